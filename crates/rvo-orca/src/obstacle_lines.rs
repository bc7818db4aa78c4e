//! Half-planes induced by nearby obstacle edges.
//!
//! Obstacles do not move and do not cooperate, so the agent takes full
//! responsibility: each line bounds the truncated velocity obstacle of one
//! edge at `time_horizon_obst`, offset by the agent radius.
//!
//! An edge runs from `obstacle1` to `obstacle2`.  If the agent is closest to
//! one endpoint, both records collapse onto that vertex and the edge is
//! treated as a point obstacle.

use rvo_agent::AgentState;
use rvo_core::{EPSILON, Line, ObstacleId, Vector2, det, sqr};
use rvo_spatial::{NeighborList, ObstacleArena};

use crate::agent_lines::{left_tangent, right_tangent};

/// Append at most one line per entry of `neighbors`.
///
/// Edges whose velocity obstacle is already excluded by an earlier line are
/// skipped, as are edges seen from behind a reflex vertex.
pub fn push_obstacle_lines(
    agent:     &AgentState,
    obstacles: &ObstacleArena,
    neighbors: &NeighborList<ObstacleId>,
    lines:     &mut Vec<Line>,
) {
    let position = agent.position;
    let velocity = agent.velocity;
    let radius = agent.params.radius;
    let radius_sq = sqr(radius);
    let inv_time_horizon_obst = 1.0 / agent.params.time_horizon_obst;

    for id in neighbors.items() {
        let mut obstacle1 = *obstacles.get(id);
        let mut obstacle2 = *obstacles.get(obstacle1.next);

        let relative_position1 = obstacle1.point - position;
        let relative_position2 = obstacle2.point - position;

        // Both cut-off endpoints on the permitted side of an existing line?
        let covered = |relative: Vector2, line: &Line| {
            det(inv_time_horizon_obst * relative - line.point, line.direction)
                - inv_time_horizon_obst * radius
                >= -EPSILON
        };
        if lines
            .iter()
            .any(|line| covered(relative_position1, line) && covered(relative_position2, line))
        {
            continue;
        }

        let dist_sq1 = relative_position1.abs_sq();
        let dist_sq2 = relative_position2.abs_sq();

        let obstacle_vector = obstacle2.point - obstacle1.point;
        let s = (-relative_position1 * obstacle_vector) / obstacle_vector.abs_sq();
        let dist_sq_line = (-relative_position1 - s * obstacle_vector).abs_sq();

        // ── Already colliding ─────────────────────────────────────────────
        if s < 0.0 && dist_sq1 <= radius_sq {
            // Left vertex.  Reflex vertices are handled by their neighbors.
            if obstacle1.convex {
                lines.push(Line::new(Vector2::ZERO, relative_position1.perp().normalize()));
            }
            continue;
        } else if s > 1.0 && dist_sq2 <= radius_sq {
            // Right vertex.  Only once, from the edge it starts.
            if obstacle2.convex && det(relative_position2, obstacle2.direction) >= 0.0 {
                lines.push(Line::new(Vector2::ZERO, relative_position2.perp().normalize()));
            }
            continue;
        } else if (0.0..1.0).contains(&s) && dist_sq_line <= radius_sq {
            // Edge interior.
            lines.push(Line::new(Vector2::ZERO, -obstacle1.direction));
            continue;
        }

        // ── Legs of the velocity obstacle ─────────────────────────────────
        let mut left_leg_direction: Vector2;
        let mut right_leg_direction: Vector2;

        if s < 0.0 && dist_sq_line <= radius_sq {
            // Seen obliquely so that the left vertex defines the obstacle.
            if !obstacle1.convex {
                continue;
            }
            obstacle2 = obstacle1;
            left_leg_direction = left_tangent(relative_position1, dist_sq1, radius);
            right_leg_direction = right_tangent(relative_position1, dist_sq1, radius);
        } else if s > 1.0 && dist_sq_line <= radius_sq {
            // Seen obliquely so that the right vertex defines the obstacle.
            if !obstacle2.convex {
                continue;
            }
            obstacle1 = obstacle2;
            left_leg_direction = left_tangent(relative_position2, dist_sq2, radius);
            right_leg_direction = right_tangent(relative_position2, dist_sq2, radius);
        } else {
            left_leg_direction = if obstacle1.convex {
                left_tangent(relative_position1, dist_sq1, radius)
            } else {
                -obstacle1.direction
            };
            right_leg_direction = if obstacle2.convex {
                right_tangent(relative_position2, dist_sq2, radius)
            } else {
                obstacle1.direction
            };
        }

        // A leg pointing into the adjacent edge is replaced by that edge and
        // marked foreign: no line is emitted if the velocity projects on it.
        let left_neighbor = obstacles.get(obstacle1.previous);
        let mut is_left_leg_foreign = false;
        let mut is_right_leg_foreign = false;

        if obstacle1.convex && det(left_leg_direction, -left_neighbor.direction) >= 0.0 {
            left_leg_direction = -left_neighbor.direction;
            is_left_leg_foreign = true;
        }
        if obstacle2.convex && det(right_leg_direction, obstacle2.direction) <= 0.0 {
            right_leg_direction = obstacle2.direction;
            is_right_leg_foreign = true;
        }

        // ── Project the velocity on the truncated cone ────────────────────
        let single_vertex = obstacle1.id == obstacle2.id;
        let left_cutoff = inv_time_horizon_obst * (obstacle1.point - position);
        let right_cutoff = inv_time_horizon_obst * (obstacle2.point - position);
        let cutoff_vector = right_cutoff - left_cutoff;

        let t = if single_vertex {
            0.5
        } else {
            ((velocity - left_cutoff) * cutoff_vector) / cutoff_vector.abs_sq()
        };
        let t_left = (velocity - left_cutoff) * left_leg_direction;
        let t_right = (velocity - right_cutoff) * right_leg_direction;

        if (t < 0.0 && t_left < 0.0) || (single_vertex && t_left < 0.0 && t_right < 0.0) {
            // Left cut-off circle.
            let unit_w = (velocity - left_cutoff).normalize();
            lines.push(Line::new(
                left_cutoff + radius * inv_time_horizon_obst * unit_w,
                Vector2::new(unit_w.y, -unit_w.x),
            ));
            continue;
        } else if t > 1.0 && t_right < 0.0 {
            // Right cut-off circle.
            let unit_w = (velocity - right_cutoff).normalize();
            lines.push(Line::new(
                right_cutoff + radius * inv_time_horizon_obst * unit_w,
                Vector2::new(unit_w.y, -unit_w.x),
            ));
            continue;
        }

        let dist_sq_cutoff = if t < 0.0 || t > 1.0 || single_vertex {
            f32::INFINITY
        } else {
            (velocity - (left_cutoff + t * cutoff_vector)).abs_sq()
        };
        let dist_sq_left = if t_left < 0.0 {
            f32::INFINITY
        } else {
            (velocity - (left_cutoff + t_left * left_leg_direction)).abs_sq()
        };
        let dist_sq_right = if t_right < 0.0 {
            f32::INFINITY
        } else {
            (velocity - (right_cutoff + t_right * right_leg_direction)).abs_sq()
        };

        if dist_sq_cutoff <= dist_sq_left && dist_sq_cutoff <= dist_sq_right {
            // Cut-off segment.
            let direction = -obstacle1.direction;
            lines.push(Line::new(
                left_cutoff + radius * inv_time_horizon_obst * direction.perp(),
                direction,
            ));
        } else if dist_sq_left <= dist_sq_right {
            if !is_left_leg_foreign {
                lines.push(Line::new(
                    left_cutoff + radius * inv_time_horizon_obst * left_leg_direction.perp(),
                    left_leg_direction,
                ));
            }
        } else if !is_right_leg_foreign {
            let direction = -right_leg_direction;
            lines.push(Line::new(
                right_cutoff + radius * inv_time_horizon_obst * direction.perp(),
                direction,
            ));
        }
    }
}
