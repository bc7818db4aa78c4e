//! Reciprocal half-planes induced by neighboring agents.
//!
//! For each neighbor, the velocity obstacle is the cone of relative
//! velocities that lead to contact within `time_horizon`, truncated by a
//! cut-off disk of radius `combined_radius / time_horizon`.  `u` is the
//! smallest change of relative velocity that leaves it; each agent takes half
//! of that change, so the line passes through `velocity + u / 2`.

use rvo_agent::AgentState;
use rvo_core::{Line, Vector2, det, sqr};
use rvo_spatial::NeighborList;

/// Unit direction of the left tangent from the origin to a disk of `radius`
/// centred at `relative_position` (`dist_sq` is its squared length).
#[inline]
pub(crate) fn left_tangent(relative_position: Vector2, dist_sq: f32, radius: f32) -> Vector2 {
    let leg = (dist_sq - sqr(radius)).sqrt();
    let p = relative_position;
    Vector2::new(p.x * leg - p.y * radius, p.x * radius + p.y * leg) / dist_sq
}

/// Unit direction of the right tangent; see [`left_tangent`].
#[inline]
pub(crate) fn right_tangent(relative_position: Vector2, dist_sq: f32, radius: f32) -> Vector2 {
    let leg = (dist_sq - sqr(radius)).sqrt();
    let p = relative_position;
    Vector2::new(p.x * leg + p.y * radius, -p.x * radius + p.y * leg) / dist_sq
}

/// Append one line per entry of `neighbors` (dense indices into `states`).
///
/// Agents that already overlap use `time_step` instead of the horizon, so
/// the line resolves the overlap within a single step.
pub fn push_agent_lines(
    agent:     &AgentState,
    states:    &[AgentState],
    neighbors: &NeighborList<usize>,
    time_step: f32,
    lines:     &mut Vec<Line>,
) {
    let inv_time_horizon = 1.0 / agent.params.time_horizon;

    for other in neighbors.items().map(|i| &states[i]) {
        let relative_position = other.position - agent.position;
        let relative_velocity = agent.velocity - other.velocity;
        let dist_sq = relative_position.abs_sq();
        let combined_radius = agent.params.radius + other.params.radius;
        let combined_radius_sq = sqr(combined_radius);

        let (direction, u) = if dist_sq > combined_radius_sq {
            // No collision.  Vector from cut-off centre to relative velocity.
            let w = relative_velocity - inv_time_horizon * relative_position;
            let w_length_sq = w.abs_sq();
            let dot_product1 = w * relative_position;

            if dot_product1 < 0.0 && sqr(dot_product1) > combined_radius_sq * w_length_sq {
                // Project on the cut-off circle.
                let w_length = w_length_sq.sqrt();
                let unit_w = w / w_length;
                (
                    Vector2::new(unit_w.y, -unit_w.x),
                    (combined_radius * inv_time_horizon - w_length) * unit_w,
                )
            } else {
                // Project on a leg.
                let direction = if det(relative_position, w) > 0.0 {
                    left_tangent(relative_position, dist_sq, combined_radius)
                } else {
                    -right_tangent(relative_position, dist_sq, combined_radius)
                };
                let dot_product2 = relative_velocity * direction;
                (direction, dot_product2 * direction - relative_velocity)
            }
        } else {
            // Collision.  Project on the cut-off circle of one time step.
            let inv_time_step = 1.0 / time_step;
            let w = relative_velocity - inv_time_step * relative_position;
            let w_length = w.abs();
            let unit_w = w / w_length;
            (
                Vector2::new(unit_w.y, -unit_w.x),
                (combined_radius * inv_time_step - w_length) * unit_w,
            )
        };

        lines.push(Line::new(agent.velocity + 0.5 * u, direction));
    }
}
