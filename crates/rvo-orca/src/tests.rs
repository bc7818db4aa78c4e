//! Unit tests for rvo-orca.

use rvo_agent::{AgentState, AgentWork};
use rvo_core::{AgentDefaults, AgentId, AgentParams, Vector2};
use rvo_spatial::{AgentTree, ObstacleArena, ObstacleTree};

use crate::{StepContext, compute_neighbors, compute_new_velocity};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn params(radius: f32, max_speed: f32) -> AgentParams {
    AgentParams { radius, max_speed, ..AgentDefaults::circle().params }
}

fn agent(i: u32, position: Vector2, velocity: Vector2, params: AgentParams) -> AgentState {
    let mut state = AgentState::new(AgentId(i), position, velocity, params);
    state.pref_velocity = velocity;
    state
}

/// Run both per-agent operations for every agent and return the work records.
fn compute_all(
    states:    &[AgentState],
    obstacles: &mut ObstacleArena,
    time_step: f32,
) -> Vec<AgentWork> {
    let obstacle_tree = (!obstacles.is_empty()).then(|| ObstacleTree::build(obstacles));
    let mut agent_tree = AgentTree::new();
    let positions: Vec<Vector2> = states.iter().map(|s| s.position).collect();
    agent_tree.build(&positions);

    let ctx = StepContext::new(states, &agent_tree, obstacle_tree.as_ref(), obstacles, time_step);
    states
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut work = AgentWork::new(s.params.max_neighbors);
            compute_neighbors(i, &ctx, &mut work);
            compute_new_velocity(i, &ctx, &mut work);
            work
        })
        .collect()
}

// ── Linear programming ────────────────────────────────────────────────────────

#[cfg(test)]
mod linear_program {
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use rvo_core::{Line, Vector2, det};

    use crate::linear_program::{Objective, linear_program2};
    use crate::solve;

    const TOLERANCE: f32 = 1e-3;

    fn feasible(lines: &[Line], radius: f32, v: Vector2, tolerance: f32) -> bool {
        v.abs() <= radius + tolerance && lines.iter().all(|l| l.violation(v) <= tolerance)
    }

    /// Closest feasible point to `target` by enumerating every vertex and
    /// projection the optimum could sit on.
    fn brute_force(lines: &[Line], radius: f32, target: Vector2) -> Vector2 {
        let mut candidates = Vec::new();

        candidates.push(if target.abs() > radius { target.normalize() * radius } else { target });

        for (i, a) in lines.iter().enumerate() {
            // Projection onto the line.
            candidates.push(a.point + ((target - a.point) * a.direction) * a.direction);

            // Line / circle intersections.
            let dot = a.point * a.direction;
            let disc = dot * dot + radius * radius - a.point.abs_sq();
            if disc >= 0.0 {
                candidates.push(a.point + (-dot - disc.sqrt()) * a.direction);
                candidates.push(a.point + (-dot + disc.sqrt()) * a.direction);
            }

            // Line / line intersections.
            for b in &lines[i + 1..] {
                let denom = det(a.direction, b.direction);
                if denom.abs() > 1e-6 {
                    let t = det(b.direction, a.point - b.point) / denom;
                    candidates.push(a.point + t * a.direction);
                }
            }
        }

        candidates
            .into_iter()
            .filter(|&v| feasible(lines, radius, v, 1e-4))
            .min_by(|a, b| (*a - target).abs_sq().total_cmp(&(*b - target).abs_sq()))
            .unwrap()
    }

    /// Random lines that all keep the origin on their permitted side.
    fn random_lines(rng: &mut SmallRng, n: usize) -> Vec<Line> {
        (0..n)
            .map(|_| {
                let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
                let direction = Vector2::new(angle.cos(), angle.sin());
                let offset: f32 = rng.gen_range(0.05..1.5);
                Line::new(-offset * direction.perp(), direction)
            })
            .collect()
    }

    #[test]
    fn unconstrained_returns_preferred() {
        let (v, satisfied) = linear_program2(&[], 2.0, Objective::Closest(Vector2::new(0.5, 1.0)));
        assert_eq!(satisfied, 0);
        assert_eq!(v, Vector2::new(0.5, 1.0));
    }

    #[test]
    fn preferred_clamped_to_max_speed() {
        let (v, _) = linear_program2(&[], 2.0, Objective::Closest(Vector2::new(0.0, 10.0)));
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v.y, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn single_line_projects_preferred() {
        // Permitted side: y <= 0.5.
        let line = Line::new(Vector2::new(0.0, 0.5), Vector2::new(-1.0, 0.0));
        let v = solve(&[line], 0, 2.0, Vector2::new(0.3, 1.5));
        assert_abs_diff_eq!(v.x, 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(v.y, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn matches_brute_force_on_feasible_sets() {
        let mut rng = SmallRng::seed_from_u64(2024);
        let radius = 2.0;

        for trial in 0..300 {
            let n = rng.gen_range(1..7);
            let lines = random_lines(&mut rng, n);
            let target = Vector2::new(rng.gen_range(-4.0..4.0), rng.gen_range(-4.0..4.0));

            let (v, satisfied) = linear_program2(&lines, radius, Objective::Closest(target));
            assert_eq!(satisfied, lines.len(), "trial {trial}: feasible set reported infeasible");
            assert!(feasible(&lines, radius, v, TOLERANCE), "trial {trial}: result {v} violates a line");

            let expected = brute_force(&lines, radius, target);
            assert_abs_diff_eq!(
                (v - target).abs(),
                (expected - target).abs(),
                epsilon = TOLERANCE
            );
        }
    }

    #[test]
    fn infeasible_falls_back_to_least_violation() {
        // y >= 1 and y <= -1 cannot both hold; the fallback splits the
        // difference.
        let up = Line::new(Vector2::new(0.0, 1.0), Vector2::new(1.0, 0.0));
        let down = Line::new(Vector2::new(0.0, -1.0), Vector2::new(-1.0, 0.0));
        let lines = [up, down];

        let (_, satisfied) = linear_program2(&lines, 2.0, Objective::Closest(Vector2::new(1.0, 0.0)));
        assert_eq!(satisfied, 1);

        let v = solve(&lines, 0, 2.0, Vector2::new(1.0, 0.0));
        assert_abs_diff_eq!(v.y, 0.0, epsilon = 1e-5);
        assert!(v.abs() <= 2.0 + 1e-5);
        assert_abs_diff_eq!(up.violation(v), down.violation(v), epsilon = 1e-5);
    }

    #[test]
    fn fallback_keeps_obstacle_lines_hard() {
        // Obstacle line: x <= 0.  Agent lines demand y >= 1 and y <= -1.
        let obstacle = Line::new(Vector2::ZERO, Vector2::new(0.0, 1.0));
        let up = Line::new(Vector2::new(0.0, 1.0), Vector2::new(1.0, 0.0));
        let down = Line::new(Vector2::new(0.0, -1.0), Vector2::new(-1.0, 0.0));

        let v = solve(&[obstacle, up, down], 1, 2.0, Vector2::new(1.0, 0.0));
        assert!(obstacle.violation(v) <= 1e-5, "obstacle line violated by {v}");
    }
}

// ── Agent lines ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod agent_lines {
    use approx::assert_abs_diff_eq;
    use rvo_core::Vector2;
    use rvo_spatial::ObstacleArena;

    use super::*;

    #[test]
    fn overlapping_agents_separate_within_one_step() {
        let p = params(1.0, 4.0);
        let states = [
            agent(0, Vector2::ZERO, Vector2::ZERO, p),
            agent(1, Vector2::new(1.0, 0.0), Vector2::ZERO, p),
        ];
        let work = compute_all(&states, &mut ObstacleArena::new(), 0.25);

        let line = work[0].orca_lines[0];
        assert_abs_diff_eq!(line.point.x, -2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(line.point.y, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(line.direction.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(line.direction.y, 1.0, epsilon = 1e-6);

        // Each agent backs off far enough to clear the overlap in one step.
        assert!(work[0].new_velocity.x <= -2.0 + 1e-4);
        assert!(work[1].new_velocity.x >= 2.0 - 1e-4);
    }

    #[test]
    fn head_on_agents_choose_mirrored_velocities() {
        let p = params(1.0, 2.0);
        let states = [
            agent(0, Vector2::new(-5.0, 0.1), Vector2::new(1.0, 0.0), p),
            agent(1, Vector2::new(5.0, -0.1), Vector2::new(-1.0, 0.0), p),
        ];
        let work = compute_all(&states, &mut ObstacleArena::new(), 0.25);

        let a = work[0].new_velocity;
        let b = work[1].new_velocity;
        assert_abs_diff_eq!(a.x, -b.x, epsilon = 1e-5);
        assert_abs_diff_eq!(a.y, -b.y, epsilon = 1e-5);
        // Both swerve apart rather than continuing straight.
        assert!(a.y > 0.0 && b.y < 0.0);
        // The chosen velocity sits on (or inside) the agent's own line.
        assert!(work[0].orca_lines[0].violation(a) <= 1e-5);
    }

    #[test]
    fn distant_agents_keep_preferred_velocity() {
        let p = params(1.0, 2.0);
        let states = [
            agent(0, Vector2::ZERO, Vector2::new(1.0, 0.0), p),
            agent(1, Vector2::new(0.0, 10.0), Vector2::new(1.0, 0.0), p),
        ];
        let work = compute_all(&states, &mut ObstacleArena::new(), 0.25);

        assert_eq!(work[0].agent_neighbors.len(), 1);
        assert_eq!(work[0].new_velocity, Vector2::new(1.0, 0.0));
    }
}

// ── Neighbors ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod neighbors {
    use rvo_core::Vector2;
    use rvo_spatial::ObstacleArena;

    use super::*;

    #[test]
    fn zero_neighbor_cap_skips_agent_search() {
        let mut p = params(1.0, 2.0);
        p.max_neighbors = 0;
        let states = [
            agent(0, Vector2::ZERO, Vector2::ZERO, p),
            agent(1, Vector2::new(1.5, 0.0), Vector2::ZERO, p),
        ];
        let work = compute_all(&states, &mut ObstacleArena::new(), 0.25);
        assert!(work[0].agent_neighbors.is_empty());
        assert!(work[0].orca_lines.is_empty());
    }

    #[test]
    fn neighbor_cap_keeps_closest() {
        let mut p = params(0.1, 2.0);
        p.max_neighbors = 2;
        let states: Vec<AgentState> = (0..6)
            .map(|i| agent(i, Vector2::new(i as f32, 0.0), Vector2::ZERO, p))
            .collect();
        let work = compute_all(&states, &mut ObstacleArena::new(), 0.25);

        let near: Vec<usize> = work[0].agent_neighbors.items().collect();
        assert_eq!(near, vec![1, 2]);
    }

    #[test]
    fn agents_beyond_neighbor_dist_ignored() {
        let mut p = params(0.5, 2.0);
        p.neighbor_dist = 3.0;
        let states = [
            agent(0, Vector2::ZERO, Vector2::ZERO, p),
            agent(1, Vector2::new(2.0, 0.0), Vector2::ZERO, p),
            agent(2, Vector2::new(4.0, 0.0), Vector2::ZERO, p),
        ];
        let work = compute_all(&states, &mut ObstacleArena::new(), 0.25);
        assert_eq!(work[0].agent_neighbors.items().collect::<Vec<_>>(), vec![1]);
    }
}

// ── Obstacle lines ────────────────────────────────────────────────────────────

#[cfg(test)]
mod obstacle_lines {
    use approx::assert_abs_diff_eq;
    use rvo_core::{Line, ObstacleId, Vector2};
    use rvo_spatial::{NeighborList, ObstacleArena};

    use super::*;
    use crate::obstacle_lines::push_obstacle_lines;

    fn unit_square() -> ObstacleArena {
        let mut arena = ObstacleArena::new();
        arena
            .add_polygon(&[
                Vector2::new(-1.0, -1.0),
                Vector2::new(1.0, -1.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(-1.0, 1.0),
            ])
            .unwrap();
        arena
    }

    /// Agent with a 1 s obstacle horizon, so cut-off points equal the
    /// relative vertex positions.
    fn agent_near(position: Vector2, velocity: Vector2, radius: f32) -> AgentState {
        let p = AgentParams { time_horizon_obst: 1.0, ..params(radius, 2.0) };
        agent(0, position, velocity, p)
    }

    /// Obstacle lines for `edges`, visited in the given order.
    fn lines_for(state: &AgentState, arena: &ObstacleArena, edges: &[u32]) -> Vec<Line> {
        let mut neighbors = NeighborList::unbounded();
        let mut range_sq = f32::MAX;
        for (k, &edge) in edges.iter().enumerate() {
            neighbors.insert(k as f32, ObstacleId(edge), &mut range_sq);
        }
        let mut lines = Vec::new();
        push_obstacle_lines(state, arena, &neighbors, &mut lines);
        lines
    }

    fn assert_line(line: &Line, point: (f32, f32), direction: (f32, f32)) {
        assert_abs_diff_eq!(line.point.x, point.0, epsilon = 1e-4);
        assert_abs_diff_eq!(line.point.y, point.1, epsilon = 1e-4);
        assert_abs_diff_eq!(line.direction.x, direction.0, epsilon = 1e-4);
        assert_abs_diff_eq!(line.direction.y, direction.1, epsilon = 1e-4);
    }

    #[test]
    fn approach_is_limited_by_obstacle_horizon() {
        // Radius 0.5 at y = -3 creeping towards the bottom edge at y = -1:
        // over the 10 s obstacle horizon the agent may close at most 1.5.
        let mut arena = unit_square();
        let states = [agent(0, Vector2::new(0.0, -3.0), Vector2::new(0.0, 0.25), params(0.5, 2.0))];
        let work = compute_all(&states, &mut arena, 0.25);

        assert_eq!(work[0].obstacle_neighbors.len(), 1);
        assert_eq!(work[0].orca_lines.len(), 1);
        let v = work[0].new_velocity;
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(v.y, 0.15, epsilon = 1e-5);
    }

    #[test]
    fn edges_facing_away_are_not_neighbors() {
        let mut arena = unit_square();
        let states = [agent(0, Vector2::new(0.0, -3.0), Vector2::ZERO, params(0.5, 2.0))];
        let work = compute_all(&states, &mut arena, 0.25);

        let ids: Vec<_> = work[0].obstacle_neighbors.items().collect();
        assert_eq!(ids.len(), 1);
        assert_eq!(arena.get(ids[0]).point, Vector2::new(-1.0, -1.0));
    }

    #[test]
    fn touching_edge_interior_forbids_moving_inward() {
        let mut arena = unit_square();
        // Radius overlaps the bottom edge.
        let states = [agent(0, Vector2::new(0.0, -1.2), Vector2::new(0.0, 1.0), params(0.5, 2.0))];
        let work = compute_all(&states, &mut arena, 0.25);

        let line = work[0].orca_lines[0];
        assert_eq!(line.point, Vector2::ZERO);
        assert_abs_diff_eq!(line.direction.x, -1.0, epsilon = 1e-6);
        assert!(work[0].new_velocity.y <= 1e-5);
    }

    #[test]
    fn velocity_parallel_to_wall_is_kept() {
        let mut arena = unit_square();
        let states = [agent(0, Vector2::new(-6.0, -3.0), Vector2::new(1.0, 0.0), params(0.5, 2.0))];
        let work = compute_all(&states, &mut arena, 0.25);

        for line in &work[0].orca_lines {
            assert!(line.permits(work[0].new_velocity));
        }
        assert_abs_diff_eq!(work[0].new_velocity.x, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn touching_corner_emits_one_line() {
        // Overlaps the bottom-left corner only.  The left edge reaches it as
        // its right vertex and defers; the bottom edge emits it as its left.
        let arena = unit_square();
        let state = agent_near(Vector2::new(-1.3, -1.1), Vector2::ZERO, 0.5);
        let lines = lines_for(&state, &arena, &[3, 0]);

        assert_eq!(lines.len(), 1);
        assert_line(&lines[0], (0.0, 0.0), (-0.316228, 0.948683));
    }

    #[test]
    fn touching_wall_end_from_outside() {
        let mut arena = ObstacleArena::new();
        arena.add_polygon(&[Vector2::new(0.0, 0.0), Vector2::new(2.0, 0.0)]).unwrap();
        // Edge 1 runs from (2, 0) back to (0, 0); the agent overlaps its end.
        let state = agent_near(Vector2::new(-0.3, 0.1), Vector2::ZERO, 0.5);
        let lines = lines_for(&state, &arena, &[1]);

        assert_eq!(lines.len(), 1);
        assert_line(&lines[0], (0.0, 0.0), (0.316228, 0.948683));
        assert!(!lines[0].permits(Vector2::new(1.0, 0.0)));
    }

    #[test]
    fn oblique_left_vertex_on_foreign_leg_emits_nothing() {
        // Level with the bottom edge, left of the square.  The left leg runs
        // into the left edge, which that edge's own line handles.
        let arena = unit_square();
        let state = agent_near(Vector2::new(-3.0, -1.2), Vector2::new(2.0, 1.0), 0.5);
        assert!(lines_for(&state, &arena, &[0]).is_empty());
    }

    #[test]
    fn oblique_left_vertex_cutoff_circle() {
        let arena = unit_square();
        let state = agent_near(Vector2::new(-3.0, -1.2), Vector2::new(1.0, 0.0), 0.5);
        let lines = lines_for(&state, &arena, &[0]);

        assert_eq!(lines.len(), 1);
        assert_line(&lines[0], (1.509710, 0.101942), (-0.196116, 0.980581));
        assert!(!lines[0].permits(Vector2::new(2.0, 0.2)));
    }

    #[test]
    fn oblique_right_vertex_left_leg() {
        let arena = unit_square();
        let state = agent_near(Vector2::new(3.0, -1.2), Vector2::new(-3.0, 0.0), 0.5);
        let lines = lines_for(&state, &arena, &[0]);

        assert_eq!(lines.len(), 1);
        assert_line(&lines[0], (-1.924426, -0.294256), (-0.988511, -0.151149));
        assert!(lines[0].violation(state.velocity) > 0.0);
    }

    #[test]
    fn reflex_vertex_leg_follows_edge() {
        // L-shape; (1, 1) is the inner corner.
        let mut arena = ObstacleArena::new();
        arena
            .add_polygon(&[
                Vector2::new(0.0, 0.0),
                Vector2::new(2.0, 0.0),
                Vector2::new(2.0, 1.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(1.0, 2.0),
                Vector2::new(0.0, 2.0),
            ])
            .unwrap();
        assert!(!arena.get(ObstacleId(3)).convex);

        let state = agent_near(Vector2::new(1.6, 1.6), Vector2::new(-1.0, -0.5), 0.1);
        let lines = lines_for(&state, &arena, &[2]);

        assert_eq!(lines.len(), 1);
        assert_line(&lines[0], (-0.6, -0.5), (1.0, 0.0));
    }

    #[test]
    fn edge_behind_existing_line_is_skipped() {
        // A short wall hidden under the square's bottom edge.
        let mut arena = unit_square();
        arena.add_polygon(&[Vector2::new(-0.5, 0.0), Vector2::new(0.5, 0.0)]).unwrap();
        let state = agent_near(Vector2::new(0.0, -3.0), Vector2::ZERO, 0.5);

        let alone = lines_for(&state, &arena, &[4]);
        assert_eq!(alone.len(), 1);
        assert_line(&alone[0], (-0.5, 2.5), (-1.0, 0.0));

        let lines = lines_for(&state, &arena, &[0, 4]);
        assert_eq!(lines.len(), 1);
        assert_line(&lines[0], (-1.0, 1.5), (-1.0, 0.0));
    }
}
