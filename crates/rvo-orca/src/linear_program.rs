//! Incremental 2-D linear programming over half-plane constraints.
//!
//! The feasible region is the intersection of a disk of radius `radius`
//! (the agent's max speed) with the left side of every [`Line`].  Lines are
//! added one at a time; whenever the running optimum violates the next line,
//! the optimum is recomputed on that line by [`linear_program1`] against all
//! earlier lines.
//!
//! When the constraints have no common point, [`linear_program3`] takes over
//! and minimises the worst violation of the agent lines while keeping the
//! obstacle lines hard.

use rvo_core::{EPSILON, Line, Vector2, det, sqr};

/// What the program optimises.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Objective {
    /// The feasible point closest to this velocity.
    Closest(Vector2),
    /// The feasible point furthest along this unit direction.
    Direction(Vector2),
}

/// Optimum on `lines[line_no]` subject to `lines[..line_no]` and the disk.
///
/// Returns `None` when that segment of the line is empty.
pub fn linear_program1(lines: &[Line], line_no: usize, radius: f32, objective: Objective) -> Option<Vector2> {
    let line = lines[line_no];
    let dot_product = line.point * line.direction;
    let discriminant = sqr(dot_product) + sqr(radius) - line.point.abs_sq();

    if discriminant < 0.0 {
        // The max-speed disk misses the line entirely.
        return None;
    }

    let sqrt_discriminant = discriminant.sqrt();
    let mut t_left = -dot_product - sqrt_discriminant;
    let mut t_right = -dot_product + sqrt_discriminant;

    for other in &lines[..line_no] {
        let denominator = det(line.direction, other.direction);
        let numerator = det(other.direction, line.point - other.point);

        if denominator.abs() <= EPSILON {
            // Parallel lines.
            if numerator < 0.0 {
                return None;
            }
            continue;
        }

        let t = numerator / denominator;
        if denominator >= 0.0 {
            t_right = t_right.min(t);
        } else {
            t_left = t_left.max(t);
        }

        if t_left > t_right {
            return None;
        }
    }

    let t = match objective {
        Objective::Direction(direction) => {
            if direction * line.direction > 0.0 { t_right } else { t_left }
        }
        Objective::Closest(velocity) => {
            let t = line.direction * (velocity - line.point);
            if t < t_left {
                t_left
            } else if t > t_right {
                t_right
            } else {
                t
            }
        }
    };
    Some(line.point + t * line.direction)
}

/// Optimum subject to every line in `lines` and the disk.
///
/// Returns the best point found and the number of lines it satisfies: equal
/// to `lines.len()` on success, otherwise the index of the first line that
/// could not be met.  On failure the point is the optimum over the lines
/// before that index.
pub fn linear_program2(lines: &[Line], radius: f32, objective: Objective) -> (Vector2, usize) {
    let mut result = match objective {
        // `direction` is unit length, so this lies on the disk boundary.
        Objective::Direction(direction) => direction * radius,
        Objective::Closest(velocity) if velocity.abs_sq() > sqr(radius) => velocity.normalize() * radius,
        Objective::Closest(velocity) => velocity,
    };

    for (i, line) in lines.iter().enumerate() {
        if line.violation(result) > 0.0 {
            match linear_program1(lines, i, radius, objective) {
                Some(point) => result = point,
                None => return (result, i),
            }
        }
    }

    (result, lines.len())
}

/// Fallback for an infeasible program.
///
/// `lines[..num_obst_lines]` stay hard constraints.  Starting from
/// `begin_line`, each remaining line whose violation exceeds the worst seen
/// so far is handled by projecting the previous agent lines onto it and
/// pushing `result` as far to its permitted side as those projections allow.
pub fn linear_program3(
    lines:          &[Line],
    num_obst_lines: usize,
    begin_line:     usize,
    radius:         f32,
    result:         &mut Vector2,
) {
    let mut distance = 0.0;
    let mut proj_lines: Vec<Line> = Vec::with_capacity(lines.len());

    for i in begin_line..lines.len() {
        let line = lines[i];
        if line.violation(*result) <= distance {
            // Already satisfied within the current tolerance.
            continue;
        }

        proj_lines.clear();
        proj_lines.extend_from_slice(&lines[..num_obst_lines]);

        for other in &lines[num_obst_lines..i] {
            let determinant = det(line.direction, other.direction);

            let point = if determinant.abs() <= EPSILON {
                if line.direction * other.direction > 0.0 {
                    // Same direction: `other` adds nothing here.
                    continue;
                }
                // Opposite directions: meet halfway.
                0.5 * (line.point + other.point)
            } else {
                line.point + (det(other.direction, line.point - other.point) / determinant) * line.direction
            };

            proj_lines.push(Line::new(point, (other.direction - line.direction).normalize()));
        }

        let (candidate, satisfied) =
            linear_program2(&proj_lines, radius, Objective::Direction(line.direction.perp()));
        // Infeasibility here can only come from rounding; keep the previous
        // result in that case.
        if satisfied == proj_lines.len() {
            *result = candidate;
        }

        distance = line.violation(*result);
    }
}

/// The velocity closest to `pref_velocity` allowed by `lines` within
/// `max_speed`, falling back to [`linear_program3`] when no such velocity
/// exists.  The first `num_obst_lines` lines are treated as hard.
pub fn solve(lines: &[Line], num_obst_lines: usize, max_speed: f32, pref_velocity: Vector2) -> Vector2 {
    let (mut result, satisfied) = linear_program2(lines, max_speed, Objective::Closest(pref_velocity));
    if satisfied < lines.len() {
        linear_program3(lines, num_obst_lines, satisfied, max_speed, &mut result);
    }
    result
}
