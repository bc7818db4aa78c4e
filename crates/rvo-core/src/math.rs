//! Scalar geometry helpers shared by the spatial index and the ORCA solver.
//!
//! All functions are pure.  Degenerate input (zero-length segments) is the
//! caller's responsibility: the result is NaN, never a panic.

use crate::Vector2;

/// Threshold for every near-parallel / near-zero comparison in the engine.
pub const EPSILON: f32 = 0.00001;

#[inline]
pub fn sqr(scalar: f32) -> f32 {
    scalar * scalar
}

/// 2×2 determinant of `a` and `b` (signed parallelogram area).
///
/// Positive when `b` is counter-clockwise from `a`.
#[inline]
pub fn det(a: Vector2, b: Vector2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Signed distance-like measure of `c` from the directed line `a → b`.
///
/// Positive when `c` lies to the left of the line, negative to the right,
/// zero when collinear.  Scaled by `|b - a|`.
#[inline]
pub fn left_of(a: Vector2, b: Vector2, c: Vector2) -> f32 {
    det(a - c, b - a)
}

/// Squared distance from point `c` to the segment `a – b`.
///
/// The projection parameter is clamped to `[0, 1]`, so points beyond either
/// end measure to the nearest endpoint.
pub fn dist_sq_point_segment(a: Vector2, b: Vector2, c: Vector2) -> f32 {
    let r = ((c - a) * (b - a)) / (b - a).abs_sq();

    if r < 0.0 {
        (c - a).abs_sq()
    } else if r > 1.0 {
        (c - b).abs_sq()
    } else {
        (c - (a + r * (b - a))).abs_sq()
    }
}

/// Preferred velocity for an agent at `position` heading to `goal`.
///
/// The raw goal vector is used while the goal is within unit distance, so the
/// agent slows down on approach; farther away it is normalized to unit speed.
pub fn preferred_velocity_towards(position: Vector2, goal: Vector2) -> Vector2 {
    let goal_vector = goal - position;
    if goal_vector.abs_sq() > 1.0 {
        goal_vector.normalize()
    } else {
        goal_vector
    }
}
