//! Directed lines used as half-plane velocity constraints.

use crate::{Vector2, det};

/// A directed line through `point` along the unit vector `direction`.
///
/// Read as a constraint, the permitted half-plane lies to the **left** of the
/// line.  ORCA lines are expressed in velocity space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub point:     Vector2,
    pub direction: Vector2,
}

impl Line {
    #[inline]
    pub fn new(point: Vector2, direction: Vector2) -> Self {
        Self { point, direction }
    }

    /// How far `v` lies on the forbidden (right) side of the line.
    ///
    /// Positive means the constraint is violated; zero or negative means `v`
    /// is permitted.
    #[inline]
    pub fn violation(&self, v: Vector2) -> f32 {
        det(self.direction, self.point - v)
    }

    /// `true` if `v` lies on the permitted side (or on the line itself).
    #[inline]
    pub fn permits(&self, v: Vector2) -> bool {
        self.violation(v) <= 0.0
    }
}
