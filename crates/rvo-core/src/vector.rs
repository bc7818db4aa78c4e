//! Two-dimensional vector value type.
//!
//! `Vector2` uses `f32` components.  Every constraint, position, and velocity
//! in the engine is expressed with it; the scalar helpers that combine
//! several vectors (`det`, `left_of`, …) live in [`crate::math`].
//!
//! `Mul<Vector2> for Vector2` is the dot product, so `a * b` reads the way the
//! ORCA derivations are written.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A 2-D vector (position, velocity, or direction).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Dot product.  Same as `self * other`.
    #[inline]
    pub fn dot(self, other: Vector2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Squared Euclidean length.
    #[inline]
    pub fn abs_sq(self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length.
    #[inline]
    pub fn abs(self) -> f32 {
        self.abs_sq().sqrt()
    }

    /// Unit vector in the direction of `self`.
    ///
    /// Must not be called on the zero vector: the result is NaN.
    #[inline]
    pub fn normalize(self) -> Vector2 {
        self / self.abs()
    }

    /// `self` rotated by +90°.
    #[inline]
    pub fn perp(self) -> Vector2 {
        Vector2::new(-self.y, self.x)
    }
}

impl Add for Vector2 {
    type Output = Vector2;
    #[inline]
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    #[inline]
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vector2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Vector2 {
    type Output = Vector2;
    #[inline]
    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

/// Dot product.
impl Mul for Vector2 {
    type Output = f32;
    #[inline]
    fn mul(self, rhs: Vector2) -> f32 {
        self.dot(rhs)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Vector2;
    #[inline]
    fn mul(self, rhs: f32) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vector2> for f32 {
    type Output = Vector2;
    #[inline]
    fn mul(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self * rhs.x, self * rhs.y)
    }
}

impl Div<f32> for Vector2 {
    type Output = Vector2;
    #[inline]
    fn div(self, rhs: f32) -> Vector2 {
        let inv = 1.0 / rhs;
        Vector2::new(self.x * inv, self.y * inv)
    }
}

impl From<(f32, f32)> for Vector2 {
    #[inline]
    fn from((x, y): (f32, f32)) -> Self {
        Vector2::new(x, y)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}
