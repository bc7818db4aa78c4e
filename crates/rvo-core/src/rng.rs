//! Seeded random source for steering layers.
//!
//! The core step is fully deterministic and never draws random numbers.
//! Steering code that sets preferred velocities adds a tiny random offset to
//! break perfectly symmetric configurations (two agents meeting head-on would
//! otherwise agree to slow down forever).  `SimRng` provides that offset from
//! a fixed seed so runs stay reproducible.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::Vector2;

/// Simulation-level RNG.
///
/// Used only in single-threaded contexts, by whoever sets preferred
/// velocities between steps.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// A vector with uniformly random angle and length in `[0, max_dist)`.
    pub fn perturbation(&mut self, max_dist: f32) -> Vector2 {
        let angle = self.0.r#gen::<f32>() * std::f32::consts::TAU;
        let dist = self.0.r#gen::<f32>() * max_dist;
        dist * Vector2::new(angle.cos(), angle.sin())
    }
}
