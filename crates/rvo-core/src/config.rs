//! Simulation-wide configuration.

use std::num::NonZeroUsize;

use crate::{RvoError, RvoResult};

/// Top-level simulation configuration.
///
/// Typically built by the application (or deserialized with the `serde`
/// feature) and handed to the simulator builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Seconds advanced by every step.  Default: 0.1.
    pub time_step: f32,

    /// Worker thread count for the parallel step phases.  `None` uses the
    /// host's available parallelism.
    pub num_workers: Option<usize>,
}

impl SimConfig {
    pub const DEFAULT_TIME_STEP: f32 = 0.1;

    /// Reject a time step that is not strictly positive.
    pub fn validate(&self) -> RvoResult<()> {
        if !(self.time_step > 0.0) {
            return Err(RvoError::Config(format!(
                "time_step must be > 0, got {}",
                self.time_step
            )));
        }
        Ok(())
    }

    /// The worker count actually used: the configured value, or the host's
    /// available parallelism when unset or zero.
    pub fn resolved_workers(&self) -> usize {
        match self.num_workers {
            Some(n) if n > 0 => n,
            _ => default_workers(),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            time_step:   Self::DEFAULT_TIME_STEP,
            num_workers: None,
        }
    }
}

/// Host-derived worker count (hardware concurrency, at least 1).
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
