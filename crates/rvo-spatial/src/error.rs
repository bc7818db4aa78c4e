//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `rvo-spatial`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpatialError {
    #[error("obstacle needs at least 2 vertices, got {0}")]
    TooFewVertices(usize),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
