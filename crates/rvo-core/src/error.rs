//! Engine error type.
//!
//! Sub-crates define their own error enums and wrap `RvoError` as one
//! variant via `From`.

use thiserror::Error;

/// The base error type for `rvo-core` and a common variant for sub-crates.
#[derive(Debug, Error)]
pub enum RvoError {
    #[error("invalid agent parameters: {0}")]
    InvalidParams(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `rvo-*` crates.
pub type RvoResult<T> = Result<T, RvoError>;
