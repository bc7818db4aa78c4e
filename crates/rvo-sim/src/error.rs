use rvo_core::RvoError;
use rvo_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("no default agent profile configured; call set_agent_defaults first")]
    NoAgentDefaults,

    #[error("obstacle error: {0}")]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Core(#[from] RvoError),
}

pub type SimResult<T> = Result<T, SimError>;
