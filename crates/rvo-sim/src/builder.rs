//! Fluent builder for constructing a [`Simulator`].

use rvo_core::{AgentDefaults, SimConfig};

use crate::{SimResult, Simulator};

/// Fluent builder for [`Simulator`].
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                          |
/// |------------------------|----------------------------------|
/// | `.config(c)`           | `SimConfig::default()`           |
/// | `.time_step(dt)`       | `0.1`                            |
/// | `.num_workers(n)`      | Host parallelism                 |
/// | `.agent_defaults(d)`   | None (`add_agent` fails)         |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimulatorBuilder::new()
///     .time_step(0.25)
///     .agent_defaults(AgentDefaults::circle())
///     .build()?;
/// let a = sim.add_agent(Vector2::new(0.0, 0.0))?;
/// ```
#[derive(Default)]
pub struct SimulatorBuilder {
    config:   SimConfig,
    defaults: Option<AgentDefaults>,
}

impl SimulatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn time_step(mut self, time_step: f32) -> Self {
        self.config.time_step = time_step;
        self
    }

    /// `0` selects the host's available parallelism.
    pub fn num_workers(mut self, workers: usize) -> Self {
        self.config.num_workers = (workers > 0).then_some(workers);
        self
    }

    /// Profile used by [`Simulator::add_agent`].
    pub fn agent_defaults(mut self, defaults: AgentDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Validate the configuration and the default profile and return an
    /// empty simulator.
    pub fn build(self) -> SimResult<Simulator> {
        self.config.validate()?;
        if let Some(defaults) = &self.defaults {
            defaults.params.validate()?;
        }
        Ok(Simulator::with_valid_config(self.config, self.defaults))
    }
}
