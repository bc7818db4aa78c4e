//! Per-agent avoidance parameters and the default agent profile.

use crate::{RvoError, RvoResult, Vector2};

/// The tunable parameters of one agent.
///
/// | Field               | Meaning                                                  |
/// |---------------------|----------------------------------------------------------|
/// | `neighbor_dist`     | Max centre-to-centre distance at which agents are considered |
/// | `max_neighbors`     | Cap on the agent-neighbor list (0 disables agent avoidance) |
/// | `time_horizon`      | Look-ahead for agent-agent avoidance (seconds)           |
/// | `time_horizon_obst` | Look-ahead for agent-obstacle avoidance (seconds)        |
/// | `radius`            | Disk radius                                              |
/// | `max_speed`         | Radius of the admissible velocity disk                   |
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentParams {
    pub neighbor_dist:     f32,
    pub max_neighbors:     usize,
    pub time_horizon:      f32,
    pub time_horizon_obst: f32,
    pub radius:            f32,
    pub max_speed:         f32,
}

impl AgentParams {
    /// Check the invariants every agent must hold.
    ///
    /// `radius`, `max_speed` and `neighbor_dist` must be non-negative; both
    /// time horizons must be strictly positive.
    pub fn validate(&self) -> RvoResult<()> {
        let non_negative = [
            ("radius", self.radius),
            ("max_speed", self.max_speed),
            ("neighbor_dist", self.neighbor_dist),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(RvoError::InvalidParams(format!("{name} must be >= 0, got {value}")));
            }
        }

        let positive = [
            ("time_horizon", self.time_horizon),
            ("time_horizon_obst", self.time_horizon_obst),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(RvoError::InvalidParams(format!("{name} must be > 0, got {value}")));
            }
        }
        Ok(())
    }
}

/// The "default agent" profile used when agents are added by position only.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentDefaults {
    pub params:   AgentParams,
    /// Initial velocity given to new agents.
    pub velocity: Vector2,
}

impl AgentDefaults {
    pub fn new(params: AgentParams, velocity: Vector2) -> Self {
        Self { params, velocity }
    }

    /// The standard profile of the circle benchmark: neighbor distance 15,
    /// 10 neighbors, both horizons 10 s, radius 1.5, max speed 2, at rest.
    pub fn circle() -> Self {
        Self {
            params: AgentParams {
                neighbor_dist:     15.0,
                max_neighbors:     10,
                time_horizon:      10.0,
                time_horizon_obst: 10.0,
                radius:            1.5,
                max_speed:         2.0,
            },
            velocity: Vector2::ZERO,
        }
    }
}
