//! `rvo-core` — foundational types for the `rvo` collision-avoidance engine.
//!
//! This crate is a dependency of every other `rvo-*` crate.  It intentionally
//! has no `rvo-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`vector`]      | `Vector2` value type and its operators                    |
//! | [`math`]        | `det`, `left_of`, `dist_sq_point_segment`, `EPSILON`, …   |
//! | [`line`]        | `Line`: directed half-plane constraint                   |
//! | [`ids`]         | `AgentId`, `ObstacleId`                                   |
//! | [`params`]      | `AgentParams`, `AgentDefaults`                            |
//! | [`config`]      | `SimConfig` (time step, worker count)                     |
//! | [`rng`]         | `SimRng` (seeded perturbation source)                     |
//! | [`error`]       | `RvoError`, `RvoResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod config;
pub mod error;
pub mod ids;
pub mod line;
pub mod math;
pub mod params;
pub mod rng;
pub mod vector;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SimConfig;
pub use error::{RvoError, RvoResult};
pub use ids::{AgentId, ObstacleId};
pub use line::Line;
pub use math::{EPSILON, det, dist_sq_point_segment, left_of, preferred_velocity_towards, sqr};
pub use params::{AgentDefaults, AgentParams};
pub use rng::SimRng;
pub use vector::Vector2;
