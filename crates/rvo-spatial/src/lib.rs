//! `rvo-spatial` — obstacle model and the two k-d trees used for neighbor
//! discovery.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                  |
//! |-------------------|-----------------------------------------------------------|
//! | [`obstacle`]      | `Obstacle` vertex record, `ObstacleArena` (cyclic polygons by index) |
//! | [`neighbors`]     | `NeighborList<T>`: bounded list sorted by squared distance |
//! | [`agent_tree`]    | `AgentTree`: rebuilt every step over agent positions     |
//! | [`obstacle_tree`] | `ObstacleTree`: built once over obstacle edges           |
//! | [`error`]         | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Ownership
//!
//! Neither tree owns the data it indexes.  `AgentTree` stores dense agent
//! indices plus a copy of their positions; `ObstacleTree` stores
//! `ObstacleId`s and reads vertex data from the `ObstacleArena` passed to
//! every query.  Building the obstacle tree may append records to the arena
//! (edges cut by a splitting line), which is why it takes `&mut ObstacleArena`.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Obstacle`.             |

pub mod agent_tree;
pub mod error;
pub mod neighbors;
pub mod obstacle;
pub mod obstacle_tree;

#[cfg(test)]
mod tests;

pub use agent_tree::AgentTree;
pub use error::{SpatialError, SpatialResult};
pub use neighbors::NeighborList;
pub use obstacle::{Obstacle, ObstacleArena};
pub use obstacle_tree::ObstacleTree;
