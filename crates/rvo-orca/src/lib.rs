//! `rvo-orca` — per-agent velocity computation for the `rvo` engine.
//!
//! # Crate layout
//!
//! | Module              | Contents                                                  |
//! |---------------------|-----------------------------------------------------------|
//! | [`context`]         | `StepContext<'a>`: read-only step snapshot shared by all agents |
//! | [`neighbors`]       | `compute_neighbors`: fill an agent's neighbor lists       |
//! | [`obstacle_lines`]  | Half-planes induced by nearby obstacle edges              |
//! | [`agent_lines`]     | Reciprocal half-planes induced by nearby agents           |
//! | [`linear_program`]  | `linear_program1/2/3` and `solve`                         |
//! | [`velocity`]        | `compute_new_velocity`, `commit`                          |
//!
//! # Design notes
//!
//! A step runs in two phases over disjoint agent ranges:
//!
//! 1. **Velocity phase** (parallel): for each agent, `compute_neighbors` then
//!    `compute_new_velocity`.  All reads of other agents go through
//!    `&StepContext`; each call writes only the agent's own `AgentWork`.
//!
//! 2. **Commit phase** (parallel): `commit` moves each agent's candidate
//!    velocity into its state and integrates its position.
//!
//! Because no agent reads another agent's candidate velocity during phase 1,
//! results do not depend on how agents are split across workers.

pub mod agent_lines;
pub mod context;
pub mod linear_program;
pub mod neighbors;
pub mod obstacle_lines;
pub mod velocity;

#[cfg(test)]
mod tests;

pub use context::StepContext;
pub use linear_program::solve;
pub use neighbors::compute_neighbors;
pub use velocity::{commit, compute_new_velocity};
