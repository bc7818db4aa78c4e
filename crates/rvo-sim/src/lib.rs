//! `rvo-sim` — step orchestrator and public API of the `rvo` engine.
//!
//! # Step pipeline
//!
//! ```text
//! step():
//!   ① Compact   — drop agents deleted since the last step, rebuild id map.
//!   ② Pool      — create the worker pool on first use; re-partition the
//!                 agent range when the agent count changed.
//!   ③ Tree      — rebuild the agent k-d tree from current positions.
//!   ④ Velocity  — per agent: neighbor search, ORCA lines, linear program
//!                 (parallel; reads start-of-step state only).
//!   ⑤ Commit    — per agent: velocity = new velocity, position += v·dt
//!                 (parallel).
//!   ⑥ Clock     — global_time += time_step.
//! ```
//!
//! Obstacles are static: add them with [`Simulator::add_obstacle`] and call
//! [`Simulator::process_obstacles`] once before stepping.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | (default) Runs phases ④ and ⑤ on a Rayon thread pool.   |
//! | `fx-hash`  | Uses `FxHashMap` for the agent id map.                  |
//! | `serde`    | `Serialize`/`Deserialize` on config and value types.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rvo_core::{AgentDefaults, Vector2};
//! use rvo_sim::SimulatorBuilder;
//!
//! let mut sim = SimulatorBuilder::new()
//!     .time_step(0.25)
//!     .agent_defaults(AgentDefaults::circle())
//!     .build()?;
//! let a = sim.add_agent(Vector2::new(-10.0, 0.0))?;
//! sim.set_agent_pref_velocity(a, Vector2::new(1.0, 0.0));
//! sim.step();
//! ```

pub mod builder;
pub mod error;
pub mod sim;
pub mod worker;


pub use builder::SimulatorBuilder;
pub use error::{SimError, SimResult};
pub use sim::Simulator;
pub use worker::WorkerPool;
