//! `rvo-agent` — agent storage for the `rvo` collision-avoidance engine.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`agent`]      | `AgentState` (shared step input), `AgentWork` (per-agent step output) |
//! | [`registry`]   | `IdRegistry`: bidirectional `AgentId` ↔ dense index map   |
//! | [`store`]      | `AgentStore`: dense arrays, id issuing, deferred deletion |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | `IdRegistry` uses `FxHashMap` instead of the std `HashMap`. |
//! | `serde`   | Derives `Serialize`/`Deserialize` on `AgentState`.         |

pub mod agent;
pub mod registry;
pub mod store;


pub use agent::{AgentState, AgentWork};
pub use registry::IdRegistry;
pub use store::AgentStore;
