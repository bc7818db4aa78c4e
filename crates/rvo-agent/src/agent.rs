//! Per-agent data, split by who writes it during a step.
//!
//! # Why two structs?
//!
//! The velocity phase of a step reads every agent's position and velocity
//! (through the neighbor lists) while writing each agent's own neighbor
//! lists, constraint lines and candidate velocity.  Keeping the written
//! fields in a separate `AgentWork` array lets the simulator hand out
//! `&[AgentState]` to every worker alongside disjoint `&mut [AgentWork]`
//! chunks:
//!
//! ```ignore
//! // rvo-sim step (simplified):
//! let states: &[AgentState] = &store.states;
//! for (chunk, range) in store.work.chunks_mut(..) {
//!     for (w, i) in chunk.iter_mut().zip(range) {
//!         rvo_orca::compute_neighbors(i, &ctx, w);
//!         rvo_orca::compute_new_velocity(i, &ctx, w);
//!     }
//! }
//! ```
//!
//! The commit phase then walks both arrays in lockstep, moving
//! `AgentWork::new_velocity` into `AgentState::velocity`.

use rvo_core::{AgentId, AgentParams, Line, ObstacleId, Vector2};
use rvo_spatial::NeighborList;

// ── AgentState ────────────────────────────────────────────────────────────────

/// Everything about an agent that other agents may read during a step.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentState {
    pub id:             AgentId,
    pub position:       Vector2,
    pub velocity:       Vector2,
    pub pref_velocity:  Vector2,
    pub params:         AgentParams,
    /// Set by `AgentStore::mark_deleted`; the record is dropped at the next
    /// compaction.
    pub pending_delete: bool,
}

impl AgentState {
    pub fn new(id: AgentId, position: Vector2, velocity: Vector2, params: AgentParams) -> Self {
        Self {
            id,
            position,
            velocity,
            pref_velocity: Vector2::ZERO,
            params,
            pending_delete: false,
        }
    }
}

// ── AgentWork ─────────────────────────────────────────────────────────────────

/// Scratch written by an agent's own velocity computation.
///
/// Neighbor entries refer to other agents by **dense index** into the same
/// store, valid until the next compaction.
#[derive(Clone, Debug)]
pub struct AgentWork {
    pub agent_neighbors:    NeighborList<usize>,
    pub obstacle_neighbors: NeighborList<ObstacleId>,
    pub orca_lines:         Vec<Line>,
    /// Candidate velocity, committed by the second step phase.
    pub new_velocity:       Vector2,
}

impl AgentWork {
    pub fn new(max_neighbors: usize) -> Self {
        Self {
            agent_neighbors:    NeighborList::new(max_neighbors),
            obstacle_neighbors: NeighborList::unbounded(),
            orca_lines:         Vec::new(),
            new_velocity:       Vector2::ZERO,
        }
    }
}

impl Default for AgentWork {
    fn default() -> Self {
        Self::new(0)
    }
}
