//! `AgentStore`: the dense agent arrays plus id issuing and compaction.
//!
//! Agents live in two parallel `Vec`s ([`AgentState`] and [`AgentWork`]),
//! indexed by a dense index that is internal to the engine.  Callers hold
//! [`AgentId`]s, issued from a counter that only ever increases, so an id is
//! never handed out twice, even across [`AgentStore::clear`].
//!
//! Deletion is two-phase: [`AgentStore::mark_deleted`] only flags the agent,
//! and [`AgentStore::compact`] later drops every flagged record and rebuilds
//! the id map.  Compaction is O(live agents); the simulator runs it at most
//! once per step and only when something was flagged.

use log::debug;
use rvo_core::{AgentId, AgentParams, Vector2};

use crate::{AgentState, AgentWork, IdRegistry};

/// Dense agent storage.
///
/// `states.len() == work.len() == registry.len()` at all times, and
/// `states[i].id` is the id registered at index `i`.
#[derive(Clone, Debug, Default)]
pub struct AgentStore {
    pub states:      Vec<AgentState>,
    pub work:        Vec<AgentWork>,
    registry:        IdRegistry,
    next_id:         u32,
    pending_deletes: usize,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of agents in the arrays, including ones flagged for deletion.
    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Append a new agent and return its freshly issued id.
    pub fn add(&mut self, position: Vector2, velocity: Vector2, params: AgentParams) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;

        self.states.push(AgentState::new(id, position, velocity, params));
        self.work.push(AgentWork::new(params.max_neighbors));
        self.registry.push(id);
        id
    }

    /// Flag `id` for removal at the next [`compact`][Self::compact].
    ///
    /// Flagging an agent twice has no further effect.
    ///
    /// # Panics
    /// Panics if `id` is not a live agent.
    pub fn mark_deleted(&mut self, id: AgentId) {
        let state = self.state_mut(id);
        if !state.pending_delete {
            state.pending_delete = true;
            self.pending_deletes += 1;
        }
    }

    /// `true` if at least one agent is flagged for deletion.
    #[inline]
    pub fn has_pending_deletes(&self) -> bool {
        self.pending_deletes > 0
    }

    /// Drop every flagged agent, preserving the relative order of the rest,
    /// and rebuild the id map.  Returns the number of agents removed.
    pub fn compact(&mut self) -> usize {
        if self.pending_deletes == 0 {
            return 0;
        }

        let before = self.states.len();
        let mut write = 0;
        for read in 0..before {
            if !self.states[read].pending_delete {
                self.states.swap(write, read);
                self.work.swap(write, read);
                write += 1;
            }
        }
        self.states.truncate(write);
        self.work.truncate(write);
        self.registry.rebuild(self.states.iter().map(|s| s.id));
        self.pending_deletes = 0;

        let removed = before - write;
        debug!("compacted agent store: removed {removed}, {write} remain");
        removed
    }

    /// Remove every agent.  The id counter keeps running.
    pub fn clear(&mut self) {
        self.states.clear();
        self.work.clear();
        self.registry.clear();
        self.pending_deletes = 0;
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// Dense index of a live agent, if `id` is one.
    #[inline]
    pub fn try_index(&self, id: AgentId) -> Option<usize> {
        self.registry.index_of(id)
    }

    /// Dense index of `id`.
    ///
    /// # Panics
    /// Panics if `id` was never issued or has already been compacted away.
    #[inline]
    pub fn index_of(&self, id: AgentId) -> usize {
        match self.registry.index_of(id) {
            Some(i) => i,
            None => panic!("{id} is not a live agent"),
        }
    }

    #[inline]
    pub fn contains(&self, id: AgentId) -> bool {
        self.registry.index_of(id).is_some()
    }

    /// The id stored at dense index `index`.
    #[inline]
    pub fn id_at(&self, index: usize) -> AgentId {
        self.states[index].id
    }

    /// Live ids in dense order.
    pub fn ids(&self) -> &[AgentId] {
        self.registry.ids()
    }

    #[inline]
    pub fn state(&self, id: AgentId) -> &AgentState {
        &self.states[self.index_of(id)]
    }

    #[inline]
    pub fn state_mut(&mut self, id: AgentId) -> &mut AgentState {
        let i = self.index_of(id);
        &mut self.states[i]
    }

    #[inline]
    pub fn work(&self, id: AgentId) -> &AgentWork {
        &self.work[self.index_of(id)]
    }

    /// Shared states alongside exclusive work records, for the step phases.
    #[inline]
    pub fn split_mut(&mut self) -> (&[AgentState], &mut [AgentWork]) {
        (&self.states, &mut self.work)
    }

    /// Exclusive access to both arrays, for the commit phase.
    #[inline]
    pub fn both_mut(&mut self) -> (&mut [AgentState], &mut [AgentWork]) {
        (&mut self.states, &mut self.work)
    }
}
