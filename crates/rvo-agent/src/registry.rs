//! Bidirectional map between external agent ids and dense array indices.
//!
//! Dense indices shift whenever deleted agents are compacted out, so the
//! simulator never hands them out.  `IdRegistry` translates in both
//! directions: a hash map for `AgentId → index` and a plain `Vec` for
//! `index → AgentId`.

use rvo_core::AgentId;

#[cfg(feature = "fx-hash")]
type IndexMap = rustc_hash::FxHashMap<AgentId, usize>;
#[cfg(not(feature = "fx-hash"))]
type IndexMap = std::collections::HashMap<AgentId, usize>;

/// `AgentId` ↔ dense index bijection over the live agents.
#[derive(Clone, Debug, Default)]
pub struct IdRegistry {
    to_index: IndexMap,
    to_id:    Vec<AgentId>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.to_id.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.to_id.is_empty()
    }

    /// Register `id` at the next dense index and return that index.
    pub fn push(&mut self, id: AgentId) -> usize {
        let index = self.to_id.len();
        self.to_index.insert(id, index);
        self.to_id.push(id);
        index
    }

    #[inline]
    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.to_index.get(&id).copied()
    }

    #[inline]
    pub fn id_at(&self, index: usize) -> Option<AgentId> {
        self.to_id.get(index).copied()
    }

    /// Live ids in dense order.
    pub fn ids(&self) -> &[AgentId] {
        &self.to_id
    }

    /// Replace the whole mapping with `ids`, where `ids[i]` lives at index `i`.
    pub fn rebuild<I: IntoIterator<Item = AgentId>>(&mut self, ids: I) {
        self.to_index.clear();
        self.to_id.clear();
        for id in ids {
            self.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.to_index.clear();
        self.to_id.clear();
    }
}
