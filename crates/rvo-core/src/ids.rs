//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.
//!
//! The two ids have different meanings:
//!
//! - `AgentId` is an **external handle** issued by the simulator.  It is not
//!   an index into the dense agent array; that mapping changes whenever
//!   deleted agents are compacted away.
//! - `ObstacleId` **is** an index into the obstacle arena.  Obstacle records
//!   are never removed, so the index is stable.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" (`u32::MAX`).
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize`.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Externally visible agent handle.  Issued from a monotonically
    /// increasing counter and never reused.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of one obstacle vertex (and its outgoing edge) in the arena.
    pub struct ObstacleId(u32);
}
