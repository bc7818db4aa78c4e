//! Static polygonal obstacles stored as an arena of vertex records.
//!
//! # Data layout
//!
//! Every vertex of every polygon is one [`Obstacle`] record.  A record also
//! stands for the polygon edge leaving that vertex: the segment from
//! `point` to `arena[next].point`.  `next` / `previous` are `ObstacleId`s
//! (arena indices), so each polygon is a closed cycle of indices:
//!
//! ```text
//!   v0 ─next→ v1 ─next→ v2 ─next→ v0
//! ```
//!
//! Records are never removed.  When the obstacle tree cuts an edge, the new
//! vertex is appended to the arena and spliced into its cycle with
//! [`ObstacleArena::split_edge`].
//!
//! # Winding
//!
//! Polygons are listed counter-clockwise; a clockwise polygon encloses the
//! agents instead (a bounding wall).  A two-vertex polygon is a degenerate
//! "wall" whose two edges overlap in opposite directions; both of its
//! vertices count as convex.

use rvo_core::{ObstacleId, Vector2, left_of};

use crate::{SpatialError, SpatialResult};

/// One polygon vertex and the edge that leaves it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstacle {
    pub point:     Vector2,
    /// Unit direction from `point` to the next vertex.
    pub direction: Vector2,
    /// `true` when the interior angle at this vertex is at most 180°.
    pub convex:    bool,
    pub next:      ObstacleId,
    pub previous:  ObstacleId,
    pub id:        ObstacleId,
}

/// Growable collection of obstacle vertex records.
#[derive(Clone, Debug, Default)]
pub struct ObstacleArena {
    obstacles: Vec<Obstacle>,
}

impl ObstacleArena {
    pub fn new() -> Self {
        Self { obstacles: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    /// The record for `id`.
    ///
    /// # Panics
    /// Panics if `id` was never issued by this arena.
    #[inline]
    pub fn get(&self, id: ObstacleId) -> &Obstacle {
        &self.obstacles[id.index()]
    }

    /// The record following `id` in its polygon.
    #[inline]
    pub fn next(&self, id: ObstacleId) -> &Obstacle {
        self.get(self.get(id).next)
    }

    /// All records in arena order.
    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> + '_ {
        self.obstacles.iter()
    }

    /// All ids in arena order.
    pub fn ids(&self) -> impl Iterator<Item = ObstacleId> + '_ {
        self.obstacles.iter().map(|o| o.id)
    }

    /// Ids of the polygon cycle that contains `start`, beginning at `start`.
    pub fn cycle(&self, start: ObstacleId) -> impl Iterator<Item = ObstacleId> + '_ {
        let mut current = Some(start);
        std::iter::from_fn(move || {
            let id = current?;
            let next = self.get(id).next;
            current = (next != start).then_some(next);
            Some(id)
        })
    }

    /// Append a closed polygon and return the id of its first vertex.
    ///
    /// Direction and convexity are computed per vertex here, once.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::TooFewVertices`] for fewer than 2 vertices.
    pub fn add_polygon(&mut self, vertices: &[Vector2]) -> SpatialResult<ObstacleId> {
        let n = vertices.len();
        if n < 2 {
            return Err(SpatialError::TooFewVertices(n));
        }

        let first = self.obstacles.len();
        self.obstacles.reserve(n);

        for i in 0..n {
            let prev_i = if i == 0 { n - 1 } else { i - 1 };
            let next_i = if i == n - 1 { 0 } else { i + 1 };

            let convex = if n == 2 {
                true
            } else {
                left_of(vertices[prev_i], vertices[i], vertices[next_i]) >= 0.0
            };

            self.obstacles.push(Obstacle {
                point:     vertices[i],
                direction: (vertices[next_i] - vertices[i]).normalize(),
                convex,
                next:      arena_id(first + next_i),
                previous:  arena_id(first + prev_i),
                id:        arena_id(first + i),
            });
        }

        Ok(arena_id(first))
    }

    /// Cut the edge leaving `from` at `point`.
    ///
    /// The new vertex is convex, inherits the edge direction, and is linked
    /// between `from` and its old successor.  Returns the new id.
    pub fn split_edge(&mut self, from: ObstacleId, point: Vector2) -> ObstacleId {
        let id = arena_id(self.obstacles.len());
        let old = *self.get(from);

        self.obstacles.push(Obstacle {
            point,
            direction: old.direction,
            convex:    true,
            next:      old.next,
            previous:  from,
            id,
        });
        self.obstacles[from.index()].next = id;
        self.obstacles[old.next.index()].previous = id;

        id
    }
}

#[inline]
fn arena_id(index: usize) -> ObstacleId {
    ObstacleId(index as u32)
}
