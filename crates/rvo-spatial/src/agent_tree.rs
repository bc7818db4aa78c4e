//! k-d tree over agent positions, rebuilt every step.
//!
//! # Layout
//!
//! Nodes live in one flat `Vec` of length `2 * agent_count`.  A node covering
//! `count` agents stores its left child at `node + 1` and its right child at
//! `node + 2 * left_count`, so no child pointers need allocating.
//!
//! Agents are referenced by **dense index** (position in the simulator's
//! agent array).  `order` is a permutation of those indices, partitioned in
//! place at build time, and `points` holds their positions in the same order.
//! The permutation survives between builds while the agent count is
//! unchanged; consecutive steps move agents only slightly, so the previous
//! order is already nearly partitioned.

use rvo_core::{Vector2, sqr};

use crate::NeighborList;

/// Nodes covering at most this many agents are leaves.
pub const MAX_LEAF_SIZE: usize = 10;

#[derive(Copy, Clone, Debug, Default)]
struct AgentTreeNode {
    begin: usize,
    end:   usize,
    left:  usize,
    right: usize,
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
}

impl AgentTreeNode {
    /// Squared distance from `p` to this node's bounding box (0 inside).
    #[inline]
    fn dist_sq_to(&self, p: Vector2) -> f32 {
        sqr((self.min_x - p.x).max(0.0))
            + sqr((p.x - self.max_x).max(0.0))
            + sqr((self.min_y - p.y).max(0.0))
            + sqr((p.y - self.max_y).max(0.0))
    }
}

/// Spatial partition of the current agent positions.
#[derive(Clone, Debug, Default)]
pub struct AgentTree {
    order:  Vec<usize>,
    points: Vec<Vector2>,
    nodes:  Vec<AgentTreeNode>,
}

impl AgentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of agents indexed by the last build.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rebuild over `positions`, where `positions[i]` belongs to dense agent
    /// index `i`.
    pub fn build(&mut self, positions: &[Vector2]) {
        let n = positions.len();
        if self.order.len() != n {
            self.order.clear();
            self.order.extend(0..n);
            self.nodes.clear();
            self.nodes.resize(2 * n, AgentTreeNode::default());
        }

        self.points.clear();
        self.points.extend(self.order.iter().map(|&i| positions[i]));

        if n != 0 {
            self.build_recursive(0, n, 0);
        }
    }

    fn build_recursive(&mut self, begin: usize, end: usize, node: usize) {
        let (mut min_x, mut max_x) = (self.points[begin].x, self.points[begin].x);
        let (mut min_y, mut max_y) = (self.points[begin].y, self.points[begin].y);
        for p in &self.points[begin + 1..end] {
            max_x = max_x.max(p.x);
            min_x = min_x.min(p.x);
            max_y = max_y.max(p.y);
            min_y = min_y.min(p.y);
        }

        {
            let n = &mut self.nodes[node];
            n.begin = begin;
            n.end = end;
            n.min_x = min_x;
            n.max_x = max_x;
            n.min_y = min_y;
            n.max_y = max_y;
        }

        if end - begin <= MAX_LEAF_SIZE {
            return;
        }

        // Split the longer extent at its midpoint.
        let is_vertical = max_x - min_x > max_y - min_y;
        let split_value = 0.5 * if is_vertical { max_x + min_x } else { max_y + min_y };
        let coord = |p: Vector2| if is_vertical { p.x } else { p.y };

        let mut left = begin;
        let mut right = end;
        while left < right {
            while left < right && coord(self.points[left]) < split_value {
                left += 1;
            }
            while right > left && coord(self.points[right - 1]) >= split_value {
                right -= 1;
            }
            if left < right {
                self.points.swap(left, right - 1);
                self.order.swap(left, right - 1);
                left += 1;
                right -= 1;
            }
        }

        let mut left_size = left - begin;
        if left_size == 0 {
            left_size += 1;
            left += 1;
        }

        let left_node = node + 1;
        let right_node = node + 2 * left_size;
        self.nodes[node].left = left_node;
        self.nodes[node].right = right_node;

        self.build_recursive(begin, left, left_node);
        self.build_recursive(left, end, right_node);
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Feed every agent within `*range_sq` of `position` into `neighbors`,
    /// skipping dense index `exclude` (the querying agent itself).
    ///
    /// `*range_sq` shrinks as `neighbors` fills up.
    pub fn query_neighbors(
        &self,
        position:  Vector2,
        exclude:   usize,
        range_sq:  &mut f32,
        neighbors: &mut NeighborList<usize>,
    ) {
        if self.order.is_empty() {
            return;
        }
        self.query_neighbors_recursive(position, exclude, range_sq, neighbors, 0);
    }

    fn query_neighbors_recursive(
        &self,
        position:  Vector2,
        exclude:   usize,
        range_sq:  &mut f32,
        neighbors: &mut NeighborList<usize>,
        node:      usize,
    ) {
        let n = &self.nodes[node];
        if n.end - n.begin <= MAX_LEAF_SIZE {
            for k in n.begin..n.end {
                let agent = self.order[k];
                if agent == exclude {
                    continue;
                }
                let dist_sq = (position - self.points[k]).abs_sq();
                if dist_sq < *range_sq {
                    neighbors.insert(dist_sq, agent, range_sq);
                }
            }
            return;
        }

        let dist_sq_left = self.nodes[n.left].dist_sq_to(position);
        let dist_sq_right = self.nodes[n.right].dist_sq_to(position);

        // Nearer child first; the farther one only if still in range.
        let (near, near_d, far, far_d) = if dist_sq_left < dist_sq_right {
            (n.left, dist_sq_left, n.right, dist_sq_right)
        } else {
            (n.right, dist_sq_right, n.left, dist_sq_left)
        };
        if near_d < *range_sq {
            self.query_neighbors_recursive(position, exclude, range_sq, neighbors, near);
            if far_d < *range_sq {
                self.query_neighbors_recursive(position, exclude, range_sq, neighbors, far);
            }
        }
    }

    /// Dense index of the agent closest to `point`, if it lies strictly
    /// within `radius`.
    pub fn query_nearest(&self, point: Vector2, radius: f32) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }

        let mut range_sq = f32::MAX;
        let mut best = None;
        self.query_nearest_recursive(point, &mut range_sq, &mut best, 0);

        if range_sq < sqr(radius) { best } else { None }
    }

    fn query_nearest_recursive(
        &self,
        point:    Vector2,
        range_sq: &mut f32,
        best:     &mut Option<usize>,
        node:     usize,
    ) {
        let n = &self.nodes[node];
        if n.end - n.begin <= MAX_LEAF_SIZE {
            for k in n.begin..n.end {
                let dist_sq = (point - self.points[k]).abs_sq();
                if dist_sq < *range_sq {
                    *range_sq = dist_sq;
                    *best = Some(self.order[k]);
                }
            }
            return;
        }

        let dist_sq_left = self.nodes[n.left].dist_sq_to(point);
        let dist_sq_right = self.nodes[n.right].dist_sq_to(point);

        let (near, near_d, far, far_d) = if dist_sq_left < dist_sq_right {
            (n.left, dist_sq_left, n.right, dist_sq_right)
        } else {
            (n.right, dist_sq_right, n.left, dist_sq_left)
        };
        if near_d < *range_sq {
            self.query_nearest_recursive(point, range_sq, best, near);
            if far_d < *range_sq {
                self.query_nearest_recursive(point, range_sq, best, far);
            }
        }
    }
}
