//! Binary space partition over obstacle edges, built once.
//!
//! Each node holds one edge; its supporting line splits the remaining edges
//! into a left subtree and a right subtree.  The splitting edge is chosen to
//! balance the two sides: minimise the larger side, then the smaller.  Edges
//! that straddle the chosen line are cut in two (see
//! [`ObstacleArena::split_edge`]) so that every edge lies wholly on one side.

use log::debug;
use rvo_core::{EPSILON, ObstacleId, Vector2, det, dist_sq_point_segment, left_of, sqr};

use crate::{NeighborList, ObstacleArena};

#[derive(Copy, Clone, Debug)]
struct ObstacleTreeNode {
    obstacle: ObstacleId,
    left:     Option<usize>,
    right:    Option<usize>,
}

/// Which side of a splitting line an edge falls on.
enum Side {
    Left,
    Right,
    Both,
}

/// Static obstacle tree.  Nodes reference edges by `ObstacleId`; every query
/// takes the arena the tree was built from.
#[derive(Clone, Debug, Default)]
pub struct ObstacleTree {
    nodes: Vec<ObstacleTreeNode>,
    root:  Option<usize>,
}

impl ObstacleTree {
    /// Build over every edge currently in `arena`.
    ///
    /// Cut edges append new vertex records to `arena`.
    pub fn build(arena: &mut ObstacleArena) -> Self {
        let edges: Vec<ObstacleId> = arena.ids().collect();
        let input = edges.len();

        let mut tree = Self { nodes: Vec::with_capacity(input), root: None };
        tree.root = tree.build_recursive(arena, edges);

        debug!(
            "obstacle tree built: {} input edges, {} nodes, {} edges split",
            input,
            tree.nodes.len(),
            tree.nodes.len() - input,
        );
        tree
    }

    /// Number of edges held in the tree (input edges plus split pieces).
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn build_recursive(&mut self, arena: &mut ObstacleArena, edges: Vec<ObstacleId>) -> Option<usize> {
        if edges.is_empty() {
            return None;
        }

        // ── Choose the most balanced splitting edge ──────────────────────
        let mut optimal_split = 0;
        let mut min_left = edges.len();
        let mut min_right = edges.len();

        for (i, &edge_i) in edges.iter().enumerate() {
            let best = balance_key(min_left, min_right);
            let mut left_size = 0;
            let mut right_size = 0;

            for (j, &edge_j) in edges.iter().enumerate() {
                if i == j {
                    continue;
                }
                match side_of(arena, edge_i, edge_j) {
                    (Side::Left, ..) => left_size += 1,
                    (Side::Right, ..) => right_size += 1,
                    (Side::Both, ..) => {
                        left_size += 1;
                        right_size += 1;
                    }
                }
                if balance_key(left_size, right_size) >= best {
                    break;
                }
            }

            if balance_key(left_size, right_size) < best {
                min_left = left_size;
                min_right = right_size;
                optimal_split = i;
            }
        }

        // ── Distribute the remaining edges, cutting straddlers ───────────
        let mut left_edges = Vec::with_capacity(min_left);
        let mut right_edges = Vec::with_capacity(min_right);
        let split_edge = edges[optimal_split];

        for (j, &edge_j) in edges.iter().enumerate() {
            if j == optimal_split {
                continue;
            }
            match side_of(arena, split_edge, edge_j) {
                (Side::Left, ..) => left_edges.push(edge_j),
                (Side::Right, ..) => right_edges.push(edge_j),
                (Side::Both, j1_left_of_i) => {
                    let i1 = arena.get(split_edge).point;
                    let i2 = arena.next(split_edge).point;
                    let j1 = arena.get(edge_j).point;
                    let j2 = arena.next(edge_j).point;

                    let t = det(i2 - i1, j1 - i1) / det(i2 - i1, j1 - j2);
                    let new_edge = arena.split_edge(edge_j, j1 + t * (j2 - j1));

                    if j1_left_of_i > 0.0 {
                        left_edges.push(edge_j);
                        right_edges.push(new_edge);
                    } else {
                        right_edges.push(edge_j);
                        left_edges.push(new_edge);
                    }
                }
            }
        }

        let node = self.nodes.len();
        self.nodes.push(ObstacleTreeNode { obstacle: split_edge, left: None, right: None });
        let left = self.build_recursive(arena, left_edges);
        let right = self.build_recursive(arena, right_edges);
        self.nodes[node].left = left;
        self.nodes[node].right = right;

        Some(node)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Feed every edge within `range_sq` of `position` into `neighbors`.
    ///
    /// Only edges that `position` lies to the right of (outside the polygon)
    /// are reported.  The range does not shrink during this search.
    pub fn query_neighbors(
        &self,
        arena:     &ObstacleArena,
        position:  Vector2,
        range_sq:  f32,
        neighbors: &mut NeighborList<ObstacleId>,
    ) {
        self.query_neighbors_recursive(arena, position, range_sq, neighbors, self.root);
    }

    fn query_neighbors_recursive(
        &self,
        arena:     &ObstacleArena,
        position:  Vector2,
        range_sq:  f32,
        neighbors: &mut NeighborList<ObstacleId>,
        node:      Option<usize>,
    ) {
        let Some(node) = node else { return };
        let n = self.nodes[node];

        let obstacle1 = arena.get(n.obstacle);
        let obstacle2 = arena.get(obstacle1.next);

        let agent_left_of_line = left_of(obstacle1.point, obstacle2.point, position);
        let (near, far) = if agent_left_of_line >= 0.0 { (n.left, n.right) } else { (n.right, n.left) };

        self.query_neighbors_recursive(arena, position, range_sq, neighbors, near);

        let dist_sq_line = sqr(agent_left_of_line) / (obstacle2.point - obstacle1.point).abs_sq();
        if dist_sq_line < range_sq {
            if agent_left_of_line < 0.0 {
                let dist_sq = dist_sq_point_segment(obstacle1.point, obstacle2.point, position);
                if dist_sq < range_sq {
                    let mut unbounded = range_sq;
                    neighbors.insert(dist_sq, n.obstacle, &mut unbounded);
                }
            }

            // Try the other side of the line.
            self.query_neighbors_recursive(arena, position, range_sq, neighbors, far);
        }
    }

    /// `true` if the segment `q1 – q2` keeps at least `radius` clear of every
    /// edge in the tree.  An empty tree sees everything.
    pub fn query_visibility(&self, arena: &ObstacleArena, q1: Vector2, q2: Vector2, radius: f32) -> bool {
        self.query_visibility_recursive(arena, q1, q2, radius, self.root)
    }

    fn query_visibility_recursive(
        &self,
        arena:  &ObstacleArena,
        q1:     Vector2,
        q2:     Vector2,
        radius: f32,
        node:   Option<usize>,
    ) -> bool {
        let Some(node) = node else { return true };
        let n = self.nodes[node];

        let obstacle1 = arena.get(n.obstacle);
        let obstacle2 = arena.get(obstacle1.next);

        let q1_left_of_i = left_of(obstacle1.point, obstacle2.point, q1);
        let q2_left_of_i = left_of(obstacle1.point, obstacle2.point, q2);
        let inv_length_i = 1.0 / (obstacle2.point - obstacle1.point).abs_sq();
        let radius_sq = sqr(radius);

        let both_clear = || {
            sqr(q1_left_of_i) * inv_length_i >= radius_sq && sqr(q2_left_of_i) * inv_length_i >= radius_sq
        };

        if q1_left_of_i >= 0.0 && q2_left_of_i >= 0.0 {
            return self.query_visibility_recursive(arena, q1, q2, radius, n.left)
                && (both_clear() || self.query_visibility_recursive(arena, q1, q2, radius, n.right));
        }

        if q1_left_of_i <= 0.0 && q2_left_of_i <= 0.0 {
            return self.query_visibility_recursive(arena, q1, q2, radius, n.right)
                && (both_clear() || self.query_visibility_recursive(arena, q1, q2, radius, n.left));
        }

        if q1_left_of_i >= 0.0 && q2_left_of_i <= 0.0 {
            // One can see through the obstacle from left to right.
            return self.query_visibility_recursive(arena, q1, q2, radius, n.left)
                && self.query_visibility_recursive(arena, q1, q2, radius, n.right);
        }

        let point1_left_of_q = left_of(q1, q2, obstacle1.point);
        let point2_left_of_q = left_of(q1, q2, obstacle2.point);
        let inv_length_q = 1.0 / (q2 - q1).abs_sq();

        point1_left_of_q * point2_left_of_q >= 0.0
            && sqr(point1_left_of_q) * inv_length_q > radius_sq
            && sqr(point2_left_of_q) * inv_length_q > radius_sq
            && self.query_visibility_recursive(arena, q1, q2, radius, n.left)
            && self.query_visibility_recursive(arena, q1, q2, radius, n.right)
    }
}

/// Ordering key for a candidate split: larger side first, then smaller side.
#[inline]
fn balance_key(left: usize, right: usize) -> (usize, usize) {
    (left.max(right), left.min(right))
}

/// Classify edge `j` against the supporting line of edge `i`.
///
/// Also returns how far `j`'s start vertex lies left of that line, which
/// decides which half keeps the original record when `j` is cut.
fn side_of(arena: &ObstacleArena, i: ObstacleId, j: ObstacleId) -> (Side, f32) {
    let i1 = arena.get(i).point;
    let i2 = arena.next(i).point;
    let j1 = arena.get(j).point;
    let j2 = arena.next(j).point;

    let j1_left_of_i = left_of(i1, i2, j1);
    let j2_left_of_i = left_of(i1, i2, j2);

    let side = if j1_left_of_i >= -EPSILON && j2_left_of_i >= -EPSILON {
        Side::Left
    } else if j1_left_of_i <= EPSILON && j2_left_of_i <= EPSILON {
        Side::Right
    } else {
        Side::Both
    };
    (side, j1_left_of_i)
}
