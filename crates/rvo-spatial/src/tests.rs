//! Unit tests for rvo-spatial.

#[cfg(test)]
mod neighbors {
    use crate::NeighborList;

    #[test]
    fn keeps_ascending_order() {
        let mut list = NeighborList::new(4);
        let mut range = f32::MAX;
        for (d, item) in [(5.0, 'a'), (1.0, 'b'), (3.0, 'c')] {
            list.insert(d, item, &mut range);
        }
        assert_eq!(list.items().collect::<String>(), "bca");
        // Not yet full, so the range is untouched.
        assert_eq!(range, f32::MAX);
    }

    #[test]
    fn full_list_replaces_worst_and_shrinks_range() {
        let mut list = NeighborList::new(2);
        let mut range = 100.0;
        list.insert(4.0, 1u32, &mut range);
        assert_eq!(range, 100.0);
        list.insert(9.0, 2, &mut range);
        assert_eq!(range, 9.0);

        // Callers only insert candidates inside the range.
        list.insert(2.0, 3, &mut range);
        assert_eq!(list.items().collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(range, 4.0);
    }

    #[test]
    fn zero_capacity_ignores_everything() {
        let mut list = NeighborList::new(0);
        let mut range = 10.0;
        list.insert(1.0, 0usize, &mut range);
        assert!(list.is_empty());
        assert_eq!(range, 10.0);
    }

    #[test]
    fn set_capacity_truncates() {
        let mut list = NeighborList::unbounded();
        let mut range = f32::MAX;
        for i in 0..5 {
            list.insert(i as f32, i, &mut range);
        }
        list.set_capacity(3);
        assert_eq!(list.len(), 3);
        assert_eq!(list.items().collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}

#[cfg(test)]
mod agent_tree {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use rvo_core::Vector2;

    use crate::{AgentTree, NeighborList};

    fn random_points(n: usize, seed: u64) -> Vec<Vector2> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..n)
            .map(|_| Vector2::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)))
            .collect()
    }

    /// The `k` nearest indices to `points[me]` within `range_sq`, brute force.
    fn brute_force(points: &[Vector2], me: usize, range_sq: f32, k: usize) -> Vec<usize> {
        let mut all: Vec<(f32, usize)> = points
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != me)
            .map(|(i, &p)| ((points[me] - p).abs_sq(), i))
            .filter(|&(d, _)| d < range_sq)
            .collect();
        all.sort_by(|a, b| a.0.total_cmp(&b.0));
        all.into_iter().take(k).map(|(_, i)| i).collect()
    }

    #[test]
    fn neighbors_match_brute_force() {
        let points = random_points(300, 11);
        let mut tree = AgentTree::new();
        tree.build(&points);
        assert_eq!(tree.len(), 300);

        for me in (0..points.len()).step_by(7) {
            let mut range_sq = 15.0f32 * 15.0;
            let mut list = NeighborList::new(10);
            tree.query_neighbors(points[me], me, &mut range_sq, &mut list);

            let found: Vec<usize> = list.items().collect();
            assert_eq!(found, brute_force(&points, me, 15.0 * 15.0, 10), "agent {me}");
        }
    }

    #[test]
    fn rebuild_after_moving_points() {
        let mut points = random_points(64, 3);
        let mut tree = AgentTree::new();
        tree.build(&points);

        for p in &mut points {
            *p = *p + Vector2::new(0.5, -0.25);
        }
        tree.build(&points);

        let mut range_sq = f32::MAX;
        let mut list = NeighborList::new(5);
        tree.query_neighbors(points[0], 0, &mut range_sq, &mut list);
        assert_eq!(list.items().collect::<Vec<_>>(), brute_force(&points, 0, f32::MAX, 5));
    }

    #[test]
    fn coincident_points_do_not_loop() {
        let points = vec![Vector2::new(1.0, 1.0); 40];
        let mut tree = AgentTree::new();
        tree.build(&points);

        let mut range_sq = 4.0;
        let mut list = NeighborList::new(50);
        tree.query_neighbors(points[0], 0, &mut range_sq, &mut list);
        assert_eq!(list.len(), 39);
    }

    #[test]
    fn nearest_within_radius() {
        let points = random_points(100, 5);
        let mut tree = AgentTree::new();
        tree.build(&points);

        let target = points[42] + Vector2::new(0.01, 0.0);
        assert_eq!(tree.query_nearest(target, 1.0), Some(42));
    }

    #[test]
    fn nearest_none_when_out_of_radius_or_empty() {
        let mut tree = AgentTree::new();
        assert_eq!(tree.query_nearest(Vector2::ZERO, 100.0), None);

        tree.build(&[Vector2::new(10.0, 0.0)]);
        assert_eq!(tree.query_nearest(Vector2::ZERO, 5.0), None);
        assert_eq!(tree.query_nearest(Vector2::ZERO, 10.5), Some(0));
    }

    #[test]
    fn excluded_index_is_skipped() {
        let points = vec![Vector2::ZERO, Vector2::new(1.0, 0.0)];
        let mut tree = AgentTree::new();
        tree.build(&points);

        let mut range_sq = 100.0;
        let mut list = NeighborList::new(10);
        tree.query_neighbors(points[0], 0, &mut range_sq, &mut list);
        assert_eq!(list.items().collect::<Vec<_>>(), vec![1]);
    }
}

#[cfg(test)]
mod obstacle {
    use rvo_core::Vector2;

    use crate::{ObstacleArena, SpatialError};

    fn square(arena: &mut ObstacleArena, cx: f32, cy: f32, half: f32) -> rvo_core::ObstacleId {
        arena
            .add_polygon(&[
                Vector2::new(cx - half, cy - half),
                Vector2::new(cx + half, cy - half),
                Vector2::new(cx + half, cy + half),
                Vector2::new(cx - half, cy + half),
            ])
            .unwrap()
    }

    #[test]
    fn too_few_vertices_rejected() {
        let mut arena = ObstacleArena::new();
        assert_eq!(arena.add_polygon(&[]), Err(SpatialError::TooFewVertices(0)));
        assert_eq!(
            arena.add_polygon(&[Vector2::ZERO]),
            Err(SpatialError::TooFewVertices(1))
        );
        assert!(arena.is_empty());
    }

    #[test]
    fn counter_clockwise_square_is_convex_and_linked() {
        let mut arena = ObstacleArena::new();
        let first = square(&mut arena, 0.0, 0.0, 1.0);

        let cycle: Vec<_> = arena.cycle(first).collect();
        assert_eq!(cycle.len(), 4);
        for &id in &cycle {
            let o = arena.get(id);
            assert!(o.convex);
            assert_eq!(arena.get(o.next).previous, id);
            assert!((o.direction.abs() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn reflex_vertex_detected() {
        // L-shape, counter-clockwise; the inner corner at (1, 1) is reflex.
        let mut arena = ObstacleArena::new();
        let first = arena
            .add_polygon(&[
                Vector2::new(0.0, 0.0),
                Vector2::new(2.0, 0.0),
                Vector2::new(2.0, 1.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(1.0, 2.0),
                Vector2::new(0.0, 2.0),
            ])
            .unwrap();

        let convex: Vec<bool> = arena.cycle(first).map(|id| arena.get(id).convex).collect();
        assert_eq!(convex, vec![true, true, true, false, true, true]);
    }

    #[test]
    fn two_vertex_wall_is_convex() {
        let mut arena = ObstacleArena::new();
        let first = arena
            .add_polygon(&[Vector2::new(0.0, 0.0), Vector2::new(4.0, 0.0)])
            .unwrap();
        let a = arena.get(first);
        let b = arena.next(first);
        assert!(a.convex && b.convex);
        assert_eq!(b.next, first);
        assert_eq!(a.previous, b.id);
        assert_eq!(b.direction, -a.direction);
    }

    #[test]
    fn split_edge_keeps_cycle_closed() {
        let mut arena = ObstacleArena::new();
        let first = square(&mut arena, 0.0, 0.0, 1.0);
        let old_next = arena.get(first).next;

        let new = arena.split_edge(first, Vector2::new(0.0, -1.0));
        assert_eq!(arena.get(first).next, new);
        assert_eq!(arena.get(new).previous, first);
        assert_eq!(arena.get(new).next, old_next);
        assert_eq!(arena.get(old_next).previous, new);
        assert!(arena.get(new).convex);
        assert_eq!(arena.cycle(first).count(), 5);
    }
}

#[cfg(test)]
mod obstacle_tree {
    use rvo_core::{ObstacleId, Vector2};

    use crate::{NeighborList, ObstacleArena, ObstacleTree};

    fn add_square(arena: &mut ObstacleArena, cx: f32, cy: f32, half: f32) {
        arena
            .add_polygon(&[
                Vector2::new(cx - half, cy - half),
                Vector2::new(cx + half, cy - half),
                Vector2::new(cx + half, cy + half),
                Vector2::new(cx - half, cy + half),
            ])
            .unwrap();
    }

    #[test]
    fn empty_tree_sees_everything() {
        let mut arena = ObstacleArena::new();
        let tree = ObstacleTree::build(&mut arena);
        assert!(tree.is_empty());
        assert!(tree.query_visibility(&arena, Vector2::ZERO, Vector2::new(100.0, 0.0), 5.0));
    }

    #[test]
    fn tree_holds_every_edge() {
        let mut arena = ObstacleArena::new();
        add_square(&mut arena, 0.0, 0.0, 1.0);
        add_square(&mut arena, 10.0, 0.0, 1.0);
        let tree = ObstacleTree::build(&mut arena);
        // Every arena record (including split pieces) is one tree node.
        assert_eq!(tree.len(), arena.len());
    }

    #[test]
    fn splitting_preserves_polygon_cycles() {
        // A long wall crossing the supporting lines of a square's edges
        // forces at least one cut.
        let mut arena = ObstacleArena::new();
        add_square(&mut arena, 0.0, 0.0, 1.0);
        arena
            .add_polygon(&[Vector2::new(-10.0, 0.0), Vector2::new(10.0, 0.5)])
            .unwrap();
        let before = arena.len();
        let _tree = ObstacleTree::build(&mut arena);
        assert!(arena.len() >= before);

        for o in arena.iter() {
            assert_eq!(arena.get(o.next).previous, o.id);
            assert_eq!(arena.get(o.previous).next, o.id);
        }
    }

    #[test]
    fn visibility_blocked_by_square() {
        let mut arena = ObstacleArena::new();
        add_square(&mut arena, 0.0, 0.0, 1.0);
        let tree = ObstacleTree::build(&mut arena);

        let left = Vector2::new(-5.0, 0.0);
        let right = Vector2::new(5.0, 0.0);
        assert!(!tree.query_visibility(&arena, left, right, 0.0));

        // Passing well above the square is clear, but not with a fat radius.
        let above_l = Vector2::new(-5.0, 3.0);
        let above_r = Vector2::new(5.0, 3.0);
        assert!(tree.query_visibility(&arena, above_l, above_r, 0.5));
        assert!(!tree.query_visibility(&arena, above_l, above_r, 2.5));
    }

    #[test]
    fn visibility_blocked_by_wall() {
        let mut arena = ObstacleArena::new();
        arena
            .add_polygon(&[Vector2::new(0.0, -5.0), Vector2::new(0.0, 5.0)])
            .unwrap();
        let tree = ObstacleTree::build(&mut arena);

        assert!(!tree.query_visibility(&arena, Vector2::new(-2.0, 0.0), Vector2::new(2.0, 0.0), 0.1));
        assert!(tree.query_visibility(&arena, Vector2::new(-2.0, 8.0), Vector2::new(2.0, 8.0), 0.1));
    }

    #[test]
    fn neighbor_query_reports_outside_edges_in_range() {
        let mut arena = ObstacleArena::new();
        add_square(&mut arena, 0.0, 0.0, 1.0);
        add_square(&mut arena, 50.0, 0.0, 1.0);
        let tree = ObstacleTree::build(&mut arena);

        let mut list: NeighborList<ObstacleId> = NeighborList::unbounded();
        tree.query_neighbors(&arena, Vector2::new(0.0, -3.0), 9.0, &mut list);

        // Only the near square's bottom edge lies within 3 of the query
        // point with the point on its outer side.
        assert_eq!(list.len(), 1);
        let edge = arena.get(list.items().next().unwrap());
        assert_eq!(edge.point, Vector2::new(-1.0, -1.0));
        assert!((list.entries()[0].0 - 4.0).abs() < 1e-5);
    }

    #[test]
    fn neighbor_query_is_sorted() {
        let mut arena = ObstacleArena::new();
        add_square(&mut arena, 0.0, 0.0, 1.0);
        let tree = ObstacleTree::build(&mut arena);

        let mut list: NeighborList<ObstacleId> = NeighborList::unbounded();
        tree.query_neighbors(&arena, Vector2::new(3.0, -2.0), 100.0, &mut list);

        // Outside of the bottom and right edges only.
        assert_eq!(list.len(), 2);
        let d: Vec<f32> = list.entries().iter().map(|e| e.0).collect();
        assert!(d[0] <= d[1]);
    }
}
