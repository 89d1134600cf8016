#[cfg(test)]
mod tests {
    use crate::cluster::dbscan::Frame;
    use crate::cluster::{
        Dbscan, Error, KD_TREE_MIN_POINTS, Point, PointList, Status, db_scan, distance,
    };
    use quickcheck::{QuickCheck, TestResult};

    fn sample() -> PointList {
        vec![
            Point::new(40.7128, -74.0060),
            Point::new(40.7128, -74.0060),
            Point::new(40.9128, -74.0060),
            Point::new(43.9128, -74.0060),
            Point::new(44.9128, -75.0060),
            Point::new(54.9129, -75.0060),
            Point::new(64.9128, -75.0060),
        ]
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_sample_chains_into_one_cluster() {
        let clusters = db_scan(sample(), 10.01, 1).unwrap();

        assert_eq!(clusters.len(), 1);
        let c = &clusters[0];
        assert_eq!(c.count_points, 7);
        assert_eq!(c.indices, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(c.upper_left, Point::new(64.9128, -75.0060));
        assert_eq!(c.lower_right, Point::new(40.7128, -74.0060));
        assert!(close(c.center.latitude, 52.8128));
        assert!(close(c.center.longitude, -74.506));
    }

    #[test]
    fn test_sample_with_smaller_eps_splits() {
        // 4 -> 5 is 10.0001 apart, so the chain breaks there
        let clusters = db_scan(sample(), 10.0, 1).unwrap();

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(clusters[1].indices, vec![5, 6]);
        assert_eq!(clusters[1].id, 1);
    }

    #[test]
    fn test_identical_points_share_cluster() {
        for eps in [0.0, 0.1, 1.0, 10.01] {
            let mut engine = Dbscan::new(sample(), eps, 1).unwrap();
            engine.get_clusters();
            assert_eq!(engine.status(0), engine.status(1), "eps = {}", eps);
            assert!(matches!(engine.status(0), Status::Clustered(_)));
        }
    }

    #[test]
    fn test_discovery_order_is_depth_first() {
        // BFS would give 0, 1, 2, 3; DFS reaches 3 through 1 before 2
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(2.0, 0.0),
        ];
        let clusters = db_scan(points, 1.0, 1).unwrap();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].indices, vec![0, 1, 3, 2]);
    }

    #[test]
    fn test_chain_order_follows_reachability() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        let clusters = db_scan(points.clone(), 1.5, 1).unwrap();

        assert_eq!(clusters[0].indices, vec![0, 2, 3, 1]);
        let members: PointList = clusters[0].indices.iter().map(|&i| points[i]).collect();
        assert_eq!(clusters[0].points, members);
    }

    #[test]
    fn test_get_neighbors_marks_group() {
        let points = vec![
            Point::new(10.0, 10.0),
            Point::new(50.0, 50.0),
            Point::new(10.0, 10.5),
        ];
        let mut engine = Dbscan::new(points, 1.0, 2).unwrap();

        let group = engine.get_neighbors(0);
        assert_eq!(group, vec![0, 2]);
        assert_eq!(engine.status(0), Status::Noise);
        assert_eq!(engine.status(1), Status::Unvisited);
        assert_eq!(engine.status(2), Status::Noise);

        // Already examined points are never collected twice
        assert!(engine.get_neighbors(2).is_empty());
        assert_eq!(engine.get_neighbors(1), vec![1]);
    }

    #[test]
    fn test_dense_group_keeps_stack_linear() {
        // Stack frames hold no neighbor lists, so depth n costs O(n) memory
        assert_eq!(
            std::mem::size_of::<Frame>(),
            2 * std::mem::size_of::<usize>()
        );

        let n = 5000;
        let mut engine = Dbscan::new(vec![Point::new(1.0, 1.0); n], 0.5, 1).unwrap();
        let group = engine.get_neighbors(0);

        assert_eq!(group, (0..n).collect::<Vec<_>>());
        assert!(engine.statuses().iter().all(|s| *s == Status::Noise));
    }

    #[test]
    fn test_long_chain_expands_in_order() {
        // Every point only reaches its two neighbors on the line
        let n = 3000;
        let points: PointList = (0..n).map(|i| Point::new(0.0, i as f64)).collect();
        let mut engine = Dbscan::new(points, 1.0, 1).unwrap();
        let clusters = engine.get_clusters().to_vec();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].indices, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_get_neighbors_out_of_range_seed() {
        let mut engine = Dbscan::new(sample(), 1.0, 1).unwrap();
        assert!(engine.get_neighbors(7).is_empty());
        assert!(engine.get_neighbors(usize::MAX).is_empty());
        assert!(engine.statuses().iter().all(|s| *s == Status::Unvisited));
    }

    #[test]
    fn test_min_points_filters_small_groups() {
        let points = vec![
            Point::new(10.0, 10.0),
            Point::new(10.0, 10.5),
            Point::new(10.0, 11.0),
            Point::new(50.0, 50.0),
        ];
        let mut engine = Dbscan::new(points, 1.0, 2).unwrap();
        let clusters = engine.get_clusters().to_vec();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].indices, vec![0, 1, 2]);
        assert_eq!(engine.noise(), vec![3]);
        assert_eq!(
            engine.statuses(),
            &[
                Status::Clustered(0),
                Status::Clustered(0),
                Status::Clustered(0),
                Status::Noise
            ]
        );
    }

    #[test]
    fn test_min_points_above_largest_group() {
        let mut engine = Dbscan::new(sample(), 1.0, 8).unwrap();
        assert!(engine.get_clusters().is_empty());
        assert_eq!(engine.noise().len(), 7);
        assert!(engine.statuses().iter().all(|s| *s == Status::Noise));
    }

    #[test]
    fn test_min_points_zero_and_one_keep_everything() {
        for min_points in [0, 1] {
            let clusters = db_scan(sample(), 0.5, min_points).unwrap();
            let total: usize = clusters.iter().map(|c| c.count_points).sum();
            assert_eq!(total, 7);
            assert_eq!(clusters.len(), 5);
        }
    }

    #[test]
    fn test_single_point() {
        let p = Point::new(-33.8688, 151.2093);
        let clusters = db_scan(vec![p], 0.5, 1).unwrap();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count_points, 1);
        assert_eq!(clusters[0].upper_left, p);
        assert_eq!(clusters[0].lower_right, p);
        assert_eq!(clusters[0].center, p);
    }

    #[test]
    fn test_empty_input() {
        let mut engine = Dbscan::new(Vec::new(), 1.0, 1).unwrap();
        assert!(engine.get_clusters().is_empty());
        assert!(engine.noise().is_empty());
    }

    #[test]
    fn test_second_run_adds_nothing() {
        let mut engine = Dbscan::new(sample(), 10.0, 1).unwrap();
        let first = engine.get_clusters().to_vec();
        let second = engine.get_clusters().to_vec();
        assert_eq!(first, second);
        assert_eq!(engine.clusters().len(), 2);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let err = Dbscan::new(sample(), -0.5, 1).err().unwrap();
        assert!(matches!(err, Error::InvalidEpsilon(e) if e == -0.5));

        assert!(matches!(
            Dbscan::new(sample(), f64::NAN, 1),
            Err(Error::InvalidEpsilon(_))
        ));
        assert!(matches!(
            Dbscan::new(sample(), f64::INFINITY, 1),
            Err(Error::InvalidEpsilon(_))
        ));

        let mut points = sample();
        points[3] = Point::new(f64::NAN, 1.0);
        points[5] = Point::new(1.0, f64::INFINITY);
        match Dbscan::new(points, 1.0, 1) {
            Err(Error::InvalidCoordinate { index, .. }) => assert_eq!(index, 3),
            other => panic!("expected InvalidCoordinate, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_zero_eps_groups_only_duplicates() {
        let clusters = db_scan(sample(), 0.0, 2).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].indices, vec![0, 1]);
    }

    #[test]
    fn test_tree_and_scan_agree() {
        // Same layout below and above the K-D tree threshold must cluster alike
        let grid = |n: usize| -> PointList {
            (0..n)
                .map(|i| Point::new((i / 8) as f64 * 0.3, (i % 8) as f64 * 1.1))
                .collect()
        };
        let small = grid(KD_TREE_MIN_POINTS - 1);
        let large = grid(KD_TREE_MIN_POINTS * 2);

        let small_clusters = db_scan(small.clone(), 0.5, 2).unwrap();
        let large_clusters = db_scan(large, 0.5, 2).unwrap();

        for (a, b) in small_clusters.iter().zip(&large_clusters) {
            let a_members: Vec<usize> = a.indices.clone();
            let b_members: Vec<usize> =
                b.indices.iter().copied().filter(|&i| i < small.len()).collect();
            assert_eq!(a_members, b_members);
        }
        assert_eq!(small_clusters.len(), 8);
        assert_eq!(large_clusters.len(), 8);
    }

    fn to_points(coords: &[(i8, i8)]) -> PointList {
        coords
            .iter()
            .map(|&(a, b)| Point::new(a as f64 / 8.0, b as f64 / 8.0))
            .collect()
    }

    #[test]
    fn prop_partition_and_geometry() {
        fn prop(coords: Vec<(i8, i8)>, radius: u8, min_points: u8) -> bool {
            let points = to_points(&coords);
            let eps = (radius % 32) as f64 / 8.0;
            let mut engine = Dbscan::new(points.clone(), eps, (min_points % 5) as usize).unwrap();
            let clusters = engine.get_clusters().to_vec();

            let mut owner = vec![None; points.len()];
            for c in &clusters {
                if c.count_points != c.indices.len() || c.points.len() != c.indices.len() {
                    return false;
                }
                for (&i, p) in c.indices.iter().zip(&c.points) {
                    if owner[i].is_some() || *p != points[i] {
                        return false;
                    }
                    owner[i] = Some(c.id);
                    if !c.contains(p) {
                        return false;
                    }
                }
                let mid_lat = (c.upper_left.latitude + c.lower_right.latitude) / 2.0;
                let mid_lon = (c.upper_left.longitude + c.lower_right.longitude) / 2.0;
                if c.center != Point::new(mid_lat, mid_lon) {
                    return false;
                }
            }

            owner.iter().enumerate().all(|(i, o)| match (o, engine.status(i)) {
                (Some(id), Status::Clustered(s)) => *id == s,
                (None, Status::Noise) => true,
                _ => false,
            })
        }

        QuickCheck::new()
            .tests(200)
            .quickcheck(prop as fn(Vec<(i8, i8)>, u8, u8) -> bool);
    }

    #[test]
    fn prop_neighbors_share_fate() {
        // Any two points within eps land in the same cluster, or both in noise
        fn prop(coords: Vec<(i8, i8)>, radius: u8, min_points: u8) -> TestResult {
            if coords.len() < 2 {
                return TestResult::discard();
            }
            let points = to_points(&coords);
            let eps = (radius % 32) as f64 / 8.0;
            let mut engine = Dbscan::new(points.clone(), eps, (min_points % 6) as usize).unwrap();
            engine.get_clusters();

            for i in 0..points.len() {
                for j in i + 1..points.len() {
                    if distance(&points[i], &points[j]) <= eps
                        && engine.status(i) != engine.status(j)
                    {
                        return TestResult::failed();
                    }
                }
            }
            TestResult::passed()
        }

        QuickCheck::new()
            .tests(200)
            .quickcheck(prop as fn(Vec<(i8, i8)>, u8, u8) -> TestResult);
    }

    #[test]
    fn prop_runs_are_deterministic() {
        fn prop(coords: Vec<(i8, i8)>, radius: u8) -> bool {
            let eps = (radius % 32) as f64 / 8.0;
            let first = db_scan(to_points(&coords), eps, 2).unwrap();
            let second = db_scan(to_points(&coords), eps, 2).unwrap();
            first == second
        }

        QuickCheck::new()
            .tests(100)
            .quickcheck(prop as fn(Vec<(i8, i8)>, u8) -> bool);
    }
}
