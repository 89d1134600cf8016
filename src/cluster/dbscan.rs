use tracing::{debug, info};

use super::error::{Error, Result};
use super::kdtree::{KDTree, new_kd_tree};
use super::point::{Cluster, Point, PointList, Status};

/// Inputs at least this large get a K-D tree, smaller ones are scanned linearly
pub const KD_TREE_MIN_POINTS: usize = 64;

// Clustering by transitive epsilon-reachability:
//
// getClusters(D, eps, MinPts)
//    for each unvisited point P in D, in input order
//       G = getNeighbors(P, [])
//       if sizeof(G) < MinPts
//          mark P as NOISE
//       else
//          C = next cluster built from G
//          compute bounding box of C, then its center
//
// getNeighbors(P, G)
//    for each unvisited point P' in D, in input order
//       if dist(P, P') <= eps
//          append P' to G
//          mark P' as visited
//          G = getNeighbors(P', G)
//    return G
//
// getNeighbors is run with an explicit stack instead of recursion. A frame only
// keeps its point and a resume index; on every resume the lowest unvisited
// neighbor at or past that index is looked up again. Members come out in the
// same depth-first order as the recursive form while the stack stays O(n).
// P's own entry is within distance 0 of P, so an unvisited seed is always the
// first member of G.

/// Clustering engine holding the working collection and its labels for one run
pub struct Dbscan {
    points: PointList,
    statuses: Vec<Status>,
    epsilon: f64,
    min_points: usize,
    clusters: Vec<Cluster>,
    tree: Option<KDTree>,
}

/// One level of the expansion stack: the point being expanded and the lowest
/// index not yet tried as its neighbor
pub(super) struct Frame {
    pub(super) point: usize,
    pub(super) next: usize,
}

impl Dbscan {
    /// Validates the input and prepares a clustering run
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidEpsilon`] if `epsilon` is negative, NaN or infinite
    /// - [`Error::InvalidCoordinate`] for the first point with a non-finite coordinate
    pub fn new(points: PointList, epsilon: f64, min_points: usize) -> Result<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(Error::InvalidEpsilon(epsilon));
        }
        if let Some((index, p)) = points.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            return Err(Error::InvalidCoordinate {
                index,
                latitude: p.latitude,
                longitude: p.longitude,
            });
        }

        let tree = if points.len() >= KD_TREE_MIN_POINTS {
            // Clone points for KD-tree construction (tree needs ownership)
            let tree = new_kd_tree(points.clone());
            debug!(
                points = points.len(),
                height = tree.height(),
                "built neighbor index"
            );
            Some(tree)
        } else {
            None
        };

        Ok(Dbscan {
            statuses: vec![Status::Unvisited; points.len()],
            points,
            epsilon,
            min_points,
            clusters: Vec::new(),
            tree,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn min_points(&self) -> usize {
        self.min_points
    }

    pub fn status(&self, i: usize) -> Status {
        self.statuses[i]
    }

    #[allow(dead_code)] // Part of public API, may be used by external code
    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }

    /// Clusters found so far
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    #[allow(dead_code)] // Part of public API, may be used by external code
    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters
    }

    /// Indices of examined points that did not end up in any cluster
    pub fn noise(&self) -> Vec<usize> {
        self.statuses
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == Status::Noise)
            .map(|(i, _)| i)
            .collect()
    }

    /// Lowest unvisited index at or after `from` within epsilon of point `p`
    ///
    /// `scratch` is reused across calls to hold K-D tree hits.
    fn next_neighbor(&self, p: usize, from: usize, scratch: &mut Vec<usize>) -> Option<usize> {
        let pt = &self.points[p];
        let open = |j: usize| j >= from && !self.statuses[j].is_visited();

        match &self.tree {
            Some(tree) => {
                scratch.clear();
                let found = tree.in_range(pt, self.epsilon, std::mem::take(scratch));
                let next = found.iter().copied().filter(|&j| open(j)).min();
                *scratch = found;
                next
            }
            None => (from..self.points.len())
                .find(|&j| open(j) && self.points[j].dist(pt) <= self.epsilon),
        }
    }

    /// Collects every unvisited point transitively within epsilon of `seed`
    ///
    /// Each discovered point is marked [`Status::Noise`] as soon as it is found,
    /// before its own neighbors are explored, so it joins at most one group.
    /// Returns indices in discovery order, or nothing when `seed` is out of range.
    pub fn get_neighbors(&mut self, seed: usize) -> Vec<usize> {
        let mut group = Vec::new();
        if seed >= self.points.len() {
            return group;
        }

        let mut scratch = Vec::new();
        let mut stack = vec![Frame {
            point: seed,
            next: 0,
        }];
        let mut peak_depth = 0;

        while let Some(&Frame { point, next }) = stack.last() {
            match self.next_neighbor(point, next, &mut scratch) {
                Some(j) => {
                    if let Some(top) = stack.last_mut() {
                        top.next = j + 1;
                    }
                    self.statuses[j] = Status::Noise;
                    group.push(j);
                    stack.push(Frame { point: j, next: 0 });
                    peak_depth = peak_depth.max(stack.len());
                }
                None => {
                    stack.pop();
                }
            }
        }

        debug!(seed, size = group.len(), peak_depth, "expansion done");
        group
    }

    /// Runs clustering over every unvisited point and returns all clusters
    ///
    /// Groups smaller than `min_points` are dropped and their points stay
    /// labelled noise. Calling this again after a full run finds nothing new.
    pub fn get_clusters(&mut self) -> &[Cluster] {
        for i in 0..self.points.len() {
            if self.statuses[i].is_visited() {
                continue;
            }

            let group = self.get_neighbors(i);
            if group.len() < self.min_points {
                self.statuses[i] = Status::Noise;
                debug!(seed = i, size = group.len(), "group too small, marked as noise");
                continue;
            }

            let id = self.clusters.len();
            for &j in &group {
                self.statuses[j] = Status::Clustered(id);
            }
            let cluster = Cluster::new(id, group, &self.points);
            debug!(
                id,
                seed = i,
                count = cluster.count_points,
                center_lat = cluster.center.latitude,
                center_lon = cluster.center.longitude,
                "cluster formed"
            );
            self.clusters.push(cluster);
        }

        info!(
            points = self.points.len(),
            clusters = self.clusters.len(),
            eps = self.epsilon,
            min_points = self.min_points,
            "clustering finished"
        );
        &self.clusters
    }
}

/// Clusters incoming points in one call
///
/// # Arguments
///
/// * `points` - List of points to cluster
/// * `eps` - Reachability radius, in coordinate units
/// * `min_points` - Minimum group size kept as a cluster
#[allow(dead_code)] // Part of public API, may be used by external code
pub fn db_scan(points: PointList, eps: f64, min_points: usize) -> Result<Vec<Cluster>> {
    let mut engine = Dbscan::new(points, eps, min_points)?;
    engine.get_clusters();
    Ok(engine.into_clusters())
}

/// Simple O(N) way to find points in neighbourhood
///
/// Returns indices of every point within `eps` (inclusive) of `p`, ascending.
/// Equivalent to `kd_tree.in_range(p, eps, vec![])` up to ordering.
pub fn region_query(points: &[Point], p: &Point, eps: f64) -> Vec<usize> {
    let mut result = Vec::new();
    if eps < 0.0 {
        return result;
    }

    for (i, point) in points.iter().enumerate() {
        if point.dist(p) <= eps {
            result.push(i);
        }
    }

    result
}
