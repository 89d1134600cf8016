//! This code is heavily based on <https://godoc.org/code.google.com/p/eaburns/kdtree>
//!
//! Original code is under New BSD License.
//! Author: Ethan Burns <burns.ethan@gmail.com>

use bitvec::prelude::*;

use super::point::{Point, PointList};

/// KD-Tree over (lat, lon) points using the flat Euclidean metric
///
/// Points are separated from nodes. Nodes hold only indices into the Points slice.
pub struct KDTree {
    /// All points in the tree
    pub points: PointList,
    /// Root node of the tree
    pub root: Option<Box<KDTreeNode>>,
}

/// A node in the K-D tree
pub struct KDTreeNode {
    /// Index of the point associated with this node
    pub point_id: usize,
    /// Indices of points equal to this node's point
    pub equal_ids: Vec<usize>,

    split: usize,
    left: Option<Box<KDTreeNode>>,
    right: Option<Box<KDTreeNode>>,
}

impl KDTree {
    /// Finds all points in the K-D tree within `dist` (inclusive) of `pt`
    ///
    /// Found indices are appended to `nodes` in no particular order. To avoid
    /// allocation, `nodes` can be pre-allocated and re-used across calls.
    pub fn in_range(&self, pt: &Point, dist: f64, mut nodes: Vec<usize>) -> Vec<usize> {
        if dist < 0.0 {
            return nodes;
        }
        self.in_range_recursive(self.root.as_deref(), pt, dist, &mut nodes);
        nodes
    }

    fn in_range_recursive(
        &self,
        t: Option<&KDTreeNode>,
        pt: &Point,
        r: f64,
        nodes: &mut Vec<usize>,
    ) {
        let t = match t {
            None => return,
            Some(t) => t,
        };

        let node_pt = &self.points[t.point_id];
        let diff = pt.coord(t.split) - node_pt.coord(t.split);

        let (this_side, other_side) = if diff < 0.0 {
            (t.left.as_deref(), t.right.as_deref())
        } else {
            (t.right.as_deref(), t.left.as_deref())
        };

        self.in_range_recursive(this_side, pt, r, nodes);
        // Splitting plane is out of reach: nothing on the far side can match
        if diff.abs() <= r {
            if node_pt.dist(pt) <= r {
                nodes.push(t.point_id);
                nodes.extend_from_slice(&t.equal_ids);
            }
            self.in_range_recursive(other_side, pt, r, nodes);
        }
    }

    /// Returns the height of the K-D tree
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |r| r.height())
    }
}

impl KDTreeNode {
    fn height(&self) -> usize {
        let ht = self.left.as_ref().map_or(0, |l| l.height());
        let rht = self.right.as_ref().map_or(0, |r| r.height());
        ht.max(rht) + 1
    }
}

/// Creates a new K-D tree built from the given points
pub fn new_kd_tree(points: PointList) -> KDTree {
    let mut result = KDTree { points, root: None };

    if !result.points.is_empty() {
        let mut taken = bitvec![0; result.points.len()];
        result.root = build_tree(0, &pre_sort(&result.points), &mut taken);
    }

    result
}

/// Builds a tree node by finding the median point and recursively building left and right subtrees
///
/// `taken` is scratch space shared by every split, all bits clear between calls.
fn build_tree(
    depth: usize,
    nodes: &PreSorted<'_>,
    taken: &mut BitVec,
) -> Option<Box<KDTreeNode>> {
    let split = depth % 2;
    match nodes.cur[split].len() {
        0 => None,
        1 => Some(Box::new(KDTreeNode {
            point_id: nodes.cur[split][0],
            equal_ids: Vec::new(),
            split,
            left: None,
            right: None,
        })),
        _ => {
            let (med, equal, left, right) = nodes.split_med(split, taken);
            Some(Box::new(KDTreeNode {
                point_id: med,
                equal_ids: equal,
                split,
                left: build_tree(depth + 1, &left, taken),
                right: build_tree(depth + 1, &right, taken),
            }))
        }
    }
}

/// Holds point ids pre-sorted on each dimension
struct PreSorted<'a> {
    points: &'a [Point],
    /// Currently sorted set of point IDs by dimension
    cur: [Vec<usize>; 2],
}

/// Pre-sorts point ids on each dimension, ties broken by the other dimension
fn pre_sort(points: &[Point]) -> PreSorted<'_> {
    let mut p = PreSorted {
        points,
        cur: [Vec::new(), Vec::new()],
    };
    for i in 0..2 {
        p.cur[i] = (0..points.len()).collect();
        p.cur[i].sort_by(|&a, &b| {
            let a_val = points[a].coord(i);
            let b_val = points[b].coord(i);
            if a_val == b_val {
                points[a]
                    .coord(1 - i)
                    .partial_cmp(&points[b].coord(1 - i))
                    .unwrap_or(std::cmp::Ordering::Equal)
            } else {
                a_val
                    .partial_cmp(&b_val)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }
        });
    }
    p
}

impl<'a> PreSorted<'a> {
    /// Returns the median id on the split dimension, ids of points equal to it,
    /// and two PreSorted sets holding the ids below and at-or-above the median
    /// value on that dimension (still sorted on each dimension).
    fn split_med(
        &self,
        dim: usize,
        taken: &mut BitVec,
    ) -> (usize, Vec<usize>, PreSorted<'a>, PreSorted<'a>) {
        let sorted = &self.cur[dim];
        let mut m = sorted.len() / 2;
        while m > 0 && self.points[sorted[m - 1]].coord(dim) == self.points[sorted[m]].coord(dim)
        {
            m -= 1;
        }
        let mut mh = m;
        while mh < sorted.len() - 1 && self.points[sorted[mh + 1]] == self.points[sorted[m]] {
            mh += 1;
        }
        let med = sorted[m];
        let equal = sorted[m + 1..=mh].to_vec();
        let pivot = self.points[med].coord(dim);

        for &id in &sorted[m..=mh] {
            taken.set(id, true);
        }

        let mut left = PreSorted {
            points: self.points,
            cur: [Vec::new(), Vec::new()],
        };
        left.cur[dim] = sorted[..m].to_vec();

        let mut right = PreSorted {
            points: self.points,
            cur: [Vec::new(), Vec::new()],
        };
        right.cur[dim] = sorted[mh + 1..].to_vec();

        let other = 1 - dim;
        left.cur[other] = Vec::with_capacity(left.cur[dim].len());
        right.cur[other] = Vec::with_capacity(right.cur[dim].len());

        for &n in &self.cur[other] {
            if taken[n] {
                continue;
            }
            if self.points[n].coord(dim) < pivot {
                left.cur[other].push(n);
            } else {
                right.cur[other].push(n);
            }
        }
        for &id in &sorted[m..=mh] {
            taken.set(id, false);
        }

        (med, equal, left, right)
    }
}
