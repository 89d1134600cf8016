//! Package cluster implements density-based clustering on (lat, lon) points
pub mod dbscan;
pub mod distance;
pub mod error;
pub mod kdtree;
pub mod point;

#[cfg(test)]
mod dbscan_test;

// Public API exports - allow unused imports as these are part of the public API
#[allow(unused_imports)]
pub use dbscan::{Dbscan, KD_TREE_MIN_POINTS, db_scan, region_query};
#[allow(unused_imports)]
pub use distance::distance;
pub use error::{Error, Result};
#[allow(unused_imports)]
pub use kdtree::{KDTree, new_kd_tree};
#[allow(unused_imports)]
pub use point::{Cluster, Point, PointList, Status};
