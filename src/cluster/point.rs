//! Package cluster implements density-based clustering on (lat, lon) points

use serde::Serialize;

/// Latitude bounds used to seed bounding box scans
const MAX_LATITUDE: f64 = 90.0;
/// Longitude bounds used to seed bounding box scans
const MAX_LONGITUDE: f64 = 180.0;

/// Point represents a geographic coordinate
///
/// Coordinates are treated as a flat plane when measuring distance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

/// PointList is a collection of Points
pub type PointList = Vec<Point>;

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Point {
            latitude,
            longitude,
        }
    }

    /// Returns coordinate on axis `dim` (0 = latitude, 1 = longitude)
    pub fn coord(&self, dim: usize) -> f64 {
        if dim == 0 {
            self.latitude
        } else {
            self.longitude
        }
    }

    /// Both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Returns flat distance between two points
    pub fn dist(&self, b: &Point) -> f64 {
        super::distance::distance(self, b)
    }
}

/// Visitation state of a point during a clustering run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Not yet examined
    #[default]
    Unvisited,
    /// Examined but not part of any retained cluster
    Noise,
    /// Member of the cluster with this id
    Clustered(usize),
}

impl Status {
    pub fn is_visited(&self) -> bool {
        !matches!(self, Status::Unvisited)
    }

    /// Cluster id, or -1 for points outside every cluster
    pub fn label(&self) -> i64 {
        match self {
            Status::Clustered(c) => *c as i64,
            _ => -1,
        }
    }
}

/// Cluster represents a result of DBScan clustering work
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Cluster ID
    pub id: usize,
    /// Indices of member points in discovery order
    #[serde(skip)]
    pub indices: Vec<usize>,
    /// Copies of member points, same order as `indices`
    pub points: PointList,
    pub count_points: usize,
    /// North-west corner: (max latitude, min longitude)
    pub upper_left: Point,
    /// South-east corner: (min latitude, max longitude)
    pub lower_right: Point,
    /// Midpoint of the bounding box
    pub center: Point,
}

impl Cluster {
    /// Builds a cluster from member indices and computes its geometry
    pub fn new(id: usize, indices: Vec<usize>, points: &[Point]) -> Self {
        let members: PointList = indices.iter().map(|&i| points[i]).collect();
        let mut cluster = Cluster {
            id,
            count_points: members.len(),
            indices,
            points: members,
            upper_left: Point::default(),
            lower_right: Point::default(),
            center: Point::default(),
        };
        cluster.get_coordinates_cluster();
        cluster.get_cluster_center();
        cluster
    }

    /// Calculates the bounding box corners
    ///
    /// Scan bounds start at the edges of the valid coordinate range, so an
    /// empty cluster ends up with an inverted sentinel box.
    pub fn get_coordinates_cluster(&mut self) {
        let mut max_lat = -MAX_LATITUDE;
        let mut min_lat = MAX_LATITUDE;
        let mut max_lon = -MAX_LONGITUDE;
        let mut min_lon = MAX_LONGITUDE;

        for pt in &self.points {
            if pt.latitude > max_lat {
                max_lat = pt.latitude;
            }
            if pt.latitude < min_lat {
                min_lat = pt.latitude;
            }
            if pt.longitude > max_lon {
                max_lon = pt.longitude;
            }
            if pt.longitude < min_lon {
                min_lon = pt.longitude;
            }
        }

        self.upper_left = Point::new(max_lat, min_lon);
        self.lower_right = Point::new(min_lat, max_lon);
    }

    /// Sets center to the midpoint of the bounding box
    ///
    /// This is not the mean of member coordinates.
    pub fn get_cluster_center(&mut self) {
        self.center = Point::new(
            (self.upper_left.latitude + self.lower_right.latitude) / 2.0,
            (self.lower_right.longitude + self.upper_left.longitude) / 2.0,
        );
    }

    /// Checks if `p` lies inside the bounding box (edges included)
    #[allow(dead_code)] // Part of public API, may be used by external code
    pub fn contains(&self, p: &Point) -> bool {
        p.latitude >= self.lower_right.latitude
            && p.latitude <= self.upper_left.latitude
            && p.longitude >= self.upper_left.longitude
            && p.longitude <= self.lower_right.longitude
    }
}
