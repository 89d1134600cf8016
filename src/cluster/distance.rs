use super::point::Point;

/// Calculates flat Euclidean distance between two points
///
/// Latitude and longitude are used as plain plane coordinates, no
/// geodesic correction is applied. `hypot` keeps tiny differences from
/// underflowing to zero, so only identical points are 0 apart.
pub fn distance(p1: &Point, p2: &Point) -> f64 {
    let lat_diff = p1.latitude - p2.latitude;
    let lon_diff = p1.longitude - p2.longitude;

    lat_diff.hypot(lon_diff)
}
