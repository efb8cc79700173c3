//! Great-circle distance and nearest-point helpers shared by the fetcher,
//! graph builder and routing engine.

use geo::{HaversineDistance, Point};
use waypath_common::Coordinate;

/// Great-circle distance between two coordinates, in kilometres.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let p1 = Point::new(a.lng, a.lat);
    let p2 = Point::new(b.lng, b.lat);
    p1.haversine_distance(&p2) / 1000.0
}

/// Finds the candidate nearest to `target`, along with its distance in kilometres.
///
/// Ties are broken in favor of whichever candidate appears first. Returns `None`
/// when `candidates` is empty.
pub fn nearest<T>(
    target: Coordinate,
    candidates: impl IntoIterator<Item = T>,
    coord_of: impl Fn(&T) -> Coordinate,
) -> Option<(T, f64)> {
    candidates
        .into_iter()
        .map(|item| {
            let d = distance_km(target, coord_of(&item));
            (item, d)
        })
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).expect("distance_km never returns NaN"))
}
