use geo::{Coord, Distance, Euclidean, LineString, Point};

use super::Projection;
use crate::Direction;

/// Point at `fraction` of the way along `geometry`, measured in planar space.
///
/// Vertices are visited in stored order for [`Direction::Forward`] and in
/// reverse for [`Direction::Reverse`]. Fractions of exactly 0 and 1 return
/// the first and last traversed vertex unchanged.
///
/// # Panics
///
/// If `fraction` is outside `[0, 1]` or `geometry` has no coordinates.
pub fn interpolate_line<P: Projection + ?Sized>(
    geometry: &LineString<f64>,
    direction: Direction,
    fraction: f64,
    projection: &P,
) -> Point<f64> {
    assert!(
        (0.0..=1.0).contains(&fraction),
        "interpolation fraction {fraction} outside [0, 1]"
    );

    let coords: Vec<Coord<f64>> = direction.walk(geometry).copied().collect();
    let (Some(&first), Some(&last)) = (coords.first(), coords.last()) else {
        panic!("cannot interpolate along an empty geometry");
    };
    if fraction == 0.0 {
        return first.into();
    }
    if fraction == 1.0 {
        return last.into();
    }

    let planar: Vec<Coord<f64>> = coords.iter().map(|c| projection.project(*c)).collect();

    let segment_lengths: Vec<f64> = planar
        .windows(2)
        .map(|pair| Euclidean.distance(Point::from(pair[0]), Point::from(pair[1])))
        .collect();
    let total: f64 = segment_lengths.iter().sum();

    let mut remaining = fraction * total;
    for (idx, &length) in segment_lengths.iter().enumerate() {
        if remaining <= length {
            let ratio = if length > 0.0 { remaining / length } else { 0.0 };
            let start = planar[idx];
            let end = planar[idx + 1];
            return projection.invert(start + (end - start) * ratio).into();
        }
        remaining -= length;
    }

    // Rounding carried the target past the final vertex
    last.into()
}
