use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use geo::{Coord, coord};
use timelapse_core::Projection;

const EARTH_RADIUS: f64 = 6_378_137.0;
/// Latitude at which Web Mercator becomes square
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Spherical Web Mercator (EPSG:3857), planar coordinates in metres
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        let lat = coord.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        coord! {
            x: EARTH_RADIUS * coord.x.to_radians(),
            y: EARTH_RADIUS * (FRAC_PI_4 + lat / 2.0).tan().ln(),
        }
    }

    fn invert(&self, coord: Coord<f64>) -> Coord<f64> {
        let lat = 2.0 * (coord.y / EARTH_RADIUS).exp().atan() - FRAC_PI_2;
        coord! {
            x: (coord.x / EARTH_RADIUS).to_degrees(),
            y: lat.to_degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let times_square = coord! { x: -73.9855, y: 40.758 };
        let planar = WebMercator.project(times_square);
        let back = WebMercator.invert(planar);

        assert!((back.x - times_square.x).abs() < 1e-9);
        assert!((back.y - times_square.y).abs() < 1e-9);
    }

    #[test]
    fn test_known_values() {
        let origin = WebMercator.project(coord! { x: 0.0, y: 0.0 });
        assert!(origin.x.abs() < 1e-9 && origin.y.abs() < 1e-9);

        let corner = WebMercator.project(coord! { x: 180.0, y: MAX_LATITUDE });
        assert!((corner.x - 20_037_508.342_789_244).abs() < 1e-3);
        assert!((corner.y - 20_037_508.342_789_244).abs() < 1e-3);
    }
}
