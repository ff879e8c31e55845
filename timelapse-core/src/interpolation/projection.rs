use geo::Coord;

/// Bidirectional transform between geographic `(lon, lat)` coordinates and
/// a planar rendering surface.
///
/// Supplied by the caller; the engine never constructs one. `invert` must be
/// the inverse of `project` over the area the network covers.
pub trait Projection {
    fn project(&self, coord: Coord<f64>) -> Coord<f64>;

    fn invert(&self, coord: Coord<f64>) -> Coord<f64>;
}

impl<P: Projection + ?Sized> Projection for &P {
    fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        (**self).project(coord)
    }

    fn invert(&self, coord: Coord<f64>) -> Coord<f64> {
        (**self).invert(coord)
    }
}
