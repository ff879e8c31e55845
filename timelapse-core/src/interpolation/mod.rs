//! Positions along paths.
//!
//! Interpolation happens in the caller's planar (rendered) space so that
//! on-screen motion is proportional to on-screen distance, then the result is
//! mapped back to geographic coordinates.

mod line;
mod path;
mod projection;

pub use line::interpolate_line;
pub use projection::Projection;
