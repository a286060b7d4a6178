//! Geographic to planar coordinate projection.
//!
//! Implements the conic equal-area projection and the composite US
//! projection from scratch without external dependencies.

pub mod albers;
pub mod albers_usa;

pub use albers::ConicEqualArea;
pub use albers_usa::AlbersUsa;

use cluster_common::ViewportSize;

/// Projects (longitude, latitude) in degrees to base-layer planar coordinates.
///
/// Implementations must be pure for a fixed configuration: projecting the same
/// point twice without reconfiguring yields the same output.
pub trait Projection {
    /// Planar (x, y), or `None` when the point lies outside the projection's
    /// valid domain.
    fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// Recenter and rescale for a new viewport size.
    fn fit_viewport(&mut self, viewport: ViewportSize);
}
