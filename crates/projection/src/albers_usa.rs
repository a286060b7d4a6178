//! Composite Albers projection for the United States.
//!
//! Three conic equal-area projections share one scale and translate point:
//! - Lower 48: parallels 29.5°N/45.5°N, central meridian 96°W
//! - Alaska: parallels 55°N/65°N, central meridian 154°W, 0.35× scale,
//!   inset at the bottom left
//! - Hawaii: parallels 8°N/18°N, central meridian 157°W, inset next to Alaska
//!
//! Each sub-projection has a clip rectangle relative to the translate point.
//! A geographic point is projected by the first sub-projection whose clip
//! rectangle contains its output; points covered by none of them (Europe,
//! Puerto Rico, open ocean) do not project.

use cluster_common::{BoundingBox, ViewportSize};
use tracing::debug;

use crate::albers::ConicEqualArea;
use crate::Projection;

/// Default scale when no viewport has been fitted.
pub const DEFAULT_SCALE: f64 = 1070.0;

/// Default translate point when no viewport has been fitted.
pub const DEFAULT_TRANSLATE: (f64, f64) = (480.0, 250.0);

/// Scale relative to the smaller viewport side when fitting.
pub const FIT_SCALE_FACTOR: f64 = 1.15;

const EPSILON: f64 = 1e-6;

/// Composite lower-48 / Alaska / Hawaii projection.
#[derive(Debug, Clone)]
pub struct AlbersUsa {
    scale: f64,
    translate: (f64, f64),
    lower48: ConicEqualArea,
    alaska: ConicEqualArea,
    hawaii: ConicEqualArea,
}

impl AlbersUsa {
    pub fn new() -> Self {
        Self::with_scale_translate(DEFAULT_SCALE, DEFAULT_TRANSLATE)
    }

    /// Projection fitted to a viewport: centered, scaled to the smaller side.
    pub fn for_viewport(viewport: ViewportSize) -> Self {
        let mut projection = Self::new();
        projection.fit_viewport(viewport);
        projection
    }

    pub fn with_scale_translate(scale: f64, translate: (f64, f64)) -> Self {
        let (lower48, alaska, hawaii) = build_parts(scale, translate);
        Self {
            scale,
            translate,
            lower48,
            alaska,
            hawaii,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> (f64, f64) {
        self.translate
    }

    /// Union of the three clip rectangles: everything that can project.
    pub fn bounds(&self) -> BoundingBox {
        [&self.lower48, &self.alaska, &self.hawaii]
            .iter()
            .filter_map(|part| part.clip())
            .fold(BoundingBox::empty(), |acc, clip| acc.union(&clip))
    }
}

impl Default for AlbersUsa {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection for AlbersUsa {
    fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        self.lower48
            .project(lon, lat)
            .or_else(|| self.alaska.project(lon, lat))
            .or_else(|| self.hawaii.project(lon, lat))
    }

    fn fit_viewport(&mut self, viewport: ViewportSize) {
        let scale = viewport.width.min(viewport.height) * FIT_SCALE_FACTOR;
        let translate = viewport.center();
        debug!(
            width = viewport.width,
            height = viewport.height,
            scale = scale,
            "Fitting projection to viewport"
        );
        *self = Self::with_scale_translate(scale, translate);
    }
}

fn build_parts(k: f64, (x, y): (f64, f64)) -> (ConicEqualArea, ConicEqualArea, ConicEqualArea) {
    let lower48 = ConicEqualArea::new(29.5, 45.5)
        .rotate(96.0)
        .center(-0.6, 38.7)
        .scale(k)
        .translate(x, y)
        .clip_extent(BoundingBox::new(
            x - 0.455 * k,
            y - 0.238 * k,
            x + 0.455 * k,
            y + 0.238 * k,
        ));

    let alaska = ConicEqualArea::new(55.0, 65.0)
        .rotate(154.0)
        .center(-2.0, 58.5)
        .scale(k * 0.35)
        .translate(x - 0.307 * k, y + 0.201 * k)
        .clip_extent(BoundingBox::new(
            x - 0.425 * k + EPSILON,
            y + 0.120 * k + EPSILON,
            x - 0.214 * k - EPSILON,
            y + 0.234 * k - EPSILON,
        ));

    let hawaii = ConicEqualArea::new(8.0, 18.0)
        .rotate(157.0)
        .center(-3.0, 19.9)
        .scale(k)
        .translate(x - 0.205 * k, y + 0.212 * k)
        .clip_extent(BoundingBox::new(
            x - 0.214 * k + EPSILON,
            y + 0.166 * k + EPSILON,
            x - 0.115 * k - EPSILON,
            y + 0.234 * k - EPSILON,
        ));

    (lower48, alaska, hawaii)
}
