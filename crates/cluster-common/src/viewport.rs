//! Viewport size, pan/zoom transform and the zoom gesture constraints.
//!
//! A `ViewportTransform` maps planar base-layer coordinates to screen
//! coordinates: `screen = planar * scale + translate`. Transforms are only
//! produced through `ZoomBehavior`, which keeps the scale inside its extent
//! and clamps translation so the translate extent always covers the visible
//! viewport.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;

/// Canvas height as a fraction of its width.
pub const ASPECT_RATIO: f64 = 0.62;

/// Width used when the container reports no size.
pub const DEFAULT_WIDTH: f64 = 960.0;

/// Minimum and maximum zoom factor.
pub const SCALE_EXTENT: (f64, f64) = (1.0, 8.0);

/// Pixel size of the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    /// Fixed-aspect viewport for a container width. Non-positive or
    /// non-finite widths fall back to `DEFAULT_WIDTH`.
    pub fn from_width(width: f64) -> Self {
        let width = if width.is_finite() && width > 0.0 {
            width
        } else {
            DEFAULT_WIDTH
        };
        Self {
            width,
            height: (width * ASPECT_RATIO).round(),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_size(self.width, self.height)
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::from_width(DEFAULT_WIDTH)
    }
}

/// Uniform scale followed by translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl ViewportTransform {
    pub fn identity() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
        }
    }

    pub fn new(translate_x: f64, translate_y: f64, scale: f64) -> Self {
        Self {
            translate_x,
            translate_y,
            scale,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Planar to screen coordinates.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.scale + self.translate_x,
            y * self.scale + self.translate_y,
        )
    }

    /// Screen to planar coordinates.
    #[inline]
    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        (self.invert_x(x), self.invert_y(y))
    }

    #[inline]
    pub fn invert_x(&self, x: f64) -> f64 {
        (x - self.translate_x) / self.scale
    }

    #[inline]
    pub fn invert_y(&self, y: f64) -> f64 {
        (y - self.translate_y) / self.scale
    }

    /// Shift by a planar-space offset (multiplied by the current scale).
    fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            translate_x: self.translate_x + self.scale * dx,
            translate_y: self.translate_y + self.scale * dy,
            scale: self.scale,
        }
    }
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Pan/zoom gesture handler.
///
/// Mirrors the usual map zoom behavior: wheel and pinch events scale around
/// an anchor point, drags translate in screen pixels, and every result is
/// constrained before it is handed back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBehavior {
    /// Allowed zoom range (min, max)
    pub scale_extent: (f64, f64),
    /// The visible viewport in screen coordinates
    pub extent: BoundingBox,
    /// Region of planar space the viewport may show
    pub translate_extent: BoundingBox,
}

impl ZoomBehavior {
    /// Behavior for a viewport whose translate extent is the viewport box itself.
    pub fn new(viewport: ViewportSize) -> Self {
        Self {
            scale_extent: SCALE_EXTENT,
            extent: viewport.bounds(),
            translate_extent: viewport.bounds(),
        }
    }

    fn clamp_scale(&self, k: f64) -> f64 {
        let (min, max) = self.scale_extent;
        if k.is_finite() {
            k.clamp(min, max)
        } else {
            min
        }
    }

    /// Clamp translation so the translate extent covers the viewport.
    ///
    /// When the scaled translate extent is smaller than the viewport along an
    /// axis the content is centered on that axis instead.
    pub fn constrain(&self, t: ViewportTransform) -> ViewportTransform {
        let ext = &self.extent;
        let te = &self.translate_extent;

        let dx0 = t.invert_x(ext.min_x) - te.min_x;
        let dx1 = t.invert_x(ext.max_x) - te.max_x;
        let dy0 = t.invert_y(ext.min_y) - te.min_y;
        let dy1 = t.invert_y(ext.max_y) - te.max_y;

        t.translate(shift(dx0, dx1), shift(dy0, dy1))
    }

    /// Multiply the current scale by `factor`, keeping `anchor` (screen
    /// coordinates) fixed.
    pub fn scale_by(
        &self,
        t: ViewportTransform,
        factor: f64,
        anchor: (f64, f64),
    ) -> ViewportTransform {
        self.scale_to(t, t.scale * factor, anchor)
    }

    /// Set the scale to `k`, keeping `anchor` (screen coordinates) fixed.
    /// A non-finite anchor falls back to the viewport center.
    pub fn scale_to(&self, t: ViewportTransform, k: f64, anchor: (f64, f64)) -> ViewportTransform {
        let k = self.clamp_scale(k);
        let (px, py) = if anchor.0.is_finite() && anchor.1.is_finite() {
            anchor
        } else {
            self.center()
        };
        let (x0, y0) = t.invert(px, py);
        self.constrain(ViewportTransform::new(px - x0 * k, py - y0 * k, k))
    }

    /// Pan by a screen-pixel offset. Non-finite components do not move.
    pub fn translate_by(&self, t: ViewportTransform, dx: f64, dy: f64) -> ViewportTransform {
        self.constrain(ViewportTransform::new(
            t.translate_x + finite_or_zero(dx),
            t.translate_y + finite_or_zero(dy),
            t.scale,
        ))
    }

    /// Back to the identity transform.
    pub fn reset(&self) -> ViewportTransform {
        self.constrain(ViewportTransform::identity())
    }

    /// Center of the viewport, the default zoom anchor.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.extent.min_x + self.extent.max_x) / 2.0,
            (self.extent.min_y + self.extent.max_y) / 2.0,
        )
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn shift(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        (d0 + d1) / 2.0
    } else {
        let low = d0.min(0.0);
        if low != 0.0 {
            low
        } else {
            d1.max(0.0)
        }
    }
}
