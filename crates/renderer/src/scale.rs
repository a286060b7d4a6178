//! Square-root scale for proportional symbols.
//!
//! Radius grows with the square root of the value so that circle area, not
//! radius, is proportional to the represented sum.

/// Smallest and largest circle radius before the user multiplier.
pub const RADIUS_RANGE: (f64, f64) = (3.0, 26.0);

/// Label font size bounds in pixels.
pub const FONT_SIZE_RANGE: (f64, f64) = (9.0, 18.0);

/// Label font size as a fraction of the unmultiplied radius.
pub const FONT_SIZE_RATIO: f64 = 0.9;

/// Maps `[0, max]` to a pixel range through a square root.
///
/// Like a linear scale applied to `sign(v) * sqrt(|v|)`; values outside the
/// domain extrapolate rather than clamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    domain_max: f64,
    range: (f64, f64),
}

impl SqrtScale {
    pub fn new(domain_max: f64, range: (f64, f64)) -> Self {
        Self { domain_max, range }
    }

    /// Radius scale for a set of cluster sums.
    ///
    /// The domain upper bound is the largest sum, or 1 when there is no
    /// positive sum to anchor it.
    pub fn for_sums(sums: impl IntoIterator<Item = f64>) -> Self {
        let max = sums.into_iter().fold(f64::NEG_INFINITY, f64::max);
        let domain_max = if max > 0.0 { max } else { 1.0 };
        Self::new(domain_max, RADIUS_RANGE)
    }

    pub fn domain_max(&self) -> f64 {
        self.domain_max
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        let t = signed_sqrt(value) / signed_sqrt(self.domain_max);
        r0 + (r1 - r0) * t
    }
}

fn signed_sqrt(v: f64) -> f64 {
    if v < 0.0 {
        -(-v).sqrt()
    } else {
        v.sqrt()
    }
}

/// Label font size for an unmultiplied radius.
pub fn label_font_size(base_radius: f64) -> f64 {
    let (min, max) = FONT_SIZE_RANGE;
    (base_radius * FONT_SIZE_RATIO).clamp(min, max)
}
