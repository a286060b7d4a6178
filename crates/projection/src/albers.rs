//! Albers conic equal-area projection.
//!
//! The projection is defined by two standard parallels, a rotation of the
//! central meridian, a center point (in rotated coordinates) that lands on
//! the translate point, and a uniform scale. An optional clip rectangle in
//! output coordinates restricts the valid domain.

use std::f64::consts::PI;

use cluster_common::BoundingBox;

/// Conic equal-area projection with rotation, centering and clipping.
#[derive(Debug, Clone)]
pub struct ConicEqualArea {
    /// Cone constant (n)
    n: f64,
    /// C constant
    c: f64,
    /// Rho at the origin parallel
    rho0: f64,
    /// Longitude rotation in radians, added before projecting
    rotate: f64,
    /// Center (lon, lat) in degrees, in rotated coordinates
    center: (f64, f64),
    /// Pixels per unit of the raw projection
    scale: f64,
    /// Where the center lands in output coordinates
    translate: (f64, f64),
    /// Output-space rectangle outside which points are rejected
    clip: Option<BoundingBox>,
    /// Raw projection of `center`, cached
    center_raw: (f64, f64),
}

impl ConicEqualArea {
    /// Create a projection from its standard parallels (degrees).
    ///
    /// Defaults: no rotation, center (0, 0), scale 1, translate (0, 0), no clip.
    pub fn new(parallel1_deg: f64, parallel2_deg: f64) -> Self {
        let phi1 = parallel1_deg.to_radians();
        let phi2 = parallel2_deg.to_radians();

        let sin_phi1 = phi1.sin();
        let n = (sin_phi1 + phi2.sin()) / 2.0;
        let c = 1.0 + sin_phi1 * (2.0 * n - sin_phi1);
        let rho0 = c.sqrt() / n;

        let mut projection = Self {
            n,
            c,
            rho0,
            rotate: 0.0,
            center: (0.0, 0.0),
            scale: 1.0,
            translate: (0.0, 0.0),
            clip: None,
            center_raw: (0.0, 0.0),
        };
        projection.recenter();
        projection
    }

    /// Rotate the central meridian by `lon_deg` degrees.
    pub fn rotate(mut self, lon_deg: f64) -> Self {
        self.rotate = lon_deg.to_radians();
        self
    }

    /// Set the center point (degrees, rotated coordinates).
    pub fn center(mut self, lon_deg: f64, lat_deg: f64) -> Self {
        self.center = (lon_deg, lat_deg);
        self.recenter();
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn translate(mut self, x: f64, y: f64) -> Self {
        self.translate = (x, y);
        self
    }

    pub fn clip_extent(mut self, clip: BoundingBox) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> (f64, f64) {
        self.translate
    }

    pub fn clip(&self) -> Option<BoundingBox> {
        self.clip
    }

    fn recenter(&mut self) {
        let (lon, lat) = self.center;
        self.center_raw = self.raw(lon.to_radians(), lat.to_radians());
    }

    /// Unit-sphere projection of rotated (lambda, phi) in radians.
    fn raw(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let rho = (self.c - 2.0 * self.n * phi.sin()).max(0.0).sqrt() / self.n;
        let theta = lambda * self.n;
        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }

    /// Project without applying the clip rectangle.
    pub fn project_unclipped(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        // Rotate and normalize longitude to [-π, π]
        let mut lambda = lon_deg.to_radians() + self.rotate;
        if lambda > PI {
            lambda -= 2.0 * PI;
        } else if lambda < -PI {
            lambda += 2.0 * PI;
        }
        let (x, y) = self.raw(lambda, lat_deg.to_radians());

        // Output y grows downward
        let (cx, cy) = self.center_raw;
        (
            self.translate.0 + self.scale * (x - cx),
            self.translate.1 - self.scale * (y - cy),
        )
    }

    /// Project and reject points outside the clip rectangle.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if !lon_deg.is_finite() || !lat_deg.is_finite() {
            return None;
        }
        let (x, y) = self.project_unclipped(lon_deg, lat_deg);
        match &self.clip {
            Some(clip) if !clip.contains_point(x, y) => None,
            _ => Some((x, y)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_translate() {
        let proj = ConicEqualArea::new(29.5, 45.5)
            .rotate(96.0)
            .center(-0.6, 38.7)
            .scale(1070.0)
            .translate(480.0, 250.0);

        // Rotation is applied to the input, so the center in geographic
        // coordinates sits at lon = -0.6 - 96.
        let (x, y) = proj.project_unclipped(-96.6, 38.7);
        assert!((x - 480.0).abs() < 1e-9, "x should be 480, got {}", x);
        assert!((y - 250.0).abs() < 1e-9, "y should be 250, got {}", y);
    }

    #[test]
    fn test_north_is_up() {
        let proj = ConicEqualArea::new(29.5, 45.5).rotate(96.0).scale(1000.0);
        let (_, y_south) = proj.project_unclipped(-96.0, 30.0);
        let (_, y_north) = proj.project_unclipped(-96.0, 45.0);
        assert!(y_north < y_south);
    }

    #[test]
    fn test_clip_rejects_outside_points() {
        let proj = ConicEqualArea::new(29.5, 45.5)
            .rotate(96.0)
            .scale(1000.0)
            .clip_extent(BoundingBox::new(-100.0, -100.0, 100.0, 100.0));

        assert!(proj.project(-96.0, 0.5).is_some());
        assert!(proj.project(-60.0, 40.0).is_none());
        assert!(proj.project(f64::NAN, 40.0).is_none());
    }

    #[test]
    fn test_equal_area_ratio() {
        // Equal-area: a one-degree cell near each standard parallel covers
        // about the same projected area relative to its true area.
        let proj = ConicEqualArea::new(29.5, 45.5).scale(1.0);
        let cell_area = |lat: f64| {
            let (x0, y0) = proj.project_unclipped(0.0, lat);
            let (x1, _) = proj.project_unclipped(1.0, lat);
            let (_, y1) = proj.project_unclipped(0.0, lat + 1.0);
            ((x1 - x0).abs() * (y1 - y0).abs()) / lat.to_radians().cos()
        };
        let ratio = cell_area(30.0) / cell_area(45.0);
        assert!((ratio - 1.0).abs() < 0.05, "area ratio {}", ratio);
    }
}
