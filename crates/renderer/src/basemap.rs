//! Static state boundary layer.
//!
//! Shapes are projected once per projection configuration into SVG path
//! data in base-layer coordinates. Pan and zoom never touch the paths; the
//! scene applies the viewport transform to the whole group instead.

use std::fmt::Write;

use cluster_common::{BoundingBox, ClusterResult};
use projection::Projection;
use tracing::debug;

use crate::geometry::{parse_shapes, Ring, Shape};

/// Projected outline of one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePath {
    pub name: Option<String>,
    /// SVG path data; empty when nothing projected
    pub d: String,
}

/// Boundary polygons plus their current projected paths.
#[derive(Debug, Clone)]
pub struct BaseMapLayer {
    shapes: Vec<Shape>,
    paths: Vec<ShapePath>,
    bounds: BoundingBox,
}

impl Default for BaseMapLayer {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl BaseMapLayer {
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self {
            shapes,
            paths: Vec::new(),
            bounds: BoundingBox::empty(),
        }
    }

    /// Build from GeoJSON or TopoJSON text.
    pub fn from_json(text: &str) -> ClusterResult<Self> {
        Ok(Self::new(parse_shapes(text)?))
    }

    /// Re-project every shape. Call after the projection is reconfigured.
    pub fn redraw<P: Projection + ?Sized>(&mut self, projection: &P) {
        let mut bounds = BoundingBox::empty();
        self.paths = self
            .shapes
            .iter()
            .map(|shape| ShapePath {
                name: shape.name.clone(),
                d: shape_path(shape, projection, &mut bounds),
            })
            .collect();
        self.bounds = bounds;

        debug!(
            shapes = self.shapes.len(),
            drawn = self.paths.iter().filter(|p| !p.d.is_empty()).count(),
            "Redrew base map"
        );
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn paths(&self) -> &[ShapePath] {
        &self.paths
    }

    /// Extent of all projected vertices; empty before the first redraw.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }
}

fn shape_path<P: Projection + ?Sized>(
    shape: &Shape,
    projection: &P,
    bounds: &mut BoundingBox,
) -> String {
    let mut d = String::new();
    for polygon in &shape.polygons {
        for ring in polygon {
            ring_path(ring, projection, bounds, &mut d);
        }
    }
    d
}

/// Append one ring. A vertex that does not project ends the current
/// sub-path; a ring that projects completely is closed.
fn ring_path<P: Projection + ?Sized>(
    ring: &Ring,
    projection: &P,
    bounds: &mut BoundingBox,
    d: &mut String,
) {
    let mut pen_down = false;
    let mut complete = true;

    for &(lon, lat) in ring {
        match projection.project(lon, lat) {
            Some((x, y)) => {
                bounds.expand_to(x, y);
                let cmd = if pen_down { 'L' } else { 'M' };
                // Writing to a String cannot fail
                let _ = write!(d, "{}{:.2},{:.2}", cmd, x, y);
                pen_down = true;
            }
            None => {
                pen_down = false;
                complete = false;
            }
        }
    }

    if pen_down && complete {
        d.push('Z');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_common::ViewportSize;

    struct Planar;

    impl Projection for Planar {
        fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
            (lon >= 0.0).then_some((lon, lat))
        }

        fn fit_viewport(&mut self, _viewport: ViewportSize) {}
    }

    fn square(offset: f64) -> Shape {
        Shape {
            name: Some("Square".to_string()),
            polygons: vec![vec![vec![
                (offset, 0.0),
                (offset + 1.0, 0.0),
                (offset + 1.0, 1.0),
                (offset, 0.0),
            ]]],
        }
    }

    #[test]
    fn test_closed_ring() {
        let mut layer = BaseMapLayer::new(vec![square(0.0)]);
        layer.redraw(&Planar);

        assert_eq!(
            layer.paths()[0].d,
            "M0.00,0.00L1.00,0.00L1.00,1.00L0.00,0.00Z"
        );
        assert_eq!(layer.bounds(), BoundingBox::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_unprojectable_vertex_breaks_path() {
        let mut layer = BaseMapLayer::new(vec![square(-0.5)]);
        layer.redraw(&Planar);

        let d = &layer.paths()[0].d;
        assert!(d.starts_with("M0.50,0.00L0.50,1.00"), "got {}", d);
        assert!(!d.ends_with('Z'));
    }

    #[test]
    fn test_fully_hidden_shape_is_empty() {
        let mut layer = BaseMapLayer::new(vec![square(-10.0)]);
        layer.redraw(&Planar);
        assert!(layer.paths()[0].d.is_empty());
        assert!(layer.bounds().is_empty());
    }
}
