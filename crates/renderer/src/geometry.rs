//! State boundary geometry from GeoJSON or TopoJSON.
//!
//! Both formats are reduced to a list of named shapes, each a set of
//! polygons whose rings are `(lon, lat)` positions in degrees. TopoJSON arcs
//! are delta-decoded and dequantized when the topology carries a transform,
//! then stitched into rings.

use std::collections::BTreeMap;

use cluster_common::{ClusterError, ClusterResult};
use serde::Deserialize;
use serde_json::Value;

/// A closed ring of (lon, lat) positions.
pub type Ring = Vec<(f64, f64)>;

/// Exterior ring followed by any holes.
pub type Polygon = Vec<Ring>;

/// One named feature, e.g. a state.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub name: Option<String>,
    pub polygons: Vec<Polygon>,
}

/// Parse GeoJSON (`FeatureCollection`, `Feature` or bare geometry) or a
/// TopoJSON `Topology`.
///
/// For TopoJSON the `states` object is used when present, otherwise the
/// first object in the topology.
pub fn parse_shapes(text: &str) -> ClusterResult<Vec<Shape>> {
    let value: Value = serde_json::from_str(text)?;
    match value.get("type").and_then(Value::as_str) {
        Some("Topology") => {
            let topology: Topology = serde_json::from_value(value)?;
            topology.shapes(None)
        }
        Some("FeatureCollection") => {
            let collection: FeatureCollection = serde_json::from_value(value)?;
            Ok(collection
                .features
                .into_iter()
                .filter_map(Feature::into_shape)
                .collect())
        }
        Some("Feature") => {
            let feature: Feature = serde_json::from_value(value)?;
            Ok(feature.into_shape().into_iter().collect())
        }
        Some(_) => {
            let geometry: Geometry = serde_json::from_value(value)?;
            let polygons = geometry.into_polygons();
            if polygons.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![Shape {
                name: None,
                polygons,
            }])
        }
        None => Err(ClusterError::GeometryError(
            "missing \"type\" member".to_string(),
        )),
    }
}

// ============================================================================
// GeoJSON
// ============================================================================

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Value>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

impl Feature {
    fn into_shape(self) -> Option<Shape> {
        let polygons = self.geometry?.into_polygons();
        if polygons.is_empty() {
            return None;
        }
        Some(Shape {
            name: feature_name(self.properties.as_ref()),
            polygons,
        })
    }
}

impl Geometry {
    fn into_polygons(self) -> Vec<Polygon> {
        match self {
            Geometry::Polygon { coordinates } => vec![polygon_from_positions(coordinates)],
            Geometry::MultiPolygon { coordinates } => coordinates
                .into_iter()
                .map(polygon_from_positions)
                .collect(),
            Geometry::Unsupported => Vec::new(),
        }
    }
}

fn polygon_from_positions(rings: Vec<Vec<Vec<f64>>>) -> Polygon {
    rings
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .filter(|p| p.len() >= 2)
                .map(|p| (p[0], p[1]))
                .collect()
        })
        .collect()
}

fn feature_name(properties: Option<&Value>) -> Option<String> {
    properties?
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
}

// ============================================================================
// TopoJSON
// ============================================================================

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<TopoTransform>,
    arcs: Vec<Vec<Vec<f64>>>,
    objects: BTreeMap<String, TopoGeometry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct TopoTransform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum TopoGeometry {
    GeometryCollection {
        geometries: Vec<TopoGeometry>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: Option<Value>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        properties: Option<Value>,
    },
    #[serde(other)]
    Unsupported,
}

impl Topology {
    fn shapes(&self, object: Option<&str>) -> ClusterResult<Vec<Shape>> {
        let root = match object {
            Some(name) => self.objects.get(name),
            None => self
                .objects
                .get("states")
                .or_else(|| self.objects.values().next()),
        }
        .ok_or_else(|| ClusterError::GeometryError("topology has no objects".to_string()))?;

        let decoded = self.decode_arcs();
        let mut shapes = Vec::new();
        collect_topo_shapes(root, &decoded, &mut shapes)?;
        Ok(shapes)
    }

    /// Absolute positions for every arc.
    fn decode_arcs(&self) -> Vec<Ring> {
        self.arcs
            .iter()
            .map(|arc| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| match &self.transform {
                        Some(t) => {
                            x += p[0];
                            y += p[1];
                            (
                                x * t.scale[0] + t.translate[0],
                                y * t.scale[1] + t.translate[1],
                            )
                        }
                        None => (p[0], p[1]),
                    })
                    .collect()
            })
            .collect()
    }
}

fn collect_topo_shapes(
    geometry: &TopoGeometry,
    arcs: &[Ring],
    out: &mut Vec<Shape>,
) -> ClusterResult<()> {
    match geometry {
        TopoGeometry::GeometryCollection { geometries } => {
            for g in geometries {
                collect_topo_shapes(g, arcs, out)?;
            }
        }
        TopoGeometry::Polygon {
            arcs: rings,
            properties,
        } => out.push(Shape {
            name: feature_name(properties.as_ref()),
            polygons: vec![stitch_polygon(rings, arcs)?],
        }),
        TopoGeometry::MultiPolygon {
            arcs: polygons,
            properties,
        } => out.push(Shape {
            name: feature_name(properties.as_ref()),
            polygons: polygons
                .iter()
                .map(|rings| stitch_polygon(rings, arcs))
                .collect::<ClusterResult<_>>()?,
        }),
        TopoGeometry::Unsupported => {}
    }
    Ok(())
}

fn stitch_polygon(rings: &[Vec<i64>], arcs: &[Ring]) -> ClusterResult<Polygon> {
    rings.iter().map(|ring| stitch_ring(ring, arcs)).collect()
}

/// Concatenate arcs into one ring. A negative index `i` refers to arc `!i`
/// traversed backwards; consecutive arcs share their joining point.
fn stitch_ring(indices: &[i64], arcs: &[Ring]) -> ClusterResult<Ring> {
    let mut ring: Ring = Vec::new();
    for &index in indices {
        let (arc_index, reversed) = if index < 0 {
            (!index, true)
        } else {
            (index, false)
        };
        let arc = usize::try_from(arc_index)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or_else(|| ClusterError::GeometryError(format!("arc {} out of range", index)))?;

        ring.pop();
        if reversed {
            ring.extend(arc.iter().rev().copied());
        } else {
            ring.extend(arc.iter().copied());
        }
    }
    Ok(ring)
}
