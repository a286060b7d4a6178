//! Common test fixtures for cluster map tests.

use cluster_common::RecordSet;

/// Header row shared by the CSV fixtures.
pub const CSV_HEADER: &str = "Address,State,City,New customer records,Latitude,Longitude,Country ";

/// Small customer export: two rows that share a grid cell in Kansas, a
/// Manhattan row, a row still missing coordinates and an overseas row.
pub const SAMPLE_CSV: &str = "\
Address,State,City,New customer records,Latitude,Longitude,Country 
100 Prairie Ln,KS,Hays,5,40,-100,USA
102 Prairie Ln,KS,Hays,3,40.001,-100.001,USA
1 Broadway,NY,New York,12,40.7,-74.0,USA
9 Unknown Rd,FL,Miami,4,,,USA
221B Baker St,,London,7,51.52,-0.158,UK
";

/// `SAMPLE_CSV` parsed.
pub fn sample_record_set() -> RecordSet {
    // Fixture text is static and known to parse.
    RecordSet::from_csv_str(SAMPLE_CSV).unwrap_or_default()
}

/// Two rectangular "states" around Kansas and Colorado as GeoJSON.
pub const SAMPLE_STATES_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"name": "Kansas"},
      "geometry": {"type": "Polygon", "coordinates": [[
        [-102.05, 37.0], [-94.6, 37.0], [-94.6, 40.0], [-102.05, 40.0], [-102.05, 37.0]
      ]]}
    },
    {
      "type": "Feature",
      "properties": {"name": "Colorado"},
      "geometry": {"type": "Polygon", "coordinates": [[
        [-109.05, 37.0], [-102.05, 37.0], [-102.05, 41.0], [-109.05, 41.0], [-109.05, 37.0]
      ]]}
    }
  ]
}"#;

/// The same two states as a quantized TopoJSON topology sharing the border arc.
pub const SAMPLE_STATES_TOPOJSON: &str = r#"{
  "type": "Topology",
  "transform": {"scale": [0.05, 0.05], "translate": [-109.05, 37.0]},
  "objects": {
    "states": {
      "type": "GeometryCollection",
      "geometries": [
        {"type": "Polygon", "arcs": [[0, 1]], "properties": {"name": "Kansas"}},
        {"type": "Polygon", "arcs": [[2, -1]], "properties": {"name": "Colorado"}}
      ]
    }
  },
  "arcs": [
    [[140, 60], [0, -60]],
    [[140, 0], [149, 0], [0, 60], [-149, 0]],
    [[140, 60], [0, 20], [-140, 0], [0, -80], [140, 0]]
  ]
}"#;
