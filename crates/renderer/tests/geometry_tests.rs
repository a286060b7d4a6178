//! Tests for boundary geometry parsing and base map paths.

use cluster_common::ViewportSize;
use projection::AlbersUsa;
use renderer::basemap::BaseMapLayer;
use renderer::geometry::parse_shapes;
use test_utils::{SAMPLE_STATES_GEOJSON, SAMPLE_STATES_TOPOJSON};

fn assert_close(a: (f64, f64), b: (f64, f64)) {
    assert!(
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9,
        "{:?} != {:?}",
        a,
        b
    );
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_geojson_fixture() {
    let shapes = parse_shapes(SAMPLE_STATES_GEOJSON).unwrap();
    let names: Vec<_> = shapes.iter().filter_map(|s| s.name.as_deref()).collect();
    assert_eq!(names, vec!["Kansas", "Colorado"]);
}

#[test]
fn test_topojson_matches_geojson_outline() {
    let topo = parse_shapes(SAMPLE_STATES_TOPOJSON).unwrap();
    let geo = parse_shapes(SAMPLE_STATES_GEOJSON).unwrap();
    assert_eq!(topo.len(), 2);

    // Kansas starts at its north-west corner in the topology.
    let kansas = &topo[0].polygons[0][0];
    assert_eq!(kansas.len(), 5);
    assert_close(kansas[0], (-102.05, 40.0));
    assert_close(kansas[2], (-94.6, 37.0));
    assert_close(kansas[0], kansas[4]);

    // Colorado's ring closes through the shared border traversed backwards.
    let colorado = &topo[1].polygons[0][0];
    assert_close(colorado[0], *colorado.last().unwrap());
    for corner in &geo[1].polygons[0][0] {
        assert!(
            colorado
                .iter()
                .any(|p| (p.0 - corner.0).abs() < 1e-9 && (p.1 - corner.1).abs() < 1e-9),
            "corner {:?} missing from {:?}",
            corner,
            colorado
        );
    }
}

#[test]
fn test_garbage_is_rejected() {
    assert!(parse_shapes("not json").is_err());
    assert!(parse_shapes(r#"{"type": "Topology", "arcs": []}"#).is_err());
}

// ============================================================================
// Base map paths
// ============================================================================

#[test]
fn test_paths_follow_projection() {
    let mut layer = BaseMapLayer::from_json(SAMPLE_STATES_GEOJSON).unwrap();
    let proj = AlbersUsa::for_viewport(ViewportSize::from_width(960.0));
    layer.redraw(&proj);

    assert_eq!(layer.paths().len(), 2);
    for path in layer.paths() {
        assert!(path.d.starts_with('M'));
        assert!(path.d.ends_with('Z'));
        assert_eq!(path.d.matches('L').count(), 4);
    }

    let bounds = layer.bounds();
    assert!(bounds.min_x > 0.0 && bounds.max_x < 960.0);
    assert!(bounds.min_y > 0.0 && bounds.max_y < 595.0);
}

#[test]
fn test_redraw_after_refit_moves_paths() {
    let mut layer = BaseMapLayer::from_json(SAMPLE_STATES_GEOJSON).unwrap();
    layer.redraw(&AlbersUsa::for_viewport(ViewportSize::from_width(960.0)));
    let before = layer.paths()[0].d.clone();

    layer.redraw(&AlbersUsa::for_viewport(ViewportSize::from_width(480.0)));
    assert_ne!(before, layer.paths()[0].d);
    assert!(layer.bounds().max_x < 480.0);
}
