//! Tests for screen-space grid aggregation.
//!
//! Covers value conservation, grid determinism, the min-sum filter and
//! repeatability across passes.

use cluster_common::{Record, ViewportSize, ViewportTransform, ZoomBehavior};
use projection::{AlbersUsa, Projection};
use renderer::aggregate::{aggregate, bin_records, effective_cell_size, CellKey};
use test_utils::{metro_records, overseas_records, random_records};

fn projection() -> AlbersUsa {
    AlbersUsa::for_viewport(ViewportSize::from_width(960.0))
}

fn zoomed() -> ViewportTransform {
    let zoom = ZoomBehavior::new(ViewportSize::from_width(960.0));
    zoom.scale_by(ViewportTransform::identity(), 3.0, (400.0, 250.0))
}

fn projectable_total(records: &[Record], proj: &AlbersUsa) -> f64 {
    records
        .iter()
        .filter(|r| proj.project(r.lon, r.lat).is_some())
        .map(|r| r.value)
        .sum()
}

// ============================================================================
// Conservation
// ============================================================================

#[test]
fn test_sum_is_conserved_across_cells() {
    let proj = projection();
    let mut records = random_records(2_000, 25, 11);
    records.extend(overseas_records());

    for transform in [ViewportTransform::identity(), zoomed()] {
        for cell_size in [2.0, 17.0, 40.0, 120.0] {
            let cells = bin_records(&records, &proj, &transform, cell_size);
            let binned: f64 = cells.values().map(|c| c.sum).sum();
            let expected = projectable_total(&records, &proj);
            assert!(
                (binned - expected).abs() < 1e-6,
                "cell_size={cell_size}: binned {binned} vs expected {expected}"
            );
        }
    }
}

#[test]
fn test_counts_cover_every_projected_record() {
    let proj = projection();
    let mut records = metro_records(40, 0.5, 5);
    records.extend(overseas_records());

    let cells = bin_records(&records, &proj, &ViewportTransform::identity(), 40.0);
    let counted: usize = cells.values().map(|c| c.count).sum();
    assert_eq!(counted, records.len() - overseas_records().len());
}

#[test]
fn test_overseas_records_are_ignored() {
    let clusters = aggregate(
        &overseas_records(),
        &projection(),
        &ViewportTransform::identity(),
        40.0,
        0.0,
    );
    assert!(clusters.is_empty());
}

// ============================================================================
// Grid determinism and centroid placement
// ============================================================================

#[test]
fn test_identical_points_share_a_cell() {
    let records = vec![
        Record::at(-87.63, 41.88, 1.0),
        Record::at(-87.63, 41.88, 2.0),
    ];
    let clusters = aggregate(
        &records,
        &projection(),
        &ViewportTransform::identity(),
        40.0,
        0.0,
    );
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].count, 2);
}

#[test]
fn test_key_matches_floor_of_screen_position() {
    let proj = projection();
    let transform = zoomed();
    let record = Record::at(-96.8, 32.78, 1.0);

    let (px, py) = proj.project(record.lon, record.lat).unwrap();
    let (x, y) = transform.apply(px, py);

    let clusters = aggregate(&[record], &proj, &transform, 25.0, 0.0);
    assert_eq!(
        clusters[0].key,
        CellKey::new((x / 25.0).floor() as i64, (y / 25.0).floor() as i64)
    );
}

#[test]
fn test_centroid_lies_inside_cell_bounds() {
    let proj = projection();
    let cell_size = 30.0;
    let clusters = aggregate(
        &metro_records(25, 1.0, 9),
        &proj,
        &ViewportTransform::identity(),
        cell_size,
        0.0,
    );

    // The members of a cell all lie inside it, so their mean does too.
    for c in &clusters {
        let min_x = c.key.cx as f64 * cell_size;
        let min_y = c.key.cy as f64 * cell_size;
        assert!(c.x >= min_x && c.x < min_x + cell_size, "{:?}", c);
        assert!(c.y >= min_y && c.y < min_y + cell_size, "{:?}", c);
    }
}

#[test]
fn test_tiny_cell_size_is_raised() {
    let proj = projection();
    let records = random_records(300, 5, 2);
    let a = aggregate(&records, &proj, &ViewportTransform::identity(), 0.1, 0.0);
    let b = aggregate(
        &records,
        &proj,
        &ViewportTransform::identity(),
        effective_cell_size(0.1),
        0.0,
    );
    assert_eq!(a, b);
}

// ============================================================================
// Filtering and repeatability
// ============================================================================

#[test]
fn test_raising_min_sum_never_adds_clusters() {
    let proj = projection();
    let records = metro_records(30, 2.0, 21);
    let transform = ViewportTransform::identity();

    let mut previous = usize::MAX;
    for min_sum in [f64::NEG_INFINITY, 0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 1e9] {
        let count = aggregate(&records, &proj, &transform, 40.0, min_sum).len();
        assert!(count <= previous, "min_sum={min_sum}: {count} > {previous}");
        previous = count;
    }
    assert_eq!(previous, 0);
}

#[test]
fn test_aggregate_is_idempotent() {
    let proj = projection();
    let records = random_records(1_000, 10, 99);
    let transform = zoomed();

    let first = aggregate(&records, &proj, &transform, 36.0, 3.0);
    let second = aggregate(&records, &proj, &transform, 36.0, 3.0);
    assert_eq!(first, second);
}

#[test]
fn test_clusters_are_sorted_by_key() {
    let clusters = aggregate(
        &random_records(500, 10, 4),
        &projection(),
        &ViewportTransform::identity(),
        20.0,
        0.0,
    );
    assert!(clusters.windows(2).all(|w| w[0].key < w[1].key));
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_two_close_customers_become_one_cluster() {
    let proj = projection();
    let records = vec![
        Record::at(-100.0, 40.0, 5.0),
        Record::at(-100.001, 40.001, 3.0),
    ];
    let clusters = aggregate(&records, &proj, &ViewportTransform::identity(), 40.0, 1.0);

    assert_eq!(clusters.len(), 1);
    let c = &clusters[0];
    assert_eq!(c.sum, 8.0);
    assert_eq!(c.count, 2);

    let (ax, ay) = proj.project(-100.0, 40.0).unwrap();
    let (bx, by) = proj.project(-100.001, 40.001).unwrap();
    assert!((c.x - (ax + bx) / 2.0).abs() < 1e-9);
    assert!((c.y - (ay + by) / 2.0).abs() < 1e-9);
}

#[test]
fn test_cluster_below_min_sum_is_excluded() {
    let records = vec![
        Record::at(-100.0, 40.0, 5.0),
        Record::at(-100.001, 40.001, 3.0),
    ];
    let clusters = aggregate(
        &records,
        &projection(),
        &ViewportTransform::identity(),
        40.0,
        10.0,
    );
    assert!(clusters.is_empty());
}

#[test]
fn test_zooming_in_splits_clusters() {
    let proj = projection();
    let records = metro_records(50, 1.5, 13);
    let zoom = ZoomBehavior::new(ViewportSize::from_width(960.0));

    let coarse = aggregate(&records, &proj, &ViewportTransform::identity(), 40.0, 0.0).len();
    let fine_transform = zoom.scale_by(ViewportTransform::identity(), 8.0, (480.0, 297.0));
    let fine = bin_records(&records, &proj, &fine_transform, 40.0).len();

    println!("clusters at k=1: {coarse}, cells at k=8: {fine}");
    assert!(fine > coarse);
}
