//! Screen-space grid aggregation.
//!
//! Every pass starts from scratch: each record is projected, moved into
//! screen space by the current viewport transform, and binned into a square
//! cell keyed by `(floor(x / cell_size), floor(y / cell_size))`. Cells carry
//! the summed value, the point count and running coordinate sums from which
//! the centroid is derived. Cells only exist within one pass; a key that
//! reappears in the next pass is what lets the mark layer update the same
//! mark in place.

use std::collections::HashMap;
use std::fmt;

use cluster_common::{Record, ViewportTransform};
use projection::Projection;
use serde::Serialize;
use tracing::debug;

/// Smallest cell edge in pixels. Smaller requests are raised to this.
pub const MIN_CELL_SIZE: f64 = 2.0;

/// Integer grid coordinates of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CellKey {
    pub cx: i64,
    pub cy: i64,
}

impl CellKey {
    pub fn new(cx: i64, cy: i64) -> Self {
        Self { cx, cy }
    }

    /// Key of the cell containing screen point (x, y).
    #[inline]
    pub fn for_point(x: f64, y: f64, cell_size: f64) -> Self {
        Self {
            cx: (x / cell_size).floor() as i64,
            cy: (y / cell_size).floor() as i64,
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.cx, self.cy)
    }
}

/// Accumulator for one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub key: CellKey,
    pub sum: f64,
    pub count: usize,
    pub sx: f64,
    pub sy: f64,
}

impl GridCell {
    fn new(key: CellKey) -> Self {
        Self {
            key,
            sum: 0.0,
            count: 0,
            sx: 0.0,
            sy: 0.0,
        }
    }

    fn add(&mut self, x: f64, y: f64, value: f64) {
        self.sum += value;
        self.count += 1;
        self.sx += x;
        self.sy += y;
    }

    /// Mean screen position of the member points.
    pub fn centroid(&self) -> (f64, f64) {
        // Cells are created on first insert, so count >= 1 in practice.
        let n = self.count.max(1) as f64;
        (self.sx / n, self.sy / n)
    }

    pub fn to_cluster(&self) -> Cluster {
        let (x, y) = self.centroid();
        Cluster {
            key: self.key,
            x,
            y,
            sum: self.sum,
            count: self.count,
        }
    }
}

/// Render-facing view of an aggregated cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub key: CellKey,
    /// Centroid x in screen coordinates
    pub x: f64,
    /// Centroid y in screen coordinates
    pub y: f64,
    pub sum: f64,
    pub count: usize,
}

/// Clamp a requested cell size to a usable value.
pub fn effective_cell_size(cell_size: f64) -> f64 {
    if cell_size >= MIN_CELL_SIZE {
        cell_size
    } else {
        // Also catches NaN
        MIN_CELL_SIZE
    }
}

/// Bin records into screen-space grid cells.
///
/// Records that do not project are skipped. The result holds every cell
/// with at least one point; no value threshold is applied.
pub fn bin_records<P>(
    records: &[Record],
    projection: &P,
    transform: &ViewportTransform,
    cell_size: f64,
) -> HashMap<CellKey, GridCell>
where
    P: Projection + ?Sized,
{
    let cell_size = effective_cell_size(cell_size);
    let mut cells: HashMap<CellKey, GridCell> = HashMap::new();

    for record in records {
        let Some((px, py)) = projection.project(record.lon, record.lat) else {
            continue;
        };
        let (x, y) = transform.apply(px, py);
        let key = CellKey::for_point(x, y, cell_size);
        cells
            .entry(key)
            .or_insert_with(|| GridCell::new(key))
            .add(x, y, record.value);
    }

    cells
}

/// Aggregate records into clusters with `sum >= min_sum`.
///
/// Output is ordered by cell key so identical inputs give identical lists.
pub fn aggregate<P>(
    records: &[Record],
    projection: &P,
    transform: &ViewportTransform,
    cell_size: f64,
    min_sum: f64,
) -> Vec<Cluster>
where
    P: Projection + ?Sized,
{
    let cells = bin_records(records, projection, transform, cell_size);
    let total_cells = cells.len();

    let mut clusters: Vec<Cluster> = cells
        .values()
        .filter(|cell| cell.sum >= min_sum)
        .map(GridCell::to_cluster)
        .collect();
    clusters.sort_unstable_by_key(|c| c.key);

    debug!(
        records = records.len(),
        cells = total_cells,
        clusters = clusters.len(),
        cell_size = effective_cell_size(cell_size),
        min_sum = min_sum,
        "Aggregated records into grid cells"
    );

    clusters
}
