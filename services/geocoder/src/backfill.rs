//! Row-by-row coordinate backfill.
//!
//! Rows whose latitude or longitude cell is blank are geocoded one at a
//! time with a pause between lookups. After each processed row the whole
//! table is written back so an interrupted run loses at most one lookup.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::geocode::Geocoder;
use crate::table::Table;
use crate::template::QueryTemplate;

/// How a backfill run behaves.
#[derive(Debug, Clone)]
pub struct BackfillOptions {
    pub lat_column: String,
    pub lon_column: String,
    pub template: QueryTemplate,
    /// Pause between consecutive lookups
    pub delay: Duration,
    /// Leave the old cells alone on failure instead of blanking them
    pub keep_existing: bool,
    /// Only report which rows would be geocoded
    pub dry_run: bool,
    /// Where to write the table after every processed row
    pub output: Option<PathBuf>,
}

/// Counters for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackfillSummary {
    /// Rows that needed coordinates
    pub processed: usize,
    pub resolved: usize,
    pub failed: usize,
    /// Rows that already had coordinates
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BackfillSummary {
    fn start() -> Self {
        Self {
            processed: 0,
            resolved: 0,
            failed: 0,
            skipped: 0,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// Fill in missing coordinates in `table`.
pub async fn backfill<G: Geocoder + ?Sized>(
    table: &mut Table,
    geocoder: &G,
    options: &BackfillOptions,
) -> Result<BackfillSummary> {
    let mut summary = BackfillSummary::start();

    for missing in options.template.missing_columns(table) {
        warn!(column = %missing, "Template column not in table, rendering as empty");
    }

    let lat_col = table.ensure_column(&options.lat_column);
    let lon_col = table.ensure_column(&options.lon_column);

    for row in 0..table.len() {
        if !is_blank(table.get(row, lat_col)) && !is_blank(table.get(row, lon_col)) {
            summary.skipped += 1;
            continue;
        }

        let query = options.template.render(table, row);
        summary.processed += 1;

        if options.dry_run {
            info!(row = row + 1, query = %query, "Would geocode");
            continue;
        }

        if summary.processed > 1 && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }

        let found = if query.is_empty() {
            warn!(row = row + 1, "Nothing to look up, row has no address fields");
            None
        } else {
            match geocoder.geocode(&query).await {
                Ok(Some(coords)) => Some(coords),
                Ok(None) => {
                    warn!(row = row + 1, query = %query, "No coordinates found");
                    None
                }
                Err(e) => {
                    warn!(row = row + 1, query = %query, error = %format!("{:#}", e), "Geocoding failed");
                    None
                }
            }
        };

        match found {
            Some(coords) => {
                info!(row = row + 1, lat = %coords.lat, lon = %coords.lon, "Resolved");
                table.set(row, lat_col, coords.lat);
                table.set(row, lon_col, coords.lon);
                summary.resolved += 1;
            }
            None => {
                if !options.keep_existing {
                    table.set(row, lat_col, "");
                    table.set(row, lon_col, "");
                }
                summary.failed += 1;
            }
        }

        if let Some(path) = &options.output {
            table.save(path)?;
            info!(row = row + 1, path = %path.display(), "Saved");
        }
    }

    // Nothing needed a lookup; still produce the output file.
    if summary.processed == 0 && !options.dry_run {
        if let Some(path) = &options.output {
            table.save(path)?;
        }
    }

    summary.finished_at = Utc::now();
    info!(
        processed = summary.processed,
        resolved = summary.resolved,
        failed = summary.failed,
        skipped = summary.skipped,
        elapsed_ms = summary.elapsed().num_milliseconds(),
        dry_run = options.dry_run,
        "Backfill complete"
    );
    Ok(summary)
}
