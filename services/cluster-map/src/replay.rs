//! Interaction script replay and frame output.
//!
//! A script is a YAML list of events, e.g.
//! ```yaml
//! - event: zoom
//!   factor: 2
//!   anchor: [480, 300]
//! - event: set_min_sum
//!   value: 5
//! ```
//! Every rendered frame is written as `frame-NNNN.svg` (and `.png` when
//! enabled) into the output directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use renderer::controller::{Event, FrameReport, MapController};
use renderer::raster::svg_to_png;
use renderer::scene::SceneStyle;
use tracing::{info, warn};

/// Parse an interaction script.
pub fn parse_script(text: &str) -> Result<Vec<Event>> {
    serde_yaml::from_str(text).context("Failed to parse interaction script")
}

pub fn load_script(path: &Path) -> Result<Vec<Event>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    parse_script(&text)
}

/// Writes rendered frames to disk.
pub struct FrameWriter {
    out_dir: PathBuf,
    png: bool,
    style: SceneStyle,
}

impl FrameWriter {
    pub fn new(out_dir: impl Into<PathBuf>, png: bool, style: SceneStyle) -> Result<Self> {
        let out_dir = out_dir.into();
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
        Ok(Self {
            out_dir,
            png,
            style,
        })
    }

    /// Write the controller's current scene; returns the SVG path.
    pub fn write(&self, controller: &MapController, report: &FrameReport) -> Result<PathBuf> {
        let svg = controller.to_svg(&self.style);
        let svg_path = self.out_dir.join(format!("frame-{:04}.svg", report.frame));
        std::fs::write(&svg_path, &svg)
            .with_context(|| format!("Failed to write {}", svg_path.display()))?;

        if self.png {
            let png_path = svg_path.with_extension("png");
            let png = svg_to_png(&svg)?;
            std::fs::write(&png_path, png)
                .with_context(|| format!("Failed to write {}", png_path.display()))?;
        }
        Ok(svg_path)
    }
}

/// Log and write one frame report.
pub fn emit(writer: &FrameWriter, controller: &MapController, report: &FrameReport) -> Result<()> {
    let path = writer.write(controller, report)?;
    info!(
        frame = report.frame,
        clusters = report.clusters,
        visible_sum = report.visible_sum,
        created = report.stats.created,
        updated = report.stats.updated,
        removed = report.stats.removed,
        scale = report.transform.scale,
        cell_size = %report.labels.cell_size,
        scale_multiplier = %report.labels.scale_multiplier,
        min_sum = %report.labels.min_sum,
        path = %path.display(),
        "Rendered frame"
    );
    if let Some(change) = &report.control_change {
        info!(parameter = ?change.parameter, label = %change.label, "Control changed");
    }
    Ok(())
}

/// Feed every event to the controller and write each resulting frame.
pub fn replay(
    controller: &mut MapController,
    events: &[Event],
    writer: &FrameWriter,
) -> Result<Vec<FrameReport>> {
    let mut reports = Vec::with_capacity(events.len());
    for event in events {
        match controller.handle(event) {
            Some(report) => {
                emit(writer, controller, &report)?;
                reports.push(report);
            }
            None => warn!(?event, "Event produced no frame"),
        }
    }
    Ok(reports)
}
