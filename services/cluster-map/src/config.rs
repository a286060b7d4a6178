//! Map configuration loading.
//!
//! An optional YAML file sets the canvas width, initial slider values,
//! slider ranges and scene colors. Anything missing keeps its default.

use std::path::Path;

use anyhow::{Context, Result};
use cluster_common::viewport::DEFAULT_WIDTH;
use cluster_common::ViewportSize;
use renderer::controls::{ControlParams, ControlRanges, ControlSurface};
use renderer::scene::SceneStyle;
use serde::Deserialize;
use tracing::{debug, info};

/// Root of the map YAML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Canvas width in pixels; height follows the fixed aspect ratio
    pub width: f64,
    /// Initial slider values
    pub controls: ControlParams,
    pub ranges: ControlRanges,
    pub style: SceneStyle,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            controls: ControlParams::default(),
            ranges: ControlRanges::default(),
            style: SceneStyle::default(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub width: Option<f64>,
    pub cell_size: Option<f64>,
    pub scale_multiplier: Option<f64>,
    pub min_sum: Option<f64>,
}

impl MapConfig {
    /// Load from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: MapConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!(path = %path.display(), width = config.width, "Loaded map config");
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(width) = overrides.width {
            self.width = width;
        }
        if let Some(v) = overrides.cell_size {
            self.controls.cell_size = v;
        }
        if let Some(v) = overrides.scale_multiplier {
            self.controls.scale_multiplier = v;
        }
        if let Some(v) = overrides.min_sum {
            self.controls.min_sum = v;
        }
        self
    }

    pub fn viewport(&self) -> ViewportSize {
        ViewportSize::from_width(self.width)
    }

    /// Control surface with the initial values snapped into their ranges.
    pub fn control_surface(&self) -> ControlSurface {
        ControlSurface::new(self.ranges, self.controls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "width: 640\ncontrols:\n  cell_size: 30\nranges:\n  min_sum: {{min: 0, max: 100, step: 5}}"
        )
        .unwrap();

        let config = MapConfig::load(file.path()).unwrap();
        assert_eq!(config.width, 640.0);
        assert_eq!(config.controls.cell_size, 30.0);
        assert_eq!(config.controls.scale_multiplier, 1.2);
        assert_eq!(config.ranges.min_sum.max, 100.0);
        assert_eq!(config.ranges.cell_size.max, 120.0);
        assert_eq!(config.style, SceneStyle::default());
    }

    #[test]
    fn test_overrides_win() {
        let config = MapConfig::default().with_overrides(Overrides {
            width: Some(800.0),
            min_sum: Some(5.0),
            ..Default::default()
        });
        assert_eq!(config.width, 800.0);
        assert_eq!(config.controls.min_sum, 5.0);
        assert_eq!(config.controls.cell_size, 40.0);
        assert_eq!(config.viewport().height, 496.0);
    }

    #[test]
    fn test_initial_values_are_clamped() {
        let config = MapConfig::default().with_overrides(Overrides {
            cell_size: Some(500.0),
            ..Default::default()
        });
        assert_eq!(config.control_surface().params().cell_size, 120.0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(MapConfig::load(Path::new("/nonexistent/map.yaml")).is_err());
    }
}
