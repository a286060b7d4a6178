//! The three user-adjustable aggregation parameters.
//!
//! Every parameter lives inside a `{min, max, step}` range; setting a value
//! snaps it to the step grid and clamps it, then hands back a change
//! notification carrying the fresh label so callers can re-run the
//! aggregate/render pipeline.

use serde::{Deserialize, Serialize};

/// Which slider a change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    CellSize,
    ScaleMultiplier,
    MinSum,
}

/// Allowed values of one slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ControlRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Snap to the step grid anchored at `min`, then clamp into range.
    /// Non-finite input falls back to `min`.
    pub fn snap(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.min;
        }
        let snapped = if self.step > 0.0 {
            self.min + ((value - self.min) / self.step).round() * self.step
        } else {
            value
        };
        // Drop float noise like 1.2000000000000002
        let rounded = (snapped * 1e9).round() / 1e9;
        rounded.clamp(self.min, self.max)
    }
}

/// Ranges for all three sliders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlRanges {
    pub cell_size: ControlRange,
    pub scale_multiplier: ControlRange,
    pub min_sum: ControlRange,
}

impl Default for ControlRanges {
    fn default() -> Self {
        Self {
            cell_size: ControlRange::new(10.0, 120.0, 2.0),
            scale_multiplier: ControlRange::new(0.5, 3.0, 0.1),
            min_sum: ControlRange::new(1.0, 50.0, 1.0),
        }
    }
}

impl ControlRanges {
    pub fn get(&self, parameter: Parameter) -> &ControlRange {
        match parameter {
            Parameter::CellSize => &self.cell_size,
            Parameter::ScaleMultiplier => &self.scale_multiplier,
            Parameter::MinSum => &self.min_sum,
        }
    }
}

/// Current parameter values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlParams {
    /// Grid cell edge in screen pixels
    pub cell_size: f64,
    /// Radius multiplier applied after the square-root scale
    pub scale_multiplier: f64,
    /// Clusters with a smaller sum are hidden
    pub min_sum: f64,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            cell_size: 40.0,
            scale_multiplier: 1.2,
            min_sum: 1.0,
        }
    }
}

impl ControlParams {
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::CellSize => self.cell_size,
            Parameter::ScaleMultiplier => self.scale_multiplier,
            Parameter::MinSum => self.min_sum,
        }
    }

    fn set(&mut self, parameter: Parameter, value: f64) {
        match parameter {
            Parameter::CellSize => self.cell_size = value,
            Parameter::ScaleMultiplier => self.scale_multiplier = value,
            Parameter::MinSum => self.min_sum = value,
        }
    }
}

/// Text shown next to each slider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlLabels {
    pub cell_size: String,
    pub scale_multiplier: String,
    pub min_sum: String,
}

/// Notification emitted when a slider moves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlChange {
    pub parameter: Parameter,
    pub value: f64,
    pub label: String,
}

/// Slider values together with their ranges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlSurface {
    ranges: ControlRanges,
    params: ControlParams,
}

impl ControlSurface {
    /// Surface with initial values snapped into the given ranges.
    pub fn new(ranges: ControlRanges, initial: ControlParams) -> Self {
        let mut surface = Self {
            ranges,
            params: initial,
        };
        for parameter in [
            Parameter::CellSize,
            Parameter::ScaleMultiplier,
            Parameter::MinSum,
        ] {
            let value = surface.ranges.get(parameter).snap(initial.get(parameter));
            surface.params.set(parameter, value);
        }
        surface
    }

    pub fn params(&self) -> ControlParams {
        self.params
    }

    pub fn ranges(&self) -> &ControlRanges {
        &self.ranges
    }

    /// Copy with one parameter changed, plus the change notification.
    pub fn with_value(&self, parameter: Parameter, value: f64) -> (Self, ControlChange) {
        let mut next = *self;
        let value = self.ranges.get(parameter).snap(value);
        next.params.set(parameter, value);
        let change = ControlChange {
            parameter,
            value,
            label: next.label(parameter),
        };
        (next, change)
    }

    pub fn label(&self, parameter: Parameter) -> String {
        match parameter {
            Parameter::CellSize => format!("{}", self.params.cell_size),
            Parameter::ScaleMultiplier => format!("{:.1}×", self.params.scale_multiplier),
            Parameter::MinSum => format!("{}+", self.params.min_sum),
        }
    }

    pub fn labels(&self) -> ControlLabels {
        ControlLabels {
            cell_size: self.label(Parameter::CellSize),
            scale_multiplier: self.label(Parameter::ScaleMultiplier),
            min_sum: self.label(Parameter::MinSum),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels() {
        let labels = ControlSurface::default().labels();
        assert_eq!(labels.cell_size, "40");
        assert_eq!(labels.scale_multiplier, "1.2×");
        assert_eq!(labels.min_sum, "1+");
    }

    #[test]
    fn test_values_snap_and_clamp() {
        let surface = ControlSurface::default();

        let (surface, change) = surface.with_value(Parameter::CellSize, 41.3);
        assert_eq!(change.value, 42.0);
        assert_eq!(change.label, "42");

        let (surface, change) = surface.with_value(Parameter::CellSize, 1000.0);
        assert_eq!(change.value, 120.0);

        let (surface, change) = surface.with_value(Parameter::ScaleMultiplier, 1.26);
        assert_eq!(change.value, 1.3);
        assert_eq!(change.label, "1.3×");

        let (_, change) = surface.with_value(Parameter::MinSum, f64::NAN);
        assert_eq!(change.value, 1.0);
    }

    #[test]
    fn test_initial_values_are_snapped() {
        let surface = ControlSurface::new(
            ControlRanges::default(),
            ControlParams {
                cell_size: 1.0,
                scale_multiplier: 9.0,
                min_sum: 3.0,
            },
        );
        assert_eq!(surface.params().cell_size, 10.0);
        assert_eq!(surface.params().scale_multiplier, 3.0);
        assert_eq!(surface.params().min_sum, 3.0);
    }

    #[test]
    fn test_original_is_unchanged() {
        let surface = ControlSurface::default();
        let (next, _) = surface.with_value(Parameter::MinSum, 10.0);
        assert_eq!(surface.params().min_sum, 1.0);
        assert_eq!(next.params().min_sum, 10.0);
    }
}
