//! Map state snapshots and the event loop that drives re-rendering.
//!
//! `MapState` is an immutable snapshot of everything a render pass depends
//! on. Events turn one snapshot into the next through the pure
//! `MapState::apply`; the `MapController` owns the current snapshot, swaps
//! it wholesale per event and then runs aggregation and reconciliation to
//! completion before returning.

use cluster_common::{RecordSet, ViewportSize, ViewportTransform, ZoomBehavior};
use projection::{AlbersUsa, Projection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::aggregate;
use crate::basemap::BaseMapLayer;
use crate::controls::{ControlChange, ControlLabels, ControlSurface, Parameter};
use crate::marks::{MarkLayer, RenderStats};
use crate::scene::{render_svg, SceneStyle};

/// Something that happened to the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Records and geometry finished loading
    DataLoaded,
    /// Wheel/pinch zoom by `factor` around a screen point (viewport center
    /// when omitted)
    Zoom {
        factor: f64,
        #[serde(default)]
        anchor: Option<(f64, f64)>,
    },
    /// Drag by a screen-pixel offset
    Pan { dx: f64, dy: f64 },
    /// Back to the identity transform
    ResetZoom,
    SetCellSize { value: f64 },
    SetScaleMultiplier { value: f64 },
    SetMinSum { value: f64 },
    /// Container width changed; height follows the fixed aspect ratio
    Resize { width: f64 },
}

impl Event {
    /// Whether the projection and base map must be rebuilt.
    pub fn is_resize(&self) -> bool {
        matches!(self, Event::Resize { .. })
    }
}

/// Immutable input to one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapState {
    pub viewport: ViewportSize,
    pub transform: ViewportTransform,
    pub controls: ControlSurface,
}

impl MapState {
    pub fn new(viewport: ViewportSize, controls: ControlSurface) -> Self {
        Self {
            viewport,
            transform: ViewportTransform::identity(),
            controls,
        }
    }

    /// Pan/zoom constraints for this viewport.
    pub fn zoom_behavior(&self) -> ZoomBehavior {
        ZoomBehavior::new(self.viewport)
    }

    /// Next snapshot after `event`, plus a control notification when a
    /// slider moved.
    pub fn apply(&self, event: &Event) -> (MapState, Option<ControlChange>) {
        let mut next = *self;
        let zoom = self.zoom_behavior();

        let change = match *event {
            Event::DataLoaded => None,
            Event::Zoom { factor, anchor } => {
                let anchor = anchor.unwrap_or_else(|| zoom.center());
                next.transform = zoom.scale_by(self.transform, factor, anchor);
                None
            }
            Event::Pan { dx, dy } => {
                next.transform = zoom.translate_by(self.transform, dx, dy);
                None
            }
            Event::ResetZoom => {
                next.transform = zoom.reset();
                None
            }
            Event::SetCellSize { value } => self.set_control(&mut next, Parameter::CellSize, value),
            Event::SetScaleMultiplier { value } => {
                self.set_control(&mut next, Parameter::ScaleMultiplier, value)
            }
            Event::SetMinSum { value } => self.set_control(&mut next, Parameter::MinSum, value),
            Event::Resize { width } => {
                next.viewport = ViewportSize::from_width(width);
                next.transform = next.zoom_behavior().constrain(self.transform);
                None
            }
        };

        (next, change)
    }

    fn set_control(
        &self,
        next: &mut MapState,
        parameter: Parameter,
        value: f64,
    ) -> Option<ControlChange> {
        let (controls, change) = self.controls.with_value(parameter, value);
        next.controls = controls;
        Some(change)
    }
}

/// Summary of one handled event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    /// Sequence number of the render pass
    pub frame: u64,
    pub clusters: usize,
    /// Sum over visible clusters
    pub visible_sum: f64,
    pub stats: RenderStats,
    pub transform: ViewportTransform,
    pub labels: ControlLabels,
    pub control_change: Option<ControlChange>,
}

/// Owns the current snapshot, the projection, the loaded data and the layers.
pub struct MapController<P: Projection = AlbersUsa> {
    state: MapState,
    projection: P,
    records: Option<RecordSet>,
    basemap: BaseMapLayer,
    marks: MarkLayer,
    frame: u64,
}

impl MapController<AlbersUsa> {
    /// Controller with the US projection fitted to the viewport.
    pub fn with_albers_usa(state: MapState) -> Self {
        Self::new(state, AlbersUsa::for_viewport(state.viewport))
    }
}

impl<P: Projection> MapController<P> {
    pub fn new(state: MapState, mut projection: P) -> Self {
        projection.fit_viewport(state.viewport);
        Self {
            state,
            projection,
            records: None,
            basemap: BaseMapLayer::default(),
            marks: MarkLayer::new(),
            frame: 0,
        }
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn marks(&self) -> &MarkLayer {
        &self.marks
    }

    pub fn basemap(&self) -> &BaseMapLayer {
        &self.basemap
    }

    /// Install loaded data, draw the base map and render the first frame.
    pub fn load(&mut self, records: RecordSet, basemap: BaseMapLayer) -> Option<FrameReport> {
        let stats = records.stats();
        info!(
            kept = stats.kept,
            dropped = stats.dropped,
            shapes = basemap.shapes().len(),
            "Map data loaded"
        );
        self.records = Some(records);
        self.basemap = basemap;
        self.basemap.redraw(&self.projection);
        self.handle(&Event::DataLoaded)
    }

    /// Apply an event and re-render.
    ///
    /// Returns `None` while no data has been loaded; the snapshot is still
    /// updated so the first render uses the latest parameters.
    pub fn handle(&mut self, event: &Event) -> Option<FrameReport> {
        let (next, control_change) = self.state.apply(event);
        self.state = next;

        if event.is_resize() {
            self.projection.fit_viewport(self.state.viewport);
            self.basemap.redraw(&self.projection);
        }

        let records = match &self.records {
            Some(records) => records,
            None => {
                debug!(?event, "Data not loaded yet, skipping render");
                return None;
            }
        };

        let params = self.state.controls.params();
        let clusters = aggregate(
            records.records(),
            &self.projection,
            &self.state.transform,
            params.cell_size,
            params.min_sum,
        );
        let stats = self.marks.render(&clusters, params.scale_multiplier);
        self.frame += 1;

        Some(FrameReport {
            frame: self.frame,
            clusters: clusters.len(),
            visible_sum: clusters.iter().map(|c| c.sum).sum(),
            stats,
            transform: self.state.transform,
            labels: self.state.controls.labels(),
            control_change,
        })
    }

    /// Current scene as an SVG document.
    pub fn to_svg(&self, style: &SceneStyle) -> String {
        render_svg(
            &self.state.viewport,
            &self.state.transform,
            &self.basemap,
            &self.marks,
            style,
        )
    }
}
