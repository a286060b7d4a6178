//! Cluster aggregation and rendering for the customer map.
//!
//! Implements the render pipeline:
//! - Screen-space grid aggregation
//! - Square-root radius scale
//! - Keyed mark reconciliation
//! - State boundary base map
//! - Controls, state snapshots and event handling
//! - SVG scene and PNG output

pub mod aggregate;
pub mod basemap;
pub mod controller;
pub mod controls;
pub mod geometry;
pub mod marks;
pub mod raster;
pub mod scale;
pub mod scene;

pub use aggregate::{aggregate, bin_records, CellKey, Cluster, GridCell};
pub use basemap::BaseMapLayer;
pub use controller::{Event, FrameReport, MapController, MapState};
pub use controls::{ControlParams, ControlRange, ControlRanges, ControlSurface, Parameter};
pub use marks::{Mark, MarkLayer, ReconcilePlan, RenderStats};
pub use scale::SqrtScale;
pub use scene::SceneStyle;
