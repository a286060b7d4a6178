//! Common types and utilities shared across the cluster map crates and services.

pub mod bbox;
pub mod error;
pub mod record;
pub mod viewport;

pub use bbox::BoundingBox;
pub use error::{ClusterError, ClusterResult};
pub use record::{LoadStats, Record, RecordSet};
pub use viewport::{ViewportSize, ViewportTransform, ZoomBehavior};
