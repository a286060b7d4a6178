//! Retained cluster marks and keyed reconciliation.
//!
//! Each render pass joins the new clusters against the marks from the
//! previous pass by cell key. The join is split into three steps applied in
//! order: marks whose key survives are updated in place (their handle is
//! kept), new keys get fresh marks, and keys that disappeared are removed.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::aggregate::{CellKey, Cluster};
use crate::scale::{label_font_size, SqrtScale};

/// One visual cluster mark: a circle with a centered label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mark {
    /// Stable identity, assigned at creation and kept across updates
    pub handle: u64,
    pub key: CellKey,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub font_size: f64,
    pub label: String,
    pub sum: f64,
    pub count: usize,
}

/// Visual attributes computed for a cluster.
#[derive(Debug, Clone, PartialEq)]
struct MarkAttrs {
    x: f64,
    y: f64,
    radius: f64,
    font_size: f64,
    label: String,
    sum: f64,
    count: usize,
}

impl MarkAttrs {
    fn for_cluster(cluster: &Cluster, scale: &SqrtScale, scale_multiplier: f64) -> Self {
        let base_radius = scale.apply(cluster.sum);
        Self {
            x: cluster.x,
            y: cluster.y,
            // Negative sums extrapolate below the range; never draw a negative radius.
            radius: (base_radius * scale_multiplier).max(0.0),
            font_size: label_font_size(base_radius),
            label: format_sum(cluster.sum),
            sum: cluster.sum,
            count: cluster.count,
        }
    }
}

/// Label text for a sum: integers without a fractional part.
pub fn format_sum(sum: f64) -> String {
    format!("{}", sum)
}

/// Which keys to update, create and remove to go from one frame to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub update: Vec<CellKey>,
    pub create: Vec<CellKey>,
    pub remove: Vec<CellKey>,
}

impl ReconcilePlan {
    /// Partition previous and next key sets.
    pub fn between(previous: &BTreeSet<CellKey>, next: &BTreeSet<CellKey>) -> Self {
        Self {
            update: previous.intersection(next).copied().collect(),
            create: next.difference(previous).copied().collect(),
            remove: previous.difference(next).copied().collect(),
        }
    }
}

/// Counts from one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub updated: usize,
    pub created: usize,
    pub removed: usize,
    pub visible: usize,
}

/// The current set of on-screen marks, keyed by cell.
#[derive(Debug, Clone, Default)]
pub struct MarkLayer {
    marks: BTreeMap<CellKey, Mark>,
    next_handle: u64,
}

impl MarkLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the layer against a new cluster list.
    pub fn render(&mut self, clusters: &[Cluster], scale_multiplier: f64) -> RenderStats {
        let scale = SqrtScale::for_sums(clusters.iter().map(|c| c.sum));

        let mut next: BTreeMap<CellKey, MarkAttrs> = BTreeMap::new();
        for cluster in clusters {
            next.insert(
                cluster.key,
                MarkAttrs::for_cluster(cluster, &scale, scale_multiplier),
            );
        }

        let previous_keys: BTreeSet<CellKey> = self.marks.keys().copied().collect();
        let next_keys: BTreeSet<CellKey> = next.keys().copied().collect();
        let plan = ReconcilePlan::between(&previous_keys, &next_keys);

        for key in &plan.update {
            if let (Some(mark), Some(attrs)) = (self.marks.get_mut(key), next.remove(key)) {
                apply_attrs(mark, attrs);
            }
        }

        for key in &plan.create {
            if let Some(attrs) = next.remove(key) {
                let handle = self.next_handle;
                self.next_handle += 1;
                let mut mark = Mark {
                    handle,
                    key: *key,
                    x: 0.0,
                    y: 0.0,
                    radius: 0.0,
                    font_size: 0.0,
                    label: String::new(),
                    sum: 0.0,
                    count: 0,
                };
                apply_attrs(&mut mark, attrs);
                self.marks.insert(*key, mark);
            }
        }

        for key in &plan.remove {
            self.marks.remove(key);
        }

        let stats = RenderStats {
            updated: plan.update.len(),
            created: plan.create.len(),
            removed: plan.remove.len(),
            visible: self.marks.len(),
        };

        debug!(
            updated = stats.updated,
            created = stats.created,
            removed = stats.removed,
            visible = stats.visible,
            max_sum = scale.domain_max(),
            "Reconciled cluster marks"
        );

        stats
    }

    /// Remove every mark.
    pub fn clear(&mut self) -> RenderStats {
        self.render(&[], 1.0)
    }

    pub fn get(&self, key: &CellKey) -> Option<&Mark> {
        self.marks.get(key)
    }

    /// Marks in key order.
    pub fn marks(&self) -> impl Iterator<Item = &Mark> {
        self.marks.values()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

fn apply_attrs(mark: &mut Mark, attrs: MarkAttrs) {
    mark.x = attrs.x;
    mark.y = attrs.y;
    mark.radius = attrs.radius;
    mark.font_size = attrs.font_size;
    mark.label = attrs.label;
    mark.sum = attrs.sum;
    mark.count = attrs.count;
}
