use std::collections::HashMap;

use crate::config::WeightTransform;
use crate::ir::{HierarchyNode, LeafRecord, NodeKind};
use crate::theme::{NO_FILL, Palette};

use super::LayoutError;

pub const ROOT_ID: &str = "root";

pub fn cluster_id(key: &str) -> String {
    format!("cluster:{key}")
}

pub fn leaf_id(record_index: usize) -> String {
    format!("leaf:{record_index}")
}

/// Groups records into root -> clusters -> leaves.
///
/// Clusters keep the order their key first appears in; leaves keep input order.
/// Leaves whose raw or transformed weight is not positive and finite are
/// dropped, and clusters left without leaves go with them.
pub(super) fn build_hierarchy(
    records: &[LeafRecord],
    transform: WeightTransform,
) -> Result<HierarchyNode, LayoutError> {
    let usable = |w: f64| w.is_finite() && w > 0.0;
    let extent = records
        .iter()
        .map(|record| record.weight)
        .filter(|w| usable(*w))
        .fold(None, |acc: Option<(f64, f64)>, w| match acc {
            Some((lo, hi)) => Some((lo.min(w), hi.max(w))),
            None => Some((w, w)),
        })
        .ok_or(LayoutError::EmptyInput)?;

    let mut clusters: Vec<HierarchyNode> = Vec::new();
    let mut cluster_index: HashMap<&str, usize> = HashMap::new();
    let mut dropped = 0usize;
    for (idx, record) in records.iter().enumerate() {
        let slot = *cluster_index.entry(record.cluster.as_str()).or_insert_with(|| {
            clusters.push(HierarchyNode::new(
                cluster_id(&record.cluster),
                NodeKind::Cluster {
                    key: record.cluster.clone(),
                },
                0.0,
            ));
            clusters.len() - 1
        });
        let weight = if usable(record.weight) {
            transform.apply(record.weight, extent)
        } else {
            f64::NAN
        };
        if !usable(weight) {
            tracing::debug!(label = %record.label, raw = record.weight, "dropping leaf without positive weight");
            dropped += 1;
            continue;
        }
        let cluster = &mut clusters[slot];
        cluster.weight += weight;
        cluster.children.push(HierarchyNode::new(
            leaf_id(idx),
            NodeKind::Leaf {
                label: record.label.clone(),
            },
            weight,
        ));
    }
    if dropped > 0 {
        tracing::warn!(dropped, kept = records.len() - dropped, "dropped leaves without positive weight");
    }

    clusters.retain(|cluster| !cluster.children.is_empty());
    if clusters.is_empty() {
        return Err(LayoutError::EmptyInput);
    }
    let mut root = HierarchyNode::new(ROOT_ID, NodeKind::Root, clusters.iter().map(|c| c.weight).sum());
    root.children = clusters;
    Ok(root)
}

/// Cluster `k` takes palette color `k`; leaves inherit their cluster's color and
/// every node with children is unfilled.
pub(super) fn assign_fills(root: &mut HierarchyNode, palette: Palette) {
    root.fill = NO_FILL.to_string();
    for (k, cluster) in root.children.iter_mut().enumerate() {
        paint(cluster, palette.color(k));
    }
}

fn paint(node: &mut HierarchyNode, color: &str) {
    node.fill = if node.children.is_empty() {
        color.to_string()
    } else {
        NO_FILL.to_string()
    };
    for child in &mut node.children {
        paint(child, color);
    }
}
