use std::collections::HashMap;

use crate::fit::AffineFit;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// One weighted label of the input, tagged with its cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafRecord {
    pub label: String,
    pub weight: f64,
    pub cluster: String,
}

impl LeafRecord {
    pub fn new(label: impl Into<String>, weight: f64, cluster: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            weight,
            cluster: cluster.into(),
        }
    }
}

/// Parses a JSON5 array of leaf records.
pub fn parse_records(input: &str) -> Result<Vec<LeafRecord>, json5::Error> {
    json5::from_str(input)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Cluster { key: String },
    Leaf { label: String },
}

/// Region assigned to a node by the tessellation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellPolygon {
    pub points: Vec<Point>,
    pub site: Option<Point>,
}

/// Owned hierarchy: root, clusters, leaves. Children keep input order.
#[derive(Debug, Clone)]
pub struct HierarchyNode {
    pub id: String,
    pub kind: NodeKind,
    /// Transformed weight; for inner nodes the sum over their leaves.
    pub weight: f64,
    pub fill: String,
    pub children: Vec<HierarchyNode>,
    pub cell: Option<CellPolygon>,
    pub fit: Option<AffineFit>,
}

impl HierarchyNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, weight: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            weight,
            fill: String::new(),
            children: Vec::new(),
            cell: None,
            fit: None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf { label } => Some(label),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Distance to the deepest leaf below this node.
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.height() + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn leaves(&self) -> Vec<&HierarchyNode> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }

    pub fn leaves_mut(&mut self) -> Vec<&mut HierarchyNode> {
        let mut out = Vec::new();
        collect_leaves_mut(self, &mut out);
        out
    }

    /// Child id to parent id, for upward lookups.
    pub fn parent_index(&self) -> HashMap<String, String> {
        let mut index = HashMap::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            for child in &node.children {
                index.insert(child.id.clone(), node.id.clone());
                stack.push(child);
            }
        }
        index
    }
}

fn collect_leaves<'a>(node: &'a HierarchyNode, out: &mut Vec<&'a HierarchyNode>) {
    if node.is_leaf() {
        out.push(node);
        return;
    }
    for child in &node.children {
        collect_leaves(child, out);
    }
}

fn collect_leaves_mut<'a>(node: &'a mut HierarchyNode, out: &mut Vec<&'a mut HierarchyNode>) {
    if node.children.is_empty() {
        out.push(node);
        return;
    }
    for child in &mut node.children {
        collect_leaves_mut(child, out);
    }
}
