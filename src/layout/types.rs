use serde::Serialize;

use crate::fit::AffineFit;
use crate::geometry::{ClipPolygon, Point};
use crate::ir::{CellPolygon, NodeKind};

use super::tessellation::TessellationReport;

/// One node of the finished layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaidOutNode {
    pub id: String,
    pub parent: Option<String>,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub depth: usize,
    pub height: usize,
    pub weight: f64,
    pub fill: String,
    pub cell: Option<CellPolygon>,
    /// Only leaves carry a fit; `None` when no candidate fit their cell.
    pub fit: Option<AffineFit>,
}

impl LaidOutNode {
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf { label } => Some(label),
            _ => None,
        }
    }

    pub fn polygon(&self) -> &[Point] {
        self.cell.as_ref().map(|cell| cell.points.as_slice()).unwrap_or(&[])
    }
}

/// Flattened layout, deepest nodes first. Nodes of equal depth keep
/// breadth-first order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub clip: ClipPolygon,
    pub font_family: String,
    pub font_size: f64,
    pub nodes: Vec<LaidOutNode>,
    pub tessellation: TessellationReport,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&LaidOutNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &LaidOutNode> {
        self.nodes
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::Leaf { .. }))
    }
}
