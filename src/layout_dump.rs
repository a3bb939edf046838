use crate::layout::{Layout, LaidOutNode};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub font_family: String,
    pub font_size: f64,
    pub clip: Vec<[f64; 2]>,
    pub converged: bool,
    pub tessellation_iterations: usize,
    pub nodes: Vec<NodeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub parent: Option<String>,
    pub kind: &'static str,
    pub name: String,
    pub depth: usize,
    pub height: usize,
    pub weight: f64,
    pub fill: String,
    pub polygon: Vec<[f64; 2]>,
    pub site: Option<[f64; 2]>,
    pub text: Option<TextDump>,
}

/// Label placement as an SVG-style transform: `translate(dx, dy) rotate(angle) scale(scale)`.
#[derive(Debug, Serialize)]
pub struct TextDump {
    pub lines: Vec<String>,
    pub scale: f64,
    pub dx: f64,
    pub dy: f64,
    pub angle: f64,
    pub hull: Vec<[f64; 2]>,
}

fn pair(p: &(f64, f64)) -> [f64; 2] {
    [p.0, p.1]
}

impl NodeDump {
    fn from_node(node: &LaidOutNode) -> Self {
        use crate::ir::NodeKind;
        let (kind, name) = match &node.kind {
            NodeKind::Root => ("root", node.id.clone()),
            NodeKind::Cluster { key } => ("cluster", key.clone()),
            NodeKind::Leaf { label } => ("leaf", label.clone()),
        };
        NodeDump {
            id: node.id.clone(),
            parent: node.parent.clone(),
            kind,
            name,
            depth: node.depth,
            height: node.height,
            weight: node.weight,
            fill: node.fill.clone(),
            polygon: node.polygon().iter().map(pair).collect(),
            site: node.cell.as_ref().and_then(|cell| cell.site.as_ref()).map(pair),
            text: node.fit.as_ref().map(|fit| TextDump {
                lines: fit.lines.clone(),
                scale: fit.scale,
                dx: fit.dx,
                dy: fit.dy,
                angle: fit.angle,
                hull: fit.polygon.iter().map(pair).collect(),
            }),
        }
    }
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        LayoutDump {
            font_family: layout.font_family.clone(),
            font_size: layout.font_size,
            clip: layout.clip.points.iter().map(pair).collect(),
            converged: layout.tessellation.converged,
            tessellation_iterations: layout.tessellation.iterations,
            nodes: layout.nodes.iter().map(NodeDump::from_node).collect(),
        }
    }
}

pub fn write_layout_dump(path: Option<&Path>, layout: &Layout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, &dump)?;
            writeln!(handle)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::geometry::{ClipPolygon, Region};
    use crate::ir::LeafRecord;
    use crate::layout::{LayoutEngine, LayoutRequest};

    #[test]
    fn dump_round_trips_through_json() {
        let request = LayoutRequest {
            records: vec![LeafRecord::new("alpha", 2.0, "g"), LeafRecord::new("beta", 1.0, "g")],
            clip: ClipPolygon::from(Region::Square),
            config: LayoutConfig::default(),
        };
        let layout = LayoutEngine::headless().compute(&request).expect("layout");
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("layout.json");
        write_layout_dump(Some(&path), &layout).expect("dump");

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        let nodes = value["nodes"].as_array().expect("nodes");
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0]["kind"], "leaf");
        assert_eq!(nodes[0]["name"], "alpha");
        assert_eq!(nodes[3]["kind"], "root");
        assert_eq!(nodes[3]["fill"], "none");
        assert!(nodes[0]["text"]["scale"].as_f64().expect("scale") > 0.0);
    }
}
