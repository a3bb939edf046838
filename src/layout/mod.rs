mod error;
mod hierarchy;
pub mod tessellation;
pub(crate) mod types;

pub use error::LayoutError;
pub use hierarchy::{ROOT_ID, cluster_id, leaf_id};
pub use tessellation::{PowerDiagramTreemap, TessellationEngine, TessellationReport};
pub use types::*;

use std::collections::VecDeque;
use std::sync::Arc;

use rayon::prelude::*;

use crate::config::LayoutConfig;
use crate::fit::{FitContext, LpSolver, MicroLpSolver, fit_label};
use crate::geometry::{ClipPolygon, polygon_area};
use crate::hyphenate::{DictionaryHyphenator, HyphenationOracle, NoHyphenation};
use crate::ir::{HierarchyNode, LeafRecord};
use crate::raster::{BlockRasterizer, FontRasterizer, GlyphRasterizer};

/// Everything one layout run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    pub records: Vec<LeafRecord>,
    pub clip: ClipPolygon,
    pub config: LayoutConfig,
}

/// Bundles the pluggable collaborators of a layout run.
#[derive(Clone)]
pub struct LayoutEngine {
    tessellator: Arc<dyn TessellationEngine>,
    rasterizer: Arc<dyn GlyphRasterizer>,
    hyphenator: Arc<dyn HyphenationOracle>,
    solver: Arc<dyn LpSolver>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    /// System fonts, the en-US dictionary and the simplex solver.
    pub fn new() -> Self {
        let hyphenator: Arc<dyn HyphenationOracle> = match DictionaryHyphenator::english() {
            Ok(dictionary) => Arc::new(dictionary),
            Err(err) => {
                tracing::warn!(error = %err, "hyphenation disabled");
                Arc::new(NoHyphenation)
            }
        };
        Self {
            tessellator: Arc::new(PowerDiagramTreemap),
            rasterizer: Arc::new(FontRasterizer::new()),
            hyphenator,
            solver: Arc::new(MicroLpSolver),
        }
    }

    /// Font-independent engine: block glyphs and no hyphenation.
    pub fn headless() -> Self {
        Self {
            tessellator: Arc::new(PowerDiagramTreemap),
            rasterizer: Arc::new(BlockRasterizer),
            hyphenator: Arc::new(NoHyphenation),
            solver: Arc::new(MicroLpSolver),
        }
    }

    pub fn with_tessellator(mut self, tessellator: impl TessellationEngine + 'static) -> Self {
        self.tessellator = Arc::new(tessellator);
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: impl GlyphRasterizer + 'static) -> Self {
        self.rasterizer = Arc::new(rasterizer);
        self
    }

    pub fn with_hyphenator(mut self, hyphenator: impl HyphenationOracle + 'static) -> Self {
        self.hyphenator = Arc::new(hyphenator);
        self
    }

    pub fn with_solver(mut self, solver: impl LpSolver + 'static) -> Self {
        self.solver = Arc::new(solver);
        self
    }

    pub fn compute(&self, request: &LayoutRequest) -> Result<Layout, LayoutError> {
        compute_layout(request, self)
    }
}

/// Builds the hierarchy, tessellates it and fits every leaf label into its cell.
pub fn compute_layout(request: &LayoutRequest, engine: &LayoutEngine) -> Result<Layout, LayoutError> {
    let clip = &request.clip;
    let area = polygon_area(&clip.points).abs();
    if clip.points.len() < 3 || !(area > f64::EPSILON) {
        return Err(LayoutError::InvalidClip {
            points: clip.points.len(),
            area,
        });
    }
    let config = &request.config;

    let mut root = hierarchy::build_hierarchy(&request.records, config.weight_transform)?;
    hierarchy::assign_fills(&mut root, config.palette);

    let report = engine
        .tessellator
        .tessellate(&mut root, clip, &config.tessellation);
    if !report.converged {
        tracing::debug!(
            iterations = report.iterations,
            error = report.worst_error,
            "tessellation stopped before converging"
        );
    }

    let ctx = FitContext {
        rasterizer: engine.rasterizer.as_ref(),
        hyphenator: engine.hyphenator.as_ref(),
        solver: engine.solver.as_ref(),
        text: &config.text,
        fit: &config.fit,
    };
    root.leaves_mut().into_par_iter().for_each(|leaf| {
        let Some(label) = leaf.label().map(str::to_owned) else {
            return;
        };
        let Some(cell) = leaf.cell.as_ref() else {
            tracing::debug!(label = %label, "leaf has no cell");
            return;
        };
        let outcome = fit_label(&label, &cell.points, &ctx);
        leaf.fit = outcome.fit;
    });

    let nodes = flatten(root);
    tracing::info!(
        nodes = nodes.len(),
        fitted = nodes.iter().filter(|node| node.fit.is_some()).count(),
        "layout complete"
    );
    Ok(Layout {
        clip: clip.clone(),
        font_family: config.text.font_family.clone(),
        font_size: config.text.font_size,
        nodes,
        tessellation: report,
    })
}

/// Breadth-first walk, then a stable sort by descending depth.
fn flatten(root: HierarchyNode) -> Vec<LaidOutNode> {
    let mut nodes = Vec::new();
    let mut queue: VecDeque<(HierarchyNode, Option<String>, usize)> = VecDeque::new();
    queue.push_back((root, None, 0));
    while let Some((mut node, parent, depth)) = queue.pop_front() {
        let height = node.height();
        for child in std::mem::take(&mut node.children) {
            queue.push_back((child, Some(node.id.clone()), depth + 1));
        }
        nodes.push(LaidOutNode {
            id: node.id,
            parent,
            kind: node.kind,
            depth,
            height,
            weight: node.weight,
            fill: node.fill,
            cell: node.cell,
            fit: node.fit,
        });
    }
    nodes.sort_by(|a, b| b.depth.cmp(&a.depth));
    nodes
}
