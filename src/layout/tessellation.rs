use serde::Serialize;

use crate::config::TessellationConfig;
use crate::geometry::{
    ClipPolygon, Point, bounding_box, clip_half_plane, contains_convex, polygon_area, polygon_centroid,
};
use crate::ir::{CellPolygon, HierarchyNode};

/// Summary of a tessellation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TessellationReport {
    /// Every sibling group reached the convergence ratio.
    pub converged: bool,
    /// Most iterations any sibling group used.
    pub iterations: usize,
    /// Largest final area error over all sibling groups.
    pub worst_error: f64,
}

impl Default for TessellationReport {
    fn default() -> Self {
        Self {
            converged: true,
            iterations: 0,
            worst_error: 0.0,
        }
    }
}

/// Assigns every node a convex cell with area proportional to its weight,
/// nested within its parent's cell. The root gets the clip polygon.
pub trait TessellationEngine: Send + Sync {
    fn tessellate(
        &self,
        root: &mut HierarchyNode,
        clip: &ClipPolygon,
        config: &TessellationConfig,
    ) -> TessellationReport;
}

/// Voronoi treemap built from per-level power diagrams.
///
/// Sites start at seeded random positions inside the parent cell. Each
/// iteration moves sites to their cell centroids and scales their power
/// weights by target-to-current area ratio until the area error drops below
/// the convergence ratio or the iteration cap is hit.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerDiagramTreemap;

impl TessellationEngine for PowerDiagramTreemap {
    fn tessellate(
        &self,
        root: &mut HierarchyNode,
        clip: &ClipPolygon,
        config: &TessellationConfig,
    ) -> TessellationReport {
        let mut rng = Lcg::new(config.seed);
        let mut report = TessellationReport::default();
        root.cell = Some(CellPolygon {
            points: clip.points.clone(),
            site: Some(polygon_centroid(&clip.points)),
        });
        tessellate_children(root, &clip.points, config, &mut rng, &mut report);
        report
    }
}

fn tessellate_children(
    node: &mut HierarchyNode,
    polygon: &[Point],
    config: &TessellationConfig,
    rng: &mut Lcg,
    report: &mut TessellationReport,
) {
    if node.children.is_empty() {
        return;
    }
    let weights: Vec<f64> = node.children.iter().map(|child| child.weight).collect();
    let level = power_cells_for(polygon, &weights, config, rng);
    report.converged &= level.converged;
    report.iterations = report.iterations.max(level.iterations);
    report.worst_error = report.worst_error.max(level.error);
    if !level.converged {
        tracing::debug!(
            node = %node.id,
            iterations = level.iterations,
            error = level.error,
            "tessellation did not converge"
        );
    }
    for (child, (cell, site)) in node.children.iter_mut().zip(level.cells) {
        tessellate_children(child, &cell, config, rng, report);
        child.cell = Some(CellPolygon {
            points: cell,
            site: Some(site),
        });
    }
}

struct LevelResult {
    cells: Vec<(Vec<Point>, Point)>,
    iterations: usize,
    error: f64,
    converged: bool,
}

fn power_cells_for(
    polygon: &[Point],
    weights: &[f64],
    config: &TessellationConfig,
    rng: &mut Lcg,
) -> LevelResult {
    let total_area = polygon_area(polygon).abs();
    if weights.len() == 1 || total_area <= f64::EPSILON {
        let centroid = polygon_centroid(polygon);
        return LevelResult {
            cells: weights.iter().map(|_| (polygon.to_vec(), centroid)).collect(),
            iterations: 0,
            error: 0.0,
            converged: true,
        };
    }

    let max_weight = weights.iter().copied().fold(0.0, f64::max);
    let floor = max_weight * config.min_weight_ratio;
    let values: Vec<f64> = weights.iter().map(|w| w.max(floor)).collect();
    let value_sum: f64 = values.iter().sum();
    let targets: Vec<f64> = values.iter().map(|v| total_area * v / value_sum).collect();

    let mut sites: Vec<Point> = (0..values.len())
        .map(|_| random_point_in(polygon, rng))
        .collect();
    let initial = total_area / values.len() as f64 / 2.0;
    let mut powers = vec![initial; values.len()];
    cap_powers(&sites, &mut powers);
    let mut cells = power_cells(polygon, &sites, &powers);
    let mut error = area_error(&cells, &targets, total_area);
    let mut iterations = 0;

    while iterations < config.max_iteration_count && error >= config.convergence_ratio {
        iterations += 1;
        for (site, cell) in sites.iter_mut().zip(&cells) {
            if cell.len() >= 3 {
                *site = polygon_centroid(cell);
            }
        }
        cap_powers(&sites, &mut powers);
        cells = power_cells(polygon, &sites, &powers);

        for ((power, cell), target) in powers.iter_mut().zip(&cells).zip(&targets) {
            let area = polygon_area(cell).abs().max(f64::EPSILON);
            *power = (*power * target / area).max(f64::EPSILON);
        }
        cap_powers(&sites, &mut powers);
        cells = power_cells(polygon, &sites, &powers);
        error = area_error(&cells, &targets, total_area);
    }

    LevelResult {
        cells: cells.into_iter().zip(sites).collect(),
        iterations,
        error,
        converged: error < config.convergence_ratio,
    }
}

/// Keeps each site inside its own power cell: radii `sqrt(w)` are capped at half
/// the distance to the nearest other site.
fn cap_powers(sites: &[Point], powers: &mut [f64]) {
    for (i, power) in powers.iter_mut().enumerate() {
        let nearest = sites
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, s)| (s.0 - sites[i].0).powi(2) + (s.1 - sites[i].1).powi(2))
            .fold(f64::INFINITY, f64::min);
        if nearest.is_finite() {
            *power = power.min(nearest / 4.0);
        }
    }
}

/// Power cell of every site, clipped to `polygon`.
fn power_cells(polygon: &[Point], sites: &[Point], powers: &[f64]) -> Vec<Vec<Point>> {
    sites
        .iter()
        .enumerate()
        .map(|(i, si)| {
            let mut cell = polygon.to_vec();
            for (j, sj) in sites.iter().enumerate() {
                if i == j {
                    continue;
                }
                let a = 2.0 * (sj.0 - si.0);
                let b = 2.0 * (sj.1 - si.1);
                if a == 0.0 && b == 0.0 {
                    continue;
                }
                let c = (sj.0 * sj.0 + sj.1 * sj.1) - (si.0 * si.0 + si.1 * si.1) + powers[i] - powers[j];
                cell = clip_half_plane(&cell, a, b, c);
                if cell.is_empty() {
                    break;
                }
            }
            cell
        })
        .collect()
}

fn area_error(cells: &[Vec<Point>], targets: &[f64], total_area: f64) -> f64 {
    let deviation: f64 = cells
        .iter()
        .zip(targets)
        .map(|(cell, target)| (polygon_area(cell).abs() - target).abs())
        .sum();
    deviation / (2.0 * total_area)
}

fn random_point_in(polygon: &[Point], rng: &mut Lcg) -> Point {
    let Some((min, max)) = bounding_box(polygon) else {
        return (0.0, 0.0);
    };
    for _ in 0..1000 {
        let p = (
            min.0 + rng.next_f64() * (max.0 - min.0),
            min.1 + rng.next_f64() * (max.1 - min.1),
        );
        if contains_convex(polygon, p, 0.0) {
            return p;
        }
    }
    polygon_centroid(polygon)
}

/// 32-bit linear congruential generator with the same sequence as `d3.randomLcg`.
#[derive(Debug, Clone)]
pub(crate) struct Lcg {
    state: u32,
}

impl Lcg {
    const MUL: u32 = 0x0019_660D;
    const INC: u32 = 0x3C6E_F35F;

    pub(crate) fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Uniform sample in `[0, 1)`.
    pub(crate) fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(Self::MUL).wrapping_add(Self::INC);
        self.state as f64 / 4_294_967_296.0
    }
}
