use crate::geometry::{
    Point, bounding_box, clip_half_plane, convex_half_planes, convex_violation, extent, polygon_centroid,
};

use super::FitError;
use super::formulate::formulate_inscribed_copy;
use super::lp::LpSolver;

const MIN_SCALE: f64 = 1e-9;
/// Containment tolerance for a centered copy, relative to the cell extent.
const CENTERING_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveOptions {
    /// Move the copy to the middle of its feasible translations.
    pub center_translation: bool,
    /// Relative scale reduction applied before centering.
    pub centering_slack: f64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            center_translation: true,
            centering_slack: 1e-6,
        }
    }
}

/// Scaled and translated copy of a hull: `polygon[i] = scale * hull[i] + translation`.
#[derive(Debug, Clone, PartialEq)]
pub struct InscribedCopy {
    pub scale: f64,
    pub translation: Point,
    pub polygon: Vec<Point>,
}

/// Largest copy of `hull` under uniform scale and translation that fits in `cell`.
pub fn solve_inscribed_copy(
    cell: &[Point],
    hull: &[Point],
    solver: &dyn LpSolver,
    options: SolveOptions,
) -> Result<InscribedCopy, FitError> {
    let problem = formulate_inscribed_copy(cell, hull)?;
    let assignment = solver.solve(&problem.lp)?;
    let images = problem.images(&assignment);

    let (a, b) = problem.reference;
    let hull_span = (hull[b].0 - hull[a].0).hypot(hull[b].1 - hull[a].1);
    let image_span = (images[b].0 - images[a].0).hypot(images[b].1 - images[a].1);
    let scale = image_span / hull_span;
    if !(scale > MIN_SCALE) || !scale.is_finite() {
        return Err(FitError::LpInfeasible);
    }
    let translation = (images[a].0 - scale * hull[a].0, images[a].1 - scale * hull[a].1);
    let optimal = place(hull, scale, translation);

    if options.center_translation {
        let shrunk = scale * (1.0 - options.centering_slack.clamp(0.0, 0.5));
        if let Some(center) = centered_translation(cell, hull, shrunk) {
            let centered = place(hull, shrunk, center);
            let allowed = worst_violation(cell, &optimal.polygon).max(CENTERING_TOLERANCE * extent(cell));
            if worst_violation(cell, &centered.polygon) <= allowed {
                return Ok(centered);
            }
            tracing::debug!(scale, "centered copy leaves the cell, keeping the optimal translation");
        }
    }
    Ok(optimal)
}

fn place(hull: &[Point], scale: f64, translation: Point) -> InscribedCopy {
    let polygon = hull
        .iter()
        .map(|q| (scale * q.0 + translation.0, scale * q.1 + translation.1))
        .collect();
    InscribedCopy {
        scale,
        translation,
        polygon,
    }
}

fn worst_violation(cell: &[Point], polygon: &[Point]) -> f64 {
    polygon
        .iter()
        .map(|p| convex_violation(cell, *p))
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Centroid of the translations `t` with `scale * q + t` inside `cell` for every
/// hull vertex `q`, or `None` when that set is empty.
fn centered_translation(cell: &[Point], hull: &[Point], scale: f64) -> Option<Point> {
    let planes = convex_half_planes(cell);
    let first = hull.first()?;
    let (min, max) = bounding_box(cell)?;
    let mut region = vec![
        (min.0 - scale * first.0, min.1 - scale * first.1),
        (max.0 - scale * first.0, min.1 - scale * first.1),
        (max.0 - scale * first.0, max.1 - scale * first.1),
        (min.0 - scale * first.0, max.1 - scale * first.1),
    ];
    for (a, b, c) in planes {
        // Only the hull vertex furthest along the edge normal binds.
        let support = hull
            .iter()
            .map(|q| a * q.0 + b * q.1)
            .fold(f64::NEG_INFINITY, f64::max);
        region = clip_half_plane(&region, a, b, c - scale * support);
        if region.is_empty() {
            return None;
        }
    }
    Some(polygon_centroid(&region))
}
