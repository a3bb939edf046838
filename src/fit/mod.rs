//! Text-to-cell affine fitting.
//!
//! A label is rendered to a raster, reduced to its convex hull, and the largest
//! similar copy of that hull that fits inside the cell is found with a linear
//! program. The search repeats this for every rotation angle and line split.

mod formulate;
mod hull;
mod lp;
mod search;
mod solve;

pub use formulate::{InscribeProblem, formulate_inscribed_copy};
pub use hull::{ConvexHull, DEFAULT_HULL_MARGIN, extract_hull};
pub use lp::{Comparison, Direction, LpConstraint, LpError, LpProblem, LpSolver, LpVariable, MicroLpSolver};
pub use search::{
    FitCandidate, FitContext, SearchOutcome, SearchReport, centroid_fit, fit_label, rotation_angles,
    search_best_fit,
};
pub use solve::{InscribedCopy, SolveOptions, solve_inscribed_copy};

use crate::geometry::Point;
use serde::Serialize;
use thiserror::Error;

/// Per-candidate failures. None of these abort a search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("label rendering has no ink pixels")]
    RasterEmpty,
    #[error("no positive scale fits the cell")]
    LpInfeasible,
    #[error("lp solver failed: {0}")]
    LpSolver(String),
}

impl From<LpError> for FitError {
    fn from(err: LpError) -> Self {
        match err {
            LpError::Infeasible | LpError::Unbounded => FitError::LpInfeasible,
            LpError::Solver(message) => FitError::LpSolver(message),
        }
    }
}

/// Best placement found for one label.
///
/// A point `p` in text space (origin at the left end of the first baseline) lands
/// at `scale * R(angle) * p + (dx, dy)` on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffineFit {
    pub scale: f64,
    pub dx: f64,
    pub dy: f64,
    /// Rotation in degrees, clockwise on the y-down canvas.
    pub angle: f64,
    /// The transformed hull (or bounding box for centroid placement), in canvas space.
    pub polygon: Vec<Point>,
    pub lines: Vec<String>,
}

impl AffineFit {
    pub fn transform(&self, p: Point) -> Point {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let x = p.0 * cos - p.1 * sin;
        let y = p.0 * sin + p.1 * cos;
        (self.scale * x + self.dx, self.scale * y + self.dy)
    }
}
