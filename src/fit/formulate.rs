use std::collections::BTreeMap;

use crate::geometry::{Point, bounding_box, polygon_area};

use super::FitError;
use super::lp::{Comparison, Direction, LpProblem};

/// Linear program for the largest similar copy of a hull inside a convex cell.
///
/// Every hull vertex `i` is placed at a convex combination of the cell vertices
/// with weights `lambda[i][j]`. Two reference hull vertices `a` (leftmost) and
/// `b` (rightmost) pin the similarity: every other vertex is constrained to the
/// image it would have under the transform mapping `q_a, q_b` to their images,
/// and the objective stretches `X_b - X_a`.
///
/// Both polygons are normalized to unit extent before the coefficients are built.
#[derive(Debug, Clone)]
pub struct InscribeProblem {
    pub lp: LpProblem,
    pub reference: (usize, usize),
    cell: Vec<Point>,
    hull_len: usize,
    cell_offset: Point,
    cell_extent: f64,
}

impl InscribeProblem {
    fn lambda(&self, hull_idx: usize, cell_idx: usize) -> usize {
        hull_idx * self.cell.len() + cell_idx
    }

    /// Canvas-space image of every hull vertex under a solver assignment.
    pub fn images(&self, assignment: &[f64]) -> Vec<Point> {
        (0..self.hull_len)
            .map(|i| {
                let (mut x, mut y) = (0.0, 0.0);
                for (j, p) in self.cell.iter().enumerate() {
                    let weight = assignment.get(self.lambda(i, j)).copied().unwrap_or(0.0);
                    x += weight * p.0;
                    y += weight * p.1;
                }
                (
                    self.cell_offset.0 + x * self.cell_extent,
                    self.cell_offset.1 + y * self.cell_extent,
                )
            })
            .collect()
    }
}

/// Builds the inscribed-copy program for `hull` (text space) inside `cell` (canvas).
///
/// Fails with [`FitError::LpInfeasible`] when either polygon is degenerate.
pub fn formulate_inscribed_copy(cell: &[Point], hull: &[Point]) -> Result<InscribeProblem, FitError> {
    if cell.len() < 3 || polygon_area(cell).abs() <= f64::EPSILON || hull.len() < 2 {
        return Err(FitError::LpInfeasible);
    }
    let (a, b) = reference_pair(hull).ok_or(FitError::LpInfeasible)?;

    let (cell_min, cell_max) = bounding_box(cell).ok_or(FitError::LpInfeasible)?;
    let cell_extent = (cell_max.0 - cell_min.0).max(cell_max.1 - cell_min.1);
    let (hull_min, hull_max) = bounding_box(hull).ok_or(FitError::LpInfeasible)?;
    let hull_extent = (hull_max.0 - hull_min.0).max(hull_max.1 - hull_min.1);
    if cell_extent <= 0.0 || hull_extent <= 0.0 {
        return Err(FitError::LpInfeasible);
    }

    let p: Vec<Point> = cell
        .iter()
        .map(|v| ((v.0 - cell_min.0) / cell_extent, (v.1 - cell_min.1) / cell_extent))
        .collect();
    let anchor = hull[a];
    let q: Vec<Point> = hull
        .iter()
        .map(|v| ((v.0 - anchor.0) / hull_extent, (v.1 - anchor.1) / hull_extent))
        .collect();

    let n = p.len();
    let mut lp = LpProblem::new(Direction::Maximize);
    for i in 0..q.len() {
        for pj in &p {
            let objective = if i == b {
                pj.0
            } else if i == a {
                -pj.0
            } else {
                0.0
            };
            lp.add_variable(objective, (0.0, 1.0));
        }
    }
    let lambda = |i: usize, j: usize| i * n + j;

    for i in 0..q.len() {
        lp.add_constraint((0..n).map(|j| (lambda(i, j), 1.0)).collect(), Comparison::Eq, 1.0);
    }

    let span = q[b].0 - q[a].0;
    for (i, qi) in q.iter().enumerate() {
        let mut row_x: BTreeMap<usize, f64> = BTreeMap::new();
        let mut row_y: BTreeMap<usize, f64> = BTreeMap::new();
        let along_x = qi.1 - q[a].1;
        for (j, pj) in p.iter().enumerate() {
            *row_x.entry(lambda(i, j)).or_default() += span * pj.0;
            *row_x.entry(lambda(a, j)).or_default() -= (q[b].0 - qi.0) * pj.0;
            *row_x.entry(lambda(b, j)).or_default() += (q[a].0 - qi.0) * pj.0;

            *row_y.entry(lambda(i, j)).or_default() += span * pj.1;
            *row_y.entry(lambda(a, j)).or_default() -= span * pj.1;
            *row_y.entry(lambda(b, j)).or_default() -= along_x * pj.0;
            *row_y.entry(lambda(a, j)).or_default() += along_x * pj.0;
        }
        for row in [row_x, row_y] {
            let terms: Vec<(usize, f64)> = row.into_iter().filter(|(_, coef)| *coef != 0.0).collect();
            if !terms.is_empty() {
                lp.add_constraint(terms, Comparison::Eq, 0.0);
            }
        }
    }

    Ok(InscribeProblem {
        lp,
        reference: (a, b),
        cell: p,
        hull_len: hull.len(),
        cell_offset: cell_min,
        cell_extent,
    })
}

/// Leftmost and rightmost hull vertices; `None` when the hull has no width.
fn reference_pair(hull: &[Point]) -> Option<(usize, usize)> {
    let mut left = 0;
    let mut right = 0;
    for (idx, p) in hull.iter().enumerate() {
        if p.0 < hull[left].0 || (p.0 == hull[left].0 && p.1 < hull[left].1) {
            left = idx;
        }
        if p.0 > hull[right].0 || (p.0 == hull[right].0 && p.1 < hull[right].1) {
            right = idx;
        }
    }
    (hull[right].0 > hull[left].0).then_some((left, right))
}
