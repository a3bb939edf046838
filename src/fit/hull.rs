use crate::geometry::{Point, cross, extent, order_clockwise};
use crate::raster::GlyphRaster;

use super::FitError;

/// Distance from a pixel center to the hull corners it contributes.
pub const DEFAULT_HULL_MARGIN: f64 = 1.5;

/// Convex hull of a label rendering, clockwise on the y-down canvas, leftmost vertex first.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexHull {
    pub points: Vec<Point>,
}

/// Hull of every ink pixel of `raster`, in text space.
///
/// Each ink pixel contributes the four corners of a square of half-size `margin`
/// around its center, so the hull bounds the ink conservatively.
pub fn extract_hull(raster: &GlyphRaster, margin: f64) -> Result<ConvexHull, FitError> {
    let (ox, oy) = raster.origin;
    let mut corners: Vec<Point> = Vec::new();
    for row in 0..raster.height {
        for col in 0..raster.width {
            if raster.alpha_at(col, row) == 0 {
                continue;
            }
            let cx = col as f64 - ox + 0.5;
            let cy = row as f64 - oy + 0.5;
            corners.push((cx - margin, cy - margin));
            corners.push((cx + margin, cy - margin));
            corners.push((cx - margin, cy + margin));
            corners.push((cx + margin, cy + margin));
        }
    }
    if corners.is_empty() {
        return Err(FitError::RasterEmpty);
    }
    corners.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    corners.dedup();

    let wrapped = gift_wrap(&corners);
    Ok(ConvexHull {
        points: order_clockwise(&wrapped),
    })
}

/// Relative tolerance for treating three corners as collinear.
const COLLINEAR_EPS: f64 = 1e-9;

/// Jarvis march over points sorted by x then y. Collinear corners within a
/// tolerance scaled to the point spread are dropped in favor of the farther one.
fn gift_wrap(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let tolerance = COLLINEAR_EPS * extent(points).powi(2);
    // The first point in (x, y) order is always a hull vertex.
    let start = 0;
    let mut hull = Vec::new();
    let mut current = start;
    loop {
        hull.push(points[current]);
        let origin = points[current];
        let mut next = if current == 0 { 1 } else { 0 };
        for (idx, &candidate) in points.iter().enumerate() {
            if idx == current || idx == next {
                continue;
            }
            let turn = cross(origin, points[next], candidate);
            if turn > tolerance
                || (turn.abs() <= tolerance && dist2(origin, candidate) > dist2(origin, points[next]))
            {
                next = idx;
            }
        }
        current = next;
        if current == start || hull.len() > points.len() {
            break;
        }
    }
    hull
}

fn dist2(a: Point, b: Point) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    dx * dx + dy * dy
}
