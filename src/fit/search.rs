use rayon::prelude::*;

use crate::config::{FitConfig, TextConfig};
use crate::geometry::{Point, distance_to_line, order_clockwise, polygon_area, polygon_centroid, rotate};
use crate::hyphenate::{HyphenationOracle, line_splits};
use crate::raster::GlyphRasterizer;

use super::hull::extract_hull;
use super::lp::LpSolver;
use super::solve::{SolveOptions, solve_inscribed_copy};
use super::{AffineFit, FitError};

/// Collaborators and settings shared by every candidate of a search.
#[derive(Clone, Copy)]
pub struct FitContext<'a> {
    pub rasterizer: &'a dyn GlyphRasterizer,
    pub hyphenator: &'a dyn HyphenationOracle,
    pub solver: &'a dyn LpSolver,
    pub text: &'a TextConfig,
    pub fit: &'a FitConfig,
}

/// One (rotation, line split) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FitCandidate {
    pub angle: f64,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchReport {
    pub evaluated: usize,
    pub skipped: Vec<(FitCandidate, FitError)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub fit: Option<AffineFit>,
    pub report: SearchReport,
}

/// Rotation angles in degrees: `0, +s, -s, +2s, -2s, ...` up to 90.
pub fn rotation_angles(step: Option<f64>) -> Vec<f64> {
    let mut angles = vec![0.0];
    let Some(step) = step.filter(|s| s.is_finite() && *s > 0.0) else {
        return angles;
    };
    let mut k = 1.0;
    while k * step <= 90.0 + 1e-9 {
        angles.push(k * step);
        angles.push(-k * step);
        k += 1.0;
    }
    angles
}

/// Places `label` in `cell`: optimized search when enabled, otherwise centroid placement.
pub fn fit_label(label: &str, cell: &[Point], ctx: &FitContext<'_>) -> SearchOutcome {
    if ctx.fit.enabled {
        return search_best_fit(label, cell, ctx);
    }
    SearchOutcome {
        fit: centroid_fit(label, cell, ctx),
        report: SearchReport {
            evaluated: 1,
            skipped: Vec::new(),
        },
    }
}

/// Evaluates every rotation and line split and keeps the largest scale.
///
/// Candidates are tried angle-major, split-minor; a later candidate replaces the
/// best only with a strictly larger scale, so ties go to the earlier one.
pub fn search_best_fit(label: &str, cell: &[Point], ctx: &FitContext<'_>) -> SearchOutcome {
    let cell = order_clockwise(cell);
    let breaks = if ctx.fit.hyphenation {
        ctx.hyphenator.break_points(label)
    } else {
        Vec::new()
    };
    let splits = line_splits(label, &breaks, ctx.fit.max_break_points);
    let angles = rotation_angles(ctx.fit.rotation_step);

    let hulls: Vec<Result<Vec<Point>, FitError>> = splits
        .par_iter()
        .map(|lines| {
            let raster = ctx
                .rasterizer
                .rasterize(lines, &ctx.text.font_family, ctx.text.font_size);
            extract_hull(&raster, ctx.fit.hull_margin).map(|hull| hull.points)
        })
        .collect();

    let options = SolveOptions {
        center_translation: ctx.fit.center_translation,
        centering_slack: ctx.fit.centering_slack,
    };
    let pairs: Vec<(f64, usize)> = angles
        .iter()
        .flat_map(|&angle| (0..splits.len()).map(move |split| (angle, split)))
        .collect();
    let results: Vec<Result<AffineFit, FitError>> = pairs
        .par_iter()
        .map(|&(angle, split)| {
            let hull = hulls[split].as_ref().map_err(Clone::clone)?;
            let rotated = order_clockwise(&rotate(hull, angle.to_radians()));
            let copy = solve_inscribed_copy(&cell, &rotated, ctx.solver, options)?;
            Ok(AffineFit {
                scale: copy.scale,
                dx: copy.translation.0,
                dy: copy.translation.1,
                angle,
                polygon: copy.polygon,
                lines: splits[split].clone(),
            })
        })
        .collect();

    let mut best: Option<AffineFit> = None;
    let mut report = SearchReport::default();
    for ((angle, split), result) in pairs.into_iter().zip(results) {
        report.evaluated += 1;
        match result {
            Ok(fit) => {
                if best.as_ref().is_none_or(|current| fit.scale > current.scale) {
                    best = Some(fit);
                }
            }
            Err(err) => {
                match &err {
                    FitError::LpSolver(message) => {
                        tracing::warn!(label, angle, split, %message, "lp solver failed, skipping candidate")
                    }
                    _ => tracing::debug!(label, angle, split, error = %err, "skipping candidate"),
                }
                report.skipped.push((
                    FitCandidate {
                        angle,
                        lines: splits[split].clone(),
                    },
                    err,
                ));
            }
        }
    }
    if best.is_none() {
        tracing::debug!(label, candidates = report.evaluated, "no candidate fits the cell");
    }
    SearchOutcome { fit: best, report }
}

/// Unoptimized placement: horizontal single-line text centered on the cell
/// centroid, scaled so its bounding box stays within the centroid's inset
/// distance to the nearest edge.
pub fn centroid_fit(label: &str, cell: &[Point], ctx: &FitContext<'_>) -> Option<AffineFit> {
    if cell.len() < 3 || polygon_area(cell).abs() <= f64::EPSILON {
        return None;
    }
    let (cx, cy) = polygon_centroid(cell);
    let font_size = ctx.text.font_size;
    let extent = ctx
        .rasterizer
        .measure(label, &ctx.text.font_family, font_size);
    let half_diagonal = (extent.width / 2.0).hypot(font_size / 2.0);
    let radius = (0..cell.len())
        .map(|i| {
            let a = cell[i];
            let b = cell[(i + 1) % cell.len()];
            distance_to_line((cx, cy), a, b) - ctx.fit.centering_margin
        })
        .fold(f64::INFINITY, f64::min);
    let scale = radius / half_diagonal;
    if !(scale > 0.0) || !scale.is_finite() {
        tracing::debug!(label, radius, "cell too small for centroid placement");
        return None;
    }

    let half_w = scale * extent.width / 2.0;
    let half_h = scale * font_size / 2.0;
    Some(AffineFit {
        scale,
        dx: cx - half_w,
        dy: cy - scale * (font_size / 2.0 - extent.ascent),
        angle: 0.0,
        polygon: vec![
            (cx - half_w, cy - half_h),
            (cx + half_w, cy - half_h),
            (cx + half_w, cy + half_h),
            (cx - half_w, cy + half_h),
        ],
        lines: vec![label.to_string()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::MicroLpSolver;
    use crate::geometry::contains_convex;
    use crate::hyphenate::{FixedBreaks, NoHyphenation};
    use crate::raster::{BlockRasterizer, GlyphRaster, TextExtent};

    fn square(size: f64) -> Vec<Point> {
        vec![(0.0, 0.0), (size, 0.0), (size, size), (0.0, size)]
    }

    fn context<'a>(
        hyphenator: &'a dyn HyphenationOracle,
        text: &'a TextConfig,
        fit: &'a FitConfig,
    ) -> FitContext<'a> {
        FitContext {
            rasterizer: &BlockRasterizer,
            hyphenator,
            solver: &MicroLpSolver,
            text,
            fit,
        }
    }

    #[test]
    fn angles_alternate_sign() {
        assert_eq!(rotation_angles(None), vec![0.0]);
        assert_eq!(rotation_angles(Some(0.0)), vec![0.0]);
        assert_eq!(rotation_angles(Some(30.0)), vec![0.0, 30.0, -30.0, 60.0, -60.0, 90.0, -90.0]);
        assert_eq!(rotation_angles(Some(50.0)), vec![0.0, 50.0, -50.0]);
    }

    #[test]
    fn no_rotation_evaluates_only_horizontal() {
        let text = TextConfig::default();
        let fit = FitConfig {
            rotation_step: None,
            ..FitConfig::default()
        };
        let outcome = search_best_fit("word", &square(200.0), &context(&NoHyphenation, &text, &fit));
        assert_eq!(outcome.report.evaluated, 1);
        let best = outcome.fit.expect("fit");
        assert_eq!(best.angle, 0.0);
        assert_eq!(best.lines, vec!["word".to_string()]);
        for p in &best.polygon {
            assert!(contains_convex(&square(200.0), *p, 1e-6));
        }
    }

    #[test]
    fn tall_cell_prefers_rotation() {
        let text = TextConfig::default();
        let fit = FitConfig {
            rotation_step: Some(90.0),
            ..FitConfig::default()
        };
        let cell = vec![(0.0, 0.0), (20.0, 0.0), (20.0, 300.0), (0.0, 300.0)];
        let outcome = search_best_fit("sideways", &cell, &context(&NoHyphenation, &text, &fit));
        assert_eq!(outcome.report.evaluated, 3);
        let best = outcome.fit.expect("fit");
        assert_eq!(best.angle.abs(), 90.0);
    }

    #[test]
    fn narrow_cell_prefers_hyphenated_split() {
        let text = TextConfig::default();
        let fit = FitConfig {
            rotation_step: None,
            hyphenation: true,
            ..FitConfig::default()
        };
        let oracle = FixedBreaks::new().with("abcdefgh", vec![4]);
        let cell = vec![(0.0, 0.0), (60.0, 0.0), (60.0, 60.0), (0.0, 60.0)];
        let outcome = search_best_fit("abcdefgh", &cell, &context(&oracle, &text, &fit));
        assert_eq!(outcome.report.evaluated, 2);
        let best = outcome.fit.expect("fit");
        assert_eq!(best.lines, vec!["abcd-".to_string(), "efgh".to_string()]);
    }

    #[test]
    fn blank_label_yields_no_fit() {
        let text = TextConfig::default();
        let fit = FitConfig::default();
        let outcome = search_best_fit("   ", &square(100.0), &context(&NoHyphenation, &text, &fit));
        assert!(outcome.fit.is_none());
        assert_eq!(outcome.report.skipped.len(), outcome.report.evaluated);
        assert!(
            outcome
                .report
                .skipped
                .iter()
                .all(|(_, err)| *err == FitError::RasterEmpty)
        );
    }

    #[test]
    fn disabled_optimization_centers_on_centroid() {
        let text = TextConfig::default();
        let fit = FitConfig {
            enabled: false,
            ..FitConfig::default()
        };
        let outcome = fit_label("abcd", &square(100.0), &context(&NoHyphenation, &text, &fit));
        let placed = outcome.fit.expect("fit");
        // Block glyphs: width 24, half-diagonal 13; inset radius 48.
        assert!((placed.scale - 48.0 / 13.0).abs() < 1e-9);
        assert_eq!(placed.angle, 0.0);
        assert!((placed.dx - (50.0 - placed.scale * 12.0)).abs() < 1e-9);
        assert!((placed.dy - (50.0 - placed.scale * (5.0 - 7.0))).abs() < 1e-9);
        assert_eq!(placed.lines, vec!["abcd".to_string()]);
    }

    /// Draws the same solid block whatever the lines are.
    struct SameInk;

    impl GlyphRasterizer for SameInk {
        fn rasterize(&self, _lines: &[String], _font_family: &str, _font_size: f64) -> GlyphRaster {
            let mut raster = GlyphRaster::blank(12, 4, (0.0, 3.0));
            raster.alpha.iter_mut().for_each(|a| *a = 255);
            raster
        }

        fn measure(&self, _text: &str, _font_family: &str, font_size: f64) -> TextExtent {
            BlockRasterizer.measure("abc", "", font_size)
        }
    }

    #[test]
    fn tied_candidates_keep_the_first() {
        let text = TextConfig::default();
        let fit = FitConfig {
            rotation_step: None,
            hyphenation: true,
            ..FitConfig::default()
        };
        let oracle = FixedBreaks::new().with("tiebreak", vec![3, 5]);
        let ctx = FitContext {
            rasterizer: &SameInk,
            hyphenator: &oracle,
            solver: &MicroLpSolver,
            text: &text,
            fit: &fit,
        };
        let outcome = search_best_fit("tiebreak", &square(100.0), &ctx);
        assert_eq!(outcome.report.evaluated, 4);
        assert!(outcome.report.skipped.is_empty());
        assert_eq!(outcome.fit.expect("fit").lines, vec!["tiebreak".to_string()]);
    }
}
