//! Property-based invariant tests for label fitting.
//!
//! 1. An inscribed copy lies inside its convex cell.
//! 2. The reported polygon is exactly `scale * hull + translation`.
//! 3. Scaling the cell scales the optimal copy by the same factor.
//! 4. The extracted hull contains every ink pixel's margin square.
//! 5. Line splits enumerate every break subset and rejoin to the label.
//! 6. The search reports a scale no smaller than any single grid rotation admits.

use proptest::prelude::*;
use voronoi_word_cloud::config::{FitConfig, TextConfig};
use voronoi_word_cloud::fit::{
    FitContext, MicroLpSolver, SolveOptions, extract_hull, rotation_angles, search_best_fit, solve_inscribed_copy,
};
use voronoi_word_cloud::geometry::{Point, contains_convex, extent, order_clockwise, regular_polygon, rotate};
use voronoi_word_cloud::hyphenate::{NoHyphenation, line_splits};
use voronoi_word_cloud::raster::{BlockRasterizer, GlyphRaster, GlyphRasterizer};

// ── Helpers ─────────────────────────────────────────────────────────────

fn cell_strategy() -> impl Strategy<Value = Vec<Point>> {
    (3usize..=9, 20.0f64..400.0, -500.0f64..500.0, -500.0f64..500.0, 0.0f64..1.0).prop_map(
        |(sides, radius, cx, cy, turn)| {
            regular_polygon(sides, radius)
                .into_iter()
                .map(|(x, y)| {
                    let (sin, cos) = (turn * std::f64::consts::TAU).sin_cos();
                    (cx + x * cos - y * sin, cy + x * sin + y * cos)
                })
                .collect()
        },
    )
}

fn hull_strategy() -> impl Strategy<Value = Vec<Point>> {
    (1.0f64..80.0, 1.0f64..30.0).prop_map(|(w, h)| vec![(-1.5, -h), (w, -h), (w, 1.5), (-1.5, 1.5)])
}

fn ink_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((0u32..24, 0u32..16), 1..40)
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Containment and reconstruction
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn inscribed_copy_stays_inside(cell in cell_strategy(), hull in hull_strategy(), centered in any::<bool>()) {
        let options = SolveOptions { center_translation: centered, ..SolveOptions::default() };
        let copy = solve_inscribed_copy(&cell, &hull, &MicroLpSolver, options).expect("convex cells always fit");
        prop_assert!(copy.scale > 0.0);
        let tolerance = 1e-6 * extent(&cell);
        for (q, p) in hull.iter().zip(&copy.polygon) {
            prop_assert!(contains_convex(&cell, *p, tolerance), "vertex {:?} outside {:?}", p, cell);
            let expected = (copy.scale * q.0 + copy.translation.0, copy.scale * q.1 + copy.translation.1);
            prop_assert!((expected.0 - p.0).abs() < 1e-9 && (expected.1 - p.1).abs() < 1e-9);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Scale equivariance
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn larger_cell_gives_proportionally_larger_copy(
        cell in cell_strategy(),
        hull in hull_strategy(),
        factor in 1.5f64..4.0,
    ) {
        let grown: Vec<Point> = cell.iter().map(|p| (p.0 * factor, p.1 * factor)).collect();
        let small = solve_inscribed_copy(&cell, &hull, &MicroLpSolver, SolveOptions::default()).expect("fit");
        let large = solve_inscribed_copy(&grown, &hull, &MicroLpSolver, SolveOptions::default()).expect("fit");
        let ratio = large.scale / small.scale;
        prop_assert!((ratio - factor).abs() < factor * 1e-4, "ratio {} vs factor {}", ratio, factor);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Hull covers the ink
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn hull_covers_ink(ink in ink_strategy(), ox in 0.0f64..10.0, oy in 0.0f64..10.0) {
        let mut raster = GlyphRaster::blank(24, 16, (ox, oy));
        for &(x, y) in &ink {
            raster.alpha[(y * 24 + x) as usize] = 1;
        }
        let hull = extract_hull(&raster, 1.5).expect("ink present");
        for &(x, y) in &ink {
            let cx = x as f64 - ox + 0.5;
            let cy = y as f64 - oy + 0.5;
            for corner in [(cx - 1.5, cy - 1.5), (cx + 1.5, cy - 1.5), (cx - 1.5, cy + 1.5), (cx + 1.5, cy + 1.5)] {
                prop_assert!(contains_convex(&hull.points, corner, 1e-9));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Line split enumeration
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn splits_rejoin_to_label(label in "[a-z]{2,12}", picks in prop::collection::btree_set(1usize..12, 0..5)) {
        let breaks: Vec<usize> = picks.into_iter().filter(|&at| at < label.len()).collect();
        let splits = line_splits(&label, &breaks, None);
        prop_assert_eq!(splits.len(), 1usize << breaks.len());
        for lines in &splits {
            let joined: String = lines
                .iter()
                .enumerate()
                .map(|(idx, line)| {
                    if idx + 1 < lines.len() {
                        line.strip_suffix('-').unwrap_or(line)
                    } else {
                        line.as_str()
                    }
                })
                .collect();
            prop_assert_eq!(&joined, &label);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Search optimality over the rotation grid
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn search_matches_best_grid_rotation(
        cell in cell_strategy(),
        step in prop::sample::select(vec![15.0f64, 30.0, 45.0, 60.0, 90.0]),
        label in "[a-z]{1,8}",
    ) {
        let text = TextConfig::default();
        let fit = FitConfig { rotation_step: Some(step), ..FitConfig::default() };
        let ctx = FitContext {
            rasterizer: &BlockRasterizer,
            hyphenator: &NoHyphenation,
            solver: &MicroLpSolver,
            text: &text,
            fit: &fit,
        };
        let options = SolveOptions {
            center_translation: fit.center_translation,
            centering_slack: fit.centering_slack,
        };
        let raster = BlockRasterizer.rasterize(&[label.clone()], &text.font_family, text.font_size);
        let hull = extract_hull(&raster, fit.hull_margin).expect("block glyphs have ink");
        let ordered_cell = order_clockwise(&cell);
        let best_single = rotation_angles(fit.rotation_step)
            .into_iter()
            .filter_map(|angle| {
                let rotated = order_clockwise(&rotate(&hull.points, angle.to_radians()));
                solve_inscribed_copy(&ordered_cell, &rotated, &MicroLpSolver, options).ok()
            })
            .map(|copy| copy.scale)
            .fold(0.0, f64::max);
        let found = search_best_fit(&label, &cell, &ctx).fit.expect("convex cells always fit").scale;
        prop_assert!(
            found >= best_single * (1.0 - fit.centering_slack),
            "search found {} but a single rotation admits {}",
            found,
            best_single
        );
    }
}
