use std::path::{Path, PathBuf};

use voronoi_word_cloud::geometry::{contains_convex, convex_violation, extent, polygon_area};
use voronoi_word_cloud::hyphenate::FixedBreaks;
use voronoi_word_cloud::ir::NodeKind;
use voronoi_word_cloud::{
    ClipPolygon, Layout, LayoutConfig, LayoutEngine, LayoutRequest, LeafRecord, Region, load_config, parse_records,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn animals() -> Vec<LeafRecord> {
    let input = std::fs::read_to_string(fixture("animals.json5")).expect("fixture read failed");
    parse_records(&input).expect("fixture parse failed")
}

fn layout_for(region: Region, config: LayoutConfig) -> Layout {
    let request = LayoutRequest {
        records: animals(),
        clip: ClipPolygon::from(region),
        config,
    };
    LayoutEngine::headless().compute(&request).expect("layout failed")
}

fn assert_layout_invariants(layout: &Layout, context: &str) {
    let clip_area = layout.clip.area();
    let leaf_area: f64 = layout.leaves().map(|leaf| polygon_area(leaf.polygon()).abs()).sum();
    assert!(
        (leaf_area - clip_area).abs() < clip_area * 1e-6,
        "{context}: leaf cells cover {leaf_area} of {clip_area}"
    );
    for leaf in layout.leaves() {
        let cell = leaf.polygon();
        assert!(cell.len() >= 3, "{context}: {} has no cell", leaf.id);
        let fit = leaf.fit.as_ref().expect("every animal fits its cell");
        assert!(fit.scale > 0.0, "{context}: {} has scale {}", leaf.id, fit.scale);
        let tolerance = 1e-6 * extent(cell);
        for p in &fit.polygon {
            assert!(
                contains_convex(cell, *p, tolerance),
                "{context}: {} leaks out of its cell by {}",
                leaf.id,
                convex_violation(cell, *p)
            );
        }
    }
}

#[test]
fn every_region_contains_its_labels() {
    for region in [
        Region::RectangleHorizontal,
        Region::RectangleVertical,
        Region::Square,
        Region::Hexagon,
        Region::Octagon,
        Region::Circle,
    ] {
        let layout = layout_for(region, LayoutConfig::default());
        assert_layout_invariants(&layout, &format!("{region:?}"));
    }
}

#[test]
fn zero_weight_cluster_is_dropped() {
    let layout = layout_for(Region::Square, LayoutConfig::default());
    assert_eq!(layout.leaves().count(), 11);
    assert!(layout.nodes.iter().all(|node| node.kind != NodeKind::Cluster { key: "myth".into() }));
    let clusters: Vec<&str> = layout
        .nodes
        .iter()
        .filter_map(|node| match &node.kind {
            NodeKind::Cluster { key } => Some(key.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(clusters, vec!["river", "sky", "forest"]);
}

#[test]
fn leaves_share_their_cluster_color() {
    let layout = layout_for(Region::Square, LayoutConfig::default());
    for leaf in layout.leaves() {
        let parent = leaf.parent.as_deref().expect("leaf parent");
        let expected = match parent {
            "cluster:river" => "#4e79a7",
            "cluster:sky" => "#f28e2c",
            "cluster:forest" => "#e15759",
            other => panic!("unexpected parent {other}"),
        };
        assert_eq!(leaf.fill, expected);
    }
    assert!(layout.nodes.iter().filter(|n| n.depth < 2).all(|n| n.fill == "none"));
}

#[test]
fn layout_is_deterministic() {
    let first = layout_for(Region::Octagon, LayoutConfig::default());
    let second = layout_for(Region::Octagon, LayoutConfig::default());
    assert_eq!(first, second);
}

#[test]
fn config_file_drives_the_layout() {
    let config = load_config(Some(&fixture("config.json"))).expect("config");
    assert_eq!(config.region, Region::Hexagon);
    let layout = layout_for(config.region, config.layout);
    assert_layout_invariants(&layout, "config fixture");
    let river = layout.leaves().find(|leaf| leaf.label() == Some("otter")).expect("otter");
    assert_eq!(river.fill, "#1b9e77");
    for leaf in layout.leaves() {
        let angle = leaf.fit.as_ref().expect("fit").angle;
        assert!([0.0, 45.0, -45.0, 90.0, -90.0].contains(&angle), "unexpected angle {angle}");
    }
}

#[test]
fn centroid_placement_when_optimization_disabled() {
    let mut config = LayoutConfig::default();
    config.fit.enabled = false;
    let layout = layout_for(Region::Square, config);
    for leaf in layout.leaves() {
        let fit = leaf.fit.as_ref().expect("centroid fit");
        assert_eq!(fit.angle, 0.0);
        assert_eq!(fit.lines.len(), 1);
        for p in &fit.polygon {
            assert!(contains_convex(leaf.polygon(), *p, 1e-9));
        }
    }
}

#[test]
fn hyphenated_label_can_win_in_a_narrow_cell() {
    let mut config = LayoutConfig::default();
    config.fit.rotation_step = None;
    config.fit.hyphenation = true;
    let request = LayoutRequest {
        records: vec![LeafRecord::new("woodpecker", 1.0, "forest")],
        clip: ClipPolygon::new(vec![(0.0, 0.0), (80.0, 0.0), (80.0, 80.0), (0.0, 80.0)]),
        config,
    };
    let engine = LayoutEngine::headless().with_hyphenator(FixedBreaks::new().with("woodpecker", vec![4]));
    let layout = engine.compute(&request).expect("layout");
    let leaf = layout.leaves().next().expect("leaf");
    assert_eq!(
        leaf.fit.as_ref().expect("fit").lines,
        vec!["wood-".to_string(), "pecker".to_string()]
    );
}
