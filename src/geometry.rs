use serde::{Deserialize, Serialize};

/// A point on the y-down layout canvas.
pub type Point = (f64, f64);

const AREA_EPS: f64 = 1e-12;

/// Convex outer boundary the whole hierarchy is laid out in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipPolygon {
    pub points: Vec<Point>,
}

impl ClipPolygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn area(&self) -> f64 {
        polygon_area(&self.points).abs()
    }
}

impl From<Region> for ClipPolygon {
    fn from(region: Region) -> Self {
        Self::new(region.points())
    }
}

/// Preset clip regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Region {
    #[default]
    RectangleHorizontal,
    RectangleVertical,
    Square,
    Hexagon,
    Octagon,
    Circle,
}

impl Region {
    pub fn points(self) -> Vec<Point> {
        match self {
            Region::RectangleHorizontal => {
                vec![(0.0, 0.0), (0.0, 500.0), (1000.0, 500.0), (1000.0, 0.0)]
            }
            Region::RectangleVertical => {
                vec![(0.0, 0.0), (0.0, 1000.0), (500.0, 1000.0), (500.0, 0.0)]
            }
            Region::Square => vec![(0.0, 0.0), (0.0, 1000.0), (1000.0, 1000.0), (1000.0, 0.0)],
            Region::Hexagon => regular_polygon(6, 500.0),
            Region::Octagon => regular_polygon(8, 500.0),
            Region::Circle => regular_polygon(100, 500.0),
        }
    }
}

pub fn regular_polygon(sides: usize, radius: f64) -> Vec<Point> {
    let dt = std::f64::consts::TAU / sides.max(3) as f64;
    (0..sides.max(3))
        .map(|i| {
            let t = i as f64 * dt;
            (radius * t.cos(), radius * t.sin())
        })
        .collect()
}

/// Shoelace area; positive when the vertices run clockwise on a y-down canvas.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        sum += a.0 * b.1 - b.0 * a.1;
    }
    sum / 2.0
}

/// Area centroid, falling back to the vertex mean for degenerate polygons.
///
/// Works relative to the first vertex so that small polygons far from the origin
/// keep their precision.
pub fn polygon_centroid(points: &[Point]) -> Point {
    let Some(&anchor) = points.first() else {
        return (0.0, 0.0);
    };
    let local: Vec<Point> = points
        .iter()
        .map(|p| (p.0 - anchor.0, p.1 - anchor.1))
        .collect();
    let area = polygon_area(&local);
    if area.abs() <= AREA_EPS * extent(&local).powi(2).max(1.0) {
        return vertex_mean(points);
    }
    let mut cx = 0.0;
    let mut cy = 0.0;
    for (i, a) in local.iter().enumerate() {
        let b = local[(i + 1) % local.len()];
        let cross = a.0 * b.1 - b.0 * a.1;
        cx += (a.0 + b.0) * cross;
        cy += (a.1 + b.1) * cross;
    }
    let k = 1.0 / (6.0 * area);
    (anchor.0 + cx * k, anchor.1 + cy * k)
}

/// Larger side of the bounding box, zero for an empty set.
pub fn extent(points: &[Point]) -> f64 {
    bounding_box(points)
        .map(|(min, max)| (max.0 - min.0).max(max.1 - min.1))
        .unwrap_or(0.0)
}

pub fn vertex_mean(points: &[Point]) -> Point {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.0, sy + p.1));
    (sx / n, sy / n)
}

pub fn bounding_box(points: &[Point]) -> Option<(Point, Point)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in points.iter().skip(1) {
        min.0 = min.0.min(p.0);
        min.1 = min.1.min(p.1);
        max.0 = max.0.max(p.0);
        max.1 = max.1.max(p.1);
    }
    Some((min, max))
}

/// Cross product of (a - o) and (b - o).
#[inline]
pub fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (b.0 - o.0) * (a.1 - o.1)
}

pub fn rotate(points: &[Point], radians: f64) -> Vec<Point> {
    let (sin, cos) = radians.sin_cos();
    points
        .iter()
        .map(|&(x, y)| (x * cos - y * sin, x * sin + y * cos))
        .collect()
}

/// Normalizes a convex polygon given in cyclic order (either winding): leftmost
/// (then topmost) vertex first, clockwise on the y-down canvas.
pub fn order_clockwise(points: &[Point]) -> Vec<Point> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let mut start = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let s = points[start];
        if p.0 < s.0 || (p.0 == s.0 && p.1 < s.1) {
            start = i;
        }
    }
    let mut ordered: Vec<Point> = points[start..].iter().chain(&points[..start]).copied().collect();
    if polygon_area(&ordered) < 0.0 {
        ordered[1..].reverse();
    }
    ordered
}

/// Keeps the part of `polygon` where `a * x + b * y <= c`.
pub fn clip_half_plane(polygon: &[Point], a: f64, b: f64, c: f64) -> Vec<Point> {
    if polygon.is_empty() {
        return Vec::new();
    }
    let side = |p: Point| a * p.0 + b * p.1 - c;
    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (i, &cur) in polygon.iter().enumerate() {
        let prev = polygon[(i + polygon.len() - 1) % polygon.len()];
        let d_cur = side(cur);
        let d_prev = side(prev);
        if d_cur <= 0.0 {
            if d_prev > 0.0 {
                out.push(intersect(prev, cur, d_prev, d_cur));
            }
            out.push(cur);
        } else if d_prev <= 0.0 {
            out.push(intersect(prev, cur, d_prev, d_cur));
        }
    }
    out
}

fn intersect(p: Point, q: Point, dp: f64, dq: f64) -> Point {
    let t = dp / (dp - dq);
    (p.0 + (q.0 - p.0) * t, p.1 + (q.1 - p.1) * t)
}

/// Edge half-planes of a convex polygon as `(a, b, c)` with the interior at
/// `a * x + b * y <= c`, independent of the winding direction.
pub fn convex_half_planes(polygon: &[Point]) -> Vec<(f64, f64, f64)> {
    let orientation = polygon_area(polygon).signum();
    if orientation == 0.0 {
        return Vec::new();
    }
    let mut planes = Vec::with_capacity(polygon.len());
    for (i, &p) in polygon.iter().enumerate() {
        let q = polygon[(i + 1) % polygon.len()];
        if p == q {
            continue;
        }
        // Interior lies where cross(p, q, x) has the polygon's orientation sign.
        let a = (q.1 - p.1) * orientation;
        let b = -(q.0 - p.0) * orientation;
        let c = a * p.0 + b * p.1;
        planes.push((a, b, c));
    }
    planes
}

/// Intersection of a polygon with a convex clip polygon.
pub fn clip_convex(subject: &[Point], clip: &[Point]) -> Vec<Point> {
    let mut out = subject.to_vec();
    for (a, b, c) in convex_half_planes(clip) {
        out = clip_half_plane(&out, a, b, c);
        if out.is_empty() {
            break;
        }
    }
    out
}

/// Distance from `p` to the infinite line through `a` and `b`.
pub fn distance_to_line(p: Point, a: Point, b: Point) -> f64 {
    let len = (b.0 - a.0).hypot(b.1 - a.1);
    if len <= AREA_EPS {
        return (p.0 - a.0).hypot(p.1 - a.1);
    }
    cross(a, b, p).abs() / len
}

/// Largest violation of the convex polygon's edge constraints by `p`; zero or
/// negative means inside.
pub fn convex_violation(polygon: &[Point], p: Point) -> f64 {
    convex_half_planes(polygon)
        .into_iter()
        .map(|(a, b, c)| (a * p.0 + b * p.1 - c) / a.hypot(b))
        .fold(f64::NEG_INFINITY, f64::max)
}

pub fn contains_convex(polygon: &[Point], p: Point, tolerance: f64) -> bool {
    convex_violation(polygon, p) <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<Point> {
        vec![(0.0, 0.0), (0.0, size), (size, size), (size, 0.0)]
    }

    #[test]
    fn area_and_centroid_of_square() {
        let sq = square(10.0);
        assert!((polygon_area(&sq).abs() - 100.0).abs() < 1e-9);
        let (cx, cy) = polygon_centroid(&sq);
        assert!((cx - 5.0).abs() < 1e-9 && (cy - 5.0).abs() < 1e-9);
    }

    #[test]
    fn order_clockwise_starts_leftmost_topmost() {
        let counter = vec![(2.0, 6.0), (2.0, 0.0), (0.0, 0.0), (0.0, 6.0)];
        let ordered = order_clockwise(&counter);
        assert_eq!(ordered, vec![(0.0, 0.0), (2.0, 0.0), (2.0, 6.0), (0.0, 6.0)]);
        assert!(polygon_area(&ordered) > 0.0);
        let clockwise = vec![(2.0, 6.0), (0.0, 6.0), (0.0, 0.0), (2.0, 0.0)];
        assert_eq!(order_clockwise(&clockwise), ordered);
    }

    #[test]
    fn order_clockwise_keeps_nearly_collinear_vertices_in_sequence() {
        // The first three vertices are collinear up to rounding.
        let pts = vec![(-1.194, 5.0), (3.806, 2.0), (8.806, -1.0 + 1e-12), (11.806, -1.0), (11.806, 9.0)];
        assert!(polygon_area(&pts) > 0.0);
        assert_eq!(order_clockwise(&pts), pts);
    }

    #[test]
    fn centroid_of_tiny_square_far_from_origin() {
        let side = 3e-5;
        let sq = vec![(10.0, 290.0), (10.0 + side, 290.0), (10.0 + side, 290.0 + side), (10.0, 290.0 + side)];
        let (cx, cy) = polygon_centroid(&sq);
        assert!((cx - (10.0 + side / 2.0)).abs() < 1e-9, "cx {cx}");
        assert!((cy - (290.0 + side / 2.0)).abs() < 1e-9, "cy {cy}");
        assert!(contains_convex(&sq, (cx, cy), 0.0));
    }

    #[test]
    fn clip_square_by_half_plane() {
        let clipped = clip_half_plane(&square(10.0), 1.0, 0.0, 4.0);
        assert!((polygon_area(&clipped).abs() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn clip_convex_is_winding_independent() {
        let a = square(10.0);
        let mut b: Vec<Point> = square(10.0).iter().map(|p| (p.0 + 5.0, p.1 + 5.0)).collect();
        let overlap = clip_convex(&a, &b);
        assert!((polygon_area(&overlap).abs() - 25.0).abs() < 1e-9);
        b.reverse();
        let overlap = clip_convex(&a, &b);
        assert!((polygon_area(&overlap).abs() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn containment_with_tolerance() {
        let sq = square(10.0);
        assert!(contains_convex(&sq, (5.0, 5.0), 0.0));
        assert!(contains_convex(&sq, (10.0, 5.0), 1e-9));
        assert!(!contains_convex(&sq, (10.1, 5.0), 1e-3));
    }

    #[test]
    fn preset_regions_are_convex_and_sized() {
        assert!((ClipPolygon::from(Region::Square).area() - 1_000_000.0).abs() < 1e-6);
        let circle = ClipPolygon::from(Region::Circle);
        assert_eq!(circle.points.len(), 100);
        assert!(circle.area() < std::f64::consts::PI * 500.0 * 500.0);
    }

    #[test]
    fn distance_to_edge_line() {
        assert!((distance_to_line((5.0, 5.0), (0.0, 0.0), (10.0, 0.0)) - 5.0).abs() < 1e-12);
    }
}
