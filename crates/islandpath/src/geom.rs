//! Toolpath primitives and the polygon helpers shared by the pipeline stages.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{
    Area, BooleanOps, BoundingRect, Contains, Coord, Intersects, Line, LineString, MultiPolygon,
    Polygon,
};
use serde::{Deserialize, Serialize};

/// A point in the slice plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in the slice plane.
pub type Vec2 = nalgebra::Vector2<f64>;

/// Areas below this are treated as degenerate.
pub(crate) const AREA_EPSILON: f64 = 1e-12;

/// Lengths below this are treated as zero.
pub(crate) const LENGTH_EPSILON: f64 = 1e-9;

/// A directed extrusion line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Where deposition starts.
    pub start: Point2,
    /// Where deposition ends.
    pub end: Point2,
}

impl Segment {
    /// Create a new segment.
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Midpoint between the endpoints.
    pub fn midpoint(&self) -> Point2 {
        nalgebra::center(&self.start, &self.end)
    }

    /// The same line walked the other way.
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }

    /// Convert to a `geo` line.
    pub fn to_line(&self) -> Line<f64> {
        Line::new(to_coord(&self.start), to_coord(&self.end))
    }
}

/// How a travel move was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelKind {
    /// Straight move that stays inside material and clear of holes.
    Direct,
    /// Detour through the nearest points of the outer boundary.
    Rerouted,
    /// Straight move between two islands.
    InterIsland,
}

/// A non-depositing move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Travel {
    /// How the move was produced.
    pub kind: TravelKind,
    /// Polyline vertices, first to last.
    pub points: Vec<Point2>,
}

impl Travel {
    /// Straight move inside an island.
    pub fn direct(from: Point2, to: Point2) -> Self {
        Self {
            kind: TravelKind::Direct,
            points: vec![from, to],
        }
    }

    /// Boundary detour: `from -> via_from -> via_to -> to`.
    pub fn rerouted(from: Point2, via_from: Point2, via_to: Point2, to: Point2) -> Self {
        Self {
            kind: TravelKind::Rerouted,
            points: vec![from, via_from, via_to, to],
        }
    }

    /// Straight move from one island to the next.
    pub fn inter_island(from: Point2, to: Point2) -> Self {
        Self {
            kind: TravelKind::InterIsland,
            points: vec![from, to],
        }
    }

    /// Total polyline length.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    /// First vertex.
    pub fn start(&self) -> Option<&Point2> {
        self.points.first()
    }

    /// Last vertex.
    pub fn end(&self) -> Option<&Point2> {
        self.points.last()
    }
}

pub(crate) fn to_coord(p: &Point2) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

pub(crate) fn to_point2(c: Coord<f64>) -> Point2 {
    Point2::new(c.x, c.y)
}

/// Build a ring, dropping consecutive duplicate vertices.
pub(crate) fn ring_from_points(points: &[Point2]) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = points.iter().map(to_coord).collect();
    coords.dedup_by(|a, b| {
        (a.x - b.x).abs() < LENGTH_EPSILON && (a.y - b.y).abs() < LENGTH_EPSILON
    });
    LineString::from(coords)
}

pub(crate) fn points_from_ring(ring: &LineString<f64>) -> Vec<Point2> {
    ring.coords().map(|c| to_point2(*c)).collect()
}

/// Number of distinct vertices in a closed ring.
fn distinct_vertex_count(ring: &LineString<f64>) -> usize {
    let n = ring.0.len();
    if n > 1 && ring.0[0] == ring.0[n - 1] {
        n - 1
    } else {
        n
    }
}

fn lines_overlap_bounds(a: &Line<f64>, b: &Line<f64>) -> bool {
    a.bounding_rect().intersects(&b.bounding_rect())
}

/// Does a closed ring touch or cross itself anywhere other than at the
/// shared vertex of neighbouring edges?
fn ring_self_intersects(ring: &LineString<f64>) -> bool {
    let lines: Vec<Line<f64>> = ring.lines().collect();
    let m = lines.len();
    for i in 0..m {
        for j in (i + 1)..m {
            if !lines_overlap_bounds(&lines[i], &lines[j]) {
                continue;
            }
            let adjacent = j == i + 1 || (i == 0 && j == m - 1);
            match line_intersection(lines[i], lines[j]) {
                None => {}
                Some(LineIntersection::Collinear { .. }) => return true,
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(LineIntersection::SinglePoint { .. }) => return true,
            }
        }
    }
    false
}

/// Do two rings cross or overlap? Touching at a single point is allowed.
fn rings_cross(a: &LineString<f64>, b: &LineString<f64>) -> bool {
    for la in a.lines() {
        for lb in b.lines() {
            if !lines_overlap_bounds(&la, &lb) {
                continue;
            }
            match line_intersection(la, lb) {
                None => {}
                Some(LineIntersection::SinglePoint { is_proper, .. }) => {
                    if is_proper {
                        return true;
                    }
                }
                Some(LineIntersection::Collinear { .. }) => return true,
            }
        }
    }
    false
}

/// Simple-feature validity: non-degenerate simple rings, holes inside the
/// shell and not crossing each other.
pub(crate) fn is_valid_polygon(polygon: &Polygon<f64>) -> bool {
    let exterior = polygon.exterior();
    if distinct_vertex_count(exterior) < 3 || polygon.unsigned_area() <= AREA_EPSILON {
        return false;
    }
    if ring_self_intersects(exterior) {
        return false;
    }

    let shell = Polygon::new(exterior.clone(), Vec::new());
    let holes = polygon.interiors();
    for (i, hole) in holes.iter().enumerate() {
        if distinct_vertex_count(hole) < 3 || ring_self_intersects(hole) {
            return false;
        }
        if rings_cross(exterior, hole) {
            return false;
        }
        let hole_polygon = Polygon::new(hole.clone(), Vec::new());
        if hole_polygon.unsigned_area() <= AREA_EPSILON || !shell.contains(&hole_polygon) {
            return false;
        }
        for other in &holes[i + 1..] {
            if rings_cross(hole, other) {
                return false;
            }
            let other_polygon = Polygon::new(other.clone(), Vec::new());
            if hole_polygon.contains(&other_polygon) || other_polygon.contains(&hole_polygon) {
                return false;
            }
        }
    }
    true
}

/// Resolve self-intersections with an overlay self-union.
///
/// Returns the valid, non-empty pieces; an empty vector means nothing usable
/// survived.
pub(crate) fn repair_polygon(polygon: &Polygon<f64>) -> Vec<Polygon<f64>> {
    let subject = MultiPolygon::new(vec![polygon.clone()]);
    let repaired = subject.union(&MultiPolygon::new(Vec::new()));
    repaired
        .into_iter()
        .filter(|piece| piece.unsigned_area() > AREA_EPSILON)
        .collect()
}
