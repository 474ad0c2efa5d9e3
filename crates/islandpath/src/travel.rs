//! Travel moves between consecutive segments of one island.

use geo::{Closest, ClosestPoint, Contains, Intersects, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::geom::{to_coord, Point2, Segment, Travel};
use crate::island::Island;

/// One step of a toolpath: an optional extrusion followed by an optional
/// travel to the next step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathElement {
    /// Deposited line.
    pub extrude: Option<Segment>,
    /// Move to the start of the next element.
    pub travel: Option<Travel>,
}

impl PathElement {
    /// An extrusion, optionally followed by a travel.
    pub fn extrude(segment: Segment, travel: Option<Travel>) -> Self {
        Self {
            extrude: Some(segment),
            travel,
        }
    }

    /// A pure travel with nothing deposited.
    pub fn travel_only(travel: Travel) -> Self {
        Self {
            extrude: None,
            travel: Some(travel),
        }
    }
}

/// Connect ordered segments with travel moves.
///
/// The straight move from one segment's end to the next one's start is used
/// when it lies inside the island and touches no hole. Otherwise the move
/// detours via the nearest points on the outer boundary. The last element
/// carries no travel.
pub fn route_travel(island: &Island, ordered: &[Segment]) -> Vec<PathElement> {
    let polygon = island.to_polygon();
    let holes = island.hole_polygons();

    let mut elements = Vec::with_capacity(ordered.len());
    for (i, seg) in ordered.iter().enumerate() {
        let travel = ordered
            .get(i + 1)
            .map(|next| connect(&polygon, &holes, seg.end, next.start));
        elements.push(PathElement::extrude(*seg, travel));
    }
    elements
}

fn connect(polygon: &Polygon<f64>, holes: &[Polygon<f64>], from: Point2, to: Point2) -> Travel {
    if is_safe(polygon, holes, from, to) {
        return Travel::direct(from, to);
    }

    let via_from = nearest_on_outer(polygon, from);
    let via_to = nearest_on_outer(polygon, to);
    Travel::rerouted(from, via_from, via_to, to)
}

fn is_safe(polygon: &Polygon<f64>, holes: &[Polygon<f64>], from: Point2, to: Point2) -> bool {
    let line = Segment::new(from, to).to_line();
    polygon.contains(&line) && !holes.iter().any(|h| h.intersects(&line))
}

fn nearest_on_outer(polygon: &Polygon<f64>, p: Point2) -> Point2 {
    let query = Point::from(to_coord(&p));
    match polygon.exterior().closest_point(&query) {
        Closest::Intersection(q) | Closest::SinglePoint(q) => Point2::new(q.x(), q.y()),
        Closest::Indeterminate => p,
    }
}
