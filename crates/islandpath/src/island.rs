//! Normalized island records.
//!
//! An [`Island`] is the shared currency of every stage after topology
//! reconstruction: one outer ring plus its direct holes, stored as plain
//! coordinate sequences.

use geo::{Area, BoundingRect, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use crate::geom::{points_from_ring, ring_from_points, Point2};

/// One solid region of a slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Island {
    /// Outer boundary ring.
    pub outer: Vec<Point2>,
    /// Direct holes of the outer boundary.
    pub holes: Vec<Vec<Point2>>,
}

impl Island {
    /// Create an island from rings.
    pub fn new(outer: Vec<Point2>, holes: Vec<Vec<Point2>>) -> Self {
        Self { outer, holes }
    }

    /// Build from a `geo` polygon, keeping ring order as stored.
    pub fn from_polygon(polygon: &Polygon<f64>) -> Self {
        Self {
            outer: points_from_ring(polygon.exterior()),
            holes: polygon.interiors().iter().map(points_from_ring).collect(),
        }
    }

    /// Filled polygon: outer minus holes.
    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            ring_from_points(&self.outer),
            self.holes.iter().map(|h| ring_from_points(h)).collect(),
        )
    }

    /// Each hole as its own filled polygon.
    pub fn hole_polygons(&self) -> Vec<Polygon<f64>> {
        self.holes
            .iter()
            .map(|h| Polygon::new(ring_from_points(h), Vec::new()))
            .collect()
    }

    /// Is there any outer geometry at all?
    pub fn is_empty(&self) -> bool {
        self.outer.is_empty()
    }

    /// Material area (holes subtracted).
    pub fn area(&self) -> f64 {
        self.to_polygon().unsigned_area()
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> Option<(Point2, Point2)> {
        self.to_polygon()
            .bounding_rect()
            .map(|r| (Point2::new(r.min().x, r.min().y), Point2::new(r.max().x, r.max().y)))
    }
}

/// Geometry accepted by the normalizer.
#[derive(Debug, Clone)]
pub enum GeometrySource {
    /// One filled polygon.
    Polygon(Polygon<f64>),
    /// A multi-polygon (e.g. the output of an overlay union).
    MultiPolygon(MultiPolygon<f64>),
    /// Regions from the topology builder, already flattened.
    Regions(Vec<Polygon<f64>>),
}

/// Flatten any supported geometry into island records, skipping empty
/// polygons.
pub fn extract_islands(geometry: &GeometrySource) -> Vec<Island> {
    let polygons: Vec<&Polygon<f64>> = match geometry {
        GeometrySource::Polygon(p) => vec![p],
        GeometrySource::MultiPolygon(mp) => mp.0.iter().collect(),
        GeometrySource::Regions(regions) => regions.iter().collect(),
    };

    polygons
        .into_iter()
        .map(Island::from_polygon)
        .filter(|island| !island.is_empty())
        .collect()
}
