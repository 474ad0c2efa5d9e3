//! Parallel line infill generation.

use geo::{
    BooleanOps, BoundingRect, Centroid, Coord, LineString, MultiLineString, MultiPolygon,
};
use tracing::debug;

use crate::config::PlanConfig;
use crate::diagnostics::{DropReason, RepairOutcome};
use crate::geom::{
    is_valid_polygon, repair_polygon, to_point2, Point2, Segment, Vec2, LENGTH_EPSILON,
};
use crate::island::Island;

/// Lines added on each side of the family beyond the bounding diagonal.
const EXTRA_LINES: usize = 3;

/// Settings for infill generation.
#[derive(Debug, Clone, Copy)]
pub struct InfillSettings {
    /// Distance between neighbouring lines (model units).
    pub spacing: f64,
    /// Line direction (degrees, counter-clockwise from +X).
    pub angle_deg: f64,
}

impl Default for InfillSettings {
    fn default() -> Self {
        Self {
            spacing: 1.0,
            angle_deg: 0.0,
        }
    }
}

impl From<&PlanConfig> for InfillSettings {
    fn from(config: &PlanConfig) -> Self {
        Self {
            spacing: config.spacing,
            angle_deg: config.angle_deg,
        }
    }
}

/// Result of infill generation.
#[derive(Debug, Clone)]
pub struct InfillResult {
    /// Line segments confined to material, in generation order.
    pub segments: Vec<Segment>,
    /// What had to be done to the island polygon first.
    pub repair: RepairOutcome,
}

impl InfillResult {
    fn empty(repair: RepairOutcome) -> Self {
        Self {
            segments: Vec::new(),
            repair,
        }
    }

    /// Total extrusion length.
    pub fn length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }
}

/// Fill an island with parallel lines.
///
/// Lines sit at half-spacing offsets either side of the polygon centroid,
/// so a region whose extent is a whole multiple of `spacing` gets lines
/// centred in each strip. A line crossing a hole or a concavity yields one
/// segment per piece of material it crosses.
pub fn generate_infill(island: &Island, settings: &InfillSettings) -> InfillResult {
    if island.outer.len() < 3 {
        return InfillResult::empty(RepairOutcome::Dropped(DropReason::TooFewPoints));
    }
    if settings.spacing <= 0.0 || !settings.spacing.is_finite() {
        return InfillResult::empty(RepairOutcome::Unchanged);
    }

    let polygon = island.to_polygon();
    let (region, repair) = if is_valid_polygon(&polygon) {
        (MultiPolygon::new(vec![polygon]), RepairOutcome::Unchanged)
    } else {
        let pieces = repair_polygon(&polygon);
        if pieces.is_empty() {
            debug!("island polygon empty after repair, no infill");
            return InfillResult::empty(RepairOutcome::Dropped(DropReason::EmptyAfterRepair));
        }
        let repair = RepairOutcome::Repaired {
            pieces: pieces.len(),
        };
        (MultiPolygon::new(pieces), repair)
    };

    let (Some(bounds), Some(centroid)) = (region.bounding_rect(), region.centroid()) else {
        return InfillResult::empty(repair);
    };
    let diagonal = bounds.width().hypot(bounds.height());
    if diagonal <= LENGTH_EPSILON {
        return InfillResult::empty(repair);
    }

    let angle = settings.angle_deg.to_radians();
    let dir = Vec2::new(angle.cos(), angle.sin());
    let normal = Vec2::new(-dir.y, dir.x);
    let center = Point2::new(centroid.x(), centroid.y());

    let half_count = (diagonal / settings.spacing).floor() as i64 + EXTRA_LINES as i64;
    let mut segments = Vec::new();

    for i in -half_count..half_count {
        let offset = (i as f64 + 0.5) * settings.spacing;
        // Rotating (±D, offset) about the origin then translating by the
        // centroid is the same as stepping along the rotated normal.
        let origin = center + normal * offset;
        let a = origin - dir * diagonal;
        let b = origin + dir * diagonal;

        let line = MultiLineString::new(vec![LineString::from(vec![
            Coord { x: a.x, y: a.y },
            Coord { x: b.x, y: b.y },
        ])]);
        let clipped = region.clip(&line, false);

        let mut pieces: Vec<Segment> = clipped
            .0
            .iter()
            .filter_map(|piece| {
                let first = to_point2(*piece.0.first()?);
                let last = to_point2(*piece.0.last()?);
                // Orient every piece along the line direction.
                let seg = if (last - first).dot(&dir) >= 0.0 {
                    Segment::new(first, last)
                } else {
                    Segment::new(last, first)
                };
                (seg.length() > LENGTH_EPSILON).then_some(seg)
            })
            .collect();
        pieces.sort_by(|p, q| (p.start - a).dot(&dir).total_cmp(&(q.start - a).dot(&dir)));
        segments.extend(pieces);
    }

    debug!(
        segments = segments.len(),
        spacing = settings.spacing,
        angle = settings.angle_deg,
        "infill generated"
    );

    InfillResult { segments, repair }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Contains, Intersects, Point, Polygon};

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + size, y0),
            Point2::new(x0 + size, y0 + size),
            Point2::new(x0, y0 + size),
        ]
    }

    fn point_segment_distance(p: &Point2, a: &Point2, b: &Point2) -> f64 {
        let ab = b - a;
        let t = ((p - a).dot(&ab) / ab.norm_squared()).clamp(0.0, 1.0);
        (p - (a + ab * t)).norm()
    }

    fn inside_or_near(polygon: &Polygon<f64>, p: &Point2, tol: f64) -> bool {
        if polygon.intersects(&Point::new(p.x, p.y)) {
            return true;
        }
        std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .flat_map(|ring| ring.lines())
            .any(|l| {
                let a = to_point2(l.start);
                let b = to_point2(l.end);
                point_segment_distance(p, &a, &b) < tol
            })
    }

    fn in_hole(island: &Island, p: &Point2) -> bool {
        island
            .hole_polygons()
            .iter()
            .any(|h| h.contains(&Point::new(p.x, p.y)))
    }

    #[test]
    fn test_square_with_hole_scenario() {
        let island = Island::new(square(0.0, 0.0, 10.0), vec![square(4.0, 4.0, 2.0)]);
        let settings = InfillSettings {
            spacing: 1.0,
            angle_deg: 0.0,
        };
        let result = generate_infill(&island, &settings);
        assert_eq!(result.repair, RepairOutcome::Unchanged);
        assert_eq!(result.segments.len(), 12);

        for k in 0..10 {
            let y = k as f64 + 0.5;
            let mut on_line: Vec<&Segment> = result
                .segments
                .iter()
                .filter(|s| (s.start.y - y).abs() < 1e-6)
                .collect();
            on_line.sort_by(|a, b| a.start.x.total_cmp(&b.start.x));

            for seg in &on_line {
                assert!((seg.end.y - y).abs() < 1e-6, "segment not horizontal");
            }

            if k == 4 || k == 5 {
                assert_eq!(on_line.len(), 2, "line y={y} should split around the hole");
                assert!(on_line[0].start.x.abs() < 1e-6);
                assert!((on_line[0].end.x - 4.0).abs() < 1e-6);
                assert!((on_line[1].start.x - 6.0).abs() < 1e-6);
                assert!((on_line[1].end.x - 10.0).abs() < 1e-6);
            } else {
                assert_eq!(on_line.len(), 1, "line y={y} should be a single segment");
                let seg = on_line[0];
                assert!(seg.start.x.min(seg.end.x).abs() < 1e-6);
                assert!((seg.start.x.max(seg.end.x) - 10.0).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_endpoints_stay_in_material() {
        let island = Island::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(20.0, 0.0),
                Point2::new(20.0, 20.0),
                Point2::new(10.0, 8.0),
                Point2::new(0.0, 20.0),
            ],
            vec![square(3.0, 2.0, 3.0), square(14.0, 3.0, 2.5)],
        );
        let polygon = island.to_polygon();
        let result = generate_infill(
            &island,
            &InfillSettings {
                spacing: 0.7,
                angle_deg: 37.0,
            },
        );
        assert!(!result.segments.is_empty());
        for seg in &result.segments {
            assert!(inside_or_near(&polygon, &seg.start, 1e-6));
            assert!(inside_or_near(&polygon, &seg.end, 1e-6));
            assert!(inside_or_near(&polygon, &seg.midpoint(), 1e-6));
            assert!(!in_hole(&island, &seg.midpoint()));
        }
    }

    #[test]
    fn test_angled_lines_are_parallel() {
        let island = Island::new(square(0.0, 0.0, 10.0), Vec::new());
        let result = generate_infill(
            &island,
            &InfillSettings {
                spacing: 1.0,
                angle_deg: 45.0,
            },
        );
        assert!(!result.segments.is_empty());
        let dir = Vec2::new(45f64.to_radians().cos(), 45f64.to_radians().sin());
        for seg in &result.segments {
            let v = seg.end - seg.start;
            let cross = v.x * dir.y - v.y * dir.x;
            assert!(cross.abs() < 1e-6 * v.norm().max(1.0));
            assert!(v.dot(&dir) > 0.0);
        }
        // A diagonal fill of a square covers roughly area / spacing.
        let total: f64 = result.length();
        assert!((total - 100.0).abs() < 10.0);
    }

    #[test]
    fn test_degenerate_island_is_empty() {
        let island = Island::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)], Vec::new());
        let result = generate_infill(&island, &InfillSettings::default());
        assert!(result.segments.is_empty());

        let flat = Island::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(2.0, 0.0),
            ],
            Vec::new(),
        );
        let result = generate_infill(&flat, &InfillSettings::default());
        assert!(result.segments.is_empty());
        assert_eq!(
            result.repair,
            RepairOutcome::Dropped(DropReason::EmptyAfterRepair)
        );
    }

    #[test]
    fn test_invalid_island_is_repaired() {
        let bowtie = Island::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(8.0, 8.0),
                Point2::new(8.0, 0.0),
                Point2::new(0.0, 8.0),
            ],
            Vec::new(),
        );
        let result = generate_infill(&bowtie, &InfillSettings::default());
        assert_eq!(result.repair, RepairOutcome::Repaired { pieces: 2 });
        assert!(!result.segments.is_empty());
    }
}
