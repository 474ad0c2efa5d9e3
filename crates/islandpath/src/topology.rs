//! Contour repair and outer/hole topology reconstruction.
//!
//! Raw slice contours arrive unordered, possibly open, self-intersecting or
//! tiny. This module filters and repairs them, then rebuilds a forest of
//! regions where every region owns only its *direct* holes. A contour nested
//! inside a hole is not a hole of the outer; it becomes an outer of its own.

use geo::{Area, BoundingRect, Contains, Polygon, Rect};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagnostics::{Diagnostics, DropReason, RepairOutcome, RepairStage};
use crate::geom::{is_valid_polygon, repair_polygon, ring_from_points, Point2};
use crate::island::{extract_islands, GeometrySource, Island};

/// A raw contour: an ordered, nominally closed loop of points.
pub type Contour = Vec<Point2>;

/// A planar slice result handed over by the mesh collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "contours", rename_all = "snake_case")]
pub enum CrossSection {
    /// Closed polygon boundaries, possibly nested.
    Closed(Vec<Contour>),
    /// Discrete point loops that may be open or self-intersecting.
    Discrete(Vec<Contour>),
}

impl CrossSection {
    /// The contours regardless of their source.
    pub fn contours(&self) -> &[Contour] {
        match self {
            CrossSection::Closed(c) | CrossSection::Discrete(c) => c,
        }
    }

    /// Does the slice carry any contour at all?
    pub fn is_empty(&self) -> bool {
        self.contours().is_empty()
    }
}

/// A repaired contour waiting for topology assignment.
struct Candidate {
    polygon: Polygon<f64>,
    area: f64,
    bounds: Option<Rect<f64>>,
}

impl Candidate {
    fn new(polygon: Polygon<f64>) -> Self {
        let area = polygon.unsigned_area();
        let bounds = polygon.bounding_rect();
        Self {
            polygon,
            area,
            bounds,
        }
    }

    fn contains(&self, other: &Candidate) -> bool {
        match (self.bounds, other.bounds) {
            (Some(a), Some(b)) => a.contains(&b) && self.polygon.contains(&other.polygon),
            _ => false,
        }
    }
}

/// Rebuild islands from a cross-section.
///
/// Contours with fewer than three points or an area below `area_threshold`
/// are discarded; invalid contours are repaired. Never fails: bad input only
/// yields fewer islands.
pub fn classify_topology(section: &CrossSection, area_threshold: f64) -> Vec<Island> {
    classify_topology_with_report(section, area_threshold).0
}

/// Same as [`classify_topology`], also returning what was repaired or dropped.
pub fn classify_topology_with_report(
    section: &CrossSection,
    area_threshold: f64,
) -> (Vec<Island>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();

    let candidates = build_candidates(section.contours(), area_threshold, &mut diagnostics);
    if candidates.is_empty() {
        debug!(contours = section.contours().len(), "no usable contours");
        return (Vec::new(), diagnostics);
    }

    let regions = assemble_regions(candidates, &mut diagnostics);
    let islands = extract_islands(&GeometrySource::Regions(regions));

    debug!(
        contours = section.contours().len(),
        islands = islands.len(),
        interventions = diagnostics.interventions().count(),
        "topology classified"
    );

    (islands, diagnostics)
}

/// Filter, validate and repair raw contours into candidate polygons.
fn build_candidates(
    contours: &[Contour],
    area_threshold: f64,
    diagnostics: &mut Diagnostics,
) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(contours.len());

    for (index, contour) in contours.iter().enumerate() {
        let polygon = Polygon::new(ring_from_points(contour), Vec::new());

        // A closed ring with three distinct vertices stores four coordinates.
        if contour.len() < 3 || polygon.exterior().0.len() < 4 {
            diagnostics.record(
                RepairStage::Contour,
                index,
                RepairOutcome::Dropped(DropReason::TooFewPoints),
            );
            continue;
        }

        if polygon.unsigned_area() < area_threshold {
            diagnostics.record(
                RepairStage::Contour,
                index,
                RepairOutcome::Dropped(DropReason::BelowAreaThreshold),
            );
            continue;
        }

        if is_valid_polygon(&polygon) {
            diagnostics.record(RepairStage::Contour, index, RepairOutcome::Unchanged);
            candidates.push(Candidate::new(polygon));
            continue;
        }

        let pieces = repair_polygon(&polygon);
        if pieces.is_empty() {
            debug!(index, "contour dropped after repair");
            diagnostics.record(
                RepairStage::Contour,
                index,
                RepairOutcome::Dropped(DropReason::EmptyAfterRepair),
            );
            continue;
        }

        debug!(index, pieces = pieces.len(), "contour repaired");
        diagnostics.record(
            RepairStage::Contour,
            index,
            RepairOutcome::Repaired {
                pieces: pieces.len(),
            },
        );
        candidates.extend(pieces.into_iter().map(Candidate::new));
    }

    candidates
}

/// Assign direct holes to outers, largest candidate first.
fn assemble_regions(
    mut candidates: Vec<Candidate>,
    diagnostics: &mut Diagnostics,
) -> Vec<Polygon<f64>> {
    candidates.sort_by(|a, b| b.area.total_cmp(&a.area));

    let n = candidates.len();
    let mut claimed = vec![false; n];
    let mut regions = Vec::new();

    for i in 0..n {
        if claimed[i] {
            continue;
        }
        claimed[i] = true;

        let outer = &candidates[i];
        let mut holes: Vec<usize> = Vec::new();

        for j in 0..n {
            if claimed[j] {
                continue;
            }
            let inner = &candidates[j];
            if !outer.contains(inner) {
                continue;
            }
            // Nested inside an accepted hole: a hole of a hole, not ours.
            if holes.iter().any(|&h| candidates[h].contains(inner)) {
                continue;
            }
            holes.push(j);
            claimed[j] = true;
        }

        let hole_polygons: Vec<&Polygon<f64>> =
            holes.iter().map(|&h| &candidates[h].polygon).collect();
        let index = regions.len();
        regions.extend(build_region(&outer.polygon, &hole_polygons, index, diagnostics));
    }

    regions
}

/// Combine an outer with its holes, falling back to the bare outer when the
/// combination cannot be made valid.
fn build_region(
    outer: &Polygon<f64>,
    holes: &[&Polygon<f64>],
    index: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<Polygon<f64>> {
    if holes.is_empty() {
        diagnostics.record(RepairStage::Region, index, RepairOutcome::Unchanged);
        return vec![outer.clone()];
    }

    let region = Polygon::new(
        outer.exterior().clone(),
        holes.iter().map(|h| h.exterior().clone()).collect(),
    );
    if is_valid_polygon(&region) {
        diagnostics.record(RepairStage::Region, index, RepairOutcome::Unchanged);
        return vec![region];
    }

    let pieces = repair_polygon(&region);
    if pieces.is_empty() {
        debug!(index, holes = holes.len(), "region kept without holes");
        diagnostics.record(
            RepairStage::Region,
            index,
            RepairOutcome::HolesDiscarded { count: holes.len() },
        );
        return vec![outer.clone()];
    }

    debug!(index, pieces = pieces.len(), "region repaired");
    diagnostics.record(
        RepairStage::Region,
        index,
        RepairOutcome::Repaired {
            pieces: pieces.len(),
        },
    );
    pieces
}
