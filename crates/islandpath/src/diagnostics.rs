//! Repair and travel diagnostics.
//!
//! The pipeline never fails on bad geometry. These records say what it did
//! instead, so a caller can tell a clean layer from one that was patched up.

use serde::{Deserialize, Serialize};

use crate::geom::Point2;

/// Stage that produced a repair record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStage {
    /// A raw input contour.
    Contour,
    /// An outer boundary assembled with its holes.
    Region,
    /// The filled polygon of an island before infill.
    Infill,
}

/// Why an element was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Fewer than three vertices.
    TooFewPoints,
    /// Area below the configured threshold.
    BelowAreaThreshold,
    /// Repair left nothing usable.
    EmptyAfterRepair,
}

/// What happened to one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairOutcome {
    /// Valid as given.
    Unchanged,
    /// Invalid, repaired into this many pieces.
    Repaired {
        /// Number of valid pieces produced.
        pieces: usize,
    },
    /// Discarded.
    Dropped(DropReason),
    /// Region could not be made valid with its holes; kept as bare outer.
    HolesDiscarded {
        /// Number of holes removed.
        count: usize,
    },
}

impl RepairOutcome {
    /// Did this element need any intervention?
    pub fn is_clean(&self) -> bool {
        matches!(self, RepairOutcome::Unchanged)
    }
}

/// One repair event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairRecord {
    /// Stage that reported it.
    pub stage: RepairStage,
    /// Index of the element within that stage's input.
    pub index: usize,
    /// What happened.
    pub outcome: RepairOutcome,
}

/// An inter-island travel that passes through an island interior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterIslandCrossing {
    /// Travel origin.
    pub from: Point2,
    /// Travel destination.
    pub to: Point2,
    /// Islands whose interior the move crosses.
    pub crossed_islands: Vec<usize>,
}

/// Everything noteworthy that happened while planning one layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Repair events for contours, regions and infill polygons.
    pub repairs: Vec<RepairRecord>,
    /// Inter-island moves through material (only when the check is enabled).
    pub inter_island_crossings: Vec<InterIslandCrossing>,
}

impl Diagnostics {
    /// Create empty diagnostics.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, stage: RepairStage, index: usize, outcome: RepairOutcome) {
        self.repairs.push(RepairRecord {
            stage,
            index,
            outcome,
        });
    }

    /// Records that are not [`RepairOutcome::Unchanged`].
    pub fn interventions(&self) -> impl Iterator<Item = &RepairRecord> {
        self.repairs.iter().filter(|r| !r.outcome.is_clean())
    }

    /// Number of records matching an outcome predicate.
    pub fn count(&self, predicate: impl Fn(&RepairOutcome) -> bool) -> usize {
        self.repairs.iter().filter(|r| predicate(&r.outcome)).count()
    }
}
