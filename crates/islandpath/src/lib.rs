#![warn(missing_docs)]

//! Island-aware toolpath planning for planar slices.
//!
//! This crate turns the raw contours of one cross-section into a single
//! ordered toolpath: it rebuilds the outer/hole topology, fills each solid
//! island with parallel lines, orders the lines to keep travel short, and
//! connects everything with moves that stay inside material.
//!
//! # Example
//!
//! ```
//! use islandpath::{plan_layer, CrossSection, PlanConfig, Point2};
//!
//! let square = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(10.0, 0.0),
//!     Point2::new(10.0, 10.0),
//!     Point2::new(0.0, 10.0),
//! ];
//! let section = CrossSection::Closed(vec![square]);
//! let plan = plan_layer(&section, 0.2, &PlanConfig::default())?;
//!
//! assert_eq!(plan.islands.len(), 1);
//! println!("extrude: {:.1}", plan.path.extrude_length());
//! # Ok::<(), islandpath::PlanError>(())
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod geom;
pub mod infill;
pub mod island;
pub mod order;
pub mod select;
pub mod sequence;
pub mod topology;
pub mod travel;

pub use config::{OrderingStrategy, PlanConfig};
pub use diagnostics::{
    Diagnostics, DropReason, InterIslandCrossing, RepairOutcome, RepairRecord, RepairStage,
};
pub use error::{PlanError, Result};
pub use geom::{Point2, Segment, Travel, TravelKind, Vec2};
pub use infill::{generate_infill, InfillResult, InfillSettings};
pub use island::{extract_islands, GeometrySource, Island};
pub use order::{order_segments, order_segments_with};
pub use select::{greedy_tour, selector_for, Choice, NearestEndpoint, NextSelector, SweepOrder};
pub use sequence::{find_inter_island_crossings, sequence_islands, IslandPath, LayerPath};
pub use topology::{classify_topology, classify_topology_with_report, Contour, CrossSection};
pub use travel::{route_travel, PathElement};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One cross-section to plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerInput {
    /// Height of the cutting plane.
    pub z: f64,
    /// Raw contours at that height.
    pub section: CrossSection,
}

/// Everything planned for one layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerPlan {
    /// Height of the cutting plane.
    pub z: f64,
    /// Islands after topology reconstruction.
    pub islands: Vec<Island>,
    /// Ordered, connected toolpath.
    pub path: LayerPath,
    /// Repairs and travel checks.
    pub diagnostics: Diagnostics,
}

/// Plan the toolpath of a single cross-section.
///
/// Only configuration errors are returned. Geometry problems are repaired or
/// dropped and show up in [`LayerPlan::diagnostics`].
pub fn plan_layer(section: &CrossSection, z: f64, config: &PlanConfig) -> Result<LayerPlan> {
    config.validate()?;

    let (islands, mut diagnostics) = classify_topology_with_report(section, config.area_threshold);

    let settings = InfillSettings::from(config);
    let selector = selector_for(config.ordering);

    let routed: Vec<(IslandPath, RepairOutcome)> = islands
        .par_iter()
        .enumerate()
        .map(|(index, island)| {
            let infill = generate_infill(island, &settings);
            let ordered = order_segments_with(&infill.segments, settings.angle_deg, &*selector);
            let elements = route_travel(island, &ordered);
            (IslandPath::new(index, elements), infill.repair)
        })
        .collect();

    let mut paths = Vec::with_capacity(routed.len());
    for (path, repair) in routed {
        diagnostics.record(RepairStage::Infill, path.island_index, repair);
        paths.push(path);
    }

    let path = sequence_islands(&paths, &NearestEndpoint);

    if config.check_inter_island_travel {
        diagnostics.inter_island_crossings = find_inter_island_crossings(&path, &islands);
    }

    debug!(
        z,
        islands = islands.len(),
        extrude_length = path.extrude_length(),
        travel_length = path.travel_length(),
        "layer planned"
    );

    Ok(LayerPlan {
        z,
        islands,
        path,
        diagnostics,
    })
}

/// Plan many layers in parallel; plans come back in input order.
pub fn plan_layers(layers: &[LayerInput], config: &PlanConfig) -> Result<Vec<LayerPlan>> {
    config.validate()?;

    let plans = layers
        .par_iter()
        .map(|layer| plan_layer(&layer.section, layer.z, config))
        .collect::<Result<Vec<_>>>()?;

    info!(layers = plans.len(), "planning complete");
    Ok(plans)
}
