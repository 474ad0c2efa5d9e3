//! Planning parameters.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// Strategy used to pick the next element of a greedy tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingStrategy {
    /// Nearest endpoint to the current tail, segments may be reversed.
    #[default]
    NearestEndpoint,
    /// Keep the sweep order, only flip segments toward the tail.
    Sweep,
}

/// Parameters threaded through every planning stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Infill line pitch (model units).
    pub spacing: f64,
    /// Fill direction (degrees, counter-clockwise from +X).
    pub angle_deg: f64,
    /// Minimum contour area kept by the topology builder.
    pub area_threshold: f64,
    /// Segment ordering strategy inside an island.
    pub ordering: OrderingStrategy,
    /// Report inter-island travel moves that cross solid material.
    pub check_inter_island_travel: bool,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            spacing: 1.0,
            angle_deg: 0.0,
            area_threshold: 0.1,
            ordering: OrderingStrategy::NearestEndpoint,
            check_inter_island_travel: false,
        }
    }
}

impl PlanConfig {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(PlanError::InvalidConfig(
                "spacing must be a positive number".into(),
            ));
        }
        if !self.angle_deg.is_finite() {
            return Err(PlanError::InvalidConfig("angle_deg must be finite".into()));
        }
        if !self.area_threshold.is_finite() || self.area_threshold < 0.0 {
            return Err(PlanError::InvalidConfig(
                "area_threshold must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
