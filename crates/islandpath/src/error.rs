//! Error types for layer planning.

use thiserror::Error;

/// Errors that can occur while planning a layer.
///
/// Geometry problems never show up here: bad contours are repaired or
/// dropped and reported through [`Diagnostics`](crate::Diagnostics).
#[derive(Error, Debug)]
pub enum PlanError {
    /// Invalid planning configuration.
    #[error("invalid settings: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for planning operations.
pub type Result<T> = std::result::Result<T, PlanError>;
