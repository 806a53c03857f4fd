//! Error types for pointcloud.
//!
//! The simulation itself never fails. Errors only surface at the
//! configuration boundary: validating a config and loading a scene file.

use std::fmt;

/// A configuration value that the fields cannot run with.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Value is NaN or infinite.
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
    },
    /// Value must be strictly positive.
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// Value must lie in `[0, 1]`.
    OutOfUnitRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// A random range whose end is below its start.
    EmptyRange {
        /// Name of the offending field.
        field: &'static str,
        /// Range start.
        start: f32,
        /// Range end.
        end: f32,
    },
    /// Stream column whose bottom is not below its top.
    InvertedBounds {
        /// Lower bound.
        bottom: f32,
        /// Upper bound.
        top: f32,
    },
    /// Initial stagger taller than the stream column.
    SpawnSpanTooLarge {
        /// Requested stagger height.
        spawn_span: f32,
        /// Column height, `top - bottom`.
        column: f32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonFinite { field } => write!(f, "`{}` must be a finite number", field),
            ConfigError::NonPositive { field, value } => {
                write!(f, "`{}` must be greater than zero, got {}", field, value)
            }
            ConfigError::OutOfUnitRange { field, value } => {
                write!(f, "`{}` must be within [0, 1], got {}", field, value)
            }
            ConfigError::EmptyRange { field, start, end } => {
                write!(f, "`{}` range {}..{} is empty", field, start, end)
            }
            ConfigError::InvertedBounds { bottom, top } => {
                write!(f, "stream bottom {} must be below top {}", bottom, top)
            }
            ConfigError::SpawnSpanTooLarge { spawn_span, column } => {
                write!(f, "spawn_span {} exceeds the column height {}", spawn_span, column)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur when loading a scene description.
#[derive(Debug)]
pub enum LoadError {
    /// Failed to read the file from disk.
    Io(std::io::Error),
    /// The file is not a valid scene document.
    Parse(serde_json::Error),
    /// The document parsed but holds unusable values.
    Invalid(ConfigError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "Failed to read scene file: {}", e),
            LoadError::Parse(e) => write!(f, "Failed to parse scene: {}", e),
            LoadError::Invalid(e) => write!(f, "Invalid scene configuration: {}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Parse(e) => Some(e),
            LoadError::Invalid(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Parse(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Invalid(e)
    }
}
