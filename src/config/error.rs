//! Configuration error types

use crate::error::CostError;
use crate::pricing::CatalogError;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ConfigError {
    /// Re-home a calculator validation error under a config section.
    pub(crate) fn from_cost(section: &str, err: CostError) -> Self {
        match err {
            CostError::InvalidConfiguration { field, message } => ConfigError::Validation {
                field: format!("{}.{}", section, field),
                message,
            },
            other => ConfigError::Validation {
                field: section.to_string(),
                message: other.to_string(),
            },
        }
    }
}
