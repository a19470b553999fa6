//! Catalog loading errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a pricing catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error reading catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    #[error("Invalid catalog value for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Duplicate catalog entry: {0}")]
    Duplicate(String),
}
