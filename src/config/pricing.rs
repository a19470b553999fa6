//! Pricing catalog source configuration

use super::ConfigError;
use crate::pricing::PricingCatalog;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PricingConfig {
    /// Catalog file replacing the built-in rates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl PricingConfig {
    /// Load the configured catalog, falling back to the built-in one.
    pub fn load_catalog(&self) -> Result<PricingCatalog, ConfigError> {
        let catalog = match &self.catalog_path {
            Some(path) => PricingCatalog::load(path)?,
            None => PricingCatalog::builtin()?,
        };
        Ok(catalog)
    }
}
