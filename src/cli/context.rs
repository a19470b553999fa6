//! Configuration and catalog shared by the calculating commands

use crate::cli::CommonArgs;
use crate::config::AppConfig;
use crate::pricing::PricingCatalog;
use std::sync::Arc;
use tracing::debug;

/// Loaded configuration plus the catalog it points at.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: AppConfig,
    pub catalog: Arc<PricingCatalog>,
}

impl Context {
    /// Load the catalog named by `config`, or the built-in one.
    pub fn from_config(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let catalog = Arc::new(config.pricing.load_catalog()?);
        Ok(Self { config, catalog })
    }
}

/// Resolve configuration: file (if present), then env, then flags.
///
/// A missing file at the default path is not an error; the defaults are used.
pub fn load_config(common: &CommonArgs) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = if common.config.exists() {
        AppConfig::load(Some(common.config.as_path()))?
    } else {
        debug!(path = %common.config.display(), "Config file not found, using defaults");
        AppConfig::default()
    };
    config = config.with_env_overrides();

    if let Some(ref level) = common.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref path) = common.catalog {
        config.pricing.catalog_path = Some(path.clone());
    }

    config.validate()?;
    Ok(config)
}
