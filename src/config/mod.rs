//! Configuration module for breakeven
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`BREAKEVEN_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use breakeven::config::AppConfig;
//!
//! let config = AppConfig::default();
//! assert_eq!(config.currency.exchange_rate, 150.0);
//!
//! let toml = r#"
//! [currency]
//! exchange_rate = 148.0
//! "#;
//! let config: AppConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.currency.exchange_rate, 148.0);
//! ```

pub mod currency;
pub mod error;
pub mod logging;
pub mod pricing;
pub mod scenario;

pub use currency::CurrencyConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use pricing::PricingConfig;
pub use scenario::ScenarioConfig;

use crate::compare::{ComparisonRequest, SearchDomain};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Unified configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub pricing: PricingConfig,
    pub currency: CurrencyConfig,
    /// Break-even search domain and tolerance
    pub search: SearchDomain,
    /// Default comparison scenario
    pub scenario: ScenarioConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports BREAKEVEN_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("BREAKEVEN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("BREAKEVEN_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(path) = std::env::var("BREAKEVEN_CATALOG") {
            if !path.is_empty() {
                self.pricing.catalog_path = Some(PathBuf::from(path));
            }
        }

        if let Ok(rate) = std::env::var("BREAKEVEN_EXCHANGE_RATE") {
            if let Ok(r) = rate.parse() {
                self.currency.exchange_rate = r;
            }
        }
        if let Ok(currency) = std::env::var("BREAKEVEN_CURRENCY") {
            if let Ok(c) = currency.parse() {
                self.currency.report = c;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.currency
            .normalization()
            .validate()
            .map_err(|e| ConfigError::Validation {
                field: "currency.exchange_rate".to_string(),
                message: e.to_string(),
            })?;

        self.search
            .validate()
            .map_err(|e| ConfigError::from_cost("search", e))?;

        let scenario = &self.scenario;
        scenario
            .workload
            .validate()
            .map_err(|e| ConfigError::from_cost("scenario.workload", e))?;
        scenario
            .sweep
            .validate()
            .map_err(|e| ConfigError::from_cost("scenario", e))?;
        for (i, vm) in scenario.vms.iter().enumerate() {
            vm.validate()
                .map_err(|e| ConfigError::from_cost(&format!("scenario.vms[{}]", i), e))?;
        }

        Ok(())
    }

    /// Comparison request for the configured scenario
    pub fn comparison_request(&self) -> ComparisonRequest {
        self.scenario
            .to_request(self.currency.normalization(), self.search)
    }
}
