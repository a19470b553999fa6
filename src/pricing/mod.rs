//! Pricing catalog for serverless, VM and egress rates.
//!
//! The catalog is a single immutable value built once at startup and shared
//! (behind an `Arc`) by every calculator. Rates are hand-curated and never
//! inferred: a provider/resource pair that is not in the catalog is an error.
//!
//! ## Sources
//!
//! - [`PricingCatalog::builtin`]: the catalog embedded in the binary
//! - [`PricingCatalog::load`]: a TOML file with the same layout
//! - [`PricingCatalog::from_entries`]: rows assembled in code, mostly for tests
//!
//! ## Example
//!
//! ```rust
//! use breakeven::pricing::{PricingCatalog, Provider, ResourceKind};
//!
//! let catalog = PricingCatalog::builtin().unwrap();
//! let entry = catalog.rate_for(Provider::Aws, ResourceKind::ServerlessRequest).unwrap();
//! assert_eq!(entry.unit_rate, 0.20);
//! ```

pub mod error;
pub mod provider;
mod source;

pub use error::CatalogError;
pub use provider::{Allowance, BillingModel, PricingEntry, Provider, ResourceKind};

use crate::currency::Currency;
use crate::error::CostError;
use chrono::NaiveDate;
use serde::Serialize;
use source::CatalogDocument;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("catalog.toml");

/// Descriptive, non-rate data about a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderInfo {
    pub provider: Provider,
    pub name: String,
    /// Native currency of every rate this provider publishes.
    pub currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serverless_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_service: Option<String>,
}

/// Versioned, read-only table of pricing rows.
#[derive(Debug, Clone)]
pub struct PricingCatalog {
    version: String,
    effective_date: NaiveDate,
    providers: BTreeMap<Provider, ProviderInfo>,
    entries: Vec<PricingEntry>,
    /// (provider, kind) -> row index, for non-instance rows
    by_kind: HashMap<(Provider, ResourceKind), usize>,
    /// (provider, lowercased instance class) -> row index
    by_instance: HashMap<(Provider, String), usize>,
}

impl PricingCatalog {
    /// Catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            version = %catalog.version,
            entries = catalog.entries.len(),
            "Loaded pricing catalog"
        );
        Ok(catalog)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument =
            toml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let (version, effective_date, providers, entries) = doc.into_parts();
        Self::from_entries(version, effective_date, providers, entries)
    }

    /// Build a catalog from rows, validating them.
    ///
    /// Every row's provider must be described in `providers` and share that
    /// provider's currency. A provider bills VMs either hourly or monthly,
    /// never both.
    pub fn from_entries(
        version: impl Into<String>,
        effective_date: NaiveDate,
        providers: Vec<ProviderInfo>,
        entries: Vec<PricingEntry>,
    ) -> Result<Self, CatalogError> {
        let mut provider_map = BTreeMap::new();
        for info in providers {
            let id = info.provider;
            if provider_map.insert(id, info).is_some() {
                return Err(CatalogError::Duplicate(format!("provider '{}'", id)));
            }
        }

        let mut by_kind = HashMap::new();
        let mut by_instance = HashMap::new();
        let mut vm_kinds: HashMap<Provider, ResourceKind> = HashMap::new();

        for (i, entry) in entries.iter().enumerate() {
            let field = format!("{}.{}", entry.provider, entry.kind);

            let info = provider_map.get(&entry.provider).ok_or_else(|| {
                CatalogError::Validation {
                    field: field.clone(),
                    message: "provider is not declared in the catalog".to_string(),
                }
            })?;
            if entry.currency != info.currency {
                return Err(CatalogError::Validation {
                    field,
                    message: format!(
                        "currency {} differs from provider currency {}",
                        entry.currency, info.currency
                    ),
                });
            }
            if !entry.unit_rate.is_finite() || entry.unit_rate < 0.0 {
                return Err(CatalogError::Validation {
                    field,
                    message: format!("rate must be a non-negative number, got {}", entry.unit_rate),
                });
            }
            if let Allowance::Limited(free) = entry.free_allowance {
                if !free.is_finite() || free < 0.0 {
                    return Err(CatalogError::Validation {
                        field,
                        message: format!("free allowance must be non-negative, got {}", free),
                    });
                }
            }

            if entry.kind.is_vm() {
                let class = match &entry.instance_class {
                    Some(c) if !c.trim().is_empty() => c,
                    _ => {
                        return Err(CatalogError::Validation {
                            field,
                            message: "VM rows need an instance class".to_string(),
                        })
                    }
                };
                if let Some(existing) = vm_kinds.insert(entry.provider, entry.kind) {
                    if existing != entry.kind {
                        return Err(CatalogError::Validation {
                            field,
                            message: "provider mixes hourly and monthly VM billing".to_string(),
                        });
                    }
                }
                if by_instance
                    .insert((entry.provider, class.to_lowercase()), i)
                    .is_some()
                {
                    return Err(CatalogError::Duplicate(format!(
                        "instance '{}' for provider '{}'",
                        class, entry.provider
                    )));
                }
            } else if by_kind.insert((entry.provider, entry.kind), i).is_some() {
                return Err(CatalogError::Duplicate(field));
            }
        }

        Ok(Self {
            version: version.into(),
            effective_date,
            providers: provider_map,
            entries,
            by_kind,
            by_instance,
        })
    }

    /// Look up the row for a provider's non-instance resource.
    ///
    /// VM rates are per instance class; use [`Self::instance_rate`] for those.
    pub fn rate_for(
        &self,
        provider: Provider,
        kind: ResourceKind,
    ) -> Result<&PricingEntry, CostError> {
        self.by_kind
            .get(&(provider, kind))
            .map(|&i| &self.entries[i])
            .ok_or_else(|| CostError::UnknownProviderOrResource {
                provider: provider.to_string(),
                resource: kind.to_string(),
            })
    }

    /// Look up a VM row by instance class (case-insensitive).
    pub fn instance_rate(
        &self,
        provider: Provider,
        instance_class: &str,
    ) -> Result<&PricingEntry, CostError> {
        if self.billing_model(provider).is_none() {
            return Err(CostError::UnknownProviderOrResource {
                provider: provider.to_string(),
                resource: "vm".to_string(),
            });
        }
        self.by_instance
            .get(&(provider, instance_class.to_lowercase()))
            .map(|&i| &self.entries[i])
            .ok_or_else(|| CostError::UnknownInstanceType {
                provider: provider.to_string(),
                instance_class: instance_class.to_string(),
            })
    }

    /// VM billing model, derived from the provider's instance rows.
    pub fn billing_model(&self, provider: Provider) -> Option<BillingModel> {
        self.entries
            .iter()
            .find(|e| e.provider == provider && e.kind.is_vm())
            .map(|e| match e.kind {
                ResourceKind::VmMonthly => BillingModel::FlatMonthly,
                _ => BillingModel::Hourly,
            })
    }

    pub fn currency(&self, provider: Provider) -> Option<Currency> {
        self.providers.get(&provider).map(|p| p.currency)
    }

    pub fn provider(&self, provider: Provider) -> Option<&ProviderInfo> {
        self.providers.get(&provider)
    }

    pub fn providers(&self) -> impl Iterator<Item = &ProviderInfo> {
        self.providers.values()
    }

    /// Providers that publish both serverless request and compute rates.
    pub fn serverless_providers(&self) -> Vec<Provider> {
        self.providers
            .keys()
            .copied()
            .filter(|p| {
                self.by_kind.contains_key(&(*p, ResourceKind::ServerlessRequest))
                    && self.by_kind.contains_key(&(*p, ResourceKind::ServerlessCompute))
            })
            .collect()
    }

    /// VM rows for a provider, in catalog order.
    pub fn instances(&self, provider: Provider) -> Vec<&PricingEntry> {
        self.entries
            .iter()
            .filter(|e| e.provider == provider && e.kind.is_vm())
            .collect()
    }

    pub fn entries(&self) -> &[PricingEntry] {
        &self.entries
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }
}
