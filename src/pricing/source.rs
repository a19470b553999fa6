//! On-disk catalog document.
//!
//! The TOML layout groups rates per provider, which is how they are curated
//! from vendor pricing pages. [`CatalogDocument::into_parts`] flattens it into
//! the row form the calculators look up.

use super::provider::{Allowance, BillingModel, PricingEntry, Provider, ResourceKind};
use super::ProviderInfo;
use crate::currency::Currency;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CatalogDocument {
    pub version: String,
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub providers: Vec<ProviderDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProviderDocument {
    pub id: Provider,
    pub name: String,
    #[serde(default)]
    pub currency: Currency,
    pub serverless: Option<ServerlessSection>,
    pub egress: Option<EgressSection>,
    pub vm: Option<VmSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ServerlessSection {
    pub service: String,
    pub request_rate_per_million: f64,
    #[serde(default)]
    pub free_requests: f64,
    pub compute_rate_per_gb_second: f64,
    #[serde(default)]
    pub free_gb_seconds: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct EgressSection {
    #[serde(default)]
    pub rate_per_gb: f64,
    #[serde(default)]
    pub free_gb: f64,
    /// Provider does not meter outbound transfer at all.
    #[serde(default)]
    pub unmetered: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct VmSection {
    pub service: String,
    pub billing: BillingModel,
    #[serde(default)]
    pub instances: Vec<InstanceDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct InstanceDocument {
    pub class: String,
    pub rate: f64,
}

impl CatalogDocument {
    pub fn into_parts(self) -> (String, NaiveDate, Vec<ProviderInfo>, Vec<PricingEntry>) {
        let mut infos = Vec::with_capacity(self.providers.len());
        let mut entries = Vec::new();

        for doc in self.providers {
            let currency = doc.currency;

            if let Some(s) = &doc.serverless {
                entries.push(
                    PricingEntry::new(
                        doc.id,
                        ResourceKind::ServerlessRequest,
                        s.request_rate_per_million,
                        currency,
                    )
                    .with_allowance(Allowance::Limited(s.free_requests)),
                );
                entries.push(
                    PricingEntry::new(
                        doc.id,
                        ResourceKind::ServerlessCompute,
                        s.compute_rate_per_gb_second,
                        currency,
                    )
                    .with_allowance(Allowance::Limited(s.free_gb_seconds)),
                );
            }

            if let Some(e) = &doc.egress {
                let allowance = if e.unmetered {
                    Allowance::Unlimited
                } else {
                    Allowance::Limited(e.free_gb)
                };
                entries.push(
                    PricingEntry::new(doc.id, ResourceKind::Egress, e.rate_per_gb, currency)
                        .with_allowance(allowance),
                );
            }

            if let Some(vm) = &doc.vm {
                let kind = vm.billing.resource_kind();
                for instance in &vm.instances {
                    entries.push(
                        PricingEntry::new(doc.id, kind, instance.rate, currency)
                            .with_instance(instance.class.clone()),
                    );
                }
            }

            infos.push(ProviderInfo {
                provider: doc.id,
                name: doc.name,
                currency,
                serverless_service: doc.serverless.map(|s| s.service),
                vm_service: doc.vm.map(|v| v.service),
            });
        }

        (self.version, self.effective_date, infos, entries)
    }
}
