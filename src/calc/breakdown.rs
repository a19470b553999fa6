//! Calculator output.

use crate::currency::{Currency, Normalization};
use crate::error::CostError;
use crate::pricing::Provider;
use serde::Serialize;

/// Free-tier amounts actually used by one calculation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FreeTierConsumption {
    pub requests: u64,
    pub gb_seconds: f64,
    pub egress_gb: f64,
}

/// Billing quantities behind the charges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct UsageSummary {
    pub billable_requests: u64,
    pub total_gb_seconds: f64,
    pub billable_gb_seconds: f64,
    pub internet_egress_gb: f64,
    pub billed_egress_gb: f64,
}

/// Monthly cost of one deployment on one provider.
///
/// Serverless breakdowns fill `request_charge` and `compute_charge`; VM
/// breakdowns fill `instance_charge`. Both may carry `egress_charge`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub provider: Provider,
    pub currency: Currency,
    pub request_charge: f64,
    pub compute_charge: f64,
    pub instance_charge: f64,
    pub egress_charge: f64,
    pub total: f64,
    pub free_tier: FreeTierConsumption,
    pub usage: UsageSummary,
}

impl CostBreakdown {
    pub(crate) fn new(provider: Provider, currency: Currency) -> Self {
        Self {
            provider,
            currency,
            request_charge: 0.0,
            compute_charge: 0.0,
            instance_charge: 0.0,
            egress_charge: 0.0,
            total: 0.0,
            free_tier: FreeTierConsumption::default(),
            usage: UsageSummary::default(),
        }
    }

    /// Recompute `total` from the individual charges.
    pub(crate) fn finalize(mut self) -> Self {
        self.total =
            self.request_charge + self.compute_charge + self.instance_charge + self.egress_charge;
        self
    }

    /// The same breakdown with every monetary field expressed in `to`.
    pub fn converted(&self, to: Currency, exchange_rate: f64) -> Result<Self, CostError> {
        let norm = Normalization::new(to, exchange_rate);
        let from = self.currency;
        Ok(Self {
            currency: to,
            request_charge: norm.apply(self.request_charge, from)?,
            compute_charge: norm.apply(self.compute_charge, from)?,
            instance_charge: norm.apply(self.instance_charge, from)?,
            egress_charge: norm.apply(self.egress_charge, from)?,
            total: norm.apply(self.total, from)?,
            ..self.clone()
        })
    }

    pub fn normalized(&self, norm: &Normalization) -> Result<Self, CostError> {
        self.converted(norm.currency, norm.exchange_rate)
    }
}
