//! Internet egress transfer costing.
//!
//! Both the serverless and the VM calculator hold a clone of the same
//! [`EgressCalculator`], so the two sides of a comparison bill data transfer
//! identically.
//!
//! ```text
//! internet_gb = total_bytes * (internet_percent / 100) / 1024^3
//! billed_gb   = max(0, internet_gb - free_gb)
//! cost        = billed_gb * rate_per_gb
//! ```

use crate::currency::Currency;
use crate::error::CostError;
use crate::pricing::{Allowance, PricingCatalog, Provider, ResourceKind};
use serde::Serialize;
use std::sync::Arc;

use super::types::PERCENT_RANGE;

pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Result of one egress calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EgressCost {
    pub cost: f64,
    pub currency: Currency,
    pub internet_gb: f64,
    pub billed_gb: f64,
    pub free_gb_applied: f64,
}

impl EgressCost {
    pub fn zero(currency: Currency) -> Self {
        Self {
            cost: 0.0,
            currency,
            internet_gb: 0.0,
            billed_gb: 0.0,
            free_gb_applied: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EgressCalculator {
    catalog: Arc<PricingCatalog>,
}

impl EgressCalculator {
    pub fn new(catalog: Arc<PricingCatalog>) -> Self {
        Self { catalog }
    }

    /// Cost of moving `total_bytes`, of which `internet_percent` leaves the
    /// provider network, with the provider's free allowance applied.
    pub fn compute_egress_cost(
        &self,
        total_bytes: f64,
        internet_percent: f64,
        provider: Provider,
    ) -> Result<EgressCost, CostError> {
        self.compute_egress_cost_with(total_bytes, internet_percent, provider, true)
    }

    /// As [`Self::compute_egress_cost`], optionally ignoring the free allowance.
    pub fn compute_egress_cost_with(
        &self,
        total_bytes: f64,
        internet_percent: f64,
        provider: Provider,
        apply_free_allowance: bool,
    ) -> Result<EgressCost, CostError> {
        if !total_bytes.is_finite() || total_bytes < 0.0 {
            return Err(CostError::invalid(
                "egress_bytes",
                format!("must be a non-negative number, got {}", total_bytes),
            ));
        }
        if !PERCENT_RANGE.contains(&internet_percent) {
            return Err(CostError::invalid(
                "internet_egress_percent",
                format!("must be between 0 and 100, got {}", internet_percent),
            ));
        }

        let entry = self.catalog.rate_for(provider, ResourceKind::Egress)?;
        let allowance = if apply_free_allowance {
            entry.free_allowance
        } else {
            Allowance::NONE
        };

        let internet_gb = total_bytes * (internet_percent / 100.0) / BYTES_PER_GB;
        let (billed_gb, free_gb_applied) = allowance.apply(internet_gb);
        let cost = billed_gb * entry.unit_rate;

        tracing::trace!(
            provider = %provider,
            internet_gb,
            billed_gb,
            cost,
            "Computed egress cost"
        );

        Ok(EgressCost {
            cost,
            currency: entry.currency,
            internet_gb,
            billed_gb,
            free_gb_applied,
        })
    }
}
