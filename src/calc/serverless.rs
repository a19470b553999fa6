//! Serverless function cost calculation.
//!
//! ## Pricing Strategy
//!
//! - **Requests**: `max(0, invocations - free_requests) / 1M * rate_per_million`
//! - **Compute**: `max(0, memory_gb * duration * invocations - free_gb_seconds) * rate_per_gb_second`
//! - **Egress**: delegated to [`EgressCalculator`]
//!
//! Free-tier terms drop to zero when the profile disables the free tier.
//! The GB-second allowance is applied to this one workload as if no other
//! function shared it.

use super::breakdown::CostBreakdown;
use super::egress::EgressCalculator;
use super::types::WorkloadProfile;
use crate::currency::Normalization;
use crate::error::CostError;
use crate::pricing::{Allowance, PricingCatalog, Provider, ResourceKind};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ServerlessCalculator {
    catalog: Arc<PricingCatalog>,
    egress: EgressCalculator,
}

impl ServerlessCalculator {
    pub fn new(catalog: Arc<PricingCatalog>) -> Self {
        let egress = EgressCalculator::new(Arc::clone(&catalog));
        Self::with_egress(catalog, egress)
    }

    /// Build around an existing egress calculator, so several calculators
    /// share one egress implementation.
    pub fn with_egress(catalog: Arc<PricingCatalog>, egress: EgressCalculator) -> Self {
        Self { catalog, egress }
    }

    /// Monthly cost of `profile` on `provider`, in the provider's currency.
    pub fn compute_serverless_cost(
        &self,
        profile: &WorkloadProfile,
        provider: Provider,
    ) -> Result<CostBreakdown, CostError> {
        profile.check_structure()?;

        let request_rate = self
            .catalog
            .rate_for(provider, ResourceKind::ServerlessRequest)?;
        let compute_rate = self
            .catalog
            .rate_for(provider, ResourceKind::ServerlessCompute)?;

        let (request_allowance, compute_allowance) = if profile.include_free_tier {
            (request_rate.free_allowance, compute_rate.free_allowance)
        } else {
            (Allowance::NONE, Allowance::NONE)
        };

        let invocations = profile.monthly_invocations as f64;
        let (billable_requests, free_requests) = request_allowance.apply(invocations);

        let total_gb_seconds = profile.memory_gb() * profile.duration_seconds * invocations;
        let (billable_gb_seconds, free_gb_seconds) = compute_allowance.apply(total_gb_seconds);

        let egress = self.egress.compute_egress_cost_with(
            profile.total_egress_bytes(),
            profile.internet_egress_percent,
            provider,
            profile.include_free_tier,
        )?;

        let mut breakdown = CostBreakdown::new(provider, request_rate.currency);
        breakdown.request_charge = billable_requests / 1_000_000.0 * request_rate.unit_rate;
        breakdown.compute_charge = billable_gb_seconds * compute_rate.unit_rate;
        breakdown.egress_charge = egress.cost;
        breakdown.free_tier.requests = free_requests as u64;
        breakdown.free_tier.gb_seconds = free_gb_seconds;
        breakdown.free_tier.egress_gb = egress.free_gb_applied;
        breakdown.usage.billable_requests = billable_requests as u64;
        breakdown.usage.total_gb_seconds = total_gb_seconds;
        breakdown.usage.billable_gb_seconds = billable_gb_seconds;
        breakdown.usage.internet_egress_gb = egress.internet_gb;
        breakdown.usage.billed_egress_gb = egress.billed_gb;
        let breakdown = breakdown.finalize();

        tracing::debug!(
            provider = %provider,
            invocations = profile.monthly_invocations,
            request_charge = breakdown.request_charge,
            compute_charge = breakdown.compute_charge,
            egress_charge = breakdown.egress_charge,
            total = breakdown.total,
            "Computed serverless cost"
        );

        Ok(breakdown)
    }

    /// Cost of `profile` on every provider with a serverless offering,
    /// cheapest first, in the normalisation currency.
    pub fn compare_providers(
        &self,
        profile: &WorkloadProfile,
        norm: &Normalization,
    ) -> Result<Vec<CostBreakdown>, CostError> {
        norm.validate()?;
        let mut results = self
            .catalog
            .serverless_providers()
            .into_iter()
            .map(|provider| {
                self.compute_serverless_cost(profile, provider)?
                    .normalized(norm)
            })
            .collect::<Result<Vec<_>, _>>()?;
        results.sort_by(|a, b| a.total.total_cmp(&b.total));
        Ok(results)
    }
}
