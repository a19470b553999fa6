//! Provisioned VM cost calculation.

use super::breakdown::CostBreakdown;
use super::egress::EgressCalculator;
use super::types::{VmSelection, BYTES_PER_KB};
use crate::error::CostError;
use crate::pricing::{PricingCatalog, ResourceKind};
use std::sync::Arc;

/// Hours used to turn an hourly instance rate into a monthly figure.
pub const HOURS_PER_MONTH: f64 = 730.0;

#[derive(Debug, Clone)]
pub struct VmCalculator {
    catalog: Arc<PricingCatalog>,
    egress: EgressCalculator,
}

impl VmCalculator {
    pub fn new(catalog: Arc<PricingCatalog>) -> Self {
        let egress = EgressCalculator::new(Arc::clone(&catalog));
        Self::with_egress(catalog, egress)
    }

    pub fn with_egress(catalog: Arc<PricingCatalog>, egress: EgressCalculator) -> Self {
        Self { catalog, egress }
    }

    /// Monthly cost of `selection` in the provider's native currency.
    ///
    /// Traffic without a fixed request count contributes no egress here; see
    /// [`Self::compute_vm_cost_at`].
    pub fn compute_vm_cost(&self, selection: &VmSelection) -> Result<CostBreakdown, CostError> {
        self.compute(selection, 0)
    }

    /// Monthly cost when the VM serves `invocations` requests.
    ///
    /// Only traffic profiles that follow the volume use `invocations`; a fixed
    /// request count, or no traffic at all, gives the same cost at every volume.
    pub fn compute_vm_cost_at(
        &self,
        selection: &VmSelection,
        invocations: u64,
    ) -> Result<CostBreakdown, CostError> {
        self.compute(selection, invocations)
    }

    fn compute(
        &self,
        selection: &VmSelection,
        volume_requests: u64,
    ) -> Result<CostBreakdown, CostError> {
        let entry = self
            .catalog
            .instance_rate(selection.provider, &selection.instance_class)?;

        let mut breakdown = CostBreakdown::new(selection.provider, entry.currency);
        breakdown.instance_charge = match entry.kind {
            ResourceKind::VmMonthly => entry.unit_rate,
            _ => entry.unit_rate * HOURS_PER_MONTH,
        };

        if let Some(traffic) = &selection.traffic {
            traffic.check_structure()?;
            let requests = traffic.monthly_requests.unwrap_or(volume_requests);
            let total_bytes = traffic.egress_kb_per_request * BYTES_PER_KB * requests as f64;
            let egress = self.egress.compute_egress_cost(
                total_bytes,
                traffic.internet_egress_percent,
                selection.provider,
            )?;
            breakdown.egress_charge = egress.cost;
            breakdown.free_tier.egress_gb = egress.free_gb_applied;
            breakdown.usage.internet_egress_gb = egress.internet_gb;
            breakdown.usage.billed_egress_gb = egress.billed_gb;
        }

        let breakdown = breakdown.finalize();

        tracing::debug!(
            provider = %selection.provider,
            instance = %selection.instance_class,
            instance_charge = breakdown.instance_charge,
            egress_charge = breakdown.egress_charge,
            total = breakdown.total,
            currency = %breakdown.currency,
            "Computed VM cost"
        );

        Ok(breakdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::types::TrafficProfile;
    use crate::currency::Currency;
    use crate::pricing::Provider;

    fn calculator() -> VmCalculator {
        VmCalculator::new(Arc::new(PricingCatalog::builtin().unwrap()))
    }

    #[test]
    fn test_hourly_vm_monthly_cost() {
        let b = calculator()
            .compute_vm_cost(&VmSelection::new(Provider::Aws, "t3.small"))
            .unwrap();
        assert!((b.instance_charge - 19.856).abs() < 0.001);
        assert_eq!(b.total, b.instance_charge);
        assert_eq!(b.egress_charge, 0.0);
        assert_eq!(b.currency, Currency::Usd);
    }

    #[test]
    fn test_flat_monthly_vm_in_native_currency() {
        let b = calculator()
            .compute_vm_cost(&VmSelection::new(Provider::Sakura, "2core-4gb"))
            .unwrap();
        assert_eq!(b.instance_charge, 4620.0);
        assert_eq!(b.currency, Currency::Jpy);
    }

    #[test]
    fn test_unknown_instance() {
        let err = calculator()
            .compute_vm_cost(&VmSelection::new(Provider::Gcp, "n9-mega"))
            .unwrap_err();
        assert!(matches!(err, CostError::UnknownInstanceType { .. }));
    }

    #[test]
    fn test_fixed_traffic_adds_egress() {
        // 10M requests * 20KB ~= 190.7 GB; 100 GB free
        let vm = VmSelection::new(Provider::Aws, "t3.small")
            .with_traffic(TrafficProfile::fixed(10_000_000, 20.0, 100.0));
        let b = calculator().compute_vm_cost(&vm).unwrap();
        assert!(b.egress_charge > 0.0);
        assert_eq!(b.free_tier.egress_gb, 100.0);
        assert!((b.total - (b.instance_charge + b.egress_charge)).abs() < 1e-12);
    }

    #[test]
    fn test_unmetered_egress_is_free() {
        let vm = VmSelection::new(Provider::Sakura, "1core-1gb")
            .with_traffic(TrafficProfile::fixed(100_000_000, 500.0, 100.0));
        let b = calculator().compute_vm_cost(&vm).unwrap();
        assert_eq!(b.egress_charge, 0.0);
        assert_eq!(b.total, 1595.0);
    }

    #[test]
    fn test_cost_independent_of_volume_without_traffic() {
        let calc = calculator();
        let vm = VmSelection::new(Provider::Oracle, "VM.Standard.E4.Flex.1x8");
        let low = calc.compute_vm_cost_at(&vm, 1).unwrap();
        let high = calc.compute_vm_cost_at(&vm, 900_000_000).unwrap();
        assert_eq!(low, high);
    }

    #[test]
    fn test_following_traffic_scales_with_volume() {
        let calc = calculator();
        let vm = VmSelection::new(Provider::Aws, "t3.small")
            .with_traffic(TrafficProfile::following(100.0, 100.0));
        let standalone = calc.compute_vm_cost(&vm).unwrap();
        let busy = calc.compute_vm_cost_at(&vm, 50_000_000).unwrap();
        assert_eq!(standalone.egress_charge, 0.0);
        assert!(busy.egress_charge > 0.0);
    }

    #[test]
    fn test_fixed_traffic_ignores_volume() {
        let calc = calculator();
        let vm = VmSelection::new(Provider::Aws, "t3.small")
            .with_traffic(TrafficProfile::fixed(5_000_000, 100.0, 100.0));
        assert_eq!(
            calc.compute_vm_cost_at(&vm, 1).unwrap(),
            calc.compute_vm_cost_at(&vm, 500_000_000).unwrap()
        );
    }
}
