//! Property-based tests for the cost calculators.

use breakeven::calc::{
    EgressCalculator, ServerlessCalculator, TrafficProfile, VmCalculator, VmSelection,
    WorkloadProfile, BYTES_PER_GB,
};
use breakeven::currency::{jpy_to_usd, usd_to_jpy};
use breakeven::pricing::{PricingCatalog, Provider, ResourceKind};
use proptest::prelude::*;
use std::sync::{Arc, OnceLock};

fn catalog() -> Arc<PricingCatalog> {
    static CATALOG: OnceLock<Arc<PricingCatalog>> = OnceLock::new();
    Arc::clone(CATALOG.get_or_init(|| Arc::new(PricingCatalog::builtin().unwrap())))
}

fn serverless_provider() -> impl Strategy<Value = Provider> {
    prop_oneof![
        Just(Provider::Aws),
        Just(Provider::Gcp),
        Just(Provider::Azure),
        Just(Provider::Oracle),
    ]
}

fn workload() -> impl Strategy<Value = WorkloadProfile> {
    (
        128u32..=10_240,
        1.0f64..=900.0,
        any::<bool>(),
        0.0f64..=1_000.0,
        0.0f64..=100.0,
    )
        .prop_map(|(memory, duration, free_tier, egress_kb, pct)| {
            WorkloadProfile::new(memory, duration, 0)
                .with_free_tier(free_tier)
                .with_egress(egress_kb, pct)
        })
}

fn vm_selection() -> impl Strategy<Value = VmSelection> {
    prop_oneof![
        Just(VmSelection::new(Provider::Aws, "t3.small")),
        Just(VmSelection::new(Provider::Gcp, "e2-small")),
        Just(VmSelection::new(Provider::Azure, "B2s")),
        Just(VmSelection::new(Provider::Oracle, "VM.Standard.E4.Flex.1x8")),
        Just(VmSelection::new(Provider::Sakura, "2core-4gb")),
    ]
}

proptest! {
    #[test]
    fn serverless_cost_non_decreasing_in_volume(
        profile in workload(),
        provider in serverless_provider(),
        a in 0u64..=1_000_000_000,
        b in 0u64..=1_000_000_000,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let calc = ServerlessCalculator::new(catalog());
        let low = calc.compute_serverless_cost(&profile.with_invocations(lo), provider).unwrap();
        let high = calc.compute_serverless_cost(&profile.with_invocations(hi), provider).unwrap();
        prop_assert!(low.total <= high.total, "{} > {}", low.total, high.total);
    }

    #[test]
    fn free_tier_consumption_within_allowance(
        profile in workload(),
        provider in serverless_provider(),
        invocations in 0u64..=1_000_000_000,
    ) {
        let catalog = catalog();
        let calc = ServerlessCalculator::new(Arc::clone(&catalog));
        let b = calc
            .compute_serverless_cost(&profile.with_invocations(invocations), provider)
            .unwrap();

        let compute = catalog.rate_for(provider, ResourceKind::ServerlessCompute).unwrap();
        let requests = catalog.rate_for(provider, ResourceKind::ServerlessRequest).unwrap();
        if let Some(free) = compute.free_allowance.amount() {
            prop_assert!(b.free_tier.gb_seconds <= free);
        }
        if let Some(free) = requests.free_allowance.amount() {
            prop_assert!(b.free_tier.requests as f64 <= free);
        }
        prop_assert!(b.usage.billable_gb_seconds <= b.usage.total_gb_seconds);
    }

    #[test]
    fn vm_cost_flat_without_traffic(
        selection in vm_selection(),
        invocations in 0u64..=1_000_000_000,
    ) {
        let calc = VmCalculator::new(catalog());
        let base = calc.compute_vm_cost(&selection).unwrap();
        let at = calc.compute_vm_cost_at(&selection, invocations).unwrap();
        prop_assert_eq!(base, at);
    }

    #[test]
    fn vm_cost_with_fixed_traffic_ignores_volume(
        selection in vm_selection(),
        requests in 0u64..=10_000_000,
        egress_kb in 0.0f64..=500.0,
        invocations in 0u64..=1_000_000_000,
    ) {
        let selection = selection.with_traffic(TrafficProfile::fixed(requests, egress_kb, 100.0));
        let calc = VmCalculator::new(catalog());
        let base = calc.compute_vm_cost(&selection).unwrap();
        let at = calc.compute_vm_cost_at(&selection, invocations).unwrap();
        prop_assert_eq!(base.total, at.total);
    }

    #[test]
    fn egress_zero_when_nothing_leaves_network(
        gb in 0.0f64..=100_000.0,
        provider in serverless_provider(),
    ) {
        let egress = EgressCalculator::new(catalog());
        let cost = egress.compute_egress_cost(gb * BYTES_PER_GB, 0.0, provider).unwrap();
        prop_assert_eq!(cost.cost, 0.0);
        prop_assert_eq!(cost.internet_gb, 0.0);
    }

    #[test]
    fn egress_full_internet_matches_unadjusted_cost(
        gb in 0.0f64..=100_000.0,
        provider in serverless_provider(),
    ) {
        let catalog = catalog();
        let entry = catalog.rate_for(provider, ResourceKind::Egress).unwrap();
        let free = entry.free_allowance.amount().unwrap_or(f64::INFINITY);
        let expected = (gb - free).max(0.0) * entry.unit_rate;

        let egress = EgressCalculator::new(Arc::clone(&catalog));
        let cost = egress.compute_egress_cost(gb * BYTES_PER_GB, 100.0, provider).unwrap();
        prop_assert!((cost.cost - expected).abs() <= 1e-9 * expected.max(1.0));
        prop_assert!(cost.billed_gb <= cost.internet_gb);
    }

    #[test]
    fn currency_round_trip(amount in 0.0f64..=1e9, rate in 50.0f64..=300.0) {
        let back = jpy_to_usd(usd_to_jpy(amount, rate).unwrap(), rate).unwrap();
        prop_assert!((back - amount).abs() <= 1e-9 * amount.max(1.0));
    }

    #[test]
    fn exchange_rate_outside_band_rejected(
        rate in prop_oneof![0.0f64..50.0, 300.0001f64..10_000.0],
    ) {
        prop_assert!(usd_to_jpy(1.0, rate).is_err());
        prop_assert!(jpy_to_usd(1.0, rate).is_err());
    }
}
