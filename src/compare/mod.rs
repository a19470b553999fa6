//! Cost-vs-volume comparison and break-even analysis.
//!
//! [`ComparisonEngine::build_comparison`] sweeps a range of monthly invocation
//! counts, tabulates the serverless cost against every selected VM, and runs
//! one break-even search per VM. All amounts in a report are expressed in a
//! single currency chosen by the request's [`Normalization`].

pub mod break_even;
pub mod sweep;

pub use break_even::{
    find_break_even, find_break_even_sampled, monthly_to_per_second, per_second_to_monthly,
    BreakEvenOutcome, BreakEvenResult, NoCrossing, SearchDomain, SECONDS_PER_MONTH,
};
pub use sweep::{Spacing, VolumeRange};

use crate::calc::{CostBreakdown, ServerlessCalculator, VmCalculator, VmSelection, WorkloadProfile};
use crate::currency::{Currency, Normalization};
use crate::error::CostError;
use crate::pricing::{PricingCatalog, Provider};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Label used for the serverless column in [`ComparisonPoint::cheapest`].
pub const SERVERLESS_LABEL: &str = "serverless";

/// Everything needed to build one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRequest {
    pub profile: WorkloadProfile,
    pub serverless_provider: Provider,
    pub vms: Vec<VmSelection>,
    pub range: VolumeRange,
    pub normalization: Normalization,
    pub search: SearchDomain,
}

impl ComparisonRequest {
    pub fn new(profile: WorkloadProfile, serverless_provider: Provider, vms: Vec<VmSelection>) -> Self {
        Self {
            profile,
            serverless_provider,
            vms,
            range: VolumeRange::default(),
            normalization: Normalization::default(),
            search: SearchDomain::default(),
        }
    }

    pub fn with_range(mut self, range: VolumeRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_search(mut self, search: SearchDomain) -> Self {
        self.search = search;
        self
    }
}

/// One row of the swept-volume table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub monthly_invocations: u64,
    pub calls_per_second: f64,
    pub serverless_cost: f64,
    /// VM id -> monthly cost.
    pub vm_costs: BTreeMap<String, f64>,
}

impl ComparisonPoint {
    /// Cheapest option at this volume; serverless wins ties.
    pub fn cheapest(&self) -> (&str, f64) {
        let serverless: (&str, f64) = (SERVERLESS_LABEL, self.serverless_cost);
        self.vm_costs.iter().fold(serverless, |best, (id, &cost)| {
            if cost < best.1 {
                (id.as_str(), cost)
            } else {
                best
            }
        })
    }
}

/// VM cost at the profile's own monthly volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmBaseline {
    pub vm_id: String,
    pub breakdown: CostBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub currency: Currency,
    pub exchange_rate: f64,
    pub serverless_provider: Provider,
    /// Serverless cost at the profile's own monthly volume.
    pub serverless_baseline: CostBreakdown,
    pub vm_baselines: Vec<VmBaseline>,
    pub spacing: Spacing,
    pub points: Vec<ComparisonPoint>,
    pub break_even: Vec<BreakEvenResult>,
}

impl ComparisonReport {
    pub fn break_even_for(&self, vm_id: &str) -> Option<&BreakEvenResult> {
        self.break_even.iter().find(|r| r.vm_id == vm_id)
    }
}

/// Orchestrates the calculators over a volume sweep.
#[derive(Debug, Clone)]
pub struct ComparisonEngine {
    serverless: ServerlessCalculator,
    vm: VmCalculator,
}

impl ComparisonEngine {
    pub fn new(catalog: Arc<PricingCatalog>) -> Self {
        let egress = crate::calc::EgressCalculator::new(Arc::clone(&catalog));
        Self {
            serverless: ServerlessCalculator::with_egress(Arc::clone(&catalog), egress.clone()),
            vm: VmCalculator::with_egress(catalog, egress),
        }
    }

    pub fn serverless(&self) -> &ServerlessCalculator {
        &self.serverless
    }

    pub fn vm(&self) -> &VmCalculator {
        &self.vm
    }

    /// Serverless total at `invocations`, in the normalisation currency.
    fn serverless_total(
        &self,
        request: &ComparisonRequest,
        invocations: u64,
    ) -> Result<f64, CostError> {
        let profile = request.profile.with_invocations(invocations);
        let breakdown = self
            .serverless
            .compute_serverless_cost(&profile, request.serverless_provider)?;
        request.normalization.apply(breakdown.total, breakdown.currency)
    }

    fn vm_total(
        &self,
        request: &ComparisonRequest,
        vm: &VmSelection,
        invocations: u64,
    ) -> Result<f64, CostError> {
        let breakdown = self.vm.compute_vm_cost_at(vm, invocations)?;
        request.normalization.apply(breakdown.total, breakdown.currency)
    }

    /// Build the cost table and break-even results for `request`.
    ///
    /// Fails atomically: any lookup or validation error aborts the whole
    /// comparison.
    pub fn build_comparison(
        &self,
        request: &ComparisonRequest,
    ) -> Result<ComparisonReport, CostError> {
        request.normalization.validate()?;
        request.search.validate()?;

        let mut seen = HashSet::new();
        for vm in &request.vms {
            let id = vm.id();
            if !seen.insert(id.clone()) {
                return Err(CostError::invalid(
                    "vms",
                    format!("duplicate VM identifier '{}'; set a distinct label", id),
                ));
            }
        }

        let (volumes, spacing) = request.range.volumes()?;
        let norm = &request.normalization;

        let serverless_baseline = self
            .serverless
            .compute_serverless_cost(&request.profile, request.serverless_provider)?
            .normalized(norm)?;

        let vm_baselines = request
            .vms
            .iter()
            .map(|vm| {
                let breakdown = self
                    .vm
                    .compute_vm_cost_at(vm, request.profile.monthly_invocations)?
                    .normalized(norm)?;
                Ok(VmBaseline {
                    vm_id: vm.id(),
                    breakdown,
                })
            })
            .collect::<Result<Vec<_>, CostError>>()?;

        let points = volumes
            .iter()
            .map(|&volume| {
                let serverless_cost = self.serverless_total(request, volume)?;
                let vm_costs = request
                    .vms
                    .iter()
                    .map(|vm| Ok((vm.id(), self.vm_total(request, vm, volume)?)))
                    .collect::<Result<BTreeMap<_, _>, CostError>>()?;
                Ok(ComparisonPoint {
                    monthly_invocations: volume,
                    calls_per_second: monthly_to_per_second(volume),
                    serverless_cost,
                    vm_costs,
                })
            })
            .collect::<Result<Vec<_>, CostError>>()?;

        let break_even = request
            .vms
            .iter()
            .zip(&vm_baselines)
            .map(|(vm, baseline)| self.break_even_for(request, vm, baseline, &volumes))
            .collect::<Result<Vec<_>, CostError>>()?;

        let found = break_even.iter().filter(|r| r.outcome.is_found()).count();
        tracing::info!(
            provider = %request.serverless_provider,
            vms = request.vms.len(),
            points = points.len(),
            crossings = found,
            currency = %norm.currency,
            "Built comparison"
        );

        Ok(ComparisonReport {
            currency: norm.currency,
            exchange_rate: norm.exchange_rate,
            serverless_provider: request.serverless_provider,
            serverless_baseline,
            vm_baselines,
            spacing,
            points,
            break_even,
        })
    }

    fn break_even_for(
        &self,
        request: &ComparisonRequest,
        vm: &VmSelection,
        baseline: &VmBaseline,
        volumes: &[u64],
    ) -> Result<BreakEvenResult, CostError> {
        // VM traffic that follows the sweep can make the gap fall again, so
        // the swept volumes are checked before bisecting.
        let outcome = find_break_even_sampled(
            |x| Ok(self.serverless_total(request, x)? - self.vm_total(request, vm, x)?),
            &request.search.within_range(&request.range),
            volumes,
        )?;

        let vm_monthly_cost = match outcome.monthly_invocations() {
            Some(x) => self.vm_total(request, vm, x)?,
            None => baseline.breakdown.total,
        };

        tracing::debug!(
            vm = %baseline.vm_id,
            ?outcome,
            vm_monthly_cost,
            "Break-even search finished"
        );

        Ok(BreakEvenResult {
            vm_id: baseline.vm_id.clone(),
            vm_monthly_cost,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::TrafficProfile;

    fn engine() -> ComparisonEngine {
        ComparisonEngine::new(Arc::new(PricingCatalog::builtin().unwrap()))
    }

    fn request(vms: Vec<VmSelection>) -> ComparisonRequest {
        ComparisonRequest::new(WorkloadProfile::new(512, 1.0, 1_000_000), Provider::Aws, vms)
            .with_range(VolumeRange::new(1_000, 100_000_000, 20))
    }

    #[test]
    fn test_report_shape() {
        let vms = vec![
            VmSelection::new(Provider::Aws, "t3.small"),
            VmSelection::new(Provider::Aws, "t3.large"),
        ];
        let report = engine().build_comparison(&request(vms)).unwrap();
        assert_eq!(report.points.len(), 20);
        assert_eq!(report.spacing, Spacing::Logarithmic);
        assert_eq!(report.vm_baselines.len(), 2);
        assert_eq!(report.break_even.len(), 2);
        for point in &report.points {
            assert_eq!(point.vm_costs.len(), 2);
            assert!((point.vm_costs["aws/t3.small"] - 19.856).abs() < 1e-9);
        }
    }

    #[test]
    fn test_break_even_found_against_small_vm() {
        let report = engine()
            .build_comparison(&request(vec![VmSelection::new(Provider::Aws, "t3.small")]))
            .unwrap();
        let result = report.break_even_for("aws/t3.small").unwrap();
        match result.outcome {
            BreakEvenOutcome::Found {
                monthly_invocations,
                residual_gap,
                ..
            } => {
                assert!(monthly_invocations > 1_000_000);
                assert!(residual_gap.abs() < 0.01);
            }
            other => panic!("expected crossing, got {:?}", other),
        }
    }

    #[test]
    fn test_serverless_cost_non_decreasing_across_points() {
        let report = engine()
            .build_comparison(&request(vec![VmSelection::new(Provider::Gcp, "e2-micro")]))
            .unwrap();
        assert!(report
            .points
            .windows(2)
            .all(|w| w[0].serverless_cost <= w[1].serverless_cost));
    }

    #[test]
    fn test_sakura_normalized_to_usd() {
        let req = request(vec![VmSelection::new(Provider::Sakura, "2core-4gb")])
            .with_normalization(Normalization::new(Currency::Usd, 154.0));
        let report = engine().build_comparison(&req).unwrap();
        let cost = report.points[0].vm_costs["sakura/2core-4gb"];
        assert!((cost - 4620.0 / 154.0).abs() < 1e-9);
        assert_eq!(report.vm_baselines[0].breakdown.currency, Currency::Usd);
    }

    #[test]
    fn test_report_in_jpy() {
        let req = request(vec![VmSelection::new(Provider::Aws, "t3.small")])
            .with_normalization(Normalization::new(Currency::Jpy, 150.0));
        let report = engine().build_comparison(&req).unwrap();
        assert_eq!(report.currency, Currency::Jpy);
        assert!((report.points[0].vm_costs["aws/t3.small"] - 19.856 * 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_duplicate_vm_ids_rejected() {
        let vms = vec![
            VmSelection::new(Provider::Aws, "t3.small"),
            VmSelection::new(Provider::Aws, "t3.small"),
        ];
        let err = engine().build_comparison(&request(vms)).unwrap_err();
        assert!(matches!(err, CostError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_labels_disambiguate() {
        let vms = vec![
            VmSelection::new(Provider::Aws, "t3.small").with_label("a"),
            VmSelection::new(Provider::Aws, "t3.small").with_label("b"),
        ];
        assert!(engine().build_comparison(&request(vms)).is_ok());
    }

    #[test]
    fn test_unknown_instance_fails_whole_comparison() {
        let vms = vec![
            VmSelection::new(Provider::Aws, "t3.small"),
            VmSelection::new(Provider::Aws, "nope"),
        ];
        let err = engine().build_comparison(&request(vms)).unwrap_err();
        assert!(matches!(err, CostError::UnknownInstanceType { .. }));
    }

    #[test]
    fn test_bad_exchange_rate_rejected() {
        let req = request(vec![]).with_normalization(Normalization::new(Currency::Usd, 20.0));
        assert_eq!(
            engine().build_comparison(&req).unwrap_err(),
            CostError::InvalidExchangeRate(20.0)
        );
    }

    #[test]
    fn test_following_traffic_varies_vm_cost() {
        let vm = VmSelection::new(Provider::Aws, "t3.small")
            .with_traffic(TrafficProfile::following(100.0, 100.0));
        let report = engine().build_comparison(&request(vec![vm])).unwrap();
        let first = report.points.first().unwrap().vm_costs["aws/t3.small"];
        let last = report.points.last().unwrap().vm_costs["aws/t3.small"];
        assert!(last > first);
    }

    #[test]
    fn test_break_even_confined_to_swept_range() {
        let profile = WorkloadProfile::new(10_240, 900.0, 100_000).with_free_tier(false);
        let req = ComparisonRequest::new(
            profile,
            Provider::Aws,
            vec![VmSelection::new(Provider::Aws, "t3.small")],
        )
        .with_range(VolumeRange::new(100_000, 100_000_000, 10));

        let report = engine().build_comparison(&req).unwrap();
        assert_eq!(
            report.break_even[0].outcome,
            BreakEvenOutcome::NoBreakEvenFound {
                reason: NoCrossing::VmAlwaysCheaper
            }
        );
    }

    #[test]
    fn test_break_even_found_when_gap_falls_back_between_ends() {
        // $2 per million calls against a $10 VM whose egress is free up to
        // 10M calls and then costs $0.00001 per call: serverless is dearer
        // only between 5M and 11.25M calls.
        let toml = r#"
        version = "test"
        effective_date = "2024-06-01"

        [[providers]]
        id = "aws"
        name = "AWS"
        currency = "usd"

        [providers.serverless]
        service = "Lambda"
        request_rate_per_million = 2.0
        compute_rate_per_gb_second = 0.0

        [providers.egress]
        rate_per_gb = 0.0

        [[providers]]
        id = "azure"
        name = "Azure"
        currency = "usd"

        [providers.egress]
        rate_per_gb = 0.01024
        free_gb = 9765.625

        [providers.vm]
        service = "Virtual Machines"
        billing = "flat-monthly"
        instances = [{ class = "fixed", rate = 10.0 }]
        "#;
        let catalog = Arc::new(PricingCatalog::from_toml_str(toml).unwrap());
        let vm = VmSelection::new(Provider::Azure, "fixed")
            .with_traffic(TrafficProfile::following(1024.0, 100.0));
        let req = ComparisonRequest::new(
            WorkloadProfile::new(128, 1.0, 1_000_000),
            Provider::Aws,
            vec![vm],
        )
        .with_range(VolumeRange::new(1_000_000, 100_000_000, 100));

        let report = ComparisonEngine::new(catalog).build_comparison(&req).unwrap();
        let last = report.points.last().unwrap();
        assert!(last.serverless_cost < last.vm_costs["azure/fixed"]);
        assert!(report
            .points
            .iter()
            .any(|p| p.serverless_cost > p.vm_costs["azure/fixed"] + 1.0));

        let x = report.break_even[0].outcome.monthly_invocations().unwrap();
        assert!((x as i64 - 5_000_000).abs() <= 5_000, "crossing at {}", x);
    }

    #[test]
    fn test_cheapest_prefers_serverless_on_tie() {
        let mut vm_costs = BTreeMap::new();
        vm_costs.insert("vm".to_string(), 10.0);
        let point = ComparisonPoint {
            monthly_invocations: 1,
            calls_per_second: 0.0,
            serverless_cost: 10.0,
            vm_costs,
        };
        assert_eq!(point.cheapest(), (SERVERLESS_LABEL, 10.0));
    }

    #[test]
    fn test_cheapest_picks_lowest_vm() {
        let mut vm_costs = BTreeMap::new();
        vm_costs.insert("big".to_string(), 50.0);
        vm_costs.insert("small".to_string(), 5.0);
        let point = ComparisonPoint {
            monthly_invocations: 1,
            calls_per_second: 0.0,
            serverless_cost: 10.0,
            vm_costs,
        };
        assert_eq!(point.cheapest(), ("small", 5.0));
    }
}
