//! Compare command implementation

use crate::calc::TrafficProfile;
use crate::cli::output::{
    format_break_even_table, format_count, format_json, format_points_table,
};
use crate::cli::{CompareArgs, Context};
use crate::compare::{ComparisonEngine, ComparisonRequest};
use std::sync::Arc;

/// Assemble the comparison request: configured scenario, then flags.
///
/// VMs given on the command line serve the same traffic as the serverless
/// workload, following the swept volume.
pub fn build_request(
    args: &CompareArgs,
    ctx: &Context,
) -> Result<ComparisonRequest, Box<dyn std::error::Error>> {
    let base = ctx.config.comparison_request();

    let profile = args.workload.apply(base.profile);
    profile.validate()?;

    let vms = if args.vms.is_empty() {
        base.vms
    } else {
        let traffic = TrafficProfile::following(
            profile.egress_kb_per_invocation,
            profile.internet_egress_percent,
        );
        args.vms
            .iter()
            .map(|vm| vm.clone().with_traffic(traffic))
            .collect()
    };
    if vms.is_empty() {
        return Err(
            "No VMs to compare. Pass --vm PROVIDER:INSTANCE or add [[scenario.vms]] to the config."
                .into(),
        );
    }
    for vm in &vms {
        vm.validate()?;
    }

    let mut range = base.range;
    if let Some(min) = args.min {
        range.min = min;
    }
    if let Some(max) = args.max {
        range.max = max;
    }
    if let Some(points) = args.points {
        range.points = points;
    }
    if let Some(spacing) = args.spacing {
        range.spacing = spacing;
    }
    range.validate()?;

    let normalization = args.currency.normalization(&ctx.config);
    normalization.validate()?;

    Ok(
        ComparisonRequest::new(profile, args.provider.unwrap_or(base.serverless_provider), vms)
            .with_range(range)
            .with_normalization(normalization)
            .with_search(base.search),
    )
}

/// Handle `breakeven compare` command
pub fn handle_compare(
    args: &CompareArgs,
    ctx: &Context,
) -> Result<String, Box<dyn std::error::Error>> {
    let request = build_request(args, ctx)?;
    let engine = ComparisonEngine::new(Arc::clone(&ctx.catalog));
    let report = engine.build_comparison(&request)?;

    if args.common.json {
        return Ok(format_json(&report)?);
    }

    let c = report.currency;
    let mut out = format!(
        "Serverless ({}) at {} invocations/month: {}\n",
        report.serverless_provider,
        format_count(request.profile.monthly_invocations),
        c.format(report.serverless_baseline.total)
    );
    for baseline in &report.vm_baselines {
        out.push_str(&format!(
            "VM {}: {}\n",
            baseline.vm_id,
            c.format(baseline.breakdown.total)
        ));
    }
    out.push('\n');
    out.push_str(&format_points_table(&report));
    out.push('\n');
    out.push_str(&format_break_even_table(&report));
    Ok(out)
}
