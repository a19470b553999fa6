//! Serverless command implementation

use crate::calc::ServerlessCalculator;
use crate::cli::output::{format_breakdowns_table, format_json, format_usage_table};
use crate::cli::{Context, ServerlessArgs};
use serde_json::json;
use std::sync::Arc;

/// Handle `breakeven serverless` command
///
/// With a provider, prints one breakdown plus its usage figures; without,
/// every serverless provider in the catalog, cheapest first.
pub fn handle_serverless(
    args: &ServerlessArgs,
    ctx: &Context,
) -> Result<String, Box<dyn std::error::Error>> {
    let profile = args.workload.apply(ctx.config.scenario.workload);
    profile.validate()?;
    let norm = args.currency.normalization(&ctx.config);
    norm.validate()?;

    let calc = ServerlessCalculator::new(Arc::clone(&ctx.catalog));
    let breakdowns = match args.provider {
        Some(provider) => vec![calc
            .compute_serverless_cost(&profile, provider)?
            .normalized(&norm)?],
        None => calc.compare_providers(&profile, &norm)?,
    };

    if args.common.json {
        return Ok(format_json(&json!({
            "workload": profile,
            "exchange_rate": norm.exchange_rate,
            "results": breakdowns,
        }))?);
    }

    let mut out = format_breakdowns_table(&breakdowns);
    if let [single] = breakdowns.as_slice() {
        out.push('\n');
        out.push_str(&format_usage_table(single));
    }
    Ok(out)
}
