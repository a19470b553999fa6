//! VM command implementation

use crate::calc::{TrafficProfile, VmCalculator, VmSelection};
use crate::cli::output::{format_breakdowns_table, format_json};
use crate::cli::{Context, VmArgs};
use serde_json::json;
use std::sync::Arc;

fn selection(args: &VmArgs) -> VmSelection {
    let mut selection = VmSelection::new(args.provider, args.instance.clone());
    if let Some(ref region) = args.region {
        selection = selection.with_region(region.clone());
    }
    if args.requests > 0 || args.egress_kb > 0.0 {
        selection = selection.with_traffic(TrafficProfile::fixed(
            args.requests,
            args.egress_kb,
            args.internet_pct,
        ));
    }
    selection
}

/// Handle `breakeven vm` command
pub fn handle_vm(args: &VmArgs, ctx: &Context) -> Result<String, Box<dyn std::error::Error>> {
    let selection = selection(args);
    selection.validate()?;
    let norm = args.currency.normalization(&ctx.config);
    norm.validate()?;

    let calc = VmCalculator::new(Arc::clone(&ctx.catalog));
    let native = calc.compute_vm_cost(&selection)?;
    let breakdown = native.normalized(&norm)?;

    if args.common.json {
        return Ok(format_json(&json!({
            "vm": selection,
            "exchange_rate": norm.exchange_rate,
            "native": native,
            "result": breakdown,
        }))?);
    }

    let mut out = format!("{}\n", selection.id());
    out.push_str(&format_breakdowns_table(std::slice::from_ref(&breakdown)));
    if native.currency != breakdown.currency {
        out.push_str(&format!(
            "\nBilled in {}: {}",
            native.currency,
            native.currency.format(native.total)
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{CommonArgs, CurrencyArgs};
    use crate::config::AppConfig;
    use crate::pricing::Provider;
    use std::path::PathBuf;

    fn context() -> Context {
        Context::from_config(AppConfig::default()).unwrap()
    }

    fn args(provider: Provider, instance: &str) -> VmArgs {
        VmArgs {
            common: CommonArgs {
                config: PathBuf::from("breakeven.toml"),
                catalog: None,
                log_level: None,
                json: true,
            },
            currency: CurrencyArgs::default(),
            provider,
            instance: instance.to_string(),
            region: None,
            requests: 0,
            egress_kb: 0.0,
            internet_pct: 100.0,
        }
    }

    #[test]
    fn test_vm_hourly_instance_json() {
        let output = handle_vm(&args(Provider::Aws, "t3.small"), &context()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        let total = value["result"]["total"].as_f64().unwrap();
        assert!((total - 0.0272 * 730.0).abs() < 1e-9);
    }

    #[test]
    fn test_vm_flat_monthly_converted_to_usd() {
        let output = handle_vm(&args(Provider::Sakura, "2core-4gb"), &context()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["native"]["currency"], "jpy");
        assert_eq!(value["native"]["total"].as_f64().unwrap(), 4620.0);
        let usd = value["result"]["total"].as_f64().unwrap();
        assert!((usd - 4620.0 / 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_vm_unknown_instance() {
        let err = handle_vm(&args(Provider::Aws, "t9.huge"), &context()).unwrap_err();
        assert!(err.to_string().contains("t9.huge"));
    }

    #[test]
    fn test_vm_table_shows_native_bill() {
        let mut a = args(Provider::Sakura, "2core-4gb");
        a.common.json = false;
        let output = handle_vm(&a, &context()).unwrap();
        assert!(output.contains("sakura/2core-4gb"));
        assert!(output.contains("Billed in JPY"));
    }
}
