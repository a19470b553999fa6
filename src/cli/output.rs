//! Output formatting helpers for CLI commands

use crate::calc::CostBreakdown;
use crate::compare::{BreakEvenOutcome, ComparisonReport, NoCrossing, SERVERLESS_LABEL};
use crate::currency::Currency;
use crate::pricing::{Allowance, PricingEntry, ResourceKind};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Group digits in thousands: `1234567` -> `1,234,567`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Unit a catalog rate is quoted in.
pub fn rate_unit(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::ServerlessRequest => "per 1M requests",
        ResourceKind::ServerlessCompute => "per GB-second",
        ResourceKind::VmHourly => "per hour",
        ResourceKind::VmMonthly => "per month",
        ResourceKind::Egress => "per GB",
    }
}

/// Format cost breakdowns as a table, cheapest total highlighted.
pub fn format_breakdowns_table(breakdowns: &[CostBreakdown]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Provider", "Requests", "Compute", "Instance", "Egress", "Total",
    ]);

    let cheapest = breakdowns
        .iter()
        .map(|b| b.total)
        .min_by(|a, b| a.total_cmp(b));

    for b in breakdowns {
        let c = b.currency;
        let total = c.format(b.total);
        let total = if breakdowns.len() > 1 && Some(b.total) == cheapest {
            total.green().bold().to_string()
        } else {
            total
        };
        table.add_row(vec![
            Cell::new(b.provider),
            Cell::new(c.format(b.request_charge)),
            Cell::new(c.format(b.compute_charge)),
            Cell::new(c.format(b.instance_charge)),
            Cell::new(c.format(b.egress_charge)),
            Cell::new(total),
        ]);
    }

    table.to_string()
}

/// Billing quantities and free-tier use for one breakdown
pub fn format_usage_table(breakdown: &CostBreakdown) -> String {
    let usage = &breakdown.usage;
    let free = &breakdown.free_tier;

    let mut table = new_table();
    table.set_header(vec!["Quantity", "Value"]);
    table.add_row(vec![
        Cell::new("Billable requests"),
        Cell::new(format_count(usage.billable_requests)),
    ]);
    table.add_row(vec![
        Cell::new("GB-seconds"),
        Cell::new(format!("{:.2}", usage.total_gb_seconds)),
    ]);
    table.add_row(vec![
        Cell::new("Billable GB-seconds"),
        Cell::new(format!("{:.2}", usage.billable_gb_seconds)),
    ]);
    table.add_row(vec![
        Cell::new("Free-tier requests used"),
        Cell::new(format_count(free.requests)),
    ]);
    table.add_row(vec![
        Cell::new("Free-tier GB-seconds used"),
        Cell::new(format!("{:.2}", free.gb_seconds)),
    ]);
    table.add_row(vec![
        Cell::new("Internet egress (GB)"),
        Cell::new(format!("{:.3}", usage.internet_egress_gb)),
    ]);
    table.add_row(vec![
        Cell::new("Billed egress (GB)"),
        Cell::new(format!("{:.3}", usage.billed_egress_gb)),
    ]);
    table.to_string()
}

/// Format the swept volume table; the cheapest cell of each row is green.
pub fn format_points_table(report: &ComparisonReport) -> String {
    let c = report.currency;
    let vm_ids: Vec<&str> = report
        .vm_baselines
        .iter()
        .map(|b| b.vm_id.as_str())
        .collect();

    let mut header = vec![
        "Invocations/month".to_string(),
        "Calls/sec".to_string(),
        format!("{} ({})", SERVERLESS_LABEL, report.serverless_provider),
    ];
    header.extend(vm_ids.iter().map(|id| id.to_string()));

    let mut table = new_table();
    table.set_header(header);

    for point in &report.points {
        let (winner, _) = point.cheapest();
        let highlight = |id: &str, amount: f64| {
            let text = c.format(amount);
            if id == winner {
                text.green().to_string()
            } else {
                text
            }
        };

        let mut row = vec![
            Cell::new(format_count(point.monthly_invocations)),
            Cell::new(format!("{:.3}", point.calls_per_second)),
            Cell::new(highlight(SERVERLESS_LABEL, point.serverless_cost)),
        ];
        for id in &vm_ids {
            let cost = point.vm_costs.get(*id).copied().unwrap_or_default();
            row.push(Cell::new(highlight(id, cost)));
        }
        table.add_row(row);
    }

    table.to_string()
}

/// Format per-VM break-even results.
pub fn format_break_even_table(report: &ComparisonReport) -> String {
    let c = report.currency;
    let mut table = new_table();
    table.set_header(vec![
        "VM",
        "VM cost/month",
        "Break-even invocations/month",
        "Calls/sec",
        "Status",
    ]);

    for result in &report.break_even {
        let (volume, rate, status) = match result.outcome {
            BreakEvenOutcome::Found {
                monthly_invocations,
                calls_per_second,
                ..
            } => (
                format_count(monthly_invocations),
                format!("{:.3}", calls_per_second),
                "Found".green().to_string(),
            ),
            BreakEvenOutcome::NoBreakEvenFound { reason } => {
                let status = match reason {
                    NoCrossing::VmAlwaysCheaper => "VM always cheaper".yellow().to_string(),
                    NoCrossing::ServerlessAlwaysCheaper => {
                        "Serverless always cheaper".cyan().to_string()
                    }
                };
                ("-".to_string(), "-".to_string(), status)
            }
        };
        table.add_row(vec![
            Cell::new(&result.vm_id),
            Cell::new(c.format(result.vm_monthly_cost)),
            Cell::new(volume),
            Cell::new(rate),
            Cell::new(status),
        ]);
    }

    table.to_string()
}

/// Format catalog rows as a table
pub fn format_catalog_table(entries: &[&PricingEntry]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Provider", "Resource", "Instance", "Rate", "Unit", "Free"]);

    for e in entries {
        let free = match e.free_allowance {
            Allowance::Limited(amount) if amount == 0.0 => "-".to_string(),
            allowance => allowance.to_string(),
        };
        table.add_row(vec![
            Cell::new(e.provider),
            Cell::new(e.kind),
            Cell::new(e.instance_class.as_deref().unwrap_or("-")),
            Cell::new(format!("{}{}", e.currency.symbol(), e.unit_rate)),
            Cell::new(rate_unit(e.kind)),
            Cell::new(free),
        ]);
    }

    table.to_string()
}

/// One-line conversion summary
pub fn format_conversion(amount: f64, from: Currency, result: f64, to: Currency, rate: f64) -> String {
    format!(
        "{} = {} (1 USD = {} JPY)",
        from.format(amount),
        to.format(result).bold(),
        rate
    )
}

/// Pretty-printed JSON for any serialisable value.
pub fn format_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
