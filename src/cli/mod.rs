//! CLI module for breakeven
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serverless` - Monthly serverless cost for one or every provider
//! - `vm` - Monthly cost of a single VM instance
//! - `compare` - Sweep invocation volume and find break-even points
//! - `catalog` - Show the pricing catalog
//! - `convert` - Convert an amount between USD and JPY
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Lambda cost for 5M invocations of a 1 GB, 2 second function
//! breakeven serverless -p aws -m 1024 -d 2 -n 5000000
//!
//! # Where does Lambda stop beating a t3.small?
//! breakeven compare -p aws --vm aws:t3.small
//!
//! # Generate shell completions
//! breakeven completions bash > ~/.bash_completion.d/breakeven
//! ```

pub mod catalog;
pub mod compare;
pub mod completions;
pub mod config;
pub mod context;
pub mod convert;
pub mod output;
pub mod serverless;
pub mod vm;

pub use catalog::handle_catalog;
pub use compare::handle_compare;
pub use completions::handle_completions;
pub use config::handle_config_init;
pub use context::{load_config, Context};
pub use convert::handle_convert;
pub use serverless::handle_serverless;
pub use vm::handle_vm;

use crate::calc::{VmSelection, WorkloadProfile};
use crate::compare::{per_second_to_monthly, Spacing};
use crate::config::AppConfig;
use crate::currency::{Currency, Normalization};
use crate::pricing::Provider;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// breakeven - Serverless vs VM cost calculator
#[derive(Parser, Debug)]
#[command(
    name = "breakeven",
    version,
    about = "Serverless vs VM monthly cost comparison and break-even search"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Monthly serverless cost
    Serverless(ServerlessArgs),
    /// Monthly VM cost
    Vm(VmArgs),
    /// Compare serverless against VMs across invocation volumes
    Compare(CompareArgs),
    /// Show pricing catalog
    Catalog(CatalogArgs),
    /// Convert an amount between USD and JPY
    Convert(ConvertArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Flags shared by every command that reads configuration.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "breakeven.toml")]
    pub config: PathBuf,

    /// Pricing catalog file replacing the built-in rates
    #[arg(long, env = "BREAKEVEN_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BREAKEVEN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CurrencyArgs {
    /// Report currency (usd, jpy)
    #[arg(long)]
    pub currency: Option<Currency>,

    /// Exchange rate in JPY per USD (50-300)
    #[arg(long)]
    pub rate: Option<f64>,
}

impl CurrencyArgs {
    /// Configured normalisation with flag overrides applied
    pub fn normalization(&self, config: &AppConfig) -> Normalization {
        let base = config.currency.normalization();
        Normalization::new(
            self.currency.unwrap_or(base.currency),
            self.rate.unwrap_or(base.exchange_rate),
        )
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct WorkloadArgs {
    /// Memory allocation in MB (128-10240)
    #[arg(short, long)]
    pub memory: Option<u32>,

    /// Execution duration in seconds (1-900)
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Monthly invocation count
    #[arg(short = 'n', long, conflicts_with = "rps")]
    pub invocations: Option<u64>,

    /// Invocation rate in calls per second, converted over a 30-day month
    #[arg(long)]
    pub rps: Option<f64>,

    /// Ignore free-tier allowances
    #[arg(long)]
    pub no_free_tier: bool,

    /// Egress per invocation in KB
    #[arg(long)]
    pub egress_kb: Option<f64>,

    /// Share of egress routed to the internet (0-100)
    #[arg(long)]
    pub internet_pct: Option<f64>,
}

impl WorkloadArgs {
    /// Overlay the flags that were given onto `base`.
    pub fn apply(&self, base: WorkloadProfile) -> WorkloadProfile {
        let mut profile = base;
        if let Some(memory) = self.memory {
            profile.memory_mb = memory;
        }
        if let Some(duration) = self.duration {
            profile.duration_seconds = duration;
        }
        if let Some(invocations) = self.invocations {
            profile.monthly_invocations = invocations;
        } else if let Some(rps) = self.rps {
            profile.monthly_invocations = per_second_to_monthly(rps);
        }
        if self.no_free_tier {
            profile.include_free_tier = false;
        }
        if let Some(kb) = self.egress_kb {
            profile.egress_kb_per_invocation = kb;
        }
        if let Some(pct) = self.internet_pct {
            profile.internet_egress_percent = pct;
        }
        profile
    }
}

#[derive(Args, Debug)]
pub struct ServerlessArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub workload: WorkloadArgs,

    #[command(flatten)]
    pub currency: CurrencyArgs,

    /// Provider (aws, gcp, azure, oracle); omit to compare all
    #[arg(short, long)]
    pub provider: Option<Provider>,
}

#[derive(Args, Debug)]
pub struct VmArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub currency: CurrencyArgs,

    /// Provider (aws, gcp, azure, oracle, sakura)
    #[arg(short, long)]
    pub provider: Provider,

    /// Instance class (e.g., t3.small, e2-small, 2core-4gb)
    #[arg(short, long)]
    pub instance: String,

    /// Region, informational only
    #[arg(long)]
    pub region: Option<String>,

    /// Monthly requests served, used for egress
    #[arg(long, default_value_t = 0)]
    pub requests: u64,

    /// Egress per request in KB
    #[arg(long, default_value_t = 0.0)]
    pub egress_kb: f64,

    /// Share of egress routed to the internet (0-100)
    #[arg(long, default_value_t = 100.0)]
    pub internet_pct: f64,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub workload: WorkloadArgs,

    #[command(flatten)]
    pub currency: CurrencyArgs,

    /// Serverless provider to compare
    #[arg(short, long)]
    pub provider: Option<Provider>,

    /// VM to compare against as PROVIDER:INSTANCE (repeatable)
    #[arg(long = "vm", value_name = "PROVIDER:INSTANCE", value_parser = parse_vm_spec)]
    pub vms: Vec<VmSelection>,

    /// Smallest swept monthly volume
    #[arg(long)]
    pub min: Option<u64>,

    /// Largest swept monthly volume
    #[arg(long)]
    pub max: Option<u64>,

    /// Number of sweep points
    #[arg(long)]
    pub points: Option<usize>,

    /// Sweep spacing (linear, logarithmic, auto)
    #[arg(long)]
    pub spacing: Option<Spacing>,
}

#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Only show rows for this provider
    #[arg(short, long)]
    pub provider: Option<Provider>,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Amount to convert
    pub amount: f64,

    /// Currency of the amount (usd, jpy)
    #[arg(short, long, default_value = "usd")]
    pub from: Currency,

    /// Exchange rate in JPY per USD (50-300)
    #[arg(short, long, default_value_t = 150.0)]
    pub rate: f64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "breakeven.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Parse `provider:instance`, e.g. `aws:t3.small`.
pub fn parse_vm_spec(s: &str) -> Result<VmSelection, String> {
    let (provider, instance) = s
        .split_once(':')
        .ok_or_else(|| format!("Expected PROVIDER:INSTANCE, got '{}'", s))?;
    if instance.trim().is_empty() {
        return Err(format!("Missing instance class in '{}'", s));
    }
    let provider: Provider = provider.parse()?;
    Ok(VmSelection::new(provider, instance.trim()))
}
