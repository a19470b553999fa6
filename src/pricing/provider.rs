//! Provider identifiers and catalog row types.

use crate::currency::Currency;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cloud vendor.
///
/// The set of vendors is closed; everything that differs between them
/// (billing model, rates, allowances, currency) lives in catalog data.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(alias = "amazon")]
    Aws,
    #[serde(alias = "google")]
    Gcp,
    Azure,
    #[serde(alias = "oci")]
    Oracle,
    #[serde(alias = "sakura_cloud", alias = "sakura-cloud")]
    Sakura,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::Aws,
        Provider::Gcp,
        Provider::Azure,
        Provider::Oracle,
        Provider::Sakura,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Gcp => "gcp",
            Provider::Azure => "azure",
            Provider::Oracle => "oracle",
            Provider::Sakura => "sakura",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    /// Accepts vendor ids as well as the service-flavoured names users tend
    /// to type (`aws_lambda`, `aws_ec2`, `oci`, `sakura_cloud`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "aws" | "amazon" | "aws_lambda" | "aws_ec2" | "lambda" | "ec2" => Ok(Provider::Aws),
            "gcp" | "google" | "gcp_functions" | "cloud_functions" | "gce" | "gcp_compute" => {
                Ok(Provider::Gcp)
            }
            "azure" | "azure_functions" | "azure_vm" => Ok(Provider::Azure),
            "oracle" | "oci" | "oci_functions" | "oci_compute" => Ok(Provider::Oracle),
            "sakura" | "sakura_cloud" => Ok(Provider::Sakura),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// What a catalog row prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Per million serverless invocations.
    ServerlessRequest,
    /// Per GB-second of serverless compute.
    ServerlessCompute,
    /// Per instance-hour.
    VmHourly,
    /// Per instance-month, regardless of uptime.
    VmMonthly,
    /// Per GB of internet-bound data transfer.
    Egress,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::ServerlessRequest => "serverless-request",
            ResourceKind::ServerlessCompute => "serverless-compute",
            ResourceKind::VmHourly => "vm-hourly",
            ResourceKind::VmMonthly => "vm-monthly",
            ResourceKind::Egress => "egress",
        }
    }

    pub fn is_vm(&self) -> bool {
        matches!(self, ResourceKind::VmHourly | ResourceKind::VmMonthly)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a provider bills virtual machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingModel {
    /// Instance-hours, converted to a month with a fixed hours-per-month constant.
    Hourly,
    /// Fixed monthly price.
    FlatMonthly,
}

impl BillingModel {
    pub fn resource_kind(&self) -> ResourceKind {
        match self {
            BillingModel::Hourly => ResourceKind::VmHourly,
            BillingModel::FlatMonthly => ResourceKind::VmMonthly,
        }
    }
}

/// Free-tier allowance attached to a catalog row.
///
/// Units follow the row: requests, GB-seconds or GB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Allowance {
    Limited(f64),
    Unlimited,
}

impl Allowance {
    pub const NONE: Allowance = Allowance::Limited(0.0);

    /// Split `usage` into `(billable, consumed)`.
    ///
    /// `consumed` never exceeds the allowance and `billable + consumed == usage`
    /// for non-negative usage.
    pub fn apply(&self, usage: f64) -> (f64, f64) {
        let usage = usage.max(0.0);
        match *self {
            Allowance::Limited(free) => {
                let consumed = usage.min(free);
                (usage - consumed, consumed)
            }
            Allowance::Unlimited => (0.0, usage),
        }
    }

    /// Finite allowance amount, `None` when unlimited.
    pub fn amount(&self) -> Option<f64> {
        match *self {
            Allowance::Limited(free) => Some(free),
            Allowance::Unlimited => None,
        }
    }
}

impl fmt::Display for Allowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Allowance::Limited(free) => write!(f, "{}", free),
            Allowance::Unlimited => f.write_str("unlimited"),
        }
    }
}

/// One row of the pricing catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingEntry {
    pub provider: Provider,
    pub kind: ResourceKind,
    /// Set on VM rows only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_class: Option<String>,
    /// Rate per unit: per million requests, per GB-second, per hour, per
    /// month or per GB depending on `kind`.
    pub unit_rate: f64,
    pub free_allowance: Allowance,
    pub currency: Currency,
}

impl PricingEntry {
    pub fn new(provider: Provider, kind: ResourceKind, unit_rate: f64, currency: Currency) -> Self {
        Self {
            provider,
            kind,
            instance_class: None,
            unit_rate,
            free_allowance: Allowance::NONE,
            currency,
        }
    }

    pub fn with_allowance(mut self, allowance: Allowance) -> Self {
        self.free_allowance = allowance;
        self
    }

    pub fn with_instance(mut self, instance_class: impl Into<String>) -> Self {
        self.instance_class = Some(instance_class.into());
        self
    }
}
