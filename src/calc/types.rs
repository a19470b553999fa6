//! Workload and VM inputs to the calculators.

use crate::error::CostError;
use crate::pricing::Provider;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Memory allocation accepted from callers (MB).
pub const MEMORY_MB_RANGE: RangeInclusive<u32> = 128..=10_240;
/// Execution duration accepted from callers (seconds).
pub const DURATION_SECONDS_RANGE: RangeInclusive<f64> = 1.0..=900.0;
/// Monthly invocation count accepted from callers.
pub const MONTHLY_INVOCATIONS_RANGE: RangeInclusive<u64> = 0..=1_000_000_000;
/// Per-invocation egress accepted from callers (KB).
pub const EGRESS_KB_RANGE: RangeInclusive<f64> = 0.0..=1_000_000.0;
/// Internet-routed share of egress (percent).
pub const PERCENT_RANGE: RangeInclusive<f64> = 0.0..=100.0;

pub const BYTES_PER_KB: f64 = 1024.0;

fn default_true() -> bool {
    true
}

fn default_internet_percent() -> f64 {
    100.0
}

/// Serverless workload configuration.
///
/// Created per calculation; the sweep derives variants with
/// [`WorkloadProfile::with_invocations`] instead of mutating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadProfile {
    pub memory_mb: u32,
    pub duration_seconds: f64,
    #[serde(default)]
    pub monthly_invocations: u64,
    #[serde(default = "default_true")]
    pub include_free_tier: bool,
    #[serde(default)]
    pub egress_kb_per_invocation: f64,
    #[serde(default = "default_internet_percent")]
    pub internet_egress_percent: f64,
}

impl Default for WorkloadProfile {
    fn default() -> Self {
        Self {
            memory_mb: 512,
            duration_seconds: 1.0,
            monthly_invocations: 1_000_000,
            include_free_tier: true,
            egress_kb_per_invocation: 0.0,
            internet_egress_percent: 100.0,
        }
    }
}

impl WorkloadProfile {
    pub fn new(memory_mb: u32, duration_seconds: f64, monthly_invocations: u64) -> Self {
        Self {
            memory_mb,
            duration_seconds,
            monthly_invocations,
            ..Default::default()
        }
    }

    pub fn with_invocations(self, monthly_invocations: u64) -> Self {
        Self {
            monthly_invocations,
            ..self
        }
    }

    pub fn with_free_tier(self, include_free_tier: bool) -> Self {
        Self {
            include_free_tier,
            ..self
        }
    }

    pub fn with_egress(self, kb_per_invocation: f64, internet_percent: f64) -> Self {
        Self {
            egress_kb_per_invocation: kb_per_invocation,
            internet_egress_percent: internet_percent,
            ..self
        }
    }

    pub fn memory_gb(&self) -> f64 {
        self.memory_mb as f64 / 1024.0
    }

    pub fn total_egress_bytes(&self) -> f64 {
        self.egress_kb_per_invocation * BYTES_PER_KB * self.monthly_invocations as f64
    }

    /// Check the caller-side bounds.
    ///
    /// The engine assumes inputs already satisfy these; the CLI and config
    /// layer call this before handing a profile over.
    pub fn validate(&self) -> Result<(), CostError> {
        if !MEMORY_MB_RANGE.contains(&self.memory_mb) {
            return Err(CostError::invalid(
                "memory_mb",
                format!("must be between 128 and 10240, got {}", self.memory_mb),
            ));
        }
        if !DURATION_SECONDS_RANGE.contains(&self.duration_seconds) {
            return Err(CostError::invalid(
                "duration_seconds",
                format!("must be between 1 and 900, got {}", self.duration_seconds),
            ));
        }
        if !MONTHLY_INVOCATIONS_RANGE.contains(&self.monthly_invocations) {
            return Err(CostError::invalid(
                "monthly_invocations",
                format!(
                    "must be at most 1,000,000,000, got {}",
                    self.monthly_invocations
                ),
            ));
        }
        validate_egress(self.egress_kb_per_invocation, self.internet_egress_percent)
    }

    /// Reject values no valid configuration could produce.
    pub(crate) fn check_structure(&self) -> Result<(), CostError> {
        if self.memory_mb == 0 {
            return Err(CostError::invalid("memory_mb", "must be positive"));
        }
        if !self.duration_seconds.is_finite() || self.duration_seconds < 0.0 {
            return Err(CostError::invalid(
                "duration_seconds",
                format!("must be a non-negative number, got {}", self.duration_seconds),
            ));
        }
        check_egress_structure(self.egress_kb_per_invocation, self.internet_egress_percent)
    }
}

/// Traffic attributed to a VM for egress costing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrafficProfile {
    /// Requests served per month. `None` follows the swept invocation volume
    /// in a comparison and counts as zero in a standalone VM calculation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_requests: Option<u64>,
    #[serde(default)]
    pub egress_kb_per_request: f64,
    #[serde(default = "default_internet_percent")]
    pub internet_egress_percent: f64,
}

impl TrafficProfile {
    pub fn fixed(monthly_requests: u64, egress_kb_per_request: f64, internet_percent: f64) -> Self {
        Self {
            monthly_requests: Some(monthly_requests),
            egress_kb_per_request,
            internet_egress_percent: internet_percent,
        }
    }

    /// Traffic whose request count tracks the swept invocation volume.
    pub fn following(egress_kb_per_request: f64, internet_percent: f64) -> Self {
        Self {
            monthly_requests: None,
            egress_kb_per_request,
            internet_egress_percent: internet_percent,
        }
    }

    pub fn follows_volume(&self) -> bool {
        self.monthly_requests.is_none()
    }

    pub fn validate(&self) -> Result<(), CostError> {
        if let Some(requests) = self.monthly_requests {
            if !MONTHLY_INVOCATIONS_RANGE.contains(&requests) {
                return Err(CostError::invalid(
                    "traffic.monthly_requests",
                    format!("must be at most 1,000,000,000, got {}", requests),
                ));
            }
        }
        validate_egress(self.egress_kb_per_request, self.internet_egress_percent)
    }

    pub(crate) fn check_structure(&self) -> Result<(), CostError> {
        check_egress_structure(self.egress_kb_per_request, self.internet_egress_percent)
    }
}

/// A provisioned VM to compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VmSelection {
    pub provider: Provider,
    pub instance_class: String,
    /// Informational only; catalog pricing is region-agnostic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic: Option<TrafficProfile>,
}

impl VmSelection {
    pub fn new(provider: Provider, instance_class: impl Into<String>) -> Self {
        Self {
            provider,
            instance_class: instance_class.into(),
            region: None,
            label: None,
            traffic: None,
        }
    }

    pub fn with_traffic(mut self, traffic: TrafficProfile) -> Self {
        self.traffic = Some(traffic);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Identifier used as the column key in comparison output.
    pub fn id(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{}/{}", self.provider, self.instance_class),
        }
    }

    pub fn validate(&self) -> Result<(), CostError> {
        if self.instance_class.trim().is_empty() {
            return Err(CostError::invalid("instance_class", "cannot be empty"));
        }
        match &self.traffic {
            Some(traffic) => traffic.validate(),
            None => Ok(()),
        }
    }
}

fn validate_egress(kb: f64, percent: f64) -> Result<(), CostError> {
    if !EGRESS_KB_RANGE.contains(&kb) {
        return Err(CostError::invalid(
            "egress_kb",
            format!("must be between 0 and 1,000,000, got {}", kb),
        ));
    }
    if !PERCENT_RANGE.contains(&percent) {
        return Err(CostError::invalid(
            "internet_egress_percent",
            format!("must be between 0 and 100, got {}", percent),
        ));
    }
    Ok(())
}

fn check_egress_structure(kb: f64, percent: f64) -> Result<(), CostError> {
    if !kb.is_finite() || kb < 0.0 {
        return Err(CostError::invalid(
            "egress_kb",
            format!("must be a non-negative number, got {}", kb),
        ));
    }
    if !PERCENT_RANGE.contains(&percent) {
        return Err(CostError::invalid(
            "internet_egress_percent",
            format!("must be between 0 and 100, got {}", percent),
        ));
    }
    Ok(())
}
