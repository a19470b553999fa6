//! Invocation-volume sweep generation.

use crate::error::CostError;
use serde::{Deserialize, Serialize};

/// Upper bound on sweep resolution.
pub const MAX_SWEEP_POINTS: usize = 10_000;

/// How sweep points are distributed between `min` and `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    Linear,
    Logarithmic,
    /// Logarithmic when the range spans two or more orders of magnitude.
    #[default]
    Auto,
}

impl Spacing {
    /// Concrete spacing for a range; never returns `Auto`.
    pub fn resolve(self, min: u64, max: u64) -> Spacing {
        match self {
            Spacing::Auto => {
                if max as f64 / min.max(1) as f64 >= 100.0 {
                    Spacing::Logarithmic
                } else {
                    Spacing::Linear
                }
            }
            other => other,
        }
    }
}

impl std::str::FromStr for Spacing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" | "lin" => Ok(Spacing::Linear),
            "logarithmic" | "log" => Ok(Spacing::Logarithmic),
            "auto" => Ok(Spacing::Auto),
            _ => Err(format!("Invalid spacing: {}", s)),
        }
    }
}

/// Range of monthly invocation counts to tabulate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeRange {
    pub min: u64,
    pub max: u64,
    pub points: usize,
    pub spacing: Spacing,
}

impl Default for VolumeRange {
    fn default() -> Self {
        Self {
            min: 10_000,
            max: 100_000_000,
            points: 50,
            spacing: Spacing::Auto,
        }
    }
}

impl VolumeRange {
    pub fn new(min: u64, max: u64, points: usize) -> Self {
        Self {
            min,
            max,
            points,
            spacing: Spacing::Auto,
        }
    }

    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn validate(&self) -> Result<(), CostError> {
        if self.min > self.max {
            return Err(CostError::invalid(
                "sweep.min",
                format!("min ({}) exceeds max ({})", self.min, self.max),
            ));
        }
        if self.min != self.max && self.points < 2 {
            return Err(CostError::invalid(
                "sweep.points",
                "need at least 2 points for a range",
            ));
        }
        if self.points > MAX_SWEEP_POINTS {
            return Err(CostError::invalid(
                "sweep.points",
                format!("at most {} points allowed, got {}", MAX_SWEEP_POINTS, self.points),
            ));
        }
        Ok(())
    }

    /// Strictly increasing volumes from `min` to `max` inclusive, and the
    /// spacing actually used.
    ///
    /// Rounding can collapse neighbouring points at the low end of a narrow
    /// range, so fewer than `points` values may come back.
    pub fn volumes(&self) -> Result<(Vec<u64>, Spacing), CostError> {
        self.validate()?;
        let spacing = self.spacing.resolve(self.min, self.max);

        if self.min == self.max {
            return Ok((vec![self.min], spacing));
        }

        let n = self.points;
        let last = (n - 1) as f64;
        let mut volumes: Vec<u64> = match spacing {
            Spacing::Logarithmic => {
                let lo = self.min.max(1) as f64;
                let (ln_lo, ln_hi) = (lo.ln(), (self.max as f64).ln());
                (0..n)
                    .map(|i| (ln_lo + (ln_hi - ln_lo) * i as f64 / last).exp().round() as u64)
                    .collect()
            }
            _ => {
                let span = (self.max - self.min) as f64;
                (0..n)
                    .map(|i| self.min + (span * i as f64 / last).round() as u64)
                    .collect()
            }
        };

        volumes[0] = self.min;
        volumes[n - 1] = self.max;
        for v in volumes.iter_mut() {
            *v = (*v).clamp(self.min, self.max);
        }
        // exp/ln round-off can leave a point out of order next to a pinned end
        volumes.sort_unstable();
        volumes.dedup();

        Ok((volumes, spacing))
    }
}
