//! Break-even search between a serverless cost curve and a VM cost.
//!
//! Serverless cost is piecewise-linear and non-decreasing in invocation count
//! once past the free tier, so the crossing is located by bisection over an
//! integer domain. The bisection is sequential by nature and runs at most
//! `ceil(log2(max - min))` iterations (27 for the default domain).
//! When VM cost also grows with volume the gap need not be monotone, so
//! [`find_break_even_sampled`] walks a list of sample volumes first and only
//! bisects inside the first bracket that changes sign.

use crate::compare::sweep::VolumeRange;
use crate::error::CostError;
use serde::{Deserialize, Serialize};

/// Seconds in the 30-day month used for calls-per-second figures.
pub const SECONDS_PER_MONTH: f64 = 30.0 * 24.0 * 3600.0;

pub fn monthly_to_per_second(monthly_invocations: u64) -> f64 {
    monthly_invocations as f64 / SECONDS_PER_MONTH
}

pub fn per_second_to_monthly(calls_per_second: f64) -> u64 {
    (calls_per_second.max(0.0) * SECONDS_PER_MONTH).round() as u64
}

/// Integer domain and monetary tolerance for the bisection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDomain {
    pub min_invocations: u64,
    pub max_invocations: u64,
    /// Stop once `|serverless - vm|` falls below this amount.
    pub tolerance: f64,
}

impl Default for SearchDomain {
    fn default() -> Self {
        Self {
            min_invocations: 1,
            max_invocations: 100_000_000,
            tolerance: 0.01,
        }
    }
}

impl SearchDomain {
    pub fn validate(&self) -> Result<(), CostError> {
        if self.min_invocations > self.max_invocations {
            return Err(CostError::invalid(
                "search.min_invocations",
                format!(
                    "min ({}) exceeds max ({})",
                    self.min_invocations, self.max_invocations
                ),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(CostError::invalid(
                "search.tolerance",
                format!("must be a positive amount, got {}", self.tolerance),
            ));
        }
        Ok(())
    }

    /// Narrow the domain to the volumes `range` tabulates.
    pub fn within_range(&self, range: &VolumeRange) -> SearchDomain {
        let min = self.min_invocations.max(range.min.max(1));
        let max = self.max_invocations.min(range.max).max(min);
        SearchDomain {
            min_invocations: min,
            max_invocations: max,
            tolerance: self.tolerance,
        }
    }
}

/// Why two cost curves never cross inside the search domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoCrossing {
    /// Serverless already costs more than the VM at the smallest volume.
    VmAlwaysCheaper,
    /// Serverless still costs less than the VM at the largest volume.
    ServerlessAlwaysCheaper,
}

/// Outcome of a break-even search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BreakEvenOutcome {
    /// First volume at which serverless cost meets or exceeds the VM cost
    /// (or is within tolerance of it).
    Found {
        monthly_invocations: u64,
        calls_per_second: f64,
        /// `serverless - vm` at the reported volume.
        residual_gap: f64,
    },
    NoBreakEvenFound { reason: NoCrossing },
}

impl BreakEvenOutcome {
    fn found(monthly_invocations: u64, residual_gap: f64) -> Self {
        BreakEvenOutcome::Found {
            monthly_invocations,
            calls_per_second: monthly_to_per_second(monthly_invocations),
            residual_gap,
        }
    }

    pub fn monthly_invocations(&self) -> Option<u64> {
        match self {
            BreakEvenOutcome::Found {
                monthly_invocations,
                ..
            } => Some(*monthly_invocations),
            BreakEvenOutcome::NoBreakEvenFound { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, BreakEvenOutcome::Found { .. })
    }
}

/// Break-even result for one VM.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakEvenResult {
    pub vm_id: String,
    /// VM monthly cost at the crossing, or at the profile's own volume when
    /// there is none.
    pub vm_monthly_cost: f64,
    #[serde(flatten)]
    pub outcome: BreakEvenOutcome,
}

/// Find the smallest volume where `gap(x) = serverless(x) - vm(x)` reaches zero.
///
/// `gap` must be non-decreasing in `x`. A crossing within tolerance of either
/// end of the domain is reported as found; a gap that is already positive at
/// `min`, or still negative at `max`, is reported as no crossing.
pub fn find_break_even<F>(gap: F, domain: &SearchDomain) -> Result<BreakEvenOutcome, CostError>
where
    F: FnMut(u64) -> Result<f64, CostError>,
{
    find_break_even_sampled(gap, domain, &[])
}

/// Like [`find_break_even`], but evaluates the ascending `samples` before
/// bisecting, so a gap that rises and falls again still has its first sign
/// change bracketed.
///
/// Bisection runs between the last sample where serverless is cheaper by more
/// than the tolerance and the first sample where it is not. Samples outside the
/// domain are skipped.
pub fn find_break_even_sampled<F>(
    mut gap: F,
    domain: &SearchDomain,
    samples: &[u64],
) -> Result<BreakEvenOutcome, CostError>
where
    F: FnMut(u64) -> Result<f64, CostError>,
{
    domain.validate()?;
    let tolerance = domain.tolerance;
    let (min, max) = (domain.min_invocations, domain.max_invocations);

    let min_gap = gap(min)?;
    if min_gap.abs() < tolerance {
        return Ok(BreakEvenOutcome::found(min, min_gap));
    }
    if min_gap > 0.0 {
        return Ok(BreakEvenOutcome::NoBreakEvenFound {
            reason: NoCrossing::VmAlwaysCheaper,
        });
    }

    let candidates = samples
        .iter()
        .copied()
        .filter(|&x| x < max)
        .chain(std::iter::once(max));

    let mut lo = min;
    for volume in candidates {
        if volume <= lo {
            continue;
        }
        let volume_gap = gap(volume)?;
        if volume_gap >= 0.0 || volume_gap.abs() < tolerance {
            return bisect(&mut gap, lo, volume, volume_gap, tolerance);
        }
        lo = volume;
    }

    Ok(BreakEvenOutcome::NoBreakEvenFound {
        reason: NoCrossing::ServerlessAlwaysCheaper,
    })
}

/// Bisect `[lo, hi]` where `gap(lo)` is negative beyond tolerance.
fn bisect<F>(
    gap: &mut F,
    mut lo: u64,
    mut hi: u64,
    mut hi_gap: f64,
    tolerance: f64,
) -> Result<BreakEvenOutcome, CostError>
where
    F: FnMut(u64) -> Result<f64, CostError>,
{
    let mut iterations = 0u32;
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        let mid_gap = gap(mid)?;
        iterations += 1;
        tracing::trace!(lo, hi, mid, gap = mid_gap, "Bisection step");

        if mid_gap.abs() < tolerance {
            return Ok(BreakEvenOutcome::found(mid, mid_gap));
        }
        if mid_gap < 0.0 {
            lo = mid;
        } else {
            hi = mid;
            hi_gap = mid_gap;
        }
    }

    tracing::trace!(iterations, volume = hi, "Bisection bracket collapsed");
    Ok(BreakEvenOutcome::found(hi, hi_gap))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_gap(per_call: f64, fixed: f64) -> impl FnMut(u64) -> Result<f64, CostError> {
        move |x| Ok(x as f64 * per_call - fixed)
    }

    #[test]
    fn test_finds_linear_crossing() {
        // $0.0001 per call vs $50 => 500,000 calls
        let outcome = find_break_even(linear_gap(0.0001, 50.0), &SearchDomain::default()).unwrap();
        match outcome {
            BreakEvenOutcome::Found {
                monthly_invocations,
                residual_gap,
                calls_per_second,
            } => {
                assert!(residual_gap.abs() < 0.01);
                assert!((monthly_invocations as i64 - 500_000).abs() <= 100);
                assert!((calls_per_second - monthly_invocations as f64 / 2_592_000.0).abs() < 1e-12);
            }
            other => panic!("expected crossing, got {:?}", other),
        }
    }

    #[test]
    fn test_collapsed_bracket_reports_first_volume_at_or_above() {
        // Steps of $1 per call, tolerance cannot be met: crossing between 10 and 11
        let outcome =
            find_break_even(|x| Ok(x as f64 - 10.5), &SearchDomain::default()).unwrap();
        assert_eq!(outcome.monthly_invocations(), Some(11));
    }

    #[test]
    fn test_vm_always_cheaper() {
        let outcome = find_break_even(|_| Ok(5.0), &SearchDomain::default()).unwrap();
        assert_eq!(
            outcome,
            BreakEvenOutcome::NoBreakEvenFound {
                reason: NoCrossing::VmAlwaysCheaper
            }
        );
    }

    #[test]
    fn test_serverless_always_cheaper() {
        let outcome = find_break_even(linear_gap(1e-9, 1000.0), &SearchDomain::default()).unwrap();
        assert_eq!(
            outcome,
            BreakEvenOutcome::NoBreakEvenFound {
                reason: NoCrossing::ServerlessAlwaysCheaper
            }
        );
    }

    #[test]
    fn test_crossing_at_domain_start_is_found_not_missing() {
        let outcome = find_break_even(|_| Ok(0.001), &SearchDomain::default()).unwrap();
        assert_eq!(outcome.monthly_invocations(), Some(1));
    }

    #[test]
    fn test_crossing_at_domain_end_is_found() {
        let domain = SearchDomain::default();
        let max = domain.max_invocations;
        let outcome = find_break_even(move |x| Ok(x as f64 - max as f64), &domain).unwrap();
        assert_eq!(outcome.monthly_invocations(), Some(max));
    }

    #[test]
    fn test_iteration_count_bounded() {
        let mut calls = 0;
        find_break_even(
            |x| {
                calls += 1;
                Ok(x as f64 - 12_345_678.5)
            },
            &SearchDomain::default(),
        )
        .unwrap();
        // two endpoint evaluations plus at most 27 bisection steps
        assert!(calls <= 29, "took {} evaluations", calls);
    }

    #[test]
    fn test_errors_propagate() {
        let result = find_break_even(
            |_| Err(CostError::invalid("x", "boom")),
            &SearchDomain::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_domain() {
        let domain = SearchDomain {
            min_invocations: 10,
            max_invocations: 1,
            tolerance: 0.01,
        };
        assert!(find_break_even(|_| Ok(0.0), &domain).is_err());

        let domain = SearchDomain {
            tolerance: 0.0,
            ..Default::default()
        };
        assert!(find_break_even(|_| Ok(0.0), &domain).is_err());
    }

    #[test]
    fn test_samples_bracket_gap_that_falls_back() {
        // Serverless dearer only between 1,000 and 3,000 calls
        let bump = |x: u64| Ok(if (1_000..3_000).contains(&x) { 5.0 } else { -5.0 });

        let unsampled = find_break_even(bump, &SearchDomain::default()).unwrap();
        assert_eq!(
            unsampled,
            BreakEvenOutcome::NoBreakEvenFound {
                reason: NoCrossing::ServerlessAlwaysCheaper
            }
        );

        let outcome =
            find_break_even_sampled(bump, &SearchDomain::default(), &[500, 1_500, 5_000]).unwrap();
        assert_eq!(outcome.monthly_invocations(), Some(1_000));
    }

    #[test]
    fn test_samples_outside_domain_ignored() {
        let domain = SearchDomain {
            min_invocations: 100,
            max_invocations: 1_000,
            tolerance: 0.01,
        };
        let outcome =
            find_break_even_sampled(|x| Ok(x as f64 - 500.5), &domain, &[1, 50, 5_000]).unwrap();
        assert_eq!(outcome.monthly_invocations(), Some(501));
    }

    #[test]
    fn test_within_range_narrows_to_swept_volumes() {
        let domain = SearchDomain::default().within_range(&VolumeRange::new(100_000, 1_000_000, 10));
        assert_eq!(domain.min_invocations, 100_000);
        assert_eq!(domain.max_invocations, 1_000_000);
        assert_eq!(domain.tolerance, 0.01);

        let domain = SearchDomain::default().within_range(&VolumeRange::new(0, 500_000_000, 10));
        assert_eq!(domain.min_invocations, 1);
        assert_eq!(domain.max_invocations, 100_000_000);
    }

    #[test]
    fn test_rate_conversions() {
        assert_eq!(monthly_to_per_second(2_592_000), 1.0);
        assert_eq!(per_second_to_monthly(10.0), 25_920_000);
        assert_eq!(per_second_to_monthly(-1.0), 0);
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let json = serde_json::to_value(BreakEvenOutcome::NoBreakEvenFound {
            reason: NoCrossing::VmAlwaysCheaper,
        })
        .unwrap();
        assert_eq!(json["status"], "no_break_even_found");
        assert_eq!(json["reason"], "vm_always_cheaper");

        let result = BreakEvenResult {
            vm_id: "aws/t3.small".to_string(),
            vm_monthly_cost: 19.856,
            outcome: BreakEvenOutcome::found(100, 0.0),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "found");
        assert_eq!(json["monthly_invocations"], 100);
        assert_eq!(json["vm_id"], "aws/t3.small");
    }
}
