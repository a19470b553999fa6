//! Per-provider monthly cost calculators.
//!
//! All calculators read from one shared [`PricingCatalog`](crate::pricing::PricingCatalog)
//! and return a [`CostBreakdown`] in the provider's native currency.
//!
//! # Example
//!
//! ```rust
//! use breakeven::calc::{ServerlessCalculator, WorkloadProfile};
//! use breakeven::pricing::{PricingCatalog, Provider};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(PricingCatalog::builtin().unwrap());
//! let calc = ServerlessCalculator::new(catalog);
//!
//! let profile = WorkloadProfile::new(512, 10.0, 1_000_000);
//! let cost = calc.compute_serverless_cost(&profile, Provider::Aws).unwrap();
//! assert_eq!(cost.request_charge, 0.0); // within the free tier
//! assert!(cost.compute_charge > 0.0);
//! ```

pub mod breakdown;
pub mod egress;
pub mod serverless;
pub mod types;
pub mod vm;

pub use breakdown::{CostBreakdown, FreeTierConsumption, UsageSummary};
pub use egress::{EgressCalculator, EgressCost, BYTES_PER_GB};
pub use serverless::ServerlessCalculator;
pub use types::{TrafficProfile, VmSelection, WorkloadProfile};
pub use vm::{VmCalculator, HOURS_PER_MONTH};
