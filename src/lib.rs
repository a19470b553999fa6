//! breakeven - Serverless vs VM cost calculation and break-even engine
//!
//! Computes the monthly cost of a serverless workload and of provisioned VMs
//! from a static pricing catalog, tabulates both across an invocation-volume
//! sweep, and locates the volume at which the VM becomes the cheaper option.
//!
//! ```
//! use breakeven::calc::{VmSelection, WorkloadProfile};
//! use breakeven::compare::{ComparisonEngine, ComparisonRequest};
//! use breakeven::pricing::{PricingCatalog, Provider};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(PricingCatalog::builtin().unwrap());
//! let request = ComparisonRequest::new(
//!     WorkloadProfile::new(512, 1.0, 1_000_000),
//!     Provider::Aws,
//!     vec![VmSelection::new(Provider::Aws, "t3.small")],
//! );
//! let report = ComparisonEngine::new(catalog).build_comparison(&request).unwrap();
//! assert_eq!(report.break_even.len(), 1);
//! ```

pub mod calc;
pub mod cli;
pub mod compare;
pub mod config;
pub mod currency;
pub mod error;
pub mod logging;
pub mod pricing;

pub use error::CostError;
