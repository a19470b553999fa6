//! Error types for cost calculations.

use thiserror::Error;

/// Errors that can occur while computing costs or break-even points.
///
/// A calculation either fully succeeds or fails with one of these; no partial
/// breakdowns are ever returned. "No break-even" is not an error, see
/// [`crate::compare::BreakEvenOutcome`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CostError {
    /// Structurally impossible input reached the engine.
    #[error("Invalid value for '{field}': {message}")]
    InvalidConfiguration { field: String, message: String },

    /// No catalog row for this provider and resource kind.
    #[error("No pricing for {resource} on provider '{provider}'")]
    UnknownProviderOrResource { provider: String, resource: String },

    /// The provider exists but does not offer this instance class.
    #[error("Unknown instance type '{instance_class}' for provider '{provider}'")]
    UnknownInstanceType {
        provider: String,
        instance_class: String,
    },

    /// Exchange rate outside the accepted band.
    #[error("Exchange rate {0} is outside the accepted range (50-300 JPY per USD)")]
    InvalidExchangeRate(f64),
}

impl CostError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        CostError::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the caller can fix this by re-requesting with different input.
    ///
    /// Catalog lookups and exchange rates are user-correctable; an
    /// `InvalidConfiguration` means upstream validation was skipped.
    pub fn is_user_correctable(&self) -> bool {
        !matches!(self, CostError::InvalidConfiguration { .. })
    }
}
