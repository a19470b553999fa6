//! USD/JPY conversion with a caller-supplied exchange rate.
//!
//! Rates are expressed as JPY per 1 USD and must fall within a sane
//! historical band; anything else is rejected rather than clamped.

use crate::error::CostError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Accepted exchange-rate band (JPY per USD).
pub const EXCHANGE_RATE_RANGE: RangeInclusive<f64> = 50.0..=300.0;

/// Currency a price or cost is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Usd,
    Jpy,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Jpy => "¥",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Jpy => "JPY",
        }
    }

    /// Format an amount with the currency symbol.
    ///
    /// USD keeps cents; JPY has no minor unit and is rounded to whole yen.
    pub fn format(&self, amount: f64) -> String {
        match self {
            Currency::Usd => format!("${:.2}", amount),
            Currency::Jpy => format!("¥{:.0}", amount),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usd" | "$" => Ok(Currency::Usd),
            "jpy" | "yen" | "¥" => Ok(Currency::Jpy),
            _ => Err(format!("Invalid currency: {}", s)),
        }
    }
}

/// Check that `rate` lies within [`EXCHANGE_RATE_RANGE`].
pub fn validate_rate(rate: f64) -> Result<(), CostError> {
    if rate.is_finite() && EXCHANGE_RATE_RANGE.contains(&rate) {
        Ok(())
    } else {
        Err(CostError::InvalidExchangeRate(rate))
    }
}

pub fn usd_to_jpy(amount: f64, rate: f64) -> Result<f64, CostError> {
    validate_rate(rate)?;
    Ok(amount * rate)
}

pub fn jpy_to_usd(amount: f64, rate: f64) -> Result<f64, CostError> {
    validate_rate(rate)?;
    Ok(amount / rate)
}

/// Convert between any two supported currencies.
///
/// The rate is validated even when `from == to` so a bad rate is reported
/// no matter which providers happen to be compared.
pub fn convert(amount: f64, from: Currency, to: Currency, rate: f64) -> Result<f64, CostError> {
    match (from, to) {
        (Currency::Usd, Currency::Jpy) => usd_to_jpy(amount, rate),
        (Currency::Jpy, Currency::Usd) => jpy_to_usd(amount, rate),
        _ => {
            validate_rate(rate)?;
            Ok(amount)
        }
    }
}

/// Target currency and rate used to put multi-provider costs on one scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Normalization {
    pub currency: Currency,
    /// JPY per USD.
    pub exchange_rate: f64,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            currency: Currency::Usd,
            exchange_rate: 150.0,
        }
    }
}

impl Normalization {
    pub fn new(currency: Currency, exchange_rate: f64) -> Self {
        Self {
            currency,
            exchange_rate,
        }
    }

    pub fn validate(&self) -> Result<(), CostError> {
        validate_rate(self.exchange_rate)
    }

    /// Express `amount` (denominated in `from`) in the target currency.
    pub fn apply(&self, amount: f64, from: Currency) -> Result<f64, CostError> {
        convert(amount, from, self.currency, self.exchange_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_apply() {
        let norm = Normalization::new(Currency::Usd, 160.0);
        assert_eq!(norm.apply(1600.0, Currency::Jpy).unwrap(), 10.0);
        assert_eq!(norm.apply(10.0, Currency::Usd).unwrap(), 10.0);
        assert!(Normalization::new(Currency::Usd, 400.0).validate().is_err());
    }

    #[test]
    fn test_usd_to_jpy() {
        assert_eq!(usd_to_jpy(10.0, 150.0).unwrap(), 1500.0);
    }

    #[test]
    fn test_jpy_to_usd() {
        assert_eq!(jpy_to_usd(1500.0, 150.0).unwrap(), 10.0);
    }

    #[test]
    fn test_rate_band_edges_accepted() {
        assert!(usd_to_jpy(1.0, 50.0).is_ok());
        assert!(usd_to_jpy(1.0, 300.0).is_ok());
    }

    #[test]
    fn test_rate_out_of_band_rejected() {
        assert_eq!(
            usd_to_jpy(1.0, 49.99),
            Err(CostError::InvalidExchangeRate(49.99))
        );
        assert!(jpy_to_usd(1.0, 300.5).is_err());
        assert!(jpy_to_usd(1.0, f64::NAN).is_err());
        assert!(jpy_to_usd(1.0, 0.0).is_err());
    }

    #[test]
    fn test_convert_same_currency_is_identity() {
        assert_eq!(convert(42.0, Currency::Usd, Currency::Usd, 150.0).unwrap(), 42.0);
        assert_eq!(convert(42.0, Currency::Jpy, Currency::Jpy, 150.0).unwrap(), 42.0);
        assert!(convert(42.0, Currency::Usd, Currency::Usd, 10.0).is_err());
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("jpy").unwrap(), Currency::Jpy);
        assert_eq!(Currency::from_str("yen").unwrap(), Currency::Jpy);
        assert!(Currency::from_str("eur").is_err());
    }

    #[test]
    fn test_currency_format() {
        assert_eq!(Currency::Usd.format(19.856), "$19.86");
        assert_eq!(Currency::Jpy.format(1595.4), "¥1595");
    }

    #[test]
    fn test_currency_serde() {
        let json = serde_json::to_string(&Currency::Jpy).unwrap();
        assert_eq!(json, "\"jpy\"");
    }
}
