//! Currency normalisation configuration

use crate::currency::{Currency, Normalization};
use serde::{Deserialize, Serialize};

/// Reporting currency and USD/JPY rate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Currency every comparison is reported in
    pub report: Currency,
    /// JPY per USD
    pub exchange_rate: f64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        let norm = Normalization::default();
        Self {
            report: norm.currency,
            exchange_rate: norm.exchange_rate,
        }
    }
}

impl CurrencyConfig {
    pub fn normalization(&self) -> Normalization {
        Normalization::new(self.report, self.exchange_rate)
    }
}
