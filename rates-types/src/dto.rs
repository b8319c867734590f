//! Data Transfer Objects (DTOs) for the request boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ExchangeRate;

// ─────────────────────────────────────────────────────────────────────────────
// Exchange Rate DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// A single rate as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateDto {
    pub source_currency: String,
    pub target_currency: String,
    /// Value of one unit of the source currency in the target currency
    pub rate: Decimal,
    pub valid_for: DateTime<Utc>,
}

impl From<&ExchangeRate> for ExchangeRateDto {
    fn from(rate: &ExchangeRate) -> Self {
        Self {
            source_currency: rate.source_currency().code().to_string(),
            target_currency: rate.target_currency().code().to_string(),
            rate: rate.value(),
            valid_for: rate.valid_for(),
        }
    }
}

/// Response containing exchange rates and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateResponse {
    /// Target currency code used for all rates
    pub target_currency: String,
    pub rates: Vec<ExchangeRateDto>,
    /// UTC timestamp when the rates were retrieved
    pub retrieved_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Description of a registered exchange rate provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub currency_code: String,
    pub name: String,
    pub description: String,
    pub endpoint: String,
}
