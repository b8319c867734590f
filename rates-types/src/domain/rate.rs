//! Raw upstream quotes and canonical per-unit exchange rates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use super::Currency;
use crate::error::DomainError;

/// A daily rate entry as published upstream.
///
/// `quoted_rate` is the price of `quote_amount` units of the quoted currency,
/// e.g. amount 100 and rate 17.00 means 17.00 target units per 100 JPY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRateQuote {
    pub currency_code: String,
    pub quote_amount: i64,
    pub quoted_rate: Decimal,
    pub valid_for: Option<DateTime<Utc>>,
}

/// Canonical exchange rate: one unit of `source_currency` is worth
/// `value` units of `target_currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeRate {
    source_currency: Currency,
    target_currency: Currency,
    value: Decimal,
    valid_for: DateTime<Utc>,
}

impl ExchangeRate {
    /// Creates a new exchange rate. The per-unit value must be positive.
    pub fn new(
        source_currency: Currency,
        target_currency: Currency,
        value: Decimal,
        valid_for: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::NonPositiveRate {
                currency: source_currency,
                value,
            });
        }
        Ok(Self {
            source_currency,
            target_currency,
            value,
            valid_for,
        })
    }

    pub fn source_currency(&self) -> &Currency {
        &self.source_currency
    }

    pub fn target_currency(&self) -> &Currency {
        &self.target_currency
    }

    /// Per-unit value in the target currency.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn valid_for(&self) -> DateTime<Utc> {
        self.valid_for
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}={}",
            self.source_currency, self.target_currency, self.value
        )
    }
}
