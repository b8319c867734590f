//! Static Reference Exchange Rates
//!
//! Hardcoded daily rate tables for targets that have no live upstream source.
//! Tables are declared with the `define_reference_rates!` macro and served
//! through the `DailyRates` port, stamped with the time of each request.
//!
//! # Adding a Currency
//! Add a line to the table's macro invocation:
//! ```ignore
//! define_reference_rates! {
//!     USD_REFERENCE_RATES: "USD", "FED" => {
//!         // ... existing rates ...
//!         KRW => dec!(0.00072),
//!     }
//! }
//! ```
//!
//! # Example
//! ```
//! use exchange_rates::{StaticRates, USD_REFERENCE_RATES};
//!
//! let rates = StaticRates::new(&USD_REFERENCE_RATES).unwrap();
//! assert_eq!(rates.target_currency().code(), "USD");
//! ```

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use rates_types::{
    CancellationToken, Currency, DailyRates, DomainError, ExchangeRate, RateError,
};

// ─────────────────────────────────────────────────────────────────────────────
// Reference Table
// ─────────────────────────────────────────────────────────────────────────────

/// A compile-time table of per-unit rates against one target currency.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceTable {
    pub target: &'static str,
    pub source_name: &'static str,
    pub rates: &'static [(&'static str, Decimal)],
}

/// Declares a `ReferenceTable` constant.
///
/// # Syntax
/// ```ignore
/// define_reference_rates! {
///     NAME: "TARGET", "Source name" => {
///         CODE => per_unit_value,
///     }
/// }
/// ```
#[macro_export]
macro_rules! define_reference_rates {
    (
        $name:ident: $target:literal, $source:literal => {
            $($code:ident => $value:expr),* $(,)?
        }
    ) => {
        pub const $name: $crate::ReferenceTable = $crate::ReferenceTable {
            target: $target,
            source_name: $source,
            rates: &[$((stringify!($code), $value)),*],
        };
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// REFERENCE TABLES - Add new rates here!
// ─────────────────────────────────────────────────────────────────────────────

define_reference_rates! {
    USD_REFERENCE_RATES: "USD", "FED" => {
        EUR => dec!(1.18),
        JPY => dec!(0.009),
        GBP => dec!(1.33),
        AUD => dec!(0.74),
        CAD => dec!(0.80),
        CZK => dec!(0.044),
        CHF => dec!(1.10),
        SEK => dec!(0.095),
        NOK => dec!(0.093),
        DKK => dec!(0.158),
        NZD => dec!(0.61),
        CNY => dec!(0.14),
        INR => dec!(0.012),
        BRL => dec!(0.20),
        MXN => dec!(0.058),
        ZAR => dec!(0.052),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DailyRates Adapter
// ─────────────────────────────────────────────────────────────────────────────

/// Serves a `ReferenceTable` as a daily rate set.
#[derive(Debug, Clone)]
pub struct StaticRates {
    target: Currency,
    source_name: &'static str,
    rates: Vec<(Currency, Decimal)>,
}

impl StaticRates {
    /// Validates the table's codes and values.
    pub fn new(table: &ReferenceTable) -> Result<Self, DomainError> {
        let target = Currency::new(table.target)?;
        let rates = table
            .rates
            .iter()
            .map(|&(code, value)| {
                let currency = Currency::new(code)?;
                if value <= Decimal::ZERO {
                    return Err(DomainError::NonPositiveRate { currency, value });
                }
                Ok((currency, value))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            target,
            source_name: table.source_name,
            rates,
        })
    }

    pub fn target_currency(&self) -> &Currency {
        &self.target
    }

    /// Name of the institution the table stands in for.
    pub fn source_name(&self) -> &'static str {
        self.source_name
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[async_trait::async_trait]
impl DailyRates for StaticRates {
    async fn daily_rates(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Arc<[ExchangeRate]>, RateError> {
        let now = Utc::now();
        let rates = self
            .rates
            .iter()
            .map(|(source, value)| {
                ExchangeRate::new(source.clone(), self.target.clone(), *value, now)
                    .map_err(|e| RateError::Normalization {
                        code: source.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = rates.len(), target = %self.target, "Serving static reference rates");
        Ok(rates.into())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    define_reference_rates! {
        BROKEN_RATES: "EUR", "Test" => {
            USD => dec!(0.0),
        }
    }

    #[test]
    fn test_usd_table_is_valid() {
        let rates = StaticRates::new(&USD_REFERENCE_RATES).unwrap();
        assert_eq!(rates.target_currency().code(), "USD");
        assert_eq!(rates.source_name(), "FED");
        assert_eq!(rates.len(), 16);
    }

    #[test]
    fn test_non_positive_table_entry_is_rejected() {
        let result = StaticRates::new(&BROKEN_RATES);
        assert!(matches!(result, Err(DomainError::NonPositiveRate { .. })));
    }

    #[tokio::test]
    async fn test_daily_rates_target_usd() {
        let rates = StaticRates::new(&USD_REFERENCE_RATES).unwrap();

        let daily = rates.daily_rates(&CancellationToken::new()).await.unwrap();

        assert_eq!(daily.len(), 16);
        assert!(daily.iter().all(|r| r.target_currency().code() == "USD"));
        assert_eq!(daily[0].source_currency().code(), "EUR");
        assert_eq!(daily[0].value(), dec!(1.18));
        assert_eq!(daily[1].value(), dec!(0.009));
    }
}
