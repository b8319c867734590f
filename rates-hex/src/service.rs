//! Exchange Rate Application Service
//!
//! Request-boundary orchestration: normalizes caller input, resolves the
//! provider for the target currency and shapes the response.

use chrono::Utc;
use tracing::{info, warn};

use rates_types::{
    AppError, CancellationToken, Currency, ExchangeRateDto, ExchangeRateProvider,
    ExchangeRateResponse, ProviderInfo,
};

use crate::registry::ProviderRegistry;

/// Target currency used when the caller names none.
pub const DEFAULT_TARGET_CURRENCY: &str = "CZK";

/// Application service for exchange rate queries.
///
/// Generic over `P: ExchangeRateProvider` so tests can register in-memory providers.
pub struct ExchangeRateService<P: ExchangeRateProvider> {
    registry: ProviderRegistry<P>,
}

impl<P: ExchangeRateProvider> ExchangeRateService<P> {
    /// Creates a new service over a fixed provider registry.
    pub fn new(registry: ProviderRegistry<P>) -> Self {
        Self { registry }
    }

    /// Returns a reference to the underlying registry.
    pub fn registry(&self) -> &ProviderRegistry<P> {
        &self.registry
    }

    /// Gets rates for `codes` against `target` (default CZK).
    ///
    /// Blank codes are ignored; malformed codes are reported together.
    pub async fn get_exchange_rates(
        &self,
        target: Option<&str>,
        codes: &[String],
        cancel: &CancellationToken,
    ) -> Result<ExchangeRateResponse, AppError> {
        info!("Received request for exchange rates with {} currencies", codes.len());

        let currencies = parse_currency_codes(codes)?;
        if currencies.is_empty() {
            warn!("Exchange rate request received with no valid currency codes");
            return Err(AppError::BadRequest(
                "At least one currency code must be provided".into(),
            ));
        }

        let target = normalize_target(target);
        let provider = self.registry.resolve(&target)?;
        let rates = provider.get_exchange_rates(&currencies, cancel).await?;

        info!(
            "Successfully retrieved {} exchange rates for target currency {}",
            rates.len(),
            target
        );

        Ok(ExchangeRateResponse {
            target_currency: target,
            rates: rates.iter().map(ExchangeRateDto::from).collect(),
            retrieved_at: Utc::now(),
        })
    }

    /// Describes every registered provider.
    pub fn providers(&self) -> Vec<ProviderInfo> {
        self.registry.providers().map(|p| p.info()).collect()
    }
}

fn normalize_target(target: Option<&str>) -> String {
    target
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TARGET_CURRENCY)
        .to_ascii_uppercase()
}

/// Parses requested codes, skipping blanks and uppercasing the rest.
pub fn parse_currency_codes<S: AsRef<str>>(codes: &[S]) -> Result<Vec<Currency>, AppError> {
    let mut currencies = Vec::with_capacity(codes.len());
    let mut invalid = Vec::new();

    for code in codes.iter().map(AsRef::as_ref) {
        if code.trim().is_empty() {
            continue;
        }
        match Currency::new(code) {
            Ok(currency) => currencies.push(currency),
            Err(_) => invalid.push(code.trim().to_string()),
        }
    }

    if !invalid.is_empty() {
        warn!(invalid = ?invalid, "Rejected invalid currency codes");
        return Err(AppError::BadRequest(format!(
            "Invalid currency codes: {}",
            invalid.join(", ")
        )));
    }
    Ok(currencies)
}

/// Parses a comma-separated list such as `"USD,EUR,JPY"`.
pub fn parse_currency_list(list: &str) -> Result<Vec<Currency>, AppError> {
    if list.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Currency codes parameter is required".into(),
        ));
    }
    let codes: Vec<&str> = list.split(',').collect();
    parse_currency_codes(&codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes_uppercases_and_skips_blanks() {
        let codes = ["usd", " ", "Eur", ""];

        let currencies = parse_currency_codes(&codes).unwrap();

        let parsed: Vec<_> = currencies.iter().map(Currency::code).collect();
        assert_eq!(parsed, ["USD", "EUR"]);
    }

    #[test]
    fn test_parse_codes_reports_all_invalid() {
        let codes = ["USD", "EURO", "1AB"];

        let result = parse_currency_codes(&codes);

        assert_eq!(
            result,
            Err(AppError::BadRequest("Invalid currency codes: EURO, 1AB".into()))
        );
    }

    #[test]
    fn test_parse_list() {
        let currencies = parse_currency_list("usd, eur,JPY").unwrap();
        assert_eq!(currencies.len(), 3);
        assert_eq!(currencies[1].code(), "EUR");
    }

    #[test]
    fn test_parse_blank_list_fails() {
        assert!(matches!(
            parse_currency_list("  "),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_normalize_target() {
        assert_eq!(normalize_target(None), "CZK");
        assert_eq!(normalize_target(Some("  ")), "CZK");
        assert_eq!(normalize_target(Some(" usd ")), "USD");
    }
}
