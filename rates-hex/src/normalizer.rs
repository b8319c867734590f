//! Rate normalizer: raw upstream quotes to per-unit exchange rates.
//!
//! Upstream quotes some currencies per 100 or 1000 units. Every output rate
//! is `quoted_rate / quote_amount` in decimal arithmetic, in input order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use rates_types::{Currency, ExchangeRate, RateError, RawRateQuote};

/// What to do with a quote that cannot become a valid rate
/// (non-positive amount, non-positive rate, or a malformed code).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidQuotePolicy {
    /// Drop the entry, log it, keep going.
    #[default]
    Skip,
    /// Abort the whole batch with `RateError::Normalization`.
    Reject,
}

/// Converts raw quotes into canonical rates against one target currency.
#[derive(Debug, Clone)]
pub struct RateNormalizer {
    target: Currency,
    policy: InvalidQuotePolicy,
}

impl RateNormalizer {
    pub fn new(target: Currency) -> Self {
        Self {
            target,
            policy: InvalidQuotePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: InvalidQuotePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn target_currency(&self) -> &Currency {
        &self.target
    }

    pub fn policy(&self) -> InvalidQuotePolicy {
        self.policy
    }

    /// Normalizes a batch. Quotes without a `valid_for` are stamped with the
    /// current time.
    pub fn normalize(&self, quotes: Vec<RawRateQuote>) -> Result<Vec<ExchangeRate>, RateError> {
        self.normalize_at(quotes, Utc::now())
    }

    pub fn normalize_at(
        &self,
        quotes: Vec<RawRateQuote>,
        fetched_at: DateTime<Utc>,
    ) -> Result<Vec<ExchangeRate>, RateError> {
        let mut rates = Vec::with_capacity(quotes.len());
        for quote in quotes {
            match self.normalize_one(&quote, fetched_at) {
                Ok(rate) => rates.push(rate),
                Err(reason) => match self.policy {
                    InvalidQuotePolicy::Skip => {
                        debug!(
                            currency = %quote.currency_code,
                            amount = quote.quote_amount,
                            "Skipping invalid rate entry: {}",
                            reason
                        );
                    }
                    InvalidQuotePolicy::Reject => {
                        return Err(RateError::Normalization {
                            code: quote.currency_code,
                            reason,
                        });
                    }
                },
            }
        }
        Ok(rates)
    }

    fn normalize_one(
        &self,
        quote: &RawRateQuote,
        fetched_at: DateTime<Utc>,
    ) -> Result<ExchangeRate, String> {
        if quote.quote_amount <= 0 {
            return Err(format!(
                "Amount must be positive, got {}",
                quote.quote_amount
            ));
        }
        let source = Currency::new(&quote.currency_code).map_err(|e| e.to_string())?;
        let per_unit = quote.quoted_rate / Decimal::from(quote.quote_amount);
        ExchangeRate::new(
            source,
            self.target.clone(),
            per_unit,
            quote.valid_for.unwrap_or(fetched_at),
        )
        .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn czk() -> Currency {
        Currency::new("CZK").unwrap()
    }

    fn quote(code: &str, amount: i64, rate: Decimal) -> RawRateQuote {
        RawRateQuote {
            currency_code: code.to_string(),
            quote_amount: amount,
            quoted_rate: rate,
            valid_for: None,
        }
    }

    #[test]
    fn test_amount_one_is_unchanged() {
        let rates = RateNormalizer::new(czk())
            .normalize(vec![quote("USD", 1, dec!(22.50))])
            .unwrap();

        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].source_currency().code(), "USD");
        assert_eq!(rates[0].target_currency().code(), "CZK");
        assert_eq!(rates[0].value(), dec!(22.50));
    }

    #[test]
    fn test_multi_unit_amount_is_divided() {
        let rates = RateNormalizer::new(czk())
            .normalize(vec![
                quote("JPY", 100, dec!(17.00)),
                quote("EUR", 2, dec!(48.00)),
                quote("HUF", 100, dec!(6.512)),
                quote("IDR", 1000, dec!(1.462)),
            ])
            .unwrap();

        assert_eq!(rates[0].value(), dec!(0.17));
        assert_eq!(rates[1].value(), dec!(24.00));
        assert_eq!(rates[2].value(), dec!(0.06512));
        assert_eq!(rates[3].value(), dec!(0.001462));
    }

    #[test]
    fn test_lower_case_code_is_upper_cased() {
        let rates = RateNormalizer::new(czk())
            .normalize(vec![quote("gbp", 1, dec!(28.10))])
            .unwrap();

        assert_eq!(rates[0].source_currency().code(), "GBP");
    }

    #[test]
    fn test_valid_for_defaults_to_fetch_time() {
        let fetched_at = Utc::now();
        let mut dated = quote("EUR", 1, dec!(24.00));
        let valid_for = fetched_at - chrono::Duration::days(1);
        dated.valid_for = Some(valid_for);

        let rates = RateNormalizer::new(czk())
            .normalize_at(vec![dated, quote("USD", 1, dec!(22.50))], fetched_at)
            .unwrap();

        assert_eq!(rates[0].valid_for(), valid_for);
        assert_eq!(rates[1].valid_for(), fetched_at);
    }

    #[test]
    fn test_skip_policy_drops_invalid_amounts_and_keeps_order() {
        let rates = RateNormalizer::new(czk())
            .normalize(vec![
                quote("USD", 0, dec!(22.50)),
                quote("AUD", 1, dec!(14.90)),
                quote("EUR", -5, dec!(120)),
                quote("JPY", 100, dec!(17.00)),
            ])
            .unwrap();

        let codes: Vec<_> = rates.iter().map(|r| r.source_currency().code()).collect();
        assert_eq!(codes, ["AUD", "JPY"]);
        assert_eq!(rates[1].value(), dec!(0.17));
    }

    #[test]
    fn test_skip_policy_drops_bad_codes_and_non_positive_rates() {
        let rates = RateNormalizer::new(czk())
            .normalize(vec![
                quote("EURO", 1, dec!(24.00)),
                quote("XDR", 1, dec!(0)),
                quote("CHF", 1, dec!(-1)),
                quote("PLN", 1, dec!(5.60)),
            ])
            .unwrap();

        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].source_currency().code(), "PLN");
    }

    #[test]
    fn test_amount_boundary() {
        let normalizer = RateNormalizer::new(czk());

        assert!(normalizer.normalize(vec![quote("USD", 0, dec!(10))]).unwrap().is_empty());
        assert_eq!(normalizer.normalize(vec![quote("USD", 1, dec!(10))]).unwrap().len(), 1);
    }

    #[test]
    fn test_reject_policy_fails_on_zero_amount() {
        let normalizer = RateNormalizer::new(czk()).with_policy(InvalidQuotePolicy::Reject);

        let result = normalizer.normalize(vec![
            quote("USD", 1, dec!(22.50)),
            quote("BAD", 0, dec!(10)),
            quote("EUR", 1, dec!(24.00)),
        ]);

        match result {
            Err(RateError::Normalization { code, reason }) => {
                assert_eq!(code, "BAD");
                assert!(reason.contains("Amount must be positive"));
            }
            other => panic!("expected normalization error, got {:?}", other),
        }
    }

    #[test]
    fn test_reject_policy_passes_valid_batch() {
        let rates = RateNormalizer::new(czk())
            .with_policy(InvalidQuotePolicy::Reject)
            .normalize(vec![quote("USD", 1, dec!(22.50)), quote("JPY", 100, dec!(17.00))])
            .unwrap();

        assert_eq!(rates.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(RateNormalizer::new(czk()).normalize(Vec::new()).unwrap().is_empty());
    }
}
