//! Wire format of the CNB daily rates endpoint.
//!
//! ```json
//! { "rates": [ { "code": "EUR", "amount": 1, "rate": 24.305, "validFor": "2024-01-15" } ] }
//! ```
//!
//! Field names are matched case-insensitively; a missing or null `rates`
//! array decodes as an empty list.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

use rates_types::RawRateQuote;

#[derive(Debug, Deserialize)]
struct DailyRatesPayload {
    #[serde(default)]
    rates: Option<Vec<CnbRateDto>>,
}

#[derive(Debug, Deserialize)]
struct CnbRateDto {
    code: String,
    /// Missing amounts decode as 0 and are rejected by the normalizer.
    #[serde(default)]
    amount: i64,
    rate: Decimal,
    #[serde(default, rename = "validfor", deserialize_with = "deserialize_valid_for")]
    valid_for: Option<DateTime<Utc>>,
}

impl From<CnbRateDto> for RawRateQuote {
    fn from(dto: CnbRateDto) -> Self {
        Self {
            currency_code: dto.code,
            quote_amount: dto.amount,
            quoted_rate: dto.rate,
            valid_for: dto.valid_for,
        }
    }
}

/// Decodes a daily rates payload into raw quotes.
pub fn decode_daily_rates(body: &str) -> Result<Vec<RawRateQuote>, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    let payload: DailyRatesPayload = serde_json::from_value(lowercase_keys(value))?;
    Ok(payload
        .rates
        .unwrap_or_default()
        .into_iter()
        .map(RawRateQuote::from)
        .collect())
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_ascii_lowercase(), lowercase_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

fn deserialize_valid_for<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| {
        parse_valid_for(&s).ok_or_else(|| de::Error::custom(format!("invalid validFor: {s}")))
    })
    .transpose()
}

/// CNB publishes plain dates; full timestamps are accepted too.
fn parse_valid_for(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_rates() {
        let body = r#"{ "rates": [
            { "code": "EUR", "amount": 1, "rate": 25.10, "validFor": "2024-01-15" },
            { "code": "JPY", "amount": 100, "rate": 17.00 }
        ]}"#;

        let quotes = decode_daily_rates(body).unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].currency_code, "EUR");
        assert_eq!(quotes[0].quoted_rate, dec!(25.10));
        let valid_for = quotes[0].valid_for.unwrap();
        assert_eq!((valid_for.year(), valid_for.month(), valid_for.day()), (2024, 1, 15));
        assert_eq!(valid_for.hour(), 0);
        assert_eq!(quotes[1].quote_amount, 100);
        assert_eq!(quotes[1].valid_for, None);
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        let body = r#"{ "Rates": [
            { "CODE": "usd", "Amount": 1, "RATE": 22.9, "VALIDFOR": "2024-01-15T10:30:00Z" }
        ] }"#;

        let quotes = decode_daily_rates(body).unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].currency_code, "usd");
        assert_eq!(quotes[0].quoted_rate, dec!(22.9));
        assert_eq!(quotes[0].valid_for.unwrap().hour(), 10);
    }

    #[test]
    fn test_missing_or_null_rates_is_empty() {
        assert!(decode_daily_rates("{}").unwrap().is_empty());
        assert!(decode_daily_rates(r#"{ "rates": null }"#).unwrap().is_empty());
        assert!(decode_daily_rates(r#"{ "rates": [] }"#).unwrap().is_empty());
    }

    #[test]
    fn test_missing_amount_decodes_as_zero() {
        let quotes = decode_daily_rates(r#"{ "rates": [ { "code": "EUR", "rate": 25.10 } ] }"#)
            .unwrap();
        assert_eq!(quotes[0].quote_amount, 0);
    }

    #[test]
    fn test_malformed_payload_fails() {
        assert!(decode_daily_rates("not json").is_err());
        assert!(decode_daily_rates(r#"{ "rates": [ { "code": "EUR" } ] }"#).is_err());
        let bad_date = r#"{ "rates": [
            { "code": "EUR", "amount": 1, "rate": 1, "validFor": "yesterday" }
        ] }"#;
        assert!(decode_daily_rates(bad_date).is_err());
    }
}
