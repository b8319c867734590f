//! Domain models for the exchange rate service.

pub mod currency;
pub mod rate;

pub use currency::Currency;
pub use rate::{ExchangeRate, RawRateQuote};
