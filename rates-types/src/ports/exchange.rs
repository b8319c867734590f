//! Exchange rate provider port.
//!
//! One provider per target currency. Implementations filter their daily
//! rate set down to the currencies a caller asked for.

use tokio_util::sync::CancellationToken;

use crate::domain::{Currency, ExchangeRate};
use crate::dto::ProviderInfo;
use crate::error::RateError;

/// Port trait for exchange rate providers.
#[async_trait::async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// The currency every returned rate is expressed in.
    fn target_currency(&self) -> &Currency;

    /// Descriptive metadata for provider listings.
    fn info(&self) -> ProviderInfo;

    /// Returns the rates for `currencies` against the target currency.
    ///
    /// An empty request yields an empty result without touching the rate source.
    /// Results follow the order of the daily rate set, not of the request.
    async fn get_exchange_rates(
        &self,
        currencies: &[Currency],
        cancel: &CancellationToken,
    ) -> Result<Vec<ExchangeRate>, RateError>;
}
