//! Daily rate source ports.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::domain::{ExchangeRate, RawRateQuote};
use crate::error::RateError;

/// Upstream fetch of raw daily quotes.
///
/// Implementations own their retry policy; callers above never retry.
#[async_trait::async_trait]
pub trait DailyRateSource: Send + Sync + 'static {
    /// Fetches the raw daily quote list. An empty list is a valid outcome.
    ///
    /// Fails with `RateError::Cancelled` when `cancel` fires first and with
    /// `RateError::Transport` on network failure or a non-retryable status.
    async fn fetch_daily_rates(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawRateQuote>, RateError>;
}

/// The full, normalized daily rate set for one target currency.
#[async_trait::async_trait]
pub trait DailyRates: Send + Sync {
    async fn daily_rates(&self, cancel: &CancellationToken)
    -> Result<Arc<[ExchangeRate]>, RateError>;
}
