//! # Rates Client
//!
//! HTTP adapter for the Czech National Bank (CNB) daily rates API.
//! Implements the `DailyRateSource` port with a retry policy and no caching.

pub mod dto;
pub mod retry;

use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

use rates_types::{CancellationToken, DailyRateSource, RateError, RawRateQuote};

pub use dto::decode_daily_rates;
pub use retry::{Backoff, RetryPolicy, is_transient_status};

/// Public CNB endpoint for the daily exchange rate fixing.
pub const CNB_DAILY_RATES_URL: &str = "https://api.cnb.cz/cnbapi/exrates/daily";

/// Failure of a single attempt, before the retry decision.
#[derive(Debug)]
struct AttemptError {
    message: String,
    retryable: bool,
}

impl AttemptError {
    fn transport(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            retryable: true,
        }
    }
}

/// CNB daily rates client.
pub struct CnbClient {
    endpoint: String,
    http: Client,
    retry: RetryPolicy,
}

impl CnbClient {
    /// Creates a client for the given endpoint with the default retry policy.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: Client::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Bounds each individual attempt (connect + headers + body).
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, RateError> {
        self.http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RateError::transport(e.to_string()))?;
        Ok(self)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Runs attempts until one succeeds, a non-retryable failure occurs,
    /// retries run out, or `cancel` fires.
    async fn get_with_retry(&self, cancel: &CancellationToken) -> Result<String, RateError> {
        let mut retry = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(RateError::Cancelled);
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RateError::Cancelled),
                outcome = self.attempt() => outcome,
            };

            let failure = match outcome {
                Ok(body) => return Ok(body),
                Err(failure) => failure,
            };

            if !failure.retryable || retry >= self.retry.max_retries {
                return Err(RateError::Transport(failure.message));
            }

            let delay = self.retry.delay_for_retry(retry);
            retry += 1;
            warn!(
                attempt = retry,
                max_retries = self.retry.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %failure.message,
                "CNB request failed, retrying"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RateError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn attempt(&self) -> Result<String, AttemptError> {
        let resp = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(AttemptError::transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AttemptError {
                message: format!("CNB responded with status {}", status),
                retryable: self.retry.should_retry_status(status.as_u16()),
            });
        }

        resp.text().await.map_err(AttemptError::transport)
    }
}

#[async_trait::async_trait]
impl DailyRateSource for CnbClient {
    async fn fetch_daily_rates(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawRateQuote>, RateError> {
        info!(endpoint = %self.endpoint, "Requesting CNB rates");

        let body = self.get_with_retry(cancel).await?;
        let quotes = decode_daily_rates(&body)
            .map_err(|e| RateError::transport(format!("Malformed CNB payload: {}", e)))?;

        if quotes.is_empty() {
            warn!("CNB rates response empty.");
        } else {
            info!(count = quotes.len(), "CNB returned {} raw rates.", quotes.len());
        }
        Ok(quotes)
    }
}
