//! Cached rate store: a rate source and normalizer behind the single-flight cache.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use rates_types::{
    CancellationToken, Currency, DailyRateSource, DailyRates, ExchangeRate, RateError,
};

use crate::cache::SingleFlightCache;
use crate::normalizer::RateNormalizer;

/// How long a fetched daily rate set is served from cache.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache shared by every store; one entry per target currency.
pub type RateCache = SingleFlightCache<Arc<[ExchangeRate]>>;

/// Cache key for a target currency's daily rate set.
pub fn cache_key(target: &Currency) -> String {
    format!("dailyRates:{}", target)
}

/// Daily rates for one target currency, fetched and normalized on cache miss.
pub struct CachedRateStore<S: DailyRateSource> {
    key: String,
    ttl: Duration,
    source: Arc<S>,
    normalizer: RateNormalizer,
    cache: Arc<RateCache>,
}

impl<S: DailyRateSource> CachedRateStore<S> {
    /// Creates a store keyed by the normalizer's target currency.
    pub fn new(source: S, normalizer: RateNormalizer, cache: Arc<RateCache>) -> Self {
        Self {
            key: cache_key(normalizer.target_currency()),
            ttl: DEFAULT_CACHE_TTL,
            source: Arc::new(source),
            normalizer,
            cache,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn target_currency(&self) -> &Currency {
        self.normalizer.target_currency()
    }

    pub fn cache_key(&self) -> &str {
        &self.key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[async_trait::async_trait]
impl<S: DailyRateSource> DailyRates for CachedRateStore<S> {
    async fn daily_rates(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<[ExchangeRate]>, RateError> {
        let source = Arc::clone(&self.source);
        let normalizer = self.normalizer.clone();
        let key = self.key.clone();

        let result = self
            .cache
            .get_or_fetch(&self.key, self.ttl, cancel, move |token| async move {
                info!(key = %key, "Cache miss for daily rates. Fetching and mapping.");
                let raw = source.fetch_daily_rates(&token).await?;
                let mapped = normalizer.normalize(raw)?;
                info!(
                    count = mapped.len(),
                    base = %normalizer.target_currency(),
                    "Mapped {} exchange rates.",
                    mapped.len()
                );
                Ok(Arc::from(mapped))
            })
            .await;

        if let Err(e) = &result {
            if !e.is_cancelled() {
                error!(key = %self.key, error = %e, "Failed to load daily rates");
            }
        }
        result
    }
}
