//! # Rates Hex
//!
//! Rate pipeline and application service for the exchange rate service.
//!
//! ## Architecture
//!
//! - `normalizer` - Raw quotes to per-unit exchange rates
//! - `cache` - Single-flight TTL cache
//! - `store` - Rate source + normalizer behind the cache
//! - `provider` - Per-target-currency providers
//! - `registry` - Target currency to provider lookup
//! - `service` - Application service (request-boundary orchestration)
//!
//! The pipeline is generic over `S: DailyRateSource`, allowing the CNB
//! client or an in-memory source to be injected.

use std::sync::Arc;
use std::time::Duration;

use exchange_rates::{StaticRates, USD_REFERENCE_RATES};
use rates_types::{AppError, Currency, DailyRateSource};

pub mod cache;
pub mod normalizer;
pub mod provider;
pub mod registry;
pub mod service;
pub mod store;


pub use cache::SingleFlightCache;
pub use normalizer::{InvalidQuotePolicy, RateNormalizer};
pub use provider::{CurrencyRateProvider, RateProvider};
pub use registry::ProviderRegistry;
pub use service::{
    DEFAULT_TARGET_CURRENCY, ExchangeRateService, parse_currency_codes, parse_currency_list,
};
pub use store::{CachedRateStore, DEFAULT_CACHE_TTL, RateCache};

/// Wiring options for [`build_registry`].
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Endpoint reported in the CZK provider's info.
    pub endpoint: String,
    pub cache_ttl: Duration,
    pub invalid_quotes: InvalidQuotePolicy,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            cache_ttl: DEFAULT_CACHE_TTL,
            invalid_quotes: InvalidQuotePolicy::default(),
        }
    }
}

/// Builds the registry of every supported provider.
///
/// CZK is served from `source` through a cached store; USD from the
/// static reference table.
pub fn build_registry<S: DailyRateSource>(
    source: S,
    options: RegistryOptions,
) -> Result<ProviderRegistry<RateProvider<S>>, AppError> {
    let cache = Arc::new(RateCache::new());

    let czk = Currency::new(DEFAULT_TARGET_CURRENCY)?;
    let normalizer = RateNormalizer::new(czk).with_policy(options.invalid_quotes);
    let store = CachedRateStore::new(source, normalizer, cache).with_ttl(options.cache_ttl);

    let usd = StaticRates::new(&USD_REFERENCE_RATES)?;

    let registry = ProviderRegistry::new([
        Arc::new(RateProvider::czk(store, options.endpoint)),
        Arc::new(RateProvider::usd(usd)),
    ])?;
    tracing::info!(
        providers = registry.len(),
        ttl_secs = options.cache_ttl.as_secs(),
        "Exchange rate providers registered"
    );
    Ok(registry)
}
