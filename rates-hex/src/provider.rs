//! Rate providers: one per target currency.
//!
//! The supported targets form a closed set (`RateProvider`); each variant
//! filters its own daily rate set down to the requested currencies.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use exchange_rates::StaticRates;
use rates_types::{
    CancellationToken, Currency, DailyRateSource, DailyRates, ExchangeRate, ExchangeRateProvider,
    ProviderInfo, RateError,
};

use crate::store::CachedRateStore;

/// Filters a daily rate set for one target currency.
pub struct CurrencyRateProvider<D: DailyRates> {
    target: Currency,
    info: ProviderInfo,
    rates: D,
}

impl<D: DailyRates> CurrencyRateProvider<D> {
    pub fn new(target: Currency, info: ProviderInfo, rates: D) -> Self {
        Self {
            target,
            info,
            rates,
        }
    }

    /// Returns a reference to the underlying daily rate set.
    pub fn rates(&self) -> &D {
        &self.rates
    }
}

#[async_trait::async_trait]
impl<D: DailyRates> ExchangeRateProvider for CurrencyRateProvider<D> {
    fn target_currency(&self) -> &Currency {
        &self.target
    }

    fn info(&self) -> ProviderInfo {
        self.info.clone()
    }

    async fn get_exchange_rates(
        &self,
        currencies: &[Currency],
        cancel: &CancellationToken,
    ) -> Result<Vec<ExchangeRate>, RateError> {
        if currencies.is_empty() {
            warn!(
                provider = %self.target,
                "Requested currencies collection is empty. Returning empty result."
            );
            return Ok(Vec::new());
        }

        // Currency codes are uppercase by construction.
        let requested: HashSet<&str> = currencies.iter().map(Currency::code).collect();
        debug!(
            provider = %self.target,
            "Fetching exchange rates for {} requested currencies via provider {}.",
            requested.len(),
            self.target
        );

        let all = self.rates.daily_rates(cancel).await?;
        let filtered: Vec<ExchangeRate> = all
            .iter()
            .filter(|rate| requested.contains(rate.source_currency().code()))
            .cloned()
            .collect();

        info!(
            provider = %self.target,
            "Provider {} returned {}/{} matching rates.",
            self.target,
            filtered.len(),
            all.len()
        );
        Ok(filtered)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Supported Providers
// ─────────────────────────────────────────────────────────────────────────────

/// Every supported target currency.
pub enum RateProvider<S: DailyRateSource> {
    /// Czech National Bank daily fixing, cached.
    Czk(CurrencyRateProvider<CachedRateStore<S>>),
    /// USD reference table.
    Usd(CurrencyRateProvider<StaticRates>),
}

impl<S: DailyRateSource> RateProvider<S> {
    /// CZK provider backed by a cached CNB store.
    pub fn czk(store: CachedRateStore<S>, endpoint: impl Into<String>) -> Self {
        let target = store.target_currency().clone();
        let info = ProviderInfo {
            currency_code: target.code().to_string(),
            name: "Czech National Bank".into(),
            description: format!("Provides exchange rates with {} as target currency", target),
            endpoint: endpoint.into(),
        };
        Self::Czk(CurrencyRateProvider::new(target, info, store))
    }

    /// USD provider backed by the static reference table.
    pub fn usd(rates: StaticRates) -> Self {
        let target = rates.target_currency().clone();
        let info = ProviderInfo {
            currency_code: target.code().to_string(),
            name: rates.source_name().into(),
            description: format!("Provides exchange rates with {} as target currency", target),
            endpoint: "Mock data for testing purposes".into(),
        };
        Self::Usd(CurrencyRateProvider::new(target, info, rates))
    }
}

#[async_trait::async_trait]
impl<S: DailyRateSource> ExchangeRateProvider for RateProvider<S> {
    fn target_currency(&self) -> &Currency {
        match self {
            Self::Czk(p) => p.target_currency(),
            Self::Usd(p) => p.target_currency(),
        }
    }

    fn info(&self) -> ProviderInfo {
        match self {
            Self::Czk(p) => p.info(),
            Self::Usd(p) => p.info(),
        }
    }

    async fn get_exchange_rates(
        &self,
        currencies: &[Currency],
        cancel: &CancellationToken,
    ) -> Result<Vec<ExchangeRate>, RateError> {
        match self {
            Self::Czk(p) => p.get_exchange_rates(currencies, cancel).await,
            Self::Usd(p) => p.get_exchange_rates(currencies, cancel).await,
        }
    }
}
