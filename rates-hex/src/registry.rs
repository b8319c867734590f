//! Provider registry: target currency code to provider.
//!
//! Built once at startup from an explicit provider list and read-only
//! afterwards, so lookups need no locking.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error};

use rates_types::{ExchangeRateProvider, RegistryError};

/// Immutable mapping of target currency codes to providers.
pub struct ProviderRegistry<P: ExchangeRateProvider> {
    providers: BTreeMap<String, Arc<P>>,
}

impl<P: ExchangeRateProvider> ProviderRegistry<P> {
    /// Registers every provider under its target currency code.
    ///
    /// Fails if two providers claim the same target currency.
    pub fn new(providers: impl IntoIterator<Item = Arc<P>>) -> Result<Self, RegistryError> {
        let mut map = BTreeMap::new();
        for provider in providers {
            let target = provider.target_currency().clone();
            if map.insert(target.code().to_string(), provider).is_some() {
                return Err(RegistryError::DuplicateProvider(target));
            }
        }
        debug!(currencies = ?map.keys().collect::<Vec<_>>(), "Provider registry built");
        Ok(Self { providers: map })
    }

    /// Looks up the provider for an already-normalized currency code.
    pub fn resolve(&self, code: &str) -> Result<Arc<P>, RegistryError> {
        if code.trim().is_empty() {
            error!("Attempted to get provider with empty currency code.");
            return Err(RegistryError::InvalidArgument(
                "Currency code must not be empty".into(),
            ));
        }

        match self.providers.get(code) {
            Some(provider) => {
                debug!("Resolved exchange rate provider for currency {}", code);
                Ok(Arc::clone(provider))
            }
            None => {
                error!("No exchange rate provider registered for currency {}", code);
                Err(RegistryError::UnknownProvider(code.to_string()))
            }
        }
    }

    /// Registered target currency codes, sorted.
    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Registered providers, sorted by target currency code.
    pub fn providers(&self) -> impl Iterator<Item = &Arc<P>> {
        self.providers.values()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
