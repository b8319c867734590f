//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use rates_client::CNB_DAILY_RATES_URL;

/// Daily rates change once a day; a longer TTL would serve stale fixings.
const MAX_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cnb_url: String,
    pub cache_ttl: Duration,
    pub max_retries: u32,
    pub http_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let cnb_url = lookup("CNB_RATES_URL").unwrap_or_else(|| CNB_DAILY_RATES_URL.to_string());

        let cache_ttl_secs = lookup("RATES_CACHE_TTL_SECS")
            .unwrap_or_else(|| "300".to_string())
            .parse::<u64>()
            .map_err(|e| {
                anyhow::anyhow!("RATES_CACHE_TTL_SECS must be a number of seconds: {e}")
            })?;

        if cache_ttl_secs > MAX_CACHE_TTL_SECS {
            anyhow::bail!("RATES_CACHE_TTL_SECS must be at most {MAX_CACHE_TTL_SECS} (one day)");
        }

        let max_retries = lookup("RATES_MAX_RETRIES")
            .unwrap_or_else(|| "3".to_string())
            .parse::<u32>()
            .map_err(|e| {
                anyhow::anyhow!("RATES_MAX_RETRIES must be a non-negative integer: {e}")
            })?;

        let http_timeout_secs = lookup("RATES_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u64>()
            .map_err(|e| {
                anyhow::anyhow!("RATES_HTTP_TIMEOUT_SECS must be a number of seconds: {e}")
            })?;
        if http_timeout_secs == 0 {
            anyhow::bail!("RATES_HTTP_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            cnb_url,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            max_retries,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.cnb_url, CNB_DAILY_RATES_URL);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CNB_RATES_URL", "http://localhost:8080/daily"),
            ("RATES_CACHE_TTL_SECS", "60"),
            ("RATES_MAX_RETRIES", "0"),
            ("RATES_HTTP_TIMEOUT_SECS", "2"),
        ])
        .unwrap();

        assert_eq!(config.cnb_url, "http://localhost:8080/daily");
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.http_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_numbers_fail() {
        assert!(load(&[("RATES_MAX_RETRIES", "-1")]).is_err());
        assert!(load(&[("RATES_CACHE_TTL_SECS", "five")]).is_err());
        assert!(load(&[("RATES_HTTP_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_cache_ttl_is_bounded() {
        assert!(load(&[("RATES_CACHE_TTL_SECS", "86400")]).is_ok());
        assert!(load(&[("RATES_CACHE_TTL_SECS", "86401")]).is_err());
        assert!(load(&[("RATES_CACHE_TTL_SECS", "18446744073709551615")]).is_err());
    }
}
