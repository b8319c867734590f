//! Error types for the exchange rate service.

use rust_decimal::Decimal;

use crate::domain::Currency;

/// Domain-level errors (value construction rules).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),

    #[error("Rate for {currency} must be positive, got {value}")]
    NonPositiveRate { currency: Currency, value: Decimal },
}

/// Rate-acquisition pipeline errors (fetch, normalize, cache).
///
/// `Clone` so a single in-flight fetch outcome can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid rate entry for {code}: {reason}")]
    Normalization { code: String, reason: String },
}

impl RateError {
    pub fn transport(message: impl Into<String>) -> Self {
        RateError::Transport(message.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RateError::Cancelled)
    }
}

/// Provider registry errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("No exchange rate provider registered for currency {0}")]
    UnknownProvider(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Exchange rate provider already registered for currency {0}")]
    DuplicateProvider(Currency),
}

/// Application-level errors (what the request boundary reports).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Rate source unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        match err {
            RateError::Transport(msg) => AppError::Unavailable(msg),
            RateError::Cancelled => AppError::Cancelled,
            e @ RateError::Normalization { .. } => AppError::Internal(e.to_string()),
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            e @ (RegistryError::UnknownProvider(_) | RegistryError::InvalidArgument(_)) => {
                AppError::BadRequest(e.to_string())
            }
            e @ RegistryError::DuplicateProvider(_) => AppError::Internal(e.to_string()),
        }
    }
}
