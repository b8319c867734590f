//! # Rates Types
//!
//! Domain types and port traits for the exchange rate service.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Currency, RawRateQuote, ExchangeRate)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for the request boundary
//! - `error/` - Domain, pipeline, registry and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{Currency, ExchangeRate, RawRateQuote};
pub use dto::*;
pub use error::{AppError, DomainError, RateError, RegistryError};
pub use ports::{DailyRateSource, DailyRates, ExchangeRateProvider};

/// Cancellation signal threaded through every suspending operation.
pub use tokio_util::sync::CancellationToken;
