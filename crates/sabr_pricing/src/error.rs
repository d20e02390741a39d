//! Pricing errors.

use sabr_core::market_data::MarketDataError;
use sabr_core::types::IntegrationError;
use sabr_models::sabr::ExtrapolationError;
use thiserror::Error;

/// Errors surfaced by the CMS pricers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Curve or surface lookup failed.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),
    /// The replication integral did not converge, even after the bounded
    /// relaxed-tolerance retries.
    #[error(transparent)]
    Integration(#[from] IntegrationError),
    /// The right-tail extrapolation fit failed.
    #[error(transparent)]
    Extrapolation(#[from] ExtrapolationError),
    /// The instrument is malformed (empty legs, non-positive accrual).
    #[error("Invalid instrument: {reason}")]
    InvalidInstrument {
        /// What is wrong with the instrument.
        reason: String,
    },
}
