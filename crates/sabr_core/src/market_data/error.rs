//! Market data error types.

use crate::types::{InterpolationError, InvalidParameterError};
use thiserror::Error;

/// Market data operation errors.
///
/// # Variants
///
/// - `InvalidMaturity`: Negative time to maturity
/// - `UnknownCurve`: Curve name not present in the bundle
/// - `OutOfBounds`: Query outside the valid domain
/// - `Interpolation`: Wrapped interpolation error
/// - `InvalidParameter`: Wrapped parameter domain violation
/// - `InsufficientData`: Not enough data points for construction
///
/// # Examples
///
/// ```
/// use sabr_core::market_data::MarketDataError;
///
/// let err = MarketDataError::UnknownCurve { name: "EUR OIS".to_string() };
/// assert!(format!("{}", err).contains("EUR OIS"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Invalid maturity (negative time).
    #[error("Invalid maturity: t = {t}")]
    InvalidMaturity {
        /// The invalid maturity value
        t: f64,
    },

    /// Curve name not present in the bundle.
    #[error("Unknown curve: {name}")]
    UnknownCurve {
        /// The requested curve name
        name: String,
    },

    /// Query point outside the valid domain.
    #[error("Out of bounds: {x} not in [{min}, {max}]")]
    OutOfBounds {
        /// The query point that was out of bounds
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Interpolation error.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// Parameter outside its admissible domain.
    #[error("Parameter error: {0}")]
    InvalidParameter(#[from] InvalidParameterError),

    /// Insufficient data for construction.
    #[error("Insufficient data: got {got}, need {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },
}
