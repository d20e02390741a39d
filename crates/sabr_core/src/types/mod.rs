//! Foundational value and error types.

pub mod currency;
pub mod error;

pub use currency::{Currency, CurrencyAmount};
pub use error::{IntegrationError, InterpolationError, InvalidParameterError, SolverError};
