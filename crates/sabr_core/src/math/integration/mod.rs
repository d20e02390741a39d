//! One-dimensional numerical quadrature.
//!
//! The replication pricers integrate a swaption-weighted payoff kernel over a
//! strike interval; the integrand is smooth but spans many orders of
//! magnitude, so an adaptive scheme with an absolute tolerance contract is
//! used. Failures are surfaced as [`crate::types::IntegrationError`] rather
//! than absorbed.

mod adaptive;

pub use adaptive::{AdaptiveSimpson, QuadratureConfig};
