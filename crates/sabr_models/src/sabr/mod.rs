//! SABR smile model: Hagan volatility, adjoints and tail extrapolation.

pub mod extrapolation;
pub mod hagan;

pub use extrapolation::{ExtrapolationError, SabrExtrapolation};
pub use hagan::{VolatilityAdjoint2, VolatilityGradient};
