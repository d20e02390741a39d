//! # sabr_risk: Sensitivity Containers and Portfolio Evaluation
//!
//! Result types for the pricing layer's sensitivity computations:
//! - [`CurveSensitivity`]: per-curve lists of (node time, sensitivity) pairs
//!   with merge/scale/clean algebra
//! - [`SabrSensitivity`]: per-(expiry, tenor) sensitivities to the four SABR
//!   parameters
//! - [`finite_difference`]: helpers the test suites use to cross-check
//!   analytic sensitivities
//! - [`portfolio`]: rayon-parallel evaluation over instrument slices sharing
//!   read-only market data

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod curve_sensitivity;
pub mod finite_difference;
pub mod portfolio;
mod sabr_sensitivity;

pub use curve_sensitivity::CurveSensitivity;
pub use sabr_sensitivity::{ExpiryTenor, SabrSensitivity};
