//! # sabr_models: Closed-Form Model Layer
//!
//! Builds on `sabr_core` and provides:
//! - Hagan (2002) lognormal SABR implied volatility with first- and
//!   second-order algorithmic adjoints (`sabr::hagan`)
//! - Black (numeraire 1) option pricing with adjoints (`black`)
//! - SABR right-tail extrapolation with C² matching at the cut-off strike
//!   (`sabr::extrapolation`)
//! - CMS instrument value objects expressed in year fractions
//!   (`instruments`)
//!
//! All model functions are `f64`; parameter validation lives in
//! `sabr_core::market_data::sabr::SabrParameters` so a constructed parameter
//! set is valid by construction.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod black;
pub mod distributions;
pub mod instruments;
pub mod sabr;
