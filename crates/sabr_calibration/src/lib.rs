//! # sabr_calibration: Hull-White Calibration
//!
//! Hull-White one-factor short-rate model with piecewise constant volatility,
//! priced in closed form for caplets as zero-coupon bond puts, and a
//! successive root-finder engine that fits one volatility piece per
//! calibrating caplet to an externally supplied (typically SABR) target
//! price. Earlier pieces are frozen as the engine walks the expiry ladder.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod engine;
mod hull_white;

pub use engine::{CalibrationError, CalibrationTarget, SuccessiveCalibrationEngine};
pub use hull_white::{CapletTimes, HullWhiteModel};
