//! # sabr_core: Numerical Foundation for the SABR CMS Replication Library
//!
//! Bottom layer of the workspace. Provides:
//! - Root-finding solvers and bracket search (`math::solvers`)
//! - Adaptive 1-D quadrature (`math::integration`)
//! - Interpolators (`math::interpolators`)
//! - Yield curves and curve bundles (`market_data::curves`)
//! - SABR parameter surfaces (`market_data::sabr`)
//! - Currency-tagged amounts and error types (`types`)
//!
//! This crate has no dependency on the other `sabr_*` crates and builds on
//! stable Rust. All solver code is generic over `num_traits::Float`; the
//! market-data layer is `f64`-based.
//!
//! ## Usage
//!
//! ```rust
//! use sabr_core::math::solvers::{BrentSolver, SolverConfig};
//! use sabr_core::market_data::curves::{FlatCurve, YieldCurve};
//!
//! let solver = BrentSolver::new(SolverConfig::default());
//! let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
//! assert!((root - 2.0_f64.sqrt()).abs() < 1e-10);
//!
//! let curve = FlatCurve::new(0.05_f64);
//! let df = curve.discount_factor(1.0).unwrap();
//! assert!((df - (-0.05_f64).exp()).abs() < 1e-12);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;
