//! Root-finding solvers for replication pricing and calibration.
//!
//! The extrapolation tail fit and the successive calibration engine both
//! reduce to scalar root-finding problems. Two bracketing solvers are
//! provided, plus an outward bracket search for callers that only know a
//! starting interval.
//!
//! ## Available Solvers
//!
//! - [`BrentSolver`]: robust combination of bisection, secant and inverse
//!   quadratic interpolation
//! - [`RiddersSolver`]: exponential-fit bracketing method, fast on smooth
//!   monotone residuals
//!
//! Both take a [`SolverConfig`] carrying `tolerance` (default 1e-10) and
//! `max_iterations` (default 100).
//!
//! ## Example
//!
//! ```
//! use sabr_core::math::solvers::{RiddersSolver, SolverConfig, bracket_root};
//!
//! let f = |x: f64| x * x * x - 5.0;
//! let (a, b) = bracket_root(&f, -1.0, 1.0).unwrap();
//! let solver = RiddersSolver::new(SolverConfig::default());
//! let root = solver.find_root(&f, a, b).unwrap();
//! assert!((root - 5.0_f64.cbrt()).abs() < 1e-9);
//! ```

mod bracket;
mod brent;
mod config;
mod ridders;

pub use bracket::bracket_root;
pub use brent::BrentSolver;
pub use config::SolverConfig;
pub use ridders::RiddersSolver;
