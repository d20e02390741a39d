//! Ridders' method root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Ridders' method root finder.
///
/// Fits an exponential through the bracket midpoint to place the next
/// iterate, giving superlinear convergence on smooth residuals while keeping
/// the bracketing guarantee. Used by the extrapolation tail fit and the
/// successive calibration engine, where the residuals are smooth and
/// monotone in the solved parameter.
///
/// # Example
///
/// ```
/// use sabr_core::math::solvers::{RiddersSolver, SolverConfig};
///
/// let solver = RiddersSolver::new(SolverConfig::default());
/// let root = solver.find_root(|x: f64| x.exp() - 3.0, 0.0, 2.0).unwrap();
/// assert!((root - 3.0_f64.ln()).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct RiddersSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> RiddersSolver<T> {
    /// Create a new Ridders solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }

    /// Find a root of `f` in the bracket [a, b].
    ///
    /// Requires that `f(a)` and `f(b)` have opposite signs.
    ///
    /// # Returns
    ///
    /// * `Ok(x)` with `|f(x)| < tolerance` or bracket width below tolerance
    /// * `Err(SolverError::NoBracket)` if the endpoints have the same sign
    /// * `Err(SolverError::MaxIterationsExceeded)` on non-convergence
    pub fn find_root<F>(&self, f: F, a: T, b: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        let mut lo = a;
        let mut hi = b;
        let mut f_lo = f(lo);
        let mut f_hi = f(hi);

        if f_lo == T::zero() {
            return Ok(lo);
        }
        if f_hi == T::zero() {
            return Ok(hi);
        }
        if f_lo * f_hi > T::zero() {
            return Err(SolverError::NoBracket {
                a: lo.to_f64().unwrap_or(f64::NAN),
                b: hi.to_f64().unwrap_or(f64::NAN),
            });
        }

        let half = T::from(0.5).unwrap();
        let tol = self.config.tolerance;

        for _ in 0..self.config.max_iterations {
            let mid = (lo + hi) * half;
            let f_mid = f(mid);

            // Exponential correction factor through (lo, mid, hi).
            let s = (f_mid * f_mid - f_lo * f_hi).sqrt();
            if s == T::zero() {
                return Ok(mid);
            }
            let sign = if f_lo > f_hi { T::one() } else { -T::one() };
            let x = mid + (mid - lo) * sign * f_mid / s;
            let f_x = f(x);

            if f_x.abs() < tol {
                return Ok(x);
            }

            // Re-bracket with the midpoint and the new iterate.
            if f_mid * f_x < T::zero() {
                lo = mid;
                f_lo = f_mid;
                hi = x;
                f_hi = f_x;
            } else if f_lo * f_x < T::zero() {
                hi = x;
                f_hi = f_x;
            } else {
                lo = x;
                f_lo = f_x;
            }

            if (hi - lo).abs() < tol {
                return Ok((lo + hi) * half);
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }
}
