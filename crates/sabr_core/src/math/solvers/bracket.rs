//! Outward bracket search for root finders.

use crate::types::SolverError;
use num_traits::Float;

const MAX_STEPS: usize = 50;

/// Expand an initial interval outward until it brackets a sign change of `f`.
///
/// Starting from `[lower, upper]`, the endpoint whose function value is
/// smaller in magnitude is pushed outward by a golden-ratio multiple of the
/// interval width, until `f` changes sign across the interval or the step
/// budget is exhausted.
///
/// The extrapolation tail fit starts its residual search from `[-1, 1]` and
/// relies on this expansion to reach the solved coefficient, which can be
/// orders of magnitude outside the initial interval.
///
/// # Returns
///
/// * `Ok((a, b))` - A bracket with `f(a) * f(b) <= 0`
/// * `Err(SolverError::BracketExpansionFailed)` - No sign change found
///
/// # Example
///
/// ```
/// use sabr_core::math::solvers::bracket_root;
///
/// let f = |x: f64| x - 100.0;
/// let (a, b) = bracket_root(&f, -1.0, 1.0).unwrap();
/// assert!(f(a) * f(b) <= 0.0);
/// ```
pub fn bracket_root<T, F>(f: &F, lower: T, upper: T) -> Result<(T, T), SolverError>
where
    T: Float,
    F: Fn(T) -> T,
{
    let ratio = T::from(1.6).unwrap();
    let mut a = lower;
    let mut b = upper;
    let mut fa = f(a);
    let mut fb = f(b);

    for _ in 0..MAX_STEPS {
        if fa * fb <= T::zero() {
            return Ok((a, b));
        }
        if fa.abs() < fb.abs() {
            a = a + ratio * (a - b);
            fa = f(a);
        } else {
            b = b + ratio * (b - a);
            fb = f(b);
        }
    }

    Err(SolverError::BracketExpansionFailed {
        a: lower.to_f64().unwrap_or(f64::NAN),
        b: upper.to_f64().unwrap_or(f64::NAN),
        steps: MAX_STEPS,
    })
}
