//! Replication quadrature with a bounded relaxed-tolerance retry.

use sabr_core::math::integration::{AdaptiveSimpson, QuadratureConfig};
use sabr_core::types::IntegrationError;

/// Relaxation applied to the tolerance on each retry.
const RETRY_FACTOR: f64 = 10.0;
/// Retries after the first attempt.
const MAX_RETRIES: usize = 2;

/// Integrate `f` over `[lower, upper]`, relaxing the tolerance by
/// [`RETRY_FACTOR`] up to [`MAX_RETRIES`] times when the subdivision depth is
/// exhausted. Any remaining failure is propagated.
pub(crate) fn integrate_with_retry<F>(
    f: &F,
    lower: f64,
    upper: f64,
    abs_tolerance: f64,
) -> Result<f64, IntegrationError>
where
    F: Fn(f64) -> f64,
{
    let mut tolerance = abs_tolerance;
    let mut attempt = 0;
    loop {
        let quad = AdaptiveSimpson::new(QuadratureConfig::new(tolerance, 60));
        match quad.integrate(f, lower, upper) {
            Ok(value) => return Ok(value),
            Err(IntegrationError::MaxSubdivisionsExceeded { .. }) if attempt < MAX_RETRIES => {
                attempt += 1;
                tolerance *= RETRY_FACTOR;
                tracing::debug!(
                    attempt,
                    tolerance,
                    "replication integral did not converge, relaxing tolerance"
                );
            }
            Err(err) => return Err(err),
        }
    }
}
