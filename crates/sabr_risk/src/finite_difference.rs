//! Finite-difference helpers for cross-checking analytic sensitivities.
//!
//! The pricing test suites verify every analytic sensitivity against a
//! central difference of the present value under a bumped scenario. The
//! function passed in maps a bump size to the bumped valuation, so curve
//! node bumps, SABR parameter bumps and strike bumps all share one helper.

/// Central difference `(f(shift) - f(-shift)) / (2 shift)`.
pub fn central<F, E>(f: F, shift: f64) -> Result<f64, E>
where
    F: Fn(f64) -> Result<f64, E>,
{
    Ok((f(shift)? - f(-shift)?) / (2.0 * shift))
}

/// Second central difference `(f(shift) - 2 f(0) + f(-shift)) / shift²`.
pub fn second<F, E>(f: F, shift: f64) -> Result<f64, E>
where
    F: Fn(f64) -> Result<f64, E>,
{
    Ok((f(shift)? - 2.0 * f(0.0)? + f(-shift)?) / (shift * shift))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::convert::Infallible;

    #[test]
    fn test_central_on_cubic() {
        let f = |s: f64| -> Result<f64, Infallible> { Ok((2.0 + s).powi(3)) };
        let d = central(f, 1e-5).unwrap();
        assert_relative_eq!(d, 12.0, max_relative = 1e-8);
    }

    #[test]
    fn test_second_on_cubic() {
        let f = |s: f64| -> Result<f64, Infallible> { Ok((2.0 + s).powi(3)) };
        let d2 = second(f, 1e-4).unwrap();
        assert_relative_eq!(d2, 12.0, max_relative = 1e-5);
    }
}
