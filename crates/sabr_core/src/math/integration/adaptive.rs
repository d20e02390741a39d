//! Adaptive Simpson quadrature with Richardson extrapolation.

use crate::types::IntegrationError;

/// Configuration for the adaptive quadrature.
///
/// The tolerance is absolute: a panel is accepted when the difference between
/// its coarse and refined Simpson estimates is within `15 * tolerance`, the
/// factor 15 being the Richardson error constant of the scheme. The tolerance
/// is halved on each subdivision so panel errors sum to the requested bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureConfig {
    /// Absolute tolerance on the integral value.
    pub abs_tolerance: f64,
    /// Maximum subdivision depth before the integration fails.
    pub max_depth: usize,
}

impl Default for QuadratureConfig {
    /// Default configuration: absolute tolerance 1e-10, depth 60.
    fn default() -> Self {
        Self {
            abs_tolerance: 1e-10,
            max_depth: 60,
        }
    }
}

impl QuadratureConfig {
    /// Create a configuration with explicit values.
    ///
    /// # Panics
    ///
    /// Panics if `abs_tolerance <= 0` or `max_depth == 0`.
    pub fn new(abs_tolerance: f64, max_depth: usize) -> Self {
        assert!(abs_tolerance > 0.0, "abs_tolerance must be positive");
        assert!(max_depth > 0, "max_depth must be > 0");
        Self {
            abs_tolerance,
            max_depth,
        }
    }
}

/// Adaptive Simpson integrator.
///
/// Each panel is estimated by Simpson's rule and by the two-half refinement;
/// when the estimates agree within the (depth-scaled) tolerance the refined
/// value plus the Richardson correction `(fine - coarse) / 15` is accepted,
/// otherwise the panel is split. Exhausting the depth budget raises
/// [`IntegrationError::MaxSubdivisionsExceeded`].
///
/// # Example
///
/// ```
/// use sabr_core::math::integration::{AdaptiveSimpson, QuadratureConfig};
///
/// let quad = AdaptiveSimpson::new(QuadratureConfig::new(1e-12, 60));
/// let value = quad.integrate(&|x: f64| x.sin(), 0.0, std::f64::consts::PI).unwrap();
/// assert!((value - 2.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct AdaptiveSimpson {
    config: QuadratureConfig,
}

impl AdaptiveSimpson {
    /// Create an integrator with the given configuration.
    pub fn new(config: QuadratureConfig) -> Self {
        Self { config }
    }

    /// Create an integrator with the default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: QuadratureConfig::default(),
        }
    }

    /// Create an integrator with an explicit absolute tolerance.
    pub fn with_tolerance(abs_tolerance: f64) -> Self {
        Self {
            config: QuadratureConfig::new(abs_tolerance, QuadratureConfig::default().max_depth),
        }
    }

    /// Integrate `f` over `[lower, upper]`.
    ///
    /// # Returns
    ///
    /// * `Ok(value)` - Integral estimate within the configured tolerance
    /// * `Err(IntegrationError::InvalidBounds)` - NaN bounds or `upper < lower`
    /// * `Err(IntegrationError::NonFiniteIntegrand)` - integrand returned NaN/inf
    /// * `Err(IntegrationError::MaxSubdivisionsExceeded)` - depth exhausted
    pub fn integrate<F>(&self, f: &F, lower: f64, upper: f64) -> Result<f64, IntegrationError>
    where
        F: Fn(f64) -> f64,
    {
        if !lower.is_finite() || !upper.is_finite() || upper < lower {
            return Err(IntegrationError::InvalidBounds { lower, upper });
        }
        if lower == upper {
            return Ok(0.0);
        }

        let fa = eval(f, lower)?;
        let fb = eval(f, upper)?;
        let mid = 0.5 * (lower + upper);
        let fm = eval(f, mid)?;
        let whole = simpson(fa, fm, fb, lower, upper);

        let result = self.refine(
            f,
            lower,
            upper,
            fa,
            fm,
            fb,
            whole,
            self.config.abs_tolerance,
            self.config.max_depth,
        );
        if result.is_err() {
            tracing::trace!(lower, upper, "adaptive quadrature failed to converge");
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn refine<F>(
        &self,
        f: &F,
        a: f64,
        b: f64,
        fa: f64,
        fm: f64,
        fb: f64,
        whole: f64,
        tol: f64,
        depth: usize,
    ) -> Result<f64, IntegrationError>
    where
        F: Fn(f64) -> f64,
    {
        let m = 0.5 * (a + b);
        let lm = 0.5 * (a + m);
        let rm = 0.5 * (m + b);
        let flm = eval(f, lm)?;
        let frm = eval(f, rm)?;

        let left = simpson(fa, flm, fm, a, m);
        let right = simpson(fm, frm, fb, m, b);
        let delta = left + right - whole;

        if delta.abs() <= 15.0 * tol {
            return Ok(left + right + delta / 15.0);
        }
        if depth == 0 {
            return Err(IntegrationError::MaxSubdivisionsExceeded {
                lower: a,
                upper: b,
                max_depth: self.config.max_depth,
            });
        }

        let half_tol = 0.5 * tol;
        let l = self.refine(f, a, m, fa, flm, fm, left, half_tol, depth - 1)?;
        let r = self.refine(f, m, b, fm, frm, fb, right, half_tol, depth - 1)?;
        Ok(l + r)
    }

    /// Returns a reference to the quadrature configuration.
    pub fn config(&self) -> &QuadratureConfig {
        &self.config
    }
}

#[inline]
fn simpson(fa: f64, fm: f64, fb: f64, a: f64, b: f64) -> f64 {
    (b - a) / 6.0 * (fa + 4.0 * fm + fb)
}

#[inline]
fn eval<F: Fn(f64) -> f64>(f: &F, x: f64) -> Result<f64, IntegrationError> {
    let y = f(x);
    if y.is_finite() {
        Ok(y)
    } else {
        Err(IntegrationError::NonFiniteIntegrand { x })
    }
}
