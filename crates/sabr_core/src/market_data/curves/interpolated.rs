//! Interpolated yield curve implementation.

use super::YieldCurve;
use crate::market_data::error::MarketDataError;
use crate::math::interpolators::LinearInterpolator;
use num_traits::Float;

/// Yield curve interpolating zero rates linearly between node times.
///
/// The discount factor is `exp(-r(t) * t)` with `r(t)` piecewise linear on
/// the nodes and flat beyond them. Node-bumped copies for finite-difference
/// sensitivity checks are produced by [`InterpolatedCurve::with_rate_shift`];
/// the original is never mutated.
///
/// # Example
///
/// ```
/// use sabr_core::market_data::curves::{YieldCurve, InterpolatedCurve};
///
/// let curve = InterpolatedCurve::new(
///     &[0.5, 1.0, 5.0, 10.0],
///     &[0.02, 0.025, 0.03, 0.035],
/// ).unwrap();
/// let df = curve.discount_factor(2.0).unwrap();
/// assert!(df > 0.0 && df < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedCurve<T: Float> {
    times: Vec<T>,
    rates: Vec<T>,
}

impl<T: Float> InterpolatedCurve<T> {
    /// Construct a curve from node times and zero rates.
    ///
    /// Node times must be positive and strictly increasing, with at least
    /// two nodes.
    pub fn new(times: &[T], rates: &[T]) -> Result<Self, MarketDataError> {
        if times.len() < 2 {
            return Err(MarketDataError::InsufficientData {
                got: times.len(),
                need: 2,
            });
        }
        if rates.len() != times.len() {
            return Err(MarketDataError::InsufficientData {
                got: rates.len(),
                need: times.len(),
            });
        }
        for (i, &t) in times.iter().enumerate() {
            if t <= T::zero() {
                return Err(MarketDataError::InvalidMaturity {
                    t: t.to_f64().unwrap_or(0.0),
                });
            }
            if i > 0 && t <= times[i - 1] {
                return Err(MarketDataError::InvalidMaturity {
                    t: t.to_f64().unwrap_or(0.0),
                });
            }
        }
        Ok(Self {
            times: times.to_vec(),
            rates: rates.to_vec(),
        })
    }

    /// Node times.
    #[inline]
    pub fn times(&self) -> &[T] {
        &self.times
    }

    /// Node zero rates.
    #[inline]
    pub fn rates(&self) -> &[T] {
        &self.rates
    }

    /// A copy with the rate at `node_index` shifted by `shift`.
    ///
    /// # Panics
    ///
    /// Panics if `node_index` is out of range.
    pub fn with_rate_shift(&self, node_index: usize, shift: T) -> Self {
        let mut rates = self.rates.clone();
        rates[node_index] = rates[node_index] + shift;
        Self {
            times: self.times.clone(),
            rates,
        }
    }

    /// A copy with every node rate shifted by `shift` (parallel bump).
    pub fn with_parallel_shift(&self, shift: T) -> Self {
        let rates: Vec<T> = self.rates.iter().map(|&r| r + shift).collect();
        Self {
            times: self.times.clone(),
            rates,
        }
    }

    fn rate_at(&self, t: T) -> T {
        // Construction guarantees the interpolator inputs are valid.
        let interp = LinearInterpolator::new(&self.times, &self.rates)
            .expect("curve nodes validated at construction");
        interp.interpolate_flat(t)
    }
}

impl<T: Float> YieldCurve<T> for InterpolatedCurve<T> {
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError> {
        if t < T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        if t == T::zero() {
            return Ok(T::one());
        }
        let r = self.rate_at(t);
        Ok((-r * t).exp())
    }

    fn zero_rate(&self, t: T) -> Result<T, MarketDataError> {
        if t <= T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        Ok(self.rate_at(t))
    }
}
