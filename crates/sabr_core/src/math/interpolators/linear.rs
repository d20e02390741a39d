//! Piecewise linear interpolation.

use crate::types::InterpolationError;
use num_traits::Float;

/// Piecewise linear interpolator over sorted abscissae.
///
/// # Example
///
/// ```
/// use sabr_core::math::interpolators::LinearInterpolator;
///
/// let interp = LinearInterpolator::new(&[0.0, 1.0, 2.0], &[0.0, 2.0, 4.0]).unwrap();
/// let y: f64 = interp.interpolate(0.5).unwrap();
/// assert!((y - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
}

impl<T: Float> LinearInterpolator<T> {
    /// Construct an interpolator from node coordinates.
    ///
    /// # Returns
    ///
    /// * `Err(InterpolationError::InsufficientData)` - fewer than 2 nodes
    /// * `Err(InterpolationError::DimensionMismatch)` - axis lengths differ
    /// * `Err(InterpolationError::NonMonotonicData)` - `xs` not strictly increasing
    pub fn new(xs: &[T], ys: &[T]) -> Result<Self, InterpolationError> {
        if xs.len() < 2 {
            return Err(InterpolationError::InsufficientData {
                got: xs.len(),
                need: 2,
            });
        }
        if ys.len() != xs.len() {
            return Err(InterpolationError::DimensionMismatch {
                got: ys.len(),
                expected: xs.len(),
            });
        }
        for i in 1..xs.len() {
            if xs[i] <= xs[i - 1] {
                return Err(InterpolationError::NonMonotonicData { index: i });
            }
        }
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    /// Return the interpolation domain (x_min, x_max).
    #[inline]
    pub fn domain(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Node abscissae.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// Node ordinates.
    #[inline]
    pub fn ys(&self) -> &[T] {
        &self.ys
    }

    /// Interpolate at `x`; errors outside the domain.
    pub fn interpolate(&self, x: T) -> Result<T, InterpolationError> {
        let (x_min, x_max) = self.domain();
        if x < x_min || x > x_max {
            return Err(InterpolationError::OutOfBounds {
                x: x.to_f64().unwrap_or(f64::NAN),
                min: x_min.to_f64().unwrap_or(f64::NAN),
                max: x_max.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(self.value_at(x))
    }

    /// Interpolate at `x` with flat extrapolation outside the domain.
    pub fn interpolate_flat(&self, x: T) -> T {
        let (x_min, x_max) = self.domain();
        if x <= x_min {
            return self.ys[0];
        }
        if x >= x_max {
            return self.ys[self.ys.len() - 1];
        }
        self.value_at(x)
    }

    fn value_at(&self, x: T) -> T {
        let i = self.find_segment(x);
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    /// Segment index `i` with `xs[i] <= x < xs[i+1]`, clamped to [0, n-2].
    #[inline]
    fn find_segment(&self, x: T) -> usize {
        let pos = self.xs.partition_point(|&xi| xi <= x);
        if pos == 0 {
            0
        } else if pos >= self.xs.len() {
            self.xs.len() - 2
        } else {
            pos - 1
        }
    }
}
