//! Bilinear interpolation on a rectangular grid.

use crate::types::InterpolationError;
use num_traits::Float;

/// Bilinear interpolator over a rectangular (x, y) grid.
///
/// `zs[i][j]` is the value at `(xs[i], ys[j])`. Both axes must be strictly
/// increasing. Used by the SABR parameter surfaces, which query with the
/// instrument's (expiry, tenor) pair.
///
/// # Example
///
/// ```
/// use sabr_core::math::interpolators::BilinearInterpolator;
///
/// let interp = BilinearInterpolator::new(
///     &[0.0, 1.0],
///     &[0.0, 1.0],
///     &[vec![0.0, 1.0], vec![1.0, 2.0]],
/// ).unwrap();
/// let z: f64 = interp.interpolate(0.5, 0.5).unwrap();
/// assert!((z - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BilinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
    zs: Vec<Vec<T>>,
}

impl<T: Float> BilinearInterpolator<T> {
    /// Construct an interpolator from grid axes and values.
    ///
    /// # Returns
    ///
    /// * `Err(InterpolationError::InsufficientData)` - an axis has < 2 nodes
    /// * `Err(InterpolationError::NonMonotonicData)` - an axis is not strictly
    ///   increasing
    /// * `Err(InterpolationError::DimensionMismatch)` - grid shape does not
    ///   match the axes
    pub fn new(xs: &[T], ys: &[T], zs: &[Vec<T>]) -> Result<Self, InterpolationError> {
        for axis in [xs, ys] {
            if axis.len() < 2 {
                return Err(InterpolationError::InsufficientData {
                    got: axis.len(),
                    need: 2,
                });
            }
            for i in 1..axis.len() {
                if axis[i] <= axis[i - 1] {
                    return Err(InterpolationError::NonMonotonicData { index: i });
                }
            }
        }
        if zs.len() != xs.len() {
            return Err(InterpolationError::DimensionMismatch {
                got: zs.len(),
                expected: xs.len(),
            });
        }
        for row in zs {
            if row.len() != ys.len() {
                return Err(InterpolationError::DimensionMismatch {
                    got: row.len(),
                    expected: ys.len(),
                });
            }
        }
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            zs: zs.to_vec(),
        })
    }

    /// The x-axis domain.
    #[inline]
    pub fn domain_x(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// The y-axis domain.
    #[inline]
    pub fn domain_y(&self) -> (T, T) {
        (self.ys[0], self.ys[self.ys.len() - 1])
    }

    /// The x-axis nodes.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// The y-axis nodes.
    #[inline]
    pub fn ys(&self) -> &[T] {
        &self.ys
    }

    /// The grid values, indexed `[x][y]`.
    #[inline]
    pub fn values(&self) -> &[Vec<T>] {
        &self.zs
    }

    /// Interpolate at `(x, y)`; errors outside the grid.
    pub fn interpolate(&self, x: T, y: T) -> Result<T, InterpolationError> {
        let (x_min, x_max) = self.domain_x();
        if x < x_min || x > x_max {
            return Err(InterpolationError::OutOfBounds {
                x: x.to_f64().unwrap_or(f64::NAN),
                min: x_min.to_f64().unwrap_or(f64::NAN),
                max: x_max.to_f64().unwrap_or(f64::NAN),
            });
        }
        let (y_min, y_max) = self.domain_y();
        if y < y_min || y > y_max {
            return Err(InterpolationError::OutOfBounds {
                x: y.to_f64().unwrap_or(f64::NAN),
                min: y_min.to_f64().unwrap_or(f64::NAN),
                max: y_max.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(self.value_at(x, y))
    }

    /// Interpolate at `(x, y)` with the coordinates clamped to the grid
    /// domain (flat extrapolation outside the grid).
    pub fn interpolate_clamped(&self, x: T, y: T) -> T {
        let (x_min, x_max) = self.domain_x();
        let (y_min, y_max) = self.domain_y();
        let x = x.max(x_min).min(x_max);
        let y = y.max(y_min).min(y_max);
        self.value_at(x, y)
    }

    fn value_at(&self, x: T, y: T) -> T {
        let i = find_cell(&self.xs, x);
        let j = find_cell(&self.ys, y);

        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[j], self.ys[j + 1]);
        let z00 = self.zs[i][j];
        let z10 = self.zs[i + 1][j];
        let z01 = self.zs[i][j + 1];
        let z11 = self.zs[i + 1][j + 1];

        let u = (x - x0) / (x1 - x0);
        let v = (y - y0) / (y1 - y0);
        let one = T::one();
        (one - u) * (one - v) * z00 + u * (one - v) * z10 + (one - u) * v * z01 + u * v * z11
    }
}

/// Cell index `i` with `axis[i] <= q < axis[i+1]`, clamped to [0, n-2].
#[inline]
fn find_cell<T: Float>(axis: &[T], q: T) -> usize {
    let pos = axis.partition_point(|&v| v <= q);
    if pos == 0 {
        0
    } else if pos >= axis.len() {
        axis.len() - 2
    } else {
        pos - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> BilinearInterpolator<f64> {
        BilinearInterpolator::new(
            &[0.0, 1.0, 2.0],
            &[0.0, 10.0],
            &[vec![0.0, 10.0], vec![1.0, 11.0], vec![2.0, 12.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_interpolate_at_nodes() {
        let interp = grid();
        assert_eq!(interp.interpolate(1.0, 0.0).unwrap(), 1.0);
        assert_eq!(interp.interpolate(2.0, 10.0).unwrap(), 12.0);
    }

    #[test]
    fn test_interpolate_cell_interior() {
        let interp = grid();
        let z = interp.interpolate(0.5, 5.0).unwrap();
        assert!((z - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_bounds() {
        let interp = grid();
        assert!(matches!(
            interp.interpolate(-0.1, 5.0),
            Err(InterpolationError::OutOfBounds { .. })
        ));
        assert!(matches!(
            interp.interpolate(1.0, 11.0),
            Err(InterpolationError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_clamped_extrapolation_is_flat() {
        let interp = grid();
        assert_eq!(interp.interpolate_clamped(-5.0, -5.0), 0.0);
        assert_eq!(interp.interpolate_clamped(100.0, 100.0), 12.0);
    }

    #[test]
    fn test_bad_grid_shape() {
        let result = BilinearInterpolator::new(
            &[0.0, 1.0],
            &[0.0, 1.0],
            &[vec![0.0, 1.0], vec![1.0]],
        );
        assert!(matches!(
            result,
            Err(InterpolationError::DimensionMismatch { got: 1, expected: 2 })
        ));
    }

    #[test]
    fn test_non_monotonic_axis() {
        let result = BilinearInterpolator::new(
            &[0.0, 0.0],
            &[0.0, 1.0],
            &[vec![0.0, 1.0], vec![1.0, 2.0]],
        );
        assert!(matches!(
            result,
            Err(InterpolationError::NonMonotonicData { index: 1 })
        ));
    }
}
