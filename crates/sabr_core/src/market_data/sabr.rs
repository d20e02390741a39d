//! SABR parameter surfaces.
//!
//! Smile parameters are stored on a rectangular (expiry, tenor) grid, one
//! grid per parameter, and interpolated bilinearly with flat extrapolation
//! outside the grid. Bumped copies of a surface support finite-difference
//! checks of the analytic parameter sensitivities.

use crate::math::interpolators::BilinearInterpolator;
use crate::types::{InterpolationError, InvalidParameterError};

use super::curves::CurveBundle;

/// SABR smile parameters at a single (expiry, tenor) point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SabrParameters {
    /// Overall volatility level.
    pub alpha: f64,
    /// CEV exponent in `[0, 1]`.
    pub beta: f64,
    /// Spot/vol correlation in `(-1, 1)`.
    pub rho: f64,
    /// Volatility of volatility.
    pub nu: f64,
}

impl SabrParameters {
    /// Construct validated parameters.
    pub fn new(alpha: f64, beta: f64, rho: f64, nu: f64) -> Result<Self, InvalidParameterError> {
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(InvalidParameterError::new("alpha", alpha, "alpha >= 0"));
        }
        if !beta.is_finite() || !(0.0..=1.0).contains(&beta) {
            return Err(InvalidParameterError::new("beta", beta, "0 <= beta <= 1"));
        }
        if !rho.is_finite() || rho <= -1.0 || rho >= 1.0 {
            return Err(InvalidParameterError::new("rho", rho, "-1 < rho < 1"));
        }
        if !nu.is_finite() || nu < 0.0 {
            return Err(InvalidParameterError::new("nu", nu, "nu >= 0"));
        }
        Ok(Self { alpha, beta, rho, nu })
    }
}

/// Which SABR parameter a bump or sensitivity refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SabrParameterKind {
    /// Volatility level.
    Alpha,
    /// CEV exponent.
    Beta,
    /// Spot/vol correlation.
    Rho,
    /// Volatility of volatility.
    Nu,
}

/// SABR parameters on an (expiry, tenor) grid.
#[derive(Debug, Clone)]
pub struct SabrSurface {
    alpha: BilinearInterpolator<f64>,
    beta: BilinearInterpolator<f64>,
    rho: BilinearInterpolator<f64>,
    nu: BilinearInterpolator<f64>,
}

impl SabrSurface {
    /// Build a surface from node axes and one grid per parameter.
    ///
    /// `expiries` and `tenors` must be strictly increasing. Each grid is
    /// indexed `[expiry][tenor]` and every node is validated with
    /// [`SabrParameters::new`].
    pub fn new(
        expiries: &[f64],
        tenors: &[f64],
        alpha: &[Vec<f64>],
        beta: &[Vec<f64>],
        rho: &[Vec<f64>],
        nu: &[Vec<f64>],
    ) -> Result<Self, SabrSurfaceError> {
        for i in 0..expiries.len() {
            for j in 0..tenors.len() {
                let a = grid_at(alpha, i, j)?;
                let b = grid_at(beta, i, j)?;
                let r = grid_at(rho, i, j)?;
                let n = grid_at(nu, i, j)?;
                SabrParameters::new(a, b, r, n)?;
            }
        }
        Ok(Self {
            alpha: BilinearInterpolator::new(expiries, tenors, alpha)?,
            beta: BilinearInterpolator::new(expiries, tenors, beta)?,
            rho: BilinearInterpolator::new(expiries, tenors, rho)?,
            nu: BilinearInterpolator::new(expiries, tenors, nu)?,
        })
    }

    /// Parameters at `(expiry, tenor)`, flat beyond the grid.
    pub fn parameters(&self, expiry: f64, tenor: f64) -> SabrParameters {
        SabrParameters {
            alpha: self.alpha.interpolate_clamped(expiry, tenor),
            beta: self.beta.interpolate_clamped(expiry, tenor),
            rho: self.rho.interpolate_clamped(expiry, tenor),
            nu: self.nu.interpolate_clamped(expiry, tenor),
        }
    }

    /// A copy with every node of one parameter grid shifted by `shift`.
    ///
    /// The bumped nodes are re-validated, so e.g. a rho bump that leaves
    /// `(-1, 1)` is rejected.
    pub fn with_shift(
        &self,
        kind: SabrParameterKind,
        shift: f64,
    ) -> Result<Self, SabrSurfaceError> {
        let bump = |interp: &BilinearInterpolator<f64>| -> Vec<Vec<f64>> {
            interp
                .values()
                .iter()
                .map(|row| row.iter().map(|&v| v + shift).collect())
                .collect()
        };
        let (alpha, beta, rho, nu) = match kind {
            SabrParameterKind::Alpha => (
                bump(&self.alpha),
                self.beta.values().to_vec(),
                self.rho.values().to_vec(),
                self.nu.values().to_vec(),
            ),
            SabrParameterKind::Beta => (
                self.alpha.values().to_vec(),
                bump(&self.beta),
                self.rho.values().to_vec(),
                self.nu.values().to_vec(),
            ),
            SabrParameterKind::Rho => (
                self.alpha.values().to_vec(),
                self.beta.values().to_vec(),
                bump(&self.rho),
                self.nu.values().to_vec(),
            ),
            SabrParameterKind::Nu => (
                self.alpha.values().to_vec(),
                self.beta.values().to_vec(),
                self.rho.values().to_vec(),
                bump(&self.nu),
            ),
        };
        Self::new(self.alpha.xs(), self.alpha.ys(), &alpha, &beta, &rho, &nu)
    }

    /// Expiry axis nodes.
    pub fn expiries(&self) -> &[f64] {
        self.alpha.xs()
    }

    /// Tenor axis nodes.
    pub fn tenors(&self) -> &[f64] {
        self.alpha.ys()
    }
}

fn grid_at(grid: &[Vec<f64>], i: usize, j: usize) -> Result<f64, SabrSurfaceError> {
    grid.get(i)
        .and_then(|row| row.get(j))
        .copied()
        .ok_or(SabrSurfaceError::Interpolation(
            InterpolationError::DimensionMismatch {
                got: grid.get(i).map_or(grid.len(), Vec::len),
                expected: j + 1,
            },
        ))
}

/// Errors from surface construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SabrSurfaceError {
    /// The grid axes or shape are invalid.
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
    /// A node violates the SABR parameter constraints.
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameterError),
}

/// Yield curves plus the SABR surface priced against.
#[derive(Debug, Clone)]
pub struct SabrBundle {
    /// Discounting and forwarding curves.
    pub curves: CurveBundle,
    /// Smile parameter surface.
    pub sabr: SabrSurface,
}

impl SabrBundle {
    /// Pair a curve bundle with a SABR surface.
    pub fn new(curves: CurveBundle, sabr: SabrSurface) -> Self {
        Self { curves, sabr }
    }
}
