//! SABR right-tail price extrapolation.
//!
//! Above a cut-off strike the Black price implied by the Hagan smile is
//! replaced by the tail function
//!
//! ```text
//! f(K) = K^(-mu) * exp(a + b/K + c/K^2)
//! ```
//!
//! with (a, b, c) fitted so that the price and its first two strike
//! derivatives are continuous at the cut-off (C² matching). The fit solves
//! for c by root-finding on the residual of the second-derivative match; b
//! and a then follow in closed form. Derivatives of the tail price with
//! respect to the forward and the SABR parameters are obtained by implicit
//! differentiation of the matching conditions through a 3x3 linear solve,
//! with the required third-order terms approximated by finite differences
//! on the second-order adjoints.

use std::sync::OnceLock;

use sabr_core::market_data::SabrParameters;
use sabr_core::math::solvers::{bracket_root, BrentSolver, SolverConfig};
use sabr_core::types::SolverError;
use thiserror::Error;

use crate::black;
use crate::sabr::hagan;

/// Below this expiry the tail is taken as (numerically) zero.
const SMALL_EXPIRY: f64 = 1e-6;
/// Tail parameter a for the zero-expiry degenerate case.
const SMALL_PARAMETER: f64 = -1.0e4;
/// Threshold under which the price and its derivatives count as zero.
const SMALL_PRICE: f64 = 1e-15;
/// Relative shift for the finite-difference third-order terms.
const FD_SHIFT: f64 = 1e-5;

/// Errors from the tail fit or its implicit differentiation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtrapolationError {
    /// Root-finding for the c parameter failed.
    #[error(transparent)]
    Solver(#[from] SolverError),
    /// The implicit-differentiation system is singular.
    #[error("Singular system in tail parameter differentiation")]
    SingularSystem,
}

/// Fitted right-tail extrapolation of the SABR smile price.
#[derive(Debug)]
pub struct SabrExtrapolation {
    params: SabrParameters,
    forward: f64,
    cutoff: f64,
    expiry: f64,
    mu: f64,
    /// Fitted tail parameters (a, b, c).
    tail: [f64; 3],
    /// Price and its first two strike derivatives at the cut-off.
    price_k: [f64; 3],
    /// Smile volatility at the cut-off.
    volatility_k: f64,
    param_deriv_forward: OnceLock<Result<[f64; 3], ExtrapolationError>>,
    param_deriv_sabr: OnceLock<Result<[[f64; 3]; 4], ExtrapolationError>>,
}

impl SabrExtrapolation {
    /// Fit the tail at construction.
    ///
    /// Expiries below 1e-6 yield the degenerate tail (a = -1e4), as does a
    /// cut-off price whose value and first two derivatives are all below
    /// 1e-15 in magnitude (a = -100).
    pub fn new(
        params: SabrParameters,
        forward: f64,
        cutoff: f64,
        expiry: f64,
        mu: f64,
    ) -> Result<Self, ExtrapolationError> {
        let mut out = Self {
            params,
            forward,
            cutoff,
            expiry,
            mu,
            tail: [SMALL_PARAMETER, 0.0, 0.0],
            price_k: [0.0; 3],
            volatility_k: 0.0,
            param_deriv_forward: OnceLock::new(),
            param_deriv_sabr: OnceLock::new(),
        };
        if expiry > SMALL_EXPIRY {
            out.fit()?;
        }
        Ok(out)
    }

    fn fit(&mut self) -> Result<(), ExtrapolationError> {
        let kc = self.cutoff;
        let mu = self.mu;
        let v = hagan::volatility_adjoint2(self.forward, kc, self.expiry, &self.params);
        self.volatility_k = v.volatility;
        let bs = black::price_adjoint2(self.forward, kc, self.expiry, v.volatility, true);
        let vk = v.gradient.d_strike;
        let pk = [
            bs.price,
            bs.gradient[2] + bs.gradient[1] * vk,
            bs.hessian[2][2]
                + bs.hessian[1][2] * vk
                + (bs.hessian[2][1] + bs.hessian[1][1] * vk) * vk
                + bs.gradient[1] * v.d2[1][1],
        ];
        self.price_k = pk;
        if pk[0].abs() < SMALL_PRICE && pk[1].abs() < SMALL_PRICE && pk[2].abs() < SMALL_PRICE {
            self.tail = [-100.0, 0.0, 0.0];
            return Ok(());
        }
        let residual = |c: f64| {
            let b = -2.0 * c / kc - (pk[1] / pk[0] * kc + mu) * kc;
            let k2 = kc * kc;
            -pk[2] / pk[0] * k2
                + mu * (mu + 1.0)
                + 2.0 * b * (mu + 1.0) / kc
                + (2.0 * c * (2.0 * mu + 3.0) + b * b) / k2
                + 4.0 * b * c / (k2 * kc)
                + 4.0 * c * c / (k2 * k2)
        };
        let (lo, hi) = bracket_root(&residual, -1.0, 1.0)?;
        let solver = BrentSolver::new(SolverConfig::high_precision());
        let c = solver.find_root(&residual, lo, hi)?;
        let b = -2.0 * c / kc - (pk[1] / pk[0] * kc + mu) * kc;
        let a = (pk[0] / kc.powf(-mu)).ln() - b / kc - c / (kc * kc);
        self.tail = [a, b, c];
        tracing::debug!(a, b, c, cutoff = kc, "fitted extrapolation tail");
        Ok(())
    }

    /// The fitted tail parameters (a, b, c).
    pub fn tail_parameters(&self) -> [f64; 3] {
        self.tail
    }

    /// Smile volatility at the cut-off strike.
    pub fn volatility_at_cutoff(&self) -> f64 {
        self.volatility_k
    }

    /// The cut-off strike.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Tail value f(K) = K^(-mu) exp(a + b/K + c/K²).
    pub fn extrapolation(&self, strike: f64) -> f64 {
        let [a, b, c] = self.tail;
        strike.powf(-self.mu) * (a + b / strike + c / (strike * strike)).exp()
    }

    /// First strike derivative of the tail value.
    pub fn extrapolation_derivative(&self, strike: f64) -> f64 {
        let [_, b, c] = self.tail;
        -self.extrapolation(strike) * (self.mu + (b + 2.0 * c / strike) / strike) / strike
    }

    /// Option price with numeraire 1: SABR Black below the cut-off, the tail
    /// above it. Puts by call/put parity in the tail region.
    pub fn price(&self, strike: f64, is_call: bool) -> f64 {
        if strike <= self.cutoff {
            let vol = hagan::volatility(self.forward, strike, self.expiry, &self.params);
            return black::price(self.forward, strike, self.expiry, vol, is_call);
        }
        let mut p = self.extrapolation(strike);
        if !is_call {
            p -= self.forward - strike;
        }
        p
    }

    /// Strike derivative of the price in both regions.
    pub fn price_derivative_strike(&self, strike: f64, is_call: bool) -> f64 {
        if strike <= self.cutoff {
            let (vol, grad) =
                hagan::volatility_adjoint(self.forward, strike, self.expiry, &self.params);
            let bs = black::price_adjoint(self.forward, strike, self.expiry, vol, is_call);
            return bs.d_strike + bs.d_vol * grad.d_strike;
        }
        let mut d = self.extrapolation_derivative(strike);
        if !is_call {
            d += 1.0;
        }
        d
    }

    /// Forward derivative of the price in both regions.
    pub fn price_derivative_forward(
        &self,
        strike: f64,
        is_call: bool,
    ) -> Result<f64, ExtrapolationError> {
        if strike <= self.cutoff {
            let (vol, grad) =
                hagan::volatility_adjoint(self.forward, strike, self.expiry, &self.params);
            let bs = black::price_adjoint(self.forward, strike, self.expiry, vol, is_call);
            return Ok(bs.d_forward + bs.d_vol * grad.d_forward);
        }
        let dp = self
            .param_deriv_forward
            .get_or_init(|| self.compute_param_deriv_forward())
            .clone()?;
        let f = self.extrapolation(strike);
        let mut d = f * dp[0] + f / strike * dp[1] + f / (strike * strike) * dp[2];
        if !is_call {
            d -= 1.0;
        }
        Ok(d)
    }

    /// Price and its derivative with respect to (alpha, beta, rho, nu).
    pub fn price_adjoint_sabr(
        &self,
        strike: f64,
        is_call: bool,
    ) -> Result<(f64, [f64; 4]), ExtrapolationError> {
        if strike <= self.cutoff {
            let (vol, grad) =
                hagan::volatility_adjoint(self.forward, strike, self.expiry, &self.params);
            let bs = black::price_adjoint(self.forward, strike, self.expiry, vol, is_call);
            let mut d = [0.0; 4];
            for (i, slot) in d.iter_mut().enumerate() {
                *slot = bs.d_vol * grad.parameter(i);
            }
            return Ok((bs.price, d));
        }
        let dp = self
            .param_deriv_sabr
            .get_or_init(|| self.compute_param_deriv_sabr())
            .clone()?;
        let f = self.extrapolation(strike);
        let f_da = f;
        let f_db = f / strike;
        let f_dc = f_db / strike;
        let mut d = [0.0; 4];
        for (i, slot) in d.iter_mut().enumerate() {
            *slot = f_da * dp[i][0] + f_db * dp[i][1] + f_dc * dp[i][2];
        }
        Ok((f, d))
    }

    /// The 3x3 Jacobian of the matching conditions in (a, b, c).
    fn matching_jacobian(&self) -> [[f64; 3]; 3] {
        let kc = self.cutoff;
        let mu = self.mu;
        let [_, b, c] = self.tail;
        let f = self.price_k[0];
        let fp = self.price_k[1];
        let fpp = self.price_k[2];
        let mut fd = [[0.0; 3]; 3];
        fd[0][0] = f;
        fd[0][1] = f / kc;
        fd[0][2] = fd[0][1] / kc;
        fd[1][0] = fp;
        fd[1][1] = (fp - fd[0][1]) / kc;
        fd[1][2] = (fp - 2.0 * fd[0][1]) / (kc * kc);
        fd[2][0] = fpp;
        fd[2][1] = (fpp + fd[0][2] * (2.0 * (mu + 1.0) + 2.0 * b / kc + 4.0 * c / (kc * kc))) / kc;
        fd[2][2] = (fpp
            + fd[0][2] * (2.0 * (2.0 * mu + 3.0) + 4.0 * b / kc + 8.0 * c / (kc * kc)))
            / (kc * kc);
        fd
    }

    /// Derivative of (a, b, c) with respect to the forward.
    fn compute_param_deriv_forward(&self) -> Result<[f64; 3], ExtrapolationError> {
        if self.degenerate_tail() {
            return Ok([0.0; 3]);
        }
        let kc = self.cutoff;
        let t = self.expiry;
        let vol_k = self.volatility_k;
        let v = hagan::volatility_adjoint2(self.forward, kc, t, &self.params);
        let bs = black::price_adjoint2(self.forward, kc, t, vol_k, true);
        let vd = v.gradient;

        // Third-order terms by finite difference on the second-order adjoints.
        let bs_kp = black::price_adjoint2(self.forward, kc * (1.0 + FD_SHIFT), t, vol_k, true);
        let bs_d3_fkk = (bs_kp.hessian[2][0] - bs.hessian[2][0]) / (kc * FD_SHIFT);
        let bs_vp = black::price_adjoint2(self.forward, kc, t, vol_k * (1.0 + FD_SHIFT), true);
        let vol_shift = vol_k * FD_SHIFT;
        let bs_d3_sss = (bs_vp.hessian[1][1] - bs.hessian[1][1]) / vol_shift;
        let bs_d3_sfk = (bs_vp.hessian[0][2] - bs.hessian[0][2]) / vol_shift;
        let bs_d3_sfs = (bs_vp.hessian[0][1] - bs.hessian[0][1]) / vol_shift;
        let bs_d3_skk = (bs_vp.hessian[2][2] - bs.hessian[2][2]) / vol_shift;
        let bs_d3_ssk = (bs_vp.hessian[1][2] - bs.hessian[1][2]) / vol_shift;
        let v_kp =
            hagan::volatility_adjoint2(self.forward, kc * (1.0 + FD_SHIFT), t, &self.params);
        let v_d3_kkf = (v_kp.d2[1][0] - v.d2[1][0]) / (kc * FD_SHIFT);

        let p_df = [
            bs.gradient[0] + bs.gradient[1] * vd.d_forward,
            bs.hessian[0][2]
                + bs.hessian[1][0] * vd.d_strike
                + (bs.hessian[2][1] + bs.hessian[1][1] * vd.d_strike) * vd.d_forward
                + bs.gradient[1] * v.d2[1][0],
            bs_d3_fkk
                + bs_d3_sfk * vd.d_strike
                + (bs_d3_sfk + bs_d3_sfs * vd.d_strike) * vd.d_strike
                + bs.hessian[1][0] * v.d2[1][1]
                + (bs_d3_skk
                    + bs_d3_ssk * vd.d_strike
                    + (bs_d3_ssk + bs_d3_sss * vd.d_strike) * vd.d_strike
                    + bs.hessian[1][1] * v.d2[1][1])
                    * vd.d_forward
                + 2.0 * (bs.hessian[2][1] + bs.hessian[1][1] * vd.d_strike) * v.d2[1][0]
                + bs.gradient[1] * v_d3_kkf,
        ];
        solve3(self.matching_jacobian(), p_df).ok_or(ExtrapolationError::SingularSystem)
    }

    /// Derivative of (a, b, c) with respect to (alpha, beta, rho, nu).
    fn compute_param_deriv_sabr(&self) -> Result<[[f64; 3]; 4], ExtrapolationError> {
        if self.degenerate_tail() {
            return Ok([[0.0; 3]; 4]);
        }
        let kc = self.cutoff;
        let t = self.expiry;
        let vol_k = self.volatility_k;
        let v = hagan::volatility_adjoint2(self.forward, kc, t, &self.params);
        let vd = v.gradient;
        let bs = black::price_adjoint2(self.forward, kc, t, vol_k, true);
        let bs_vp = black::price_adjoint2(self.forward, kc, t, vol_k * (1.0 + FD_SHIFT), true);
        let vol_shift = vol_k * FD_SHIFT;
        let bs_d3_sss = (bs_vp.hessian[1][1] - bs.hessian[1][1]) / vol_shift;
        let bs_d3_skk = (bs_vp.hessian[2][2] - bs.hessian[2][2]) / vol_shift;
        let bs_d3_ssk = (bs_vp.hessian[1][2] - bs.hessian[1][2]) / vol_shift;
        let jac = self.matching_jacobian();

        let mut result = [[0.0; 3]; 4];
        for (index, out) in result.iter_mut().enumerate() {
            // Relative shift for alpha/nu (scale parameters), absolute for
            // beta/rho (which may be zero).
            let (bumped, shift) = bump_parameter(&self.params, index);
            let v_pp = hagan::volatility_adjoint2(self.forward, kc, t, &bumped);
            let v_d2_kp = (v_pp.gradient.d_strike - vd.d_strike) / shift;
            let v_d3_kkp = (v_pp.d2[1][1] - v.d2[1][1]) / shift;
            let dparam = vd.parameter(index);
            let p_dp = [
                bs.gradient[1] * dparam,
                (bs.hessian[2][1] + bs.hessian[1][1] * vd.d_strike) * dparam
                    + bs.gradient[1] * v_d2_kp,
                (bs_d3_skk
                    + bs_d3_ssk * vd.d_strike
                    + (bs_d3_ssk + bs_d3_sss * vd.d_strike) * vd.d_strike
                    + bs.hessian[1][1] * v.d2[1][1])
                    * dparam
                    + 2.0 * (bs.hessian[1][2] + bs.hessian[1][1] * vd.d_strike) * v_d2_kp
                    + bs.gradient[1] * v_d3_kkp,
            ];
            *out = solve3(jac, p_dp).ok_or(ExtrapolationError::SingularSystem)?;
        }
        Ok(result)
    }

    fn degenerate_tail(&self) -> bool {
        self.price_k[0].abs() < SMALL_PRICE
            && self.price_k[1].abs() < SMALL_PRICE
            && self.price_k[2].abs() < SMALL_PRICE
    }
}

fn bump_parameter(params: &SabrParameters, index: usize) -> (SabrParameters, f64) {
    let mut p = *params;
    let shift = match index {
        0 => {
            let s = p.alpha * FD_SHIFT;
            p.alpha += s;
            s
        }
        1 => {
            p.beta += FD_SHIFT;
            FD_SHIFT
        }
        2 => {
            p.rho += FD_SHIFT;
            FD_SHIFT
        }
        _ => {
            let s = p.nu * FD_SHIFT;
            p.nu += s;
            s
        }
    };
    (p, shift)
}

/// Solve a 3x3 linear system by Gaussian elimination with partial pivoting.
fn solve3(a: [[f64; 3]; 3], b: [f64; 3]) -> Option<[f64; 3]> {
    let mut m = [[0.0_f64; 4]; 3];
    for i in 0..3 {
        m[i][..3].copy_from_slice(&a[i]);
        m[i][3] = b[i];
    }
    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| {
            m[i][col]
                .abs()
                .partial_cmp(&m[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if m[pivot][col].abs() < f64::MIN_POSITIVE {
            return None;
        }
        m.swap(col, pivot);
        for row in (col + 1)..3 {
            let factor = m[row][col] / m[col][col];
            for k in col..4 {
                m[row][k] -= factor * m[col][k];
            }
        }
    }
    let mut x = [0.0_f64; 3];
    for row in (0..3).rev() {
        let mut sum = m[row][3];
        for k in (row + 1)..3 {
            sum -= m[row][k] * x[k];
        }
        x[row] = sum / m[row][row];
    }
    Some(x)
}
