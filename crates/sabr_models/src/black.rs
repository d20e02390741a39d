//! Black option formula with numeraire 1 and its algorithmic adjoints.
//!
//! The replication pricers work with undiscounted swaption prices, so every
//! function here prices with numeraire 1; discounting is applied by the
//! caller. The second-order adjoint is ordered (forward, volatility, strike),
//! which is the order the extrapolation fit consumes.

use crate::distributions::{norm_cdf, norm_pdf};

/// Strikes below this level collapse a call to its intrinsic forward payoff.
const SMALL_STRIKE: f64 = 1e-10;

/// First-order price derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackAdjoint {
    /// Option price.
    pub price: f64,
    /// Derivative with respect to the forward.
    pub d_forward: f64,
    /// Derivative with respect to the volatility.
    pub d_vol: f64,
    /// Derivative with respect to the strike.
    pub d_strike: f64,
}

/// Price with first- and second-order derivatives in (forward, vol, strike).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackAdjoint2 {
    /// Option price.
    pub price: f64,
    /// Gradient ordered `[d_forward, d_vol, d_strike]`.
    pub gradient: [f64; 3],
    /// Symmetric Hessian in the same ordering.
    pub hessian: [[f64; 3]; 3],
}

/// Undiscounted Black price.
pub fn price(forward: f64, strike: f64, expiry: f64, volatility: f64, is_call: bool) -> f64 {
    if strike < SMALL_STRIKE {
        return if is_call { forward - strike } else { 0.0 };
    }
    let sigma_root_t = volatility * expiry.sqrt();
    let d1 = ((forward / strike).ln() + 0.5 * sigma_root_t * sigma_root_t) / sigma_root_t;
    let d2 = d1 - sigma_root_t;
    if is_call {
        forward * norm_cdf(d1) - strike * norm_cdf(d2)
    } else {
        strike * norm_cdf(-d2) - forward * norm_cdf(-d1)
    }
}

/// Price and first-order derivatives.
pub fn price_adjoint(
    forward: f64,
    strike: f64,
    expiry: f64,
    volatility: f64,
    is_call: bool,
) -> BlackAdjoint {
    let sqrt_t = expiry.sqrt();
    let sigma_root_t = volatility * sqrt_t;
    let d1 = ((forward / strike).ln() + 0.5 * sigma_root_t * sigma_root_t) / sigma_root_t;
    let d2 = d1 - sigma_root_t;
    let d_vol = forward * norm_pdf(d1) * sqrt_t;
    if is_call {
        BlackAdjoint {
            price: forward * norm_cdf(d1) - strike * norm_cdf(d2),
            d_forward: norm_cdf(d1),
            d_vol,
            d_strike: -norm_cdf(d2),
        }
    } else {
        BlackAdjoint {
            price: strike * norm_cdf(-d2) - forward * norm_cdf(-d1),
            d_forward: -norm_cdf(-d1),
            d_vol,
            d_strike: norm_cdf(-d2),
        }
    }
}

/// Price with first- and second-order derivatives in (forward, vol, strike).
///
/// The Hessian is identical for calls and puts; the put price and first-order
/// terms follow from call/put parity.
pub fn price_adjoint2(
    forward: f64,
    strike: f64,
    expiry: f64,
    volatility: f64,
    is_call: bool,
) -> BlackAdjoint2 {
    let sqrt_t = expiry.sqrt();
    let sigma_root_t = volatility * sqrt_t;
    let d1 = ((forward / strike).ln() + 0.5 * sigma_root_t * sigma_root_t) / sigma_root_t;
    let d2 = d1 - sigma_root_t;
    let nd1 = norm_pdf(d1);
    let nd2 = norm_pdf(d2);

    let mut p = forward * norm_cdf(d1) - strike * norm_cdf(d2);
    let mut d_forward = norm_cdf(d1);
    let d_vol = forward * nd1 * sqrt_t;
    let mut d_strike = -norm_cdf(d2);
    if !is_call {
        p = p - forward + strike;
        d_forward -= 1.0;
        d_strike += 1.0;
    }

    let d2_ff = nd1 / (forward * sigma_root_t);
    let d2_fv = -nd1 * d2 / volatility;
    let d2_fk = -nd1 / (strike * sigma_root_t);
    let d2_vv = forward * nd1 * sqrt_t * d1 * d2 / volatility;
    let d2_vk = forward * nd1 * d1 / (volatility * strike);
    let d2_kk = nd2 / (strike * sigma_root_t);

    BlackAdjoint2 {
        price: p,
        gradient: [d_forward, d_vol, d_strike],
        hessian: [
            [d2_ff, d2_fv, d2_fk],
            [d2_fv, d2_vv, d2_vk],
            [d2_fk, d2_vk, d2_kk],
        ],
    }
}
