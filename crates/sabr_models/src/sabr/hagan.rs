//! Hagan (2002) lognormal SABR implied volatility and its adjoints.
//!
//! `volatility` implements the standard smile formula with the usual
//! branches (ATM, beta near 0, beta near 1, small z series, guarded rho
//! limits). `volatility_adjoint2` follows the two-level chain-rule
//! decomposition through `h1 = F*K` and `h2 = ln(F/K)` and returns the
//! gradient in all six inputs plus the (forward, strike) Hessian block,
//! which the right-tail extrapolation fit requires.

use sabr_core::market_data::SabrParameters;

/// Series expansion threshold for the z/chi(z) ratio.
const SMALL_Z: f64 = 1e-6;
/// Width of the ATM branch in |forward - strike|.
const ATM_EPS: f64 = 1e-7;
/// Width of the beta = 0 and beta = 1 special-case branches.
const BETA_EPS: f64 = 1e-8;
/// Guard for the rho -> 1 limit of z/chi(z).
const RHO_EPS: f64 = 1e-5;
/// Strikes are clipped at this fraction of the forward.
const CUTOFF_MONEYNESS: f64 = 1e-12;
/// Strike floor used by the adjoint path.
const MIN_STRIKE: f64 = 1e-6;

/// Gradient of the implied volatility in all six inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityGradient {
    /// Derivative with respect to the forward.
    pub d_forward: f64,
    /// Derivative with respect to the strike.
    pub d_strike: f64,
    /// Derivative with respect to alpha.
    pub d_alpha: f64,
    /// Derivative with respect to beta.
    pub d_beta: f64,
    /// Derivative with respect to rho.
    pub d_rho: f64,
    /// Derivative with respect to nu.
    pub d_nu: f64,
}

impl VolatilityGradient {
    /// Derivative with respect to the SABR parameter at `index`
    /// (0 alpha, 1 beta, 2 rho, 3 nu).
    pub fn parameter(&self, index: usize) -> f64 {
        match index {
            0 => self.d_alpha,
            1 => self.d_beta,
            2 => self.d_rho,
            _ => self.d_nu,
        }
    }
}

/// Volatility, gradient and the second-order (forward, strike) block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityAdjoint2 {
    /// Implied volatility.
    pub volatility: f64,
    /// First-order derivatives.
    pub gradient: VolatilityGradient,
    /// Second derivatives, ordered `[[FF, FK], [KF, KK]]`.
    pub d2: [[f64; 2]; 2],
}

fn z_over_chi(rho: f64, z: f64) -> f64 {
    if z.abs() < SMALL_Z {
        return 1.0 - rho * z / 2.0;
    }
    let rho_star = 1.0 - rho;
    if rho_star.abs() < RHO_EPS {
        if z > 1.0 {
            if rho_star == 0.0 {
                return 0.0;
            }
            return z / ((2.0 * (z - 1.0)).ln() - rho_star.ln());
        }
        if z < 1.0 {
            let chi = -(1.0 - z).ln() - 0.5 * (z / (z - 1.0)).powi(2) * rho_star;
            return z / chi;
        }
        return 0.0;
    }
    let arg = (1.0 - 2.0 * rho * z + z * z).sqrt() + z - rho;
    if arg <= 0.0 {
        return 0.0;
    }
    z / (arg.ln() - rho_star.ln())
}

/// Hagan lognormal implied volatility.
///
/// The strike is clipped at `forward * 1e-12`; `alpha == 0` yields zero
/// volatility.
pub fn volatility(forward: f64, strike: f64, expiry: f64, params: &SabrParameters) -> f64 {
    let SabrParameters { alpha, beta, rho, nu } = *params;
    if alpha == 0.0 {
        return 0.0;
    }
    let k = strike.max(forward * CUTOFF_MONEYNESS);
    let beta1 = 1.0 - beta;
    if (forward - k).abs() < ATM_EPS {
        let f1 = forward.powf(beta1);
        return alpha
            * (1.0
                + expiry
                    * (beta1 * beta1 * alpha * alpha / 24.0 / f1 / f1
                        + rho * alpha * beta * nu / 4.0 / f1
                        + nu * nu * (2.0 - 3.0 * rho * rho) / 24.0))
            / f1;
    }
    if beta.abs() < BETA_EPS {
        let ln = (forward / k).ln();
        let z = nu * (forward * k).sqrt() * ln / alpha;
        return alpha
            * ln
            * z_over_chi(rho, z)
            * (1.0
                + expiry * (alpha * alpha / forward / k + nu * nu * (2.0 - 3.0 * rho * rho))
                    / 24.0)
            / (forward - k);
    }
    if (beta - 1.0).abs() < BETA_EPS {
        let ln = (forward / k).ln();
        let z = nu * ln / alpha;
        return alpha
            * z_over_chi(rho, z)
            * (1.0 + expiry * (rho * alpha * nu / 4.0 + nu * nu * (2.0 - 3.0 * rho * rho) / 24.0));
    }
    let ln = (forward / k).ln();
    let f1 = (forward * k).powf(beta1);
    let f1_sqrt = f1.sqrt();
    let ln_beta2 = (beta1 * ln).powi(2);
    let z = nu * f1_sqrt * ln / alpha;
    let first = alpha / (f1_sqrt * (1.0 + ln_beta2 / 24.0 + ln_beta2 * ln_beta2 / 1920.0));
    let third = 1.0
        + expiry
            * (beta1 * beta1 * alpha * alpha / 24.0 / f1
                + rho * nu * beta * alpha / 4.0 / f1_sqrt
                + nu * nu * (2.0 - 3.0 * rho * rho) / 24.0);
    first * z_over_chi(rho, z) * third
}

/// Volatility with its first-order gradient.
pub fn volatility_adjoint(
    forward: f64,
    strike: f64,
    expiry: f64,
    params: &SabrParameters,
) -> (f64, VolatilityGradient) {
    let adj = volatility_adjoint2(forward, strike, expiry, params);
    (adj.volatility, adj.gradient)
}

/// Volatility, gradient and (forward, strike) second derivatives.
#[allow(clippy::many_single_char_names)]
pub fn volatility_adjoint2(
    forward: f64,
    strike: f64,
    expiry: f64,
    params: &SabrParameters,
) -> VolatilityAdjoint2 {
    let SabrParameters { alpha, beta, rho, nu } = *params;
    let theta = expiry;
    let k = strike.max(MIN_STRIKE);

    // Functional decomposition: sigma = alpha / f1 * (f2 / x(f2)) * (1 + f3 * theta)
    // with h1 = F*K, h2 = ln(F/K).
    let h0 = (1.0 - beta) / 2.0;
    let h1 = forward * k;
    let h1h0 = h1.powf(h0);
    let h12 = h1h0 * h1h0;
    let h2 = (forward / k).ln();
    let h22 = h2 * h2;
    let h23 = h22 * h2;
    let h24 = h23 * h2;
    let f1 = h1h0 * (1.0 + h0 * h0 / 6.0 * (h22 + h0 * h0 / 20.0 * h24));
    let f2 = nu / alpha * h1h0 * h2;
    let f3 = h0 * h0 / 6.0 * alpha * alpha / h12
        + rho * beta * nu * alpha / 4.0 / h1h0
        + (2.0 - 3.0 * rho * rho) / 24.0 * nu * nu;
    let sqrtf2 = (1.0 - 2.0 * rho * f2 + f2 * f2).sqrt();

    let small_f2 = f2.abs() < SMALL_Z;
    let mut x = 0.0;
    let mut xp = 0.0;
    let mut xpp = 0.0;
    let f2x;
    if small_f2 {
        f2x = 1.0 - 0.5 * f2 * rho;
    } else {
        if (rho - 1.0).abs() < RHO_EPS {
            x = if f2 < 1.0 {
                -(1.0 - f2).ln() - 0.5 * (f2 / (f2 - 1.0)).powi(2) * (1.0 - rho)
            } else {
                (2.0 * f2 - 2.0).ln() - (1.0 - rho).ln()
            };
        } else {
            x = ((sqrtf2 + f2 - rho) / (1.0 - rho)).ln();
        }
        xp = 1.0 / sqrtf2;
        xpp = (rho - f2) / (sqrtf2 * sqrtf2 * sqrtf2);
        f2x = f2 / x;
    }
    let sigma = alpha / f1 * f2x * (1.0 + f3 * theta);

    // First level: sigma as a function of (f1, f2, f3, alpha) and x.
    let h0_d_beta = -0.5;
    let sigma_df1 = -sigma / f1;
    let sigma_df2 = if small_f2 {
        alpha / f1 * (1.0 + f3 * theta) * -0.5 * rho
    } else {
        alpha / f1 * (1.0 + f3 * theta) * (1.0 / x - f2 * xp / (x * x))
    };
    let sigma_df3 = alpha / f1 * f2x * theta;
    let sigma_df4 = f2x / f1 * (1.0 + f3 * theta);
    let sigma_dx = if small_f2 {
        0.0
    } else {
        -alpha / f1 * f2 / (x * x) * (1.0 + f3 * theta)
    };
    let mut sigma_d2ff = [[0.0_f64; 3]; 3];
    sigma_d2ff[0][0] = -sigma_df1 / f1 + sigma / (f1 * f1);
    sigma_d2ff[0][1] = -sigma_df2 / f1;
    sigma_d2ff[0][2] = -sigma_df3 / f1;
    if small_f2 {
        sigma_d2ff[1][2] = alpha / f1 * -0.5 * rho * theta;
    } else {
        sigma_d2ff[1][1] = alpha / f1
            * (1.0 + f3 * theta)
            * (-2.0 * xp / (x * x) - f2 * xpp / (x * x) + 2.0 * f2 * xp * xp / (x * x * x));
        sigma_d2ff[1][2] = alpha / f1 * theta * (1.0 / x - f2 * xp / (x * x));
    }

    // Second level: (f1, f2, f3) as functions of (h0, h1, h2) and the SABR
    // parameters.
    let f1_dh = [
        h1h0 * (h0 * (h22 / 3.0 + h0 * h0 / 40.0 * h24)) + h1.ln() * f1,
        h0 * f1 / h1,
        h1h0 * (h0 * h0 / 6.0 * (2.0 * h2 + h0 * h0 / 5.0 * h23)),
    ];
    let f2_dh = [h1.ln() * f2, h0 * f2 / h1, nu / alpha * h1h0];
    let f3_dh = [
        h0 / 3.0 * alpha * alpha / h12
            - 2.0 * h0 * h0 / 6.0 * alpha * alpha / h12 * h1.ln()
            - rho * beta * nu * alpha / 4.0 / h1h0 * h1.ln(),
        -2.0 * h0 * h0 / 6.0 * alpha * alpha / h12 * h0 / h1
            - rho * beta * nu * alpha / 4.0 / h1h0 * h0 / h1,
        0.0,
    ];
    let f1_dp = [0.0, f1_dh[0] * h0_d_beta, 0.0, 0.0];
    let f2_dp = [-f2 / alpha, f2_dh[0] * h0_d_beta, 0.0, h1h0 * h2 / alpha];
    let f3_dp = [
        h0 * h0 / 3.0 * alpha / h12 + rho * beta * nu / 4.0 / h1h0,
        rho * nu * alpha / 4.0 / h1h0 + f3_dh[0] * h0_d_beta,
        beta * nu * alpha / 4.0 / h1h0 - rho / 4.0 * nu * nu,
        rho * beta * alpha / 4.0 / h1h0 + (2.0 - 3.0 * rho * rho) / 12.0 * nu,
    ];
    let f4_dp = [1.0, 0.0, 0.0, 0.0];
    let sigma_dh1 = sigma_df1 * f1_dh[1] + sigma_df2 * f2_dh[1] + sigma_df3 * f3_dh[1];
    let sigma_dh2 = sigma_df1 * f1_dh[2] + sigma_df2 * f2_dh[2] + sigma_df3 * f3_dh[2];
    let f1_d2hh = [
        [
            h0 * (h0 - 1.0) * f1 / (h1 * h1),
            h0 * h1h0 / h1 * h0 * h0 / 6.0 * (2.0 * h2 + 4.0 * h0 * h0 / 20.0 * h23),
        ],
        [
            0.0,
            h1h0 * (h0 * h0 / 6.0 * (2.0 + 12.0 * h0 * h0 / 20.0 * h2)),
        ],
    ];
    let f2_d2hh = [
        [h0 * (h0 - 1.0) * f2 / (h1 * h1), nu / alpha * h0 * h1h0 / h1],
        [0.0, 0.0],
    ];
    let f3_d2hh = [
        [
            2.0 * h0 * (2.0 * h0 + 1.0) * h0 * h0 / 6.0 * alpha * alpha / (h12 * h1 * h1)
                + h0 * (h0 + 1.0) * rho * beta * nu * alpha / 4.0 / (h1h0 * h1 * h1),
            0.0,
        ],
        [0.0, 0.0],
    ];
    let mut sigma_d2hh = [[0.0_f64; 2]; 2];
    for lx in 0..2 {
        for ly in lx..2 {
            sigma_d2hh[lx][ly] = (sigma_d2ff[0][0] * f1_dh[ly + 1]
                + sigma_d2ff[0][1] * f2_dh[ly + 1]
                + sigma_d2ff[0][2] * f3_dh[ly + 1])
                * f1_dh[lx + 1]
                + sigma_df1 * f1_d2hh[lx][ly]
                + (sigma_d2ff[0][1] * f1_dh[ly + 1]
                    + sigma_d2ff[1][1] * f2_dh[ly + 1]
                    + sigma_d2ff[1][2] * f3_dh[ly + 1])
                    * f2_dh[lx + 1]
                + sigma_df2 * f2_d2hh[lx][ly]
                + (sigma_d2ff[0][2] * f1_dh[ly + 1]
                    + sigma_d2ff[1][2] * f2_dh[ly + 1]
                    + sigma_d2ff[2][2] * f3_dh[ly + 1])
                    * f3_dh[lx + 1]
                + sigma_df3 * f3_d2hh[lx][ly];
        }
    }

    // Third level: (h1, h2) as functions of (forward, strike).
    let h1_df = k;
    let h1_dk = forward;
    let h1_d2ff = 0.0;
    let h1_d2kf = 1.0;
    let h1_d2kk = 0.0;
    let h2_df = 1.0 / forward;
    let h2_dk = -1.0 / k;
    let h2_d2ff = -1.0 / (forward * forward);
    let h2_d2fk = 0.0;
    let h2_d2kk = 1.0 / (k * k);

    let d_forward = sigma_dh1 * h1_df + sigma_dh2 * h2_df;
    let d_strike = sigma_dh1 * h1_dk + sigma_dh2 * h2_dk;
    let d_alpha =
        sigma_df1 * f1_dp[0] + sigma_df2 * f2_dp[0] + sigma_df3 * f3_dp[0] + sigma_df4 * f4_dp[0];
    let d_beta =
        sigma_df1 * f1_dp[1] + sigma_df2 * f2_dp[1] + sigma_df3 * f3_dp[1] + sigma_df4 * f4_dp[1];
    let d_rho = if small_f2 {
        -0.5 * f2 + sigma_df3 * f3_dp[2]
    } else {
        let x_dr = if (rho - 1.0).abs() < RHO_EPS {
            if f2 > 1.0 {
                1.0 / (1.0 - rho) + (0.5 - f2) / ((f2 - 1.0) * (f2 - 1.0))
            } else {
                0.5 * (f2 / (1.0 - f2)).powi(2)
                    + 0.25 * (f2 - 4.0) * (f2 / (f2 - 1.0)).powi(3) / (f2 - 1.0) * (1.0 - rho)
            }
        } else {
            (-f2 / sqrtf2 - 1.0 + (sqrtf2 + f2 - rho) / (1.0 - rho)) / (sqrtf2 + f2 - rho)
        };
        sigma_df1 * f1_dp[2] + sigma_dx * x_dr + sigma_df3 * f3_dp[2] + sigma_df4 * f4_dp[2]
    };
    let d_nu =
        sigma_df1 * f1_dp[3] + sigma_df2 * f2_dp[3] + sigma_df3 * f3_dp[3] + sigma_df4 * f4_dp[3];

    let mut d2 = [[0.0_f64; 2]; 2];
    d2[0][0] = (sigma_d2hh[0][0] * h1_df + sigma_d2hh[0][1] * h2_df) * h1_df
        + sigma_dh1 * h1_d2ff
        + (sigma_d2hh[0][1] * h1_df + sigma_d2hh[1][1] * h2_df) * h2_df
        + sigma_dh2 * h2_d2ff;
    d2[0][1] = (sigma_d2hh[0][0] * h1_dk + sigma_d2hh[0][1] * h2_dk) * h1_df
        + sigma_dh1 * h1_d2kf
        + (sigma_d2hh[0][1] * h1_dk + sigma_d2hh[1][1] * h2_dk) * h2_df
        + sigma_dh2 * h2_d2fk;
    d2[1][0] = d2[0][1];
    d2[1][1] = (sigma_d2hh[0][0] * h1_dk + sigma_d2hh[0][1] * h2_dk) * h1_dk
        + sigma_dh1 * h1_d2kk
        + (sigma_d2hh[0][1] * h1_dk + sigma_d2hh[1][1] * h2_dk) * h2_dk
        + sigma_dh2 * h2_d2kk;

    VolatilityAdjoint2 {
        volatility: sigma,
        gradient: VolatilityGradient {
            d_forward,
            d_strike,
            d_alpha,
            d_beta,
            d_rho,
            d_nu,
        },
        d2,
    }
}
