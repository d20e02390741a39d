//! Cash-annuity replication kernel.
//!
//! Hagan's replication writes the CMS payoff as a position in cash-settled
//! swaptions across strikes. The kernel collects the swap-rate functions the
//! weights are built from: the cash annuity G, the discount approximation h
//! and the ratio kappa = h/G with its first two derivatives. Series
//! expansions cover the swap rate near zero, which is exercised when coupons
//! are priced as caps struck at zero.

use sabr_models::instruments::CmsCapFloor;

use crate::error::PricingError;

/// Swap rates below this level use the x -> 0 series expansions.
const EPS: f64 = 1e-10;

/// Replication kernel for one CMS cap/floor.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReplicationKernel {
    /// Number of fixed-leg periods of the underlying swap.
    n_periods: f64,
    /// Fixed-leg payments per year.
    payments_per_year: f64,
    /// 1 / payments_per_year.
    tau: f64,
    /// Exponent of the discount approximation, -(payment - settlement).
    eta: f64,
}

impl ReplicationKernel {
    pub(crate) fn for_instrument(capfloor: &CmsCapFloor) -> Result<Self, PricingError> {
        let coupon = &capfloor.coupon;
        if coupon.underlying.fixed_periods.is_empty() {
            return Err(PricingError::InvalidInstrument {
                reason: "underlying swap has no fixed periods".to_string(),
            });
        }
        let payments_per_year = coupon.underlying.fixed_payments_per_year() as f64;
        if payments_per_year <= 0.0 {
            return Err(PricingError::InvalidInstrument {
                reason: "fixed accrual implies zero payments per year".to_string(),
            });
        }
        Ok(Self {
            n_periods: coupon.underlying.fixed_periods.len() as f64,
            payments_per_year,
            tau: 1.0 / payments_per_year,
            eta: -(coupon.payment_time - coupon.settlement_time),
        })
    }

    /// Discount factor approximation from payment to settlement as a
    /// function of the swap rate.
    pub(crate) fn h(&self, x: f64) -> f64 {
        (1.0 + self.tau * x).powf(self.eta)
    }

    /// Cash annuity.
    pub(crate) fn g(&self, x: f64) -> f64 {
        if x >= EPS {
            let period_factor = 1.0 + x / self.payments_per_year;
            (1.0 - period_factor.powf(-self.n_periods)) / x
        } else {
            self.n_periods / self.payments_per_year
        }
    }

    /// kappa = h / G.
    pub(crate) fn kappa(&self, x: f64) -> f64 {
        let (g, h) = if x >= EPS {
            let period_factor = 1.0 + x / self.payments_per_year;
            (
                (1.0 - period_factor.powf(-self.n_periods)) / x,
                (1.0 + self.tau * x).powf(self.eta),
            )
        } else {
            (self.n_periods / self.payments_per_year, 1.0)
        };
        h / g
    }

    /// First and second derivative of kappa.
    pub(crate) fn kappa_derivatives(&self, x: f64) -> (f64, f64) {
        let n = self.n_periods;
        let m = self.payments_per_year;
        let period_factor = 1.0 + x / m;
        let n_period_discount = period_factor.powf(-n);
        let (g, gp, gpp);
        if x >= EPS {
            g = (1.0 - n_period_discount) / x;
            gp = -g / x + n / x / m * n_period_discount / period_factor;
            gpp = 2.0 / (x * x) * g
                - 2.0 * n / (x * x) / m * n_period_discount / period_factor
                - (n + 1.0) * n / x / (m * m) * n_period_discount / (period_factor * period_factor);
        } else {
            g = n / m;
            gp = -n / 2.0 * (n + 1.0) / (m * m);
            gpp = n / 2.0 * (n + 1.0) * (1.0 + (n + 2.0) / 3.0) / (m * m * m);
        }
        let h = (1.0 + self.tau * x).powf(self.eta);
        let hp = self.eta * self.tau * h / period_factor;
        let hpp = (self.eta - 1.0) * self.tau * hp / period_factor;
        let kp = hp / g - h * gp / (g * g);
        let kpp = hpp / g - 2.0 * hp * gp / (g * g) - h * (gpp / (g * g) - 2.0 * gp * gp / (g * g * g));
        (kp, kpp)
    }

    /// n = G/h and its first derivative, used by the delta replication.
    pub(crate) fn annuity_ratio_derivatives(&self, x: f64) -> (f64, f64) {
        let (g, gp) = if x >= EPS {
            let period_factor = 1.0 + x / self.payments_per_year;
            let n_period_discount = period_factor.powf(-self.n_periods);
            let g = (1.0 - n_period_discount) / x;
            let gp = -g / x + self.tau * self.n_periods / x * n_period_discount / period_factor;
            (g, gp)
        } else {
            (
                self.n_periods * self.tau,
                -self.n_periods * (self.n_periods + 1.0) * self.tau * self.tau / 2.0,
            )
        };
        let h = (1.0 + self.tau * x).powf(self.eta);
        let hp = self.eta * self.tau * h / (1.0 + x * self.tau);
        (g / h, gp / h - g * hp / (h * h))
    }
}
