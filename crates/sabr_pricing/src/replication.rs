//! CMS pricing by swaption replication on the plain Hagan smile.

use sabr_core::market_data::SabrBundle;
use sabr_core::types::CurrencyAmount;
use sabr_models::instruments::{CmsCapFloor, CmsCoupon};
use sabr_models::{black, sabr::hagan};

use crate::error::PricingError;
use crate::kernel::ReplicationKernel;
use crate::quadrature::integrate_with_retry;

/// Width of the cap replication integral above the strike, in rate units.
pub(crate) const DEFAULT_INTEGRATION_INTERVAL: f64 = 1.0;
/// Quadrature tolerance per currency unit of present value.
pub(crate) const PRICE_TOLERANCE: f64 = 1.0e-4;

/// Prices CMS caps, floors and coupons by static replication with
/// cash-settled swaptions valued straight off the Hagan smile.
///
/// A cap is replicated over `[K, K + interval]`, a floor over `[0, K]` and a
/// coupon as a cap struck at zero. Without a tail extrapolation the cap
/// integral inherits the smile's right wing, so this pricer overstates
/// convexity for wide intervals relative to [`crate::CmsSabrExtrapolationPricer`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CmsReplicationPricer {
    integration_interval: f64,
}

impl Default for CmsReplicationPricer {
    fn default() -> Self {
        Self::new()
    }
}

impl CmsReplicationPricer {
    /// Pricer with the default integration interval of 1.0.
    pub fn new() -> Self {
        Self {
            integration_interval: DEFAULT_INTEGRATION_INTERVAL,
        }
    }

    /// Pricer with an explicit integration interval.
    pub fn with_integration_interval(integration_interval: f64) -> Self {
        Self {
            integration_interval,
        }
    }

    /// Present value of a CMS cap or floor.
    pub fn present_value(
        &self,
        capfloor: &CmsCapFloor,
        market: &SabrBundle,
    ) -> Result<CurrencyAmount, PricingError> {
        let coupon = &capfloor.coupon;
        let kernel = ReplicationKernel::for_instrument(capfloor)?;
        let forward = coupon.underlying.forward_rate(&market.curves)?;
        let df_payment = market
            .curves
            .discount_factor(&coupon.underlying.discount_curve, coupon.payment_time)?;
        let expiry = coupon.fixing_time;
        let params = market.sabr.parameters(expiry, coupon.underlying_tenor());
        let strike = capfloor.strike;
        let is_cap = capfloor.is_cap;
        let swaption = |x: f64| {
            let vol = hagan::volatility(forward, x, expiry, &params);
            black::price(forward, x, expiry, vol, is_cap)
        };

        let ratio = kernel.g(forward) / kernel.h(forward);
        let factor = df_payment * ratio;
        let strike_part = factor * kernel.kappa(strike) * swaption(strike);
        let abs_tolerance =
            PRICE_TOLERANCE / (factor * coupon.notional.abs() * coupon.accrual);
        let integrand = |x: f64| {
            let (kp, kpp) = kernel.kappa_derivatives(x);
            ratio * (kpp * (x - strike) + 2.0 * kp) * swaption(x)
        };
        let (lower, upper) = if is_cap {
            (strike, strike + self.integration_interval)
        } else {
            (0.0, strike)
        };
        let integral = integrate_with_retry(&integrand, lower, upper, abs_tolerance)?;
        let pv = (strike_part + df_payment * integral) * coupon.notional * coupon.accrual;
        Ok(CurrencyAmount::new(pv, coupon.currency))
    }

    /// Present value of a plain CMS coupon, as a cap struck at zero.
    pub fn coupon_present_value(
        &self,
        coupon: &CmsCoupon,
        market: &SabrBundle,
    ) -> Result<CurrencyAmount, PricingError> {
        self.present_value(&CmsCapFloor::cap(coupon.clone(), 0.0), market)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    use sabr_core::market_data::curves::{CurveBundle, FlatCurve};
    use sabr_core::market_data::SabrSurface;
    use sabr_core::types::Currency;
    use sabr_models::instruments::{FixedPeriod, IborPeriod, SwapTimes};

    fn market(discount_rate: f64, forward_rate: f64) -> SabrBundle {
        let mut curves = CurveBundle::new();
        curves.insert("fund", Arc::new(FlatCurve::new(discount_rate)));
        curves.insert("fwd", Arc::new(FlatCurve::new(forward_rate)));
        let expiries = [0.0, 1.0, 10.0];
        let tenors = [0.0, 1.0, 10.0];
        let flat = |v: f64| -> Vec<Vec<f64>> { vec![vec![v; 3]; 3] };
        let sabr = SabrSurface::new(
            &expiries,
            &tenors,
            &flat(0.05),
            &flat(0.5),
            &flat(-0.2),
            &flat(0.4),
        )
        .unwrap();
        SabrBundle::new(curves, sabr)
    }

    fn coupon(notional: f64) -> CmsCoupon {
        let settlement = 5.0;
        let fixed_periods = (1..=10)
            .map(|i| FixedPeriod {
                payment_time: settlement + 0.5 * i as f64,
                accrual: 0.5,
            })
            .collect();
        let ibor_periods = (1..=20)
            .map(|i| IborPeriod {
                payment_time: settlement + 0.25 * i as f64,
                payment_accrual: 0.25,
                fixing_start_time: settlement + 0.25 * (i - 1) as f64,
                fixing_end_time: settlement + 0.25 * i as f64,
                fixing_accrual: 0.25,
            })
            .collect();
        CmsCoupon {
            payment_time: settlement + 0.5,
            accrual: 0.5,
            notional,
            fixing_time: settlement - 0.01,
            settlement_time: settlement,
            currency: Currency::EUR,
            underlying: SwapTimes {
                fixed_periods,
                ibor_periods,
                discount_curve: "fund".to_string(),
                forward_curve: "fwd".to_string(),
            },
        }
    }

    #[test]
    fn test_cap_pv_is_positive_and_above_intrinsic() {
        let market = market(0.05, 0.04);
        let coupon = coupon(1.0e6);
        let forward = coupon.underlying.forward_rate(&market.curves).unwrap();
        let df = market
            .curves
            .discount_factor("fund", coupon.payment_time)
            .unwrap();
        let cap = CmsCapFloor::cap(coupon, 0.02);
        let pv = CmsReplicationPricer::new()
            .present_value(&cap, &market)
            .unwrap();
        let intrinsic =
            (forward - cap.strike) * df * cap.coupon.notional * cap.coupon.accrual;
        assert!(pv.value > intrinsic);
    }

    #[test]
    fn test_pv_scales_linearly_in_notional() {
        let market = market(0.05, 0.04);
        let pricer = CmsReplicationPricer::new();
        let pv1 = pricer
            .present_value(&CmsCapFloor::cap(coupon(1.0e6), 0.04), &market)
            .unwrap();
        let pv2 = pricer
            .present_value(&CmsCapFloor::cap(coupon(-2.0e6), 0.04), &market)
            .unwrap();
        assert_relative_eq!(pv2.value, -2.0 * pv1.value, max_relative = 1e-8);
    }

    #[test]
    fn test_cap_floor_parity_recovers_coupon() {
        let market = market(0.05, 0.04);
        let pricer = CmsReplicationPricer::new();
        let coupon = coupon(1.0e6);
        let strike = 0.04;
        let cap = pricer
            .present_value(&CmsCapFloor::cap(coupon.clone(), strike), &market)
            .unwrap();
        let floor = pricer
            .present_value(&CmsCapFloor::floor(coupon.clone(), strike), &market)
            .unwrap();
        let cms = pricer.coupon_present_value(&coupon, &market).unwrap();
        let df = market
            .curves
            .discount_factor("fund", coupon.payment_time)
            .unwrap();
        let fixed = strike * df * coupon.notional * coupon.accrual;
        // cap - floor = coupon - fixed leg at the strike
        assert_relative_eq!(
            cap.value - floor.value,
            cms.value - fixed,
            max_relative = 5e-4
        );
    }

    #[test]
    fn test_coupon_rate_exceeds_forward() {
        // The convexity adjustment on an upward-sloping annuity is positive.
        let market = market(0.05, 0.04);
        let coupon = coupon(1.0e6);
        let pv = CmsReplicationPricer::new()
            .coupon_present_value(&coupon, &market)
            .unwrap();
        let df = market
            .curves
            .discount_factor("fund", coupon.payment_time)
            .unwrap();
        let rate = pv.value / (coupon.accrual * coupon.notional * df);
        let forward = coupon.underlying.forward_rate(&market.curves).unwrap();
        assert!(rate > forward);
        assert!(rate < forward + 0.02);
    }
}
