//! CMS replication with right-tail extrapolated swaption prices.
//!
//! Below the cut-off strike the replication swaptions are priced on the Hagan
//! smile; above it on the fitted tail `K^(-mu) exp(a + b/K + c/K^2)`, which
//! keeps the replication integral finite for thin-tailed densities. Curve,
//! SABR parameter and strike sensitivities are computed by replicating the
//! corresponding price derivatives with the same kernel weights.

use sabr_core::market_data::SabrBundle;
use sabr_core::types::CurrencyAmount;
use sabr_models::instruments::{CmsCapFloor, CmsCoupon};
use sabr_models::sabr::SabrExtrapolation;
use sabr_risk::{CurveSensitivity, ExpiryTenor, SabrSensitivity};

use crate::error::PricingError;
use crate::kernel::ReplicationKernel;
use crate::par_rate::par_rate_curve_sensitivity;
use crate::quadrature::integrate_with_retry;
use crate::replication::{DEFAULT_INTEGRATION_INTERVAL, PRICE_TOLERANCE};

/// Relaxation of the quadrature tolerance for the SABR vega integrals, whose
/// integrands are far smaller than the price integrand.
const VEGA_TOLERANCE_RELAXATION: f64 = 100.0;
/// Absolute quadrature tolerance of the strike sensitivity integral.
const STRIKE_SENSITIVITY_TOLERANCE: f64 = 1.0e-9;

/// CMS cap/floor/coupon pricer by swaption replication with SABR right-tail
/// extrapolation.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CmsSabrExtrapolationPricer {
    /// Strike above which swaptions are priced on the extrapolated tail.
    cutoff: f64,
    /// Tail thickness exponent.
    mu: f64,
    integration_interval: f64,
}

/// Per-instrument pricing state shared by the value and sensitivity
/// replications.
struct ReplicationContext {
    kernel: ReplicationKernel,
    extrapolation: SabrExtrapolation,
    forward: f64,
    df_payment: f64,
    /// Cash-annuity ratio G(F)/h(F).
    ratio: f64,
    /// `df_payment * ratio`, the scale of one replicated swaption.
    factor: f64,
    tenor: f64,
}

impl CmsSabrExtrapolationPricer {
    /// Pricer with the given cut-off strike and tail exponent `mu`, and the
    /// default integration interval of 1.0.
    pub fn new(cutoff: f64, mu: f64) -> Self {
        Self {
            cutoff,
            mu,
            integration_interval: DEFAULT_INTEGRATION_INTERVAL,
        }
    }

    /// Same pricer with an explicit integration interval.
    pub fn with_integration_interval(mut self, integration_interval: f64) -> Self {
        self.integration_interval = integration_interval;
        self
    }

    /// The cut-off strike.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// The tail thickness exponent.
    pub fn mu(&self) -> f64 {
        self.mu
    }

    fn context(
        &self,
        capfloor: &CmsCapFloor,
        market: &SabrBundle,
    ) -> Result<ReplicationContext, PricingError> {
        let coupon = &capfloor.coupon;
        let kernel = ReplicationKernel::for_instrument(capfloor)?;
        let forward = coupon.underlying.forward_rate(&market.curves)?;
        let df_payment = market
            .curves
            .discount_factor(&coupon.underlying.discount_curve, coupon.payment_time)?;
        let tenor = coupon.underlying_tenor();
        let params = market.sabr.parameters(coupon.fixing_time, tenor);
        let extrapolation =
            SabrExtrapolation::new(params, forward, self.cutoff, coupon.fixing_time, self.mu)?;
        let ratio = kernel.g(forward) / kernel.h(forward);
        Ok(ReplicationContext {
            kernel,
            extrapolation,
            forward,
            df_payment,
            ratio,
            factor: df_payment * ratio,
            tenor,
        })
    }

    /// Integration bounds: `[K, K + interval]` for a cap, `[0, K]` for a
    /// floor.
    fn bounds(&self, capfloor: &CmsCapFloor) -> (f64, f64) {
        if capfloor.is_cap {
            (capfloor.strike, capfloor.strike + self.integration_interval)
        } else {
            (0.0, capfloor.strike)
        }
    }

    /// Present value of a CMS cap or floor.
    pub fn present_value(
        &self,
        capfloor: &CmsCapFloor,
        market: &SabrBundle,
    ) -> Result<CurrencyAmount, PricingError> {
        let ctx = self.context(capfloor, market)?;
        let coupon = &capfloor.coupon;
        let value = self.replicate_price(capfloor, &ctx)?;
        Ok(CurrencyAmount::new(
            value * coupon.notional * coupon.accrual,
            coupon.currency,
        ))
    }

    /// Present value of a plain CMS coupon, as a cap struck at zero.
    pub fn coupon_present_value(
        &self,
        coupon: &CmsCoupon,
        market: &SabrBundle,
    ) -> Result<CurrencyAmount, PricingError> {
        self.present_value(&CmsCapFloor::cap(coupon.clone(), 0.0), market)
    }

    /// Par rate of a CMS coupon: the fixed rate with the same present value,
    /// i.e. the convexity-adjusted expected swap rate.
    pub fn coupon_rate(
        &self,
        coupon: &CmsCoupon,
        market: &SabrBundle,
    ) -> Result<f64, PricingError> {
        let pv = self.coupon_present_value(coupon, market)?;
        let df_payment = market
            .curves
            .discount_factor(&coupon.underlying.discount_curve, coupon.payment_time)?;
        Ok(pv.value / (coupon.accrual * coupon.notional * df_payment))
    }

    /// Undiscounted-notional replication value: strike part plus discounted
    /// integral, before scaling by notional and accrual.
    fn replicate_price(
        &self,
        capfloor: &CmsCapFloor,
        ctx: &ReplicationContext,
    ) -> Result<f64, PricingError> {
        let coupon = &capfloor.coupon;
        let strike = capfloor.strike;
        let is_cap = capfloor.is_cap;
        let strike_part =
            ctx.factor * ctx.kernel.kappa(strike) * ctx.extrapolation.price(strike, is_cap);
        let abs_tolerance =
            PRICE_TOLERANCE / (ctx.factor * coupon.notional.abs() * coupon.accrual);
        let integrand = |x: f64| {
            let (kp, kpp) = ctx.kernel.kappa_derivatives(x);
            ctx.ratio * (kpp * (x - strike) + 2.0 * kp) * ctx.extrapolation.price(x, is_cap)
        };
        let (lower, upper) = self.bounds(capfloor);
        let integral = integrate_with_retry(&integrand, lower, upper, abs_tolerance)?;
        Ok(strike_part + ctx.df_payment * integral)
    }

    /// Present value sensitivity to the zero rates of the discount and
    /// forward curves.
    ///
    /// The discount node at the payment time carries the direct discounting
    /// sensitivity; the par-rate sensitivities of the underlying swap are
    /// scaled by the replicated delta of the price to the swap rate.
    pub fn present_value_curve_sensitivity(
        &self,
        capfloor: &CmsCapFloor,
        market: &SabrBundle,
    ) -> Result<CurveSensitivity, PricingError> {
        let ctx = self.context(capfloor, market)?;
        let coupon = &capfloor.coupon;
        let strike = capfloor.strike;
        let is_cap = capfloor.is_cap;
        let (lower, upper) = self.bounds(capfloor);
        let abs_tolerance =
            PRICE_TOLERANCE / (ctx.factor * coupon.notional.abs() * coupon.accrual);

        let price = self.replicate_price(capfloor, &ctx)? * coupon.notional * coupon.accrual;

        // Materializes the cached tail derivatives so the integrand below
        // cannot fail.
        if upper > ctx.extrapolation.cutoff() {
            ctx.extrapolation.price_derivative_forward(upper, is_cap)?;
        }
        let (n0, n1) = ctx.kernel.annuity_ratio_derivatives(ctx.forward);
        let bs_strike = ctx.extrapolation.price(strike, is_cap);
        let bsp_strike = ctx.extrapolation.price_derivative_forward(strike, is_cap)?;
        let delta_strike_part = ctx.df_payment
            * ctx.kernel.kappa(strike)
            * (n1 * bs_strike + n0 * bsp_strike);
        let delta_integrand = |x: f64| {
            let (kp, kpp) = ctx.kernel.kappa_derivatives(x);
            let bs = ctx.extrapolation.price(x, is_cap);
            let bsp = ctx
                .extrapolation
                .price_derivative_forward(x, is_cap)
                .unwrap_or(0.0);
            (kpp * (x - strike) + 2.0 * kp) * (n1 * bs + n0 * bsp)
        };
        let delta_integral = integrate_with_retry(&delta_integrand, lower, upper, abs_tolerance)?;
        let delta_forward = (delta_strike_part + ctx.df_payment * delta_integral)
            * coupon.notional
            * coupon.accrual;

        let mut result = CurveSensitivity::new();
        result.add(
            coupon.underlying.discount_curve.clone(),
            coupon.payment_time,
            -coupon.payment_time * price,
        );
        let par_rate = par_rate_curve_sensitivity(&coupon.underlying, &market.curves)?;
        Ok(result.plus(&par_rate.multiplied_by(delta_forward)).cleaned())
    }

    /// Present value sensitivity to the SABR parameters, reported at the
    /// (fixing time, underlying tenor) surface coordinate.
    pub fn present_value_sabr_sensitivity(
        &self,
        capfloor: &CmsCapFloor,
        market: &SabrBundle,
    ) -> Result<SabrSensitivity, PricingError> {
        let ctx = self.context(capfloor, market)?;
        let coupon = &capfloor.coupon;
        let strike = capfloor.strike;
        let is_cap = capfloor.is_cap;
        let (lower, upper) = self.bounds(capfloor);
        let abs_tolerance = VEGA_TOLERANCE_RELAXATION * PRICE_TOLERANCE
            / (ctx.factor * coupon.notional.abs() * coupon.accrual);

        if upper > ctx.extrapolation.cutoff() {
            ctx.extrapolation.price_adjoint_sabr(upper, is_cap)?;
        }
        let (_, strike_derivatives) = ctx.extrapolation.price_adjoint_sabr(strike, is_cap)?;
        let strike_factor = ctx.factor * ctx.kernel.kappa(strike);
        let mut totals = [0.0; 4];
        for (parameter, total) in totals.iter_mut().enumerate() {
            let integrand = |x: f64| {
                let (kp, kpp) = ctx.kernel.kappa_derivatives(x);
                let derivative = ctx
                    .extrapolation
                    .price_adjoint_sabr(x, is_cap)
                    .map(|(_, d)| d[parameter])
                    .unwrap_or(0.0);
                ctx.ratio * (kpp * (x - strike) + 2.0 * kp) * derivative
            };
            let integral = integrate_with_retry(&integrand, lower, upper, abs_tolerance)?;
            *total = (strike_factor * strike_derivatives[parameter]
                + ctx.df_payment * integral)
                * coupon.notional
                * coupon.accrual;
        }
        let mut sensitivity = SabrSensitivity::new();
        sensitivity.add(
            ExpiryTenor::new(coupon.fixing_time, ctx.tenor),
            totals[0],
            totals[1],
            totals[2],
            totals[3],
        );
        Ok(sensitivity)
    }

    /// Present value sensitivity to the strike, in currency units per unit of
    /// rate.
    pub fn present_value_strike_sensitivity(
        &self,
        capfloor: &CmsCapFloor,
        market: &SabrBundle,
    ) -> Result<f64, PricingError> {
        let ctx = self.context(capfloor, market)?;
        let coupon = &capfloor.coupon;
        let strike = capfloor.strike;
        let is_cap = capfloor.is_cap;
        let (lower, upper) = self.bounds(capfloor);

        let (kp_strike, _) = ctx.kernel.kappa_derivatives(strike);
        let bs_strike = ctx.extrapolation.price(strike, is_cap);
        let first_part = if is_cap {
            -kp_strike * bs_strike
        } else {
            3.0 * kp_strike * bs_strike
        };
        let second_part = ctx.kernel.kappa(strike)
            * ctx.extrapolation.price_derivative_strike(strike, is_cap);
        let integrand = |x: f64| {
            let (_, kpp) = ctx.kernel.kappa_derivatives(x);
            -kpp * ctx.extrapolation.price(x, is_cap)
        };
        let third_part =
            integrate_with_retry(&integrand, lower, upper, STRIKE_SENSITIVITY_TOLERANCE)?;

        Ok(coupon.notional
            * coupon.accrual
            * ctx.factor
            * (first_part + second_part + third_part))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    use sabr_core::market_data::curves::{CurveBundle, FlatCurve};
    use sabr_core::market_data::{SabrParameterKind, SabrSurface};
    use sabr_core::types::Currency;
    use sabr_models::instruments::{FixedPeriod, IborPeriod, SwapTimes};

    use crate::replication::CmsReplicationPricer;

    const CUTOFF: f64 = 0.10;
    const MU: f64 = 2.50;

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

    fn pricer() -> CmsSabrExtrapolationPricer {
        CmsSabrExtrapolationPricer::new(CUTOFF, MU)
    }

    #[test]
    fn test_extrapolated_cap_at_most_plain_replication() {
        let market = market(0.05, 0.04);
        let cap = CmsCapFloor::cap(coupon(1.0e6), 0.04);
        let extrapolated = pricer().present_value(&cap, &market).unwrap();
        let plain = CmsReplicationPricer::new()
            .present_value(&cap, &market)
            .unwrap();
        assert!(extrapolated.value <= plain.value);
        assert!(extrapolated.value > 0.0);
    }

    #[test]
    fn test_cap_floor_parity_recovers_coupon() {
        let market = market(0.05, 0.04);
        let pricer = pricer();
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
        assert_relative_eq!(
            cap.value - floor.value,
            cms.value - fixed,
            max_relative = 5e-4
        );
    }

    #[test]
    fn test_coupon_rate_above_forward() {
        let market = market(0.05, 0.04);
        let coupon = coupon(1.0e6);
        let rate = pricer().coupon_rate(&coupon, &market).unwrap();
        let forward = coupon.underlying.forward_rate(&market.curves).unwrap();
        assert!(rate > forward);
        assert!(rate < forward + 0.02);
    }

    #[test]
    fn test_curve_sensitivity_matches_parallel_bump() {
        let coupon = coupon(1.0e6);
        let cap = CmsCapFloor::cap(coupon, 0.04);
        let pricer = pricer();
        let sensitivity = pricer
            .present_value_curve_sensitivity(&cap, &market(0.05, 0.04))
            .unwrap();
        let analytic = sensitivity.total("fund") + sensitivity.total("fwd");
        let shift = 1.0e-7;
        let up = pricer
            .present_value(&cap, &market(0.05 + shift, 0.04 + shift))
            .unwrap();
        let down = pricer
            .present_value(&cap, &market(0.05 - shift, 0.04 - shift))
            .unwrap();
        let finite_difference = (up.value - down.value) / (2.0 * shift);
        assert_relative_eq!(analytic, finite_difference, max_relative = 5e-3);
    }

    #[test]
    fn test_alpha_sensitivity_matches_bump() {
        let market = market(0.05, 0.04);
        let cap = CmsCapFloor::cap(coupon(1.0e6), 0.04);
        let pricer = pricer();
        let sensitivity = pricer
            .present_value_sabr_sensitivity(&cap, &market)
            .unwrap();
        let analytic: f64 = sensitivity.alpha.values().sum();
        let shift = 1.0e-5;
        let bump = |s: f64| {
            let surface = market.sabr.with_shift(SabrParameterKind::Alpha, s).unwrap();
            SabrBundle::new(market.curves.clone(), surface)
        };
        let up = pricer.present_value(&cap, &bump(shift)).unwrap();
        let down = pricer.present_value(&cap, &bump(-shift)).unwrap();
        let finite_difference = (up.value - down.value) / (2.0 * shift);
        assert_relative_eq!(analytic, finite_difference, max_relative = 5e-3);
    }

    #[test]
    fn test_strike_sensitivity_matches_bump() {
        let market = market(0.05, 0.04);
        let coupon = coupon(1.0e6);
        let pricer = pricer();
        let strike = 0.04;
        let analytic = pricer
            .present_value_strike_sensitivity(&CmsCapFloor::cap(coupon.clone(), strike), &market)
            .unwrap();
        let shift = 1.0e-5;
        let up = pricer
            .present_value(&CmsCapFloor::cap(coupon.clone(), strike + shift), &market)
            .unwrap();
        let down = pricer
            .present_value(&CmsCapFloor::cap(coupon.clone(), strike - shift), &market)
            .unwrap();
        let finite_difference = (up.value - down.value) / (2.0 * shift);
        assert_relative_eq!(analytic, finite_difference, max_relative = 5e-3);
    }

    #[test]
    fn test_floor_strike_sensitivity_is_negative_of_short_floor() {
        let market = market(0.05, 0.04);
        let coupon = coupon(1.0e6);
        let pricer = pricer();
        let floor = CmsCapFloor::floor(coupon, 0.04);
        let long = pricer
            .present_value_strike_sensitivity(&floor, &market)
            .unwrap();
        let short = pricer
            .present_value_strike_sensitivity(&floor.opposite(), &market)
            .unwrap();
        assert_relative_eq!(long, -short, max_relative = 1e-12);
        // A floor gains value as the strike rises.
        assert!(long > 0.0);
    }
}
