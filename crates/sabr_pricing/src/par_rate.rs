//! Par-rate curve sensitivity of the underlying swap.
//!
//! Sensitivities are reported against the continuously compounded zero rate
//! at each cash-flow time, so a discount factor D(t) contributes through
//! dD/dr = -t * D(t). The decomposition feeds the delta leg of the CMS curve
//! sensitivity.

use sabr_core::market_data::curves::CurveBundle;
use sabr_models::instruments::SwapTimes;
use sabr_risk::CurveSensitivity;

use crate::error::PricingError;

/// Derivative of the par swap rate with respect to each curve node rate.
pub fn par_rate_curve_sensitivity(
    swap: &SwapTimes,
    curves: &CurveBundle,
) -> Result<CurveSensitivity, PricingError> {
    let discount = curves.curve(&swap.discount_curve)?;
    let forward = curves.curve(&swap.forward_curve)?;

    let annuity = swap.annuity(curves)?;
    let float_pv = swap.floating_leg_value(curves)?;
    let par_rate = float_pv / annuity;

    let mut sens = CurveSensitivity::new();

    // Floating leg: forward curve through the fixing-period discount factor
    // ratio, discount curve through the payment discounting.
    for period in &swap.ibor_periods {
        let df_start = forward.discount_factor(period.fixing_start_time)?;
        let df_end = forward.discount_factor(period.fixing_end_time)?;
        let df_pay = discount.discount_factor(period.payment_time)?;
        let ratio = df_start / df_end;
        let weight = period.payment_accrual / period.fixing_accrual * df_pay;
        sens.add(
            &swap.forward_curve,
            period.fixing_start_time,
            -period.fixing_start_time * ratio * weight / annuity,
        );
        sens.add(
            &swap.forward_curve,
            period.fixing_end_time,
            period.fixing_end_time * ratio * weight / annuity,
        );
        let rate = (ratio - 1.0) / period.fixing_accrual;
        sens.add(
            &swap.discount_curve,
            period.payment_time,
            -period.payment_time * df_pay * period.payment_accrual * rate / annuity,
        );
    }

    // Fixed leg: the annuity in the denominator.
    for period in &swap.fixed_periods {
        let df = discount.discount_factor(period.payment_time)?;
        sens.add(
            &swap.discount_curve,
            period.payment_time,
            par_rate / annuity * period.accrual * period.payment_time * df,
        );
    }

    Ok(sens.cleaned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sabr_core::market_data::curves::FlatCurve;
    use sabr_models::instruments::{FixedPeriod, IborPeriod};
    use std::sync::Arc;

    fn swap() -> SwapTimes {
        SwapTimes {
            fixed_periods: (1..=4)
                .map(|i| FixedPeriod {
                    payment_time: 0.5 * i as f64,
                    accrual: 0.5,
                })
                .collect(),
            ibor_periods: (1..=8)
                .map(|i| IborPeriod {
                    payment_time: 0.25 * i as f64,
                    payment_accrual: 0.25,
                    fixing_start_time: 0.25 * (i - 1) as f64,
                    fixing_end_time: 0.25 * i as f64,
                    fixing_accrual: 0.25,
                })
                .collect(),
            discount_curve: "discount".to_string(),
            forward_curve: "forward".to_string(),
        }
    }

    fn bundle(r_discount: f64, r_forward: f64) -> CurveBundle {
        let mut curves = CurveBundle::new();
        curves.insert("discount", Arc::new(FlatCurve::new(r_discount)));
        curves.insert("forward", Arc::new(FlatCurve::new(r_forward)));
        curves
    }

    #[test]
    fn test_parallel_shift_matches_finite_difference() {
        let s = swap();
        let shift = 1e-7;
        for name in ["discount", "forward"] {
            let sens = par_rate_curve_sensitivity(&s, &bundle(0.05, 0.04)).unwrap();
            let rate = |bump: f64| {
                let curves = if name == "discount" {
                    bundle(0.05 + bump, 0.04)
                } else {
                    bundle(0.05, 0.04 + bump)
                };
                s.forward_rate(&curves).unwrap()
            };
            let fd = (rate(shift) - rate(-shift)) / (2.0 * shift);
            assert_relative_eq!(sens.total(name), fd, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_entries_sorted_and_merged() {
        let sens = par_rate_curve_sensitivity(&swap(), &bundle(0.05, 0.04)).unwrap();
        let entries = sens.entries("discount");
        for pair in entries.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }
}
