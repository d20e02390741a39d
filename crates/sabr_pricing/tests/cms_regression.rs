//! Regression tests on a 10-year CMS cap over a 5-year swap, checked against
//! independently computed reference values.

use std::sync::Arc;

use approx::assert_relative_eq;

use sabr_core::market_data::curves::{CurveBundle, FlatCurve, InterpolatedCurve};
use sabr_core::market_data::{SabrBundle, SabrParameterKind, SabrSurface};
use sabr_core::types::Currency;
use sabr_models::instruments::{CmsCapFloor, CmsCoupon, FixedPeriod, IborPeriod, SwapTimes};
use sabr_models::sabr::SabrExtrapolation;
use sabr_pricing::{CmsReplicationPricer, CmsSabrExtrapolationPricer};
use sabr_risk::finite_difference;

const CUTOFF: f64 = 0.10;
const MU: f64 = 2.50;
const STRIKE: f64 = 0.04;
const NOTIONAL: f64 = 1.0e6;

const PAYMENT_TIME: f64 = 10.195007111310726;
const ACCRUAL: f64 = 0.5083333333333333;
const FIXING_TIME: f64 = 9.684078149562092;
const SETTLEMENT_TIME: f64 = 9.695007111310726;

const FIXED_TIMES: [f64; 10] = [
    10.195007111310726,
    10.693150684931506,
    11.194520547945205,
    11.693150684931506,
    12.194520547945205,
    12.693150684931506,
    13.2,
    13.697739351747884,
    14.195007111310726,
    14.693150684931506,
];
const FIXED_ACCRUALS: [f64; 10] = [
    0.5,
    0.5,
    0.5,
    0.5,
    0.5,
    0.5,
    0.5055555555555555,
    0.49722222222222223,
    0.49722222222222223,
    0.5,
];

// (payment_time, payment_accrual, fixing_start, fixing_end, fixing_accrual)
const IBOR_PERIODS: [(f64, f64, f64, f64, f64); 20] = [
    (9.943640991092147, 0.25277777777777777, 9.695007111310726, 9.943640991092147, 0.25277777777777777),
    (10.195007111310726, 0.25555555555555554, 9.943640991092147, 10.195007111310726, 0.25555555555555554),
    (10.446575342465753, 0.25555555555555554, 10.195007111310726, 10.446575342465753, 0.25555555555555554),
    (10.693150684931506, 0.25, 10.446575342465753, 10.693150684931506, 0.25),
    (10.942465753424656, 0.25277777777777777, 10.693150684931506, 10.942465753424656, 0.25277777777777777),
    (11.194520547945205, 0.25555555555555554, 10.942465753424656, 11.194520547945205, 0.25555555555555554),
    (11.446575342465753, 0.25555555555555554, 11.194520547945205, 11.446575342465753, 0.25555555555555554),
    (11.693150684931506, 0.25, 11.446575342465753, 11.693150684931506, 0.25),
    (11.942465753424656, 0.25277777777777777, 11.693150684931506, 11.942465753424656, 0.25277777777777777),
    (12.194520547945205, 0.25555555555555554, 11.942465753424656, 12.194520547945205, 0.25555555555555554),
    (12.452054794520548, 0.2611111111111111, 12.194520547945205, 12.452054794520548, 0.2611111111111111),
    (12.693150684931506, 0.24444444444444444, 12.452054794520548, 12.693150684931506, 0.24444444444444444),
    (12.942465753424656, 0.25277777777777777, 12.693150684931506, 12.95068493150685, 0.2611111111111111),
    (13.2, 0.2611111111111111, 12.942465753424656, 13.2, 0.2611111111111111),
    (13.449105471966464, 0.25277777777777777, 13.2, 13.451837712403622, 0.25555555555555554),
    (13.697739351747884, 0.25277777777777777, 13.449105471966464, 13.697739351747884, 0.25277777777777777),
    (13.946373231529305, 0.25277777777777777, 13.697739351747884, 13.946373231529305, 0.25277777777777777),
    (14.195007111310726, 0.25277777777777777, 13.946373231529305, 14.197739351747884, 0.25555555555555554),
    (14.446575342465753, 0.25555555555555554, 14.195007111310726, 14.446575342465753, 0.25555555555555554),
    (14.693150684931506, 0.25, 14.446575342465753, 14.693150684931506, 0.25),
];

fn market(discount_rate: f64, forward_rate: f64) -> SabrBundle {
    let mut curves = CurveBundle::new();
    curves.insert("fund", Arc::new(FlatCurve::new(discount_rate)));
    curves.insert("fwd", Arc::new(FlatCurve::new(forward_rate)));
    SabrBundle::new(curves, surface())
}

fn surface() -> SabrSurface {
    let expiries = [0.0, 0.5, 1.0, 2.0, 5.0, 10.0];
    let tenors = [0.0, 1.0, 10.0, 100.0];
    let by_tenor = |values: [f64; 4]| -> Vec<Vec<f64>> {
        expiries.iter().map(|_| values.to_vec()).collect()
    };
    SabrSurface::new(
        &expiries,
        &tenors,
        &by_tenor([0.05, 0.05, 0.06, 0.06]),
        &by_tenor([0.5, 0.5, 0.5, 0.5]),
        &by_tenor([-0.25, -0.25, 0.0, 0.0]),
        &by_tenor([0.5, 0.5, 0.3, 0.3]),
    )
    .unwrap()
}

fn coupon(notional: f64) -> CmsCoupon {
    let fixed_periods = FIXED_TIMES
        .iter()
        .zip(FIXED_ACCRUALS.iter())
        .map(|(&payment_time, &accrual)| FixedPeriod {
            payment_time,
            accrual,
        })
        .collect();
    let ibor_periods = IBOR_PERIODS
        .iter()
        .map(
            |&(payment_time, payment_accrual, fixing_start_time, fixing_end_time, fixing_accrual)| {
                IborPeriod {
                    payment_time,
                    payment_accrual,
                    fixing_start_time,
                    fixing_end_time,
                    fixing_accrual,
                }
            },
        )
        .collect();
    CmsCoupon {
        payment_time: PAYMENT_TIME,
        accrual: ACCRUAL,
        notional,
        fixing_time: FIXING_TIME,
        settlement_time: SETTLEMENT_TIME,
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
fn test_forward_and_annuity_match_reference() {
    let market = market(0.05, 0.04);
    let coupon = coupon(NOTIONAL);
    let forward = coupon.underlying.forward_rate(&market.curves).unwrap();
    let annuity = coupon.underlying.annuity(&market.curves).unwrap();
    assert_relative_eq!(forward, 0.04043897397457396, epsilon = 1e-12);
    assert_relative_eq!(annuity, 2.6907197791647905, epsilon = 1e-12);
    assert_relative_eq!(coupon.underlying_tenor(), 4.99814357362078, epsilon = 1e-12);
}

#[test]
fn test_interpolated_sabr_parameters_match_reference() {
    let coupon = coupon(NOTIONAL);
    let params = surface().parameters(coupon.fixing_time, coupon.underlying_tenor());
    assert_relative_eq!(params.alpha, 0.054442381748467536, epsilon = 1e-14);
    assert_relative_eq!(params.beta, 0.5, epsilon = 1e-14);
    assert_relative_eq!(params.rho, -0.13894045628831167, epsilon = 1e-14);
    assert_relative_eq!(params.nu, 0.41115236503064934, epsilon = 1e-14);
}

#[test]
fn test_fitted_tail_matches_reference() {
    let market = market(0.05, 0.04);
    let coupon = coupon(NOTIONAL);
    let forward = coupon.underlying.forward_rate(&market.curves).unwrap();
    let params = market
        .sabr
        .parameters(coupon.fixing_time, coupon.underlying_tenor());
    let tail = SabrExtrapolation::new(params, forward, CUTOFF, coupon.fixing_time, MU)
        .unwrap()
        .tail_parameters();
    assert_relative_eq!(tail[0], -8.69812128231804, max_relative = 1e-8);
    assert_relative_eq!(tail[1], -0.33370604973317103, max_relative = 1e-8);
    assert_relative_eq!(tail[2], 0.009417987520021093, max_relative = 1e-8);
}

#[test]
fn test_cap_present_value_regression() {
    let market = market(0.05, 0.04);
    let cap = CmsCapFloor::cap(coupon(NOTIONAL), STRIKE);
    let pv = pricer().present_value(&cap, &market).unwrap();
    assert_eq!(pv.currency, Currency::EUR);
    assert!((pv.value - 6627.971).abs() < 1e-2, "pv = {}", pv.value);
}

#[test]
fn test_coupon_equivalent_rate_regression() {
    let market = market(0.05, 0.04);
    let rate = pricer().coupon_rate(&coupon(NOTIONAL), &market).unwrap();
    assert!((rate - 0.0485835).abs() < 1e-6, "rate = {rate}");
}

#[test]
fn test_long_short_parity() {
    let market = market(0.05, 0.04);
    let cap = CmsCapFloor::cap(coupon(NOTIONAL), STRIKE);
    let long = pricer().present_value(&cap, &market).unwrap();
    let short = pricer().present_value(&cap.opposite(), &market).unwrap();
    assert_relative_eq!(long.value, -short.value, max_relative = 1e-12);
}

#[test]
fn test_cap_floor_parity_matches_coupon_minus_fixed() {
    let market = market(0.05, 0.04);
    let pricer = pricer();
    let coupon = coupon(NOTIONAL);
    let cap = pricer
        .present_value(&CmsCapFloor::cap(coupon.clone(), STRIKE), &market)
        .unwrap();
    let floor = pricer
        .present_value(&CmsCapFloor::floor(coupon.clone(), STRIKE), &market)
        .unwrap();
    let cms = pricer.coupon_present_value(&coupon, &market).unwrap();
    let df = market
        .curves
        .discount_factor("fund", coupon.payment_time)
        .unwrap();
    let fixed = STRIKE * df * NOTIONAL * ACCRUAL;
    assert_relative_eq!(
        cap.value - floor.value,
        cms.value - fixed,
        max_relative = 5e-4
    );
}

#[test]
fn test_extrapolated_cap_at_most_plain_replication() {
    let market = market(0.05, 0.04);
    let cap = CmsCapFloor::cap(coupon(NOTIONAL), STRIKE);
    let extrapolated = pricer().present_value(&cap, &market).unwrap();
    let plain = CmsReplicationPricer::new()
        .present_value(&cap, &market)
        .unwrap();
    assert!(extrapolated.value <= plain.value);
}

#[test]
fn test_curve_sensitivity_matches_per_curve_bumps() {
    let cap = CmsCapFloor::cap(coupon(NOTIONAL), STRIKE);
    let pricer = pricer();
    let sensitivity = pricer
        .present_value_curve_sensitivity(&cap, &market(0.05, 0.04))
        .unwrap();
    let shift = 1.0e-6;

    let fd = finite_difference::central(
        |bump| {
            pricer
                .present_value(&cap, &market(0.05 + bump, 0.04))
                .map(|pv| pv.value)
        },
        shift,
    )
    .unwrap();
    assert_relative_eq!(sensitivity.total("fund"), fd, max_relative = 1e-2);

    let fd = finite_difference::central(
        |bump| {
            pricer
                .present_value(&cap, &market(0.05, 0.04 + bump))
                .map(|pv| pv.value)
        },
        shift,
    )
    .unwrap();
    assert_relative_eq!(sensitivity.total("fwd"), fd, max_relative = 1e-2);
}

/// Weight of `node` in the linearly interpolated zero rate at `t`, with flat
/// extrapolation outside the node range.
fn node_weight(times: &[f64], node: usize, t: f64) -> f64 {
    let last = times.len() - 1;
    if t <= times[0] {
        return if node == 0 { 1.0 } else { 0.0 };
    }
    if t >= times[last] {
        return if node == last { 1.0 } else { 0.0 };
    }
    let right = times.iter().position(|&x| x >= t).unwrap();
    let w = (t - times[right - 1]) / (times[right] - times[right - 1]);
    if node == right {
        w
    } else if node == right - 1 {
        1.0 - w
    } else {
        0.0
    }
}

#[test]
fn test_curve_sensitivity_matches_node_bumps_on_interpolated_curves() {
    let node_times = [1.0, 5.0, 10.0, 15.0];
    let fund = InterpolatedCurve::new(&node_times, &[0.045, 0.048, 0.05, 0.051]).unwrap();
    let fwd = InterpolatedCurve::new(&node_times, &[0.038, 0.04, 0.041, 0.042]).unwrap();
    let with_curves = |fund: InterpolatedCurve<f64>, fwd: InterpolatedCurve<f64>| {
        let mut curves = CurveBundle::new();
        curves.insert("fund", Arc::new(fund));
        curves.insert("fwd", Arc::new(fwd));
        SabrBundle::new(curves, surface())
    };
    let cap = CmsCapFloor::cap(coupon(NOTIONAL), STRIKE);
    let pricer = pricer();
    let sensitivity = pricer
        .present_value_curve_sensitivity(&cap, &with_curves(fund.clone(), fwd.clone()))
        .unwrap();
    let shift = 1.0e-6;

    // The analytic entries sit at cash-flow times; a node bump reaches each
    // of them through its interpolation weight.
    for node in 0..node_times.len() {
        for name in ["fund", "fwd"] {
            let projected: f64 = sensitivity
                .entries(name)
                .iter()
                .map(|&(t, v)| v * node_weight(&node_times, node, t))
                .sum();
            let fd = finite_difference::central(
                |bump| {
                    let bundle = if name == "fund" {
                        with_curves(fund.with_rate_shift(node, bump), fwd.clone())
                    } else {
                        with_curves(fund.clone(), fwd.with_rate_shift(node, bump))
                    };
                    pricer.present_value(&cap, &bundle).map(|pv| pv.value)
                },
                shift,
            )
            .unwrap();
            assert_relative_eq!(projected, fd, max_relative = 1e-2, epsilon = 1e-3);
        }
    }
}

#[test]
fn test_sabr_sensitivities_match_bumps() {
    let market = market(0.05, 0.04);
    let cap = CmsCapFloor::cap(coupon(NOTIONAL), STRIKE);
    let pricer = pricer();
    let sensitivity = pricer.present_value_sabr_sensitivity(&cap, &market).unwrap();

    let bumped_delta = |kind: SabrParameterKind, shift: f64| {
        finite_difference::central(
            |bump| {
                let surface = market.sabr.with_shift(kind, bump).unwrap();
                let bundle = SabrBundle::new(market.curves.clone(), surface);
                pricer.present_value(&cap, &bundle).map(|pv| pv.value)
            },
            shift,
        )
        .unwrap()
    };

    let analytic_alpha: f64 = sensitivity.alpha.values().sum();
    assert_relative_eq!(
        analytic_alpha,
        bumped_delta(SabrParameterKind::Alpha, 1.0e-5),
        max_relative = 5e-3
    );
    let analytic_rho: f64 = sensitivity.rho.values().sum();
    assert_relative_eq!(
        analytic_rho,
        bumped_delta(SabrParameterKind::Rho, 1.0e-4),
        max_relative = 5e-3
    );
    let analytic_nu: f64 = sensitivity.nu.values().sum();
    assert_relative_eq!(
        analytic_nu,
        bumped_delta(SabrParameterKind::Nu, 1.0e-4),
        max_relative = 5e-3
    );
}

#[test]
fn test_sabr_sensitivity_reported_at_expiry_tenor_of_the_coupon() {
    let market = market(0.05, 0.04);
    let cap = CmsCapFloor::cap(coupon(NOTIONAL), STRIKE);
    let sensitivity = pricer().present_value_sabr_sensitivity(&cap, &market).unwrap();
    assert_eq!(sensitivity.alpha.len(), 1);
    let key = sensitivity.alpha.keys().next().unwrap();
    assert_relative_eq!(key.expiry, FIXING_TIME, epsilon = 1e-12);
    assert_relative_eq!(key.tenor, 4.99814357362078, epsilon = 1e-12);
}

#[test]
fn test_strike_sensitivity_matches_bumps() {
    let market = market(0.05, 0.04);
    let coupon = coupon(NOTIONAL);
    let pricer = pricer();
    for &strike in &[0.0001, 0.001, 0.01, 0.04, 0.05] {
        let analytic = pricer
            .present_value_strike_sensitivity(&CmsCapFloor::cap(coupon.clone(), strike), &market)
            .unwrap();
        let fd = finite_difference::central(
            |bump| {
                pricer
                    .present_value(&CmsCapFloor::cap(coupon.clone(), strike + bump), &market)
                    .map(|pv| pv.value)
            },
            1.0e-5,
        )
        .unwrap();
        assert_relative_eq!(analytic, fd, max_relative = 5e-3);
    }
}
