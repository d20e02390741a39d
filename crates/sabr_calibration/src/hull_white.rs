//! Hull-White one-factor model with piecewise constant volatility.

use sabr_core::market_data::curves::YieldCurve;
use sabr_core::market_data::MarketDataError;
use sabr_core::types::InvalidParameterError;
use sabr_models::distributions::norm_cdf;

/// Bond-price volatilities below this are priced at intrinsic value.
const SMALL_VOLATILITY: f64 = 1.0e-12;

/// Time points of a caplet: the rate fixes at `fixing_time` on the period
/// `[period_start_time, period_end_time]` and the payoff
/// `accrual * max(L - K, 0)` (times notional) is paid at the period end.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapletTimes {
    /// Rate fixing time in years.
    pub fixing_time: f64,
    /// Start of the underlying deposit period.
    pub period_start_time: f64,
    /// End of the underlying deposit period, also the payment time.
    pub period_end_time: f64,
    /// Accrual year fraction of the period.
    pub accrual: f64,
    /// Signed notional.
    pub notional: f64,
    /// Strike rate.
    pub strike: f64,
}

/// Hull-White one-factor short-rate model
/// `dr = a (theta(t) - r) dt + eta(t) dW` with piecewise constant `eta`.
///
/// Piece `i` of the volatility applies on
/// `[volatility_times[i-1], volatility_times[i])`, with the first piece
/// starting at 0 and the last extending to infinity, so
/// `volatilities.len() == volatility_times.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HullWhiteModel {
    pub(crate) mean_reversion: f64,
    pub(crate) volatility_times: Vec<f64>,
    pub(crate) volatilities: Vec<f64>,
}

impl HullWhiteModel {
    /// Validated constructor.
    ///
    /// Requires a positive mean reversion, strictly increasing positive step
    /// times, non-negative volatilities and
    /// `volatilities.len() == volatility_times.len() + 1`.
    pub fn new(
        mean_reversion: f64,
        volatility_times: Vec<f64>,
        volatilities: Vec<f64>,
    ) -> Result<Self, InvalidParameterError> {
        if !(mean_reversion > 0.0) {
            return Err(InvalidParameterError::new(
                "mean_reversion",
                mean_reversion,
                "must be positive",
            ));
        }
        if volatilities.len() != volatility_times.len() + 1 {
            return Err(InvalidParameterError::new(
                "volatilities",
                volatilities.len() as f64,
                "must have one more entry than volatility_times",
            ));
        }
        let mut previous = 0.0;
        for &t in &volatility_times {
            if t <= previous {
                return Err(InvalidParameterError::new(
                    "volatility_times",
                    t,
                    "must be positive and strictly increasing",
                ));
            }
            previous = t;
        }
        for &eta in &volatilities {
            if eta < 0.0 {
                return Err(InvalidParameterError::new(
                    "volatility",
                    eta,
                    "must be non-negative",
                ));
            }
        }
        Ok(Self {
            mean_reversion,
            volatility_times,
            volatilities,
        })
    }

    /// Mean reversion speed.
    pub fn mean_reversion(&self) -> f64 {
        self.mean_reversion
    }

    /// Interior boundaries of the volatility steps.
    pub fn volatility_times(&self) -> &[f64] {
        &self.volatility_times
    }

    /// Volatility pieces, one more than there are boundaries.
    pub fn volatilities(&self) -> &[f64] {
        &self.volatilities
    }

    /// Index of the volatility piece containing time `t`.
    fn piece_index(&self, t: f64) -> usize {
        self.volatility_times.partition_point(|&boundary| boundary <= t)
    }

    /// Lognormal volatility over `[0, expiry]` of the
    /// `[bond_start, bond_maturity]` forward bond price:
    ///
    /// `(e^(-a s) - e^(-a m)) sqrt( sum_i eta_i^2 (e^(2a t_{i+1}) - e^(2a t_i)) / (2 a^3) )`
    ///
    /// with the sum running over the volatility pieces covering `[0, expiry]`.
    pub fn bond_price_volatility(&self, expiry: f64, bond_start: f64, bond_maturity: f64) -> f64 {
        let a = self.mean_reversion;
        let factor = (-a * bond_start).exp() - (-a * bond_maturity).exp();
        let denominator = 2.0 * a * a * a;

        let mut nodes = vec![0.0];
        for &t in &self.volatility_times {
            if t > 0.0 && t < expiry {
                nodes.push(t);
            }
        }
        nodes.push(expiry);
        let mut variance = 0.0;
        for segment in nodes.windows(2) {
            let eta = self.volatilities[self.piece_index(0.5 * (segment[0] + segment[1]))];
            variance +=
                eta * eta * ((2.0 * a * segment[1]).exp() - (2.0 * a * segment[0]).exp());
        }
        factor * (variance / denominator).sqrt()
    }

    /// European put, exercised at `expiry`, on the zero-coupon bond spanning
    /// `[bond_start, bond_maturity]`, from today's discount factors to the
    /// two bond dates.
    pub fn zero_bond_put(
        &self,
        expiry: f64,
        bond_start: f64,
        bond_maturity: f64,
        df_start: f64,
        df_maturity: f64,
        strike: f64,
    ) -> f64 {
        let vol = self.bond_price_volatility(expiry, bond_start, bond_maturity);
        if vol < SMALL_VOLATILITY {
            return (strike * df_start - df_maturity).max(0.0);
        }
        let h = (df_maturity / (df_start * strike)).ln() / vol + 0.5 * vol;
        strike * df_start * norm_cdf(-h + vol) - df_maturity * norm_cdf(-h)
    }

    /// Caplet price as `(1 + K delta)` zero-coupon bond puts struck at
    /// `1 / (1 + K delta)`, given the discount factors to the period start
    /// and end.
    pub fn caplet_price_from_discounts(
        &self,
        caplet: &CapletTimes,
        df_start: f64,
        df_end: f64,
    ) -> f64 {
        let gross = 1.0 + caplet.strike * caplet.accrual;
        caplet.notional
            * gross
            * self.zero_bond_put(
                caplet.fixing_time,
                caplet.period_start_time,
                caplet.period_end_time,
                df_start,
                df_end,
                1.0 / gross,
            )
    }

    /// Caplet price with discount factors read from `curve`.
    pub fn caplet_price(
        &self,
        caplet: &CapletTimes,
        curve: &dyn YieldCurve<f64>,
    ) -> Result<f64, MarketDataError> {
        let df_start = curve.discount_factor(caplet.period_start_time)?;
        let df_end = curve.discount_factor(caplet.period_end_time)?;
        Ok(self.caplet_price_from_discounts(caplet, df_start, df_end))
    }
}
