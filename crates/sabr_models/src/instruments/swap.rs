//! Underlying fixed-for-ibor swap expressed in year fractions.

use sabr_core::market_data::curves::CurveBundle;
use sabr_core::market_data::MarketDataError;

/// One fixed-leg payment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedPeriod {
    /// Payment time in years.
    pub payment_time: f64,
    /// Accrual year fraction of the period.
    pub accrual: f64,
}

/// One ibor-leg payment with its fixing period.
///
/// The fixing period may differ from the payment period (end-of-month rolls,
/// stub periods), so its start, end and accrual are carried separately.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IborPeriod {
    /// Payment time in years.
    pub payment_time: f64,
    /// Accrual year fraction used for the payment.
    pub payment_accrual: f64,
    /// Start time of the index fixing period.
    pub fixing_start_time: f64,
    /// End time of the index fixing period.
    pub fixing_end_time: f64,
    /// Accrual year fraction of the index fixing period.
    pub fixing_accrual: f64,
}

/// A fixed-for-ibor swap reduced to the times and accruals pricing needs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapTimes {
    /// Fixed-leg payments, in payment-time order.
    pub fixed_periods: Vec<FixedPeriod>,
    /// Ibor-leg payments, in payment-time order.
    pub ibor_periods: Vec<IborPeriod>,
    /// Name of the discounting/funding curve in the bundle.
    pub discount_curve: String,
    /// Name of the forward estimation curve in the bundle.
    pub forward_curve: String,
}

impl SwapTimes {
    /// Present value of a basis point of the fixed leg.
    pub fn annuity(&self, curves: &CurveBundle) -> Result<f64, MarketDataError> {
        let discount = curves.curve(&self.discount_curve)?;
        let mut annuity = 0.0;
        for period in &self.fixed_periods {
            annuity += period.accrual * discount.discount_factor(period.payment_time)?;
        }
        Ok(annuity)
    }

    /// Present value of the ibor leg with unit notional.
    pub fn floating_leg_value(&self, curves: &CurveBundle) -> Result<f64, MarketDataError> {
        let discount = curves.curve(&self.discount_curve)?;
        let forward = curves.curve(&self.forward_curve)?;
        let mut pv = 0.0;
        for period in &self.ibor_periods {
            let df_start = forward.discount_factor(period.fixing_start_time)?;
            let df_end = forward.discount_factor(period.fixing_end_time)?;
            let rate = (df_start / df_end - 1.0) / period.fixing_accrual;
            pv += period.payment_accrual * rate * discount.discount_factor(period.payment_time)?;
        }
        Ok(pv)
    }

    /// Par swap rate: floating leg value over the annuity.
    pub fn forward_rate(&self, curves: &CurveBundle) -> Result<f64, MarketDataError> {
        Ok(self.floating_leg_value(curves)? / self.annuity(curves)?)
    }

    /// Payment time of the last fixed-leg coupon.
    pub fn last_fixed_payment_time(&self) -> f64 {
        self.fixed_periods
            .last()
            .map(|p| p.payment_time)
            .unwrap_or(0.0)
    }

    /// Number of fixed-leg payments per year, from the first accrual.
    pub fn fixed_payments_per_year(&self) -> usize {
        self.fixed_periods
            .first()
            .map(|p| (1.0 / p.accrual).round() as usize)
            .unwrap_or(0)
    }
}
