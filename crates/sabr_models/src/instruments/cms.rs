//! CMS coupon and cap/floor definitions.

use super::SwapTimes;
use sabr_core::types::Currency;

/// A CMS coupon: pays the swap rate fixed at `fixing_time`, settled on the
/// underlying swap's start and paid at `payment_time`.
///
/// Long/short is carried by the sign of the notional.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CmsCoupon {
    /// Payment time in years.
    pub payment_time: f64,
    /// Accrual year fraction of the coupon.
    pub accrual: f64,
    /// Signed notional.
    pub notional: f64,
    /// Rate fixing time in years.
    pub fixing_time: f64,
    /// Settlement (swap start) time in years.
    pub settlement_time: f64,
    /// Payment currency.
    pub currency: Currency,
    /// The underlying swap whose par rate is paid.
    pub underlying: SwapTimes,
}

impl CmsCoupon {
    /// Tenor of the underlying swap in years, measured from settlement to the
    /// last fixed payment. This is the maturity axis of the SABR surface.
    pub fn underlying_tenor(&self) -> f64 {
        self.underlying.last_fixed_payment_time() - self.settlement_time
    }
}

/// A cap or floor on a CMS rate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CmsCapFloor {
    /// The capped/floored coupon.
    pub coupon: CmsCoupon,
    /// Strike rate.
    pub strike: f64,
    /// True for a cap (call on the rate), false for a floor.
    pub is_cap: bool,
}

impl CmsCapFloor {
    /// A cap on `coupon` at `strike`.
    pub fn cap(coupon: CmsCoupon, strike: f64) -> Self {
        Self {
            coupon,
            strike,
            is_cap: true,
        }
    }

    /// A floor on `coupon` at `strike`.
    pub fn floor(coupon: CmsCoupon, strike: f64) -> Self {
        Self {
            coupon,
            strike,
            is_cap: false,
        }
    }

    /// The instrument with the notional negated.
    pub fn opposite(&self) -> Self {
        let mut out = self.clone();
        out.coupon.notional = -out.coupon.notional;
        out
    }
}
