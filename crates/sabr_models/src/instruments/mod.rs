//! CMS instrument value objects.
//!
//! Instruments are expressed in year fractions from the valuation date and
//! carry the names of the curves they price against. They are immutable;
//! bumped scenarios are new instances.

mod cms;
mod swap;

pub use cms::{CmsCapFloor, CmsCoupon};
pub use swap::{FixedPeriod, IborPeriod, SwapTimes};
