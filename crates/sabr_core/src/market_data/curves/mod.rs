//! Yield curves and named curve bundles.

mod bundle;
mod flat;
mod interpolated;
mod traits;

pub use bundle::{CurveBundle, CurveRef};
pub use flat::FlatCurve;
pub use interpolated::InterpolatedCurve;
pub use traits::YieldCurve;
