//! Interpolation methods for curves and parameter surfaces.
//!
//! - [`LinearInterpolator`]: piecewise linear interpolation on sorted nodes,
//!   used for zero-rate curves
//! - [`BilinearInterpolator`]: 2-D grid interpolation, used for the SABR
//!   parameter surfaces on the (expiry, tenor) grid
//!
//! Both validate their inputs on construction and are generic over
//! `T: num_traits::Float`.

mod bilinear;
mod linear;

pub use bilinear::BilinearInterpolator;
pub use linear::LinearInterpolator;
