//! Numerical building blocks: solvers, quadrature, interpolation.

pub mod integration;
pub mod interpolators;
pub mod solvers;
