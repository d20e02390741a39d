//! Error types for structured error handling.
//!
//! This module provides:
//! - `SolverError`: Errors from root-finding solvers
//! - `IntegrationError`: Errors from numerical quadrature
//! - `InterpolationError`: Errors from interpolation operations
//! - `InvalidParameterError`: Model/market parameters outside their domain

use thiserror::Error;

/// Interpolation-related errors.
///
/// # Variants
/// - `OutOfBounds`: Query point outside the valid domain
/// - `InsufficientData`: Not enough data points
/// - `NonMonotonicData`: Abscissae are not strictly increasing
/// - `DimensionMismatch`: Grid dimensions are inconsistent
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationError {
    /// Query point outside the valid interpolation domain.
    #[error("Query point {x} outside valid domain [{min}, {max}]")]
    OutOfBounds {
        /// The query point that was out of bounds
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Insufficient data points for interpolation.
    #[error("Insufficient data points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Abscissae are not strictly increasing.
    #[error("Data is not strictly increasing at index {index}")]
    NonMonotonicData {
        /// Index where the violation was detected
        index: usize,
    },

    /// Grid dimensions do not match the axis lengths.
    #[error("Dimension mismatch: got {got}, expected {expected}")]
    DimensionMismatch {
        /// Provided length
        got: usize,
        /// Expected length
        expected: usize,
    },
}

/// Root-finding solver errors.
///
/// # Variants
/// - `NoBracket`: Function values at bracket endpoints have the same sign
/// - `MaxIterationsExceeded`: Solver failed to converge within iteration limit
/// - `BracketExpansionFailed`: Outward bracket search exhausted its budget
///
/// # Examples
/// ```
/// use sabr_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// No valid bracket (function values at endpoints have the same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// Outward bracket search failed to find a sign change.
    #[error("Bracket expansion failed after {steps} steps from [{a}, {b}]")]
    BracketExpansionFailed {
        /// Initial left endpoint
        a: f64,
        /// Initial right endpoint
        b: f64,
        /// Number of expansion steps attempted
        steps: usize,
    },
}

/// Numerical quadrature errors.
///
/// Quadrature failures are surfaced to the caller rather than silently
/// absorbed; the only acceptable local recovery is a bounded retry with a
/// relaxed tolerance before propagating.
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntegrationError {
    /// Adaptive subdivision exceeded its depth limit without converging.
    #[error("Quadrature did not converge within depth {max_depth} on [{lower}, {upper}]")]
    MaxSubdivisionsExceeded {
        /// Lower integration bound
        lower: f64,
        /// Upper integration bound
        upper: f64,
        /// Maximum subdivision depth that was exhausted
        max_depth: usize,
    },

    /// Integration bounds are invalid (NaN, or upper below lower).
    #[error("Invalid integration bounds [{lower}, {upper}]")]
    InvalidBounds {
        /// Lower integration bound
        lower: f64,
        /// Upper integration bound
        upper: f64,
    },

    /// The integrand produced a non-finite value.
    #[error("Integrand returned a non-finite value at x = {x}")]
    NonFiniteIntegrand {
        /// Abscissa at which the integrand failed
        x: f64,
    },
}

/// A model or market parameter outside its admissible domain.
///
/// Raised at construction time, never at use time: a successfully built
/// parameter set or surface is valid by construction.
///
/// # Examples
/// ```
/// use sabr_core::types::InvalidParameterError;
///
/// let err = InvalidParameterError::new("alpha", -0.1, "must be positive");
/// assert!(format!("{}", err).contains("alpha"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("Invalid parameter {name} = {value}: {constraint}")]
pub struct InvalidParameterError {
    /// Parameter name.
    pub name: String,
    /// Offending value.
    pub value: f64,
    /// Human-readable constraint description.
    pub constraint: String,
}

impl InvalidParameterError {
    /// Create a new invalid-parameter error.
    pub fn new(name: impl Into<String>, value: f64, constraint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            constraint: constraint.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_error_no_bracket_display() {
        let err = SolverError::NoBracket { a: 0.0, b: 1.0 };
        assert_eq!(format!("{}", err), "No bracket: f(0) and f(1) have same sign");
    }

    #[test]
    fn test_solver_error_max_iterations_display() {
        let err = SolverError::MaxIterationsExceeded { iterations: 100 };
        assert_eq!(format!("{}", err), "Failed to converge after 100 iterations");
    }

    #[test]
    fn test_solver_error_bracket_expansion_display() {
        let err = SolverError::BracketExpansionFailed {
            a: -1.0,
            b: 1.0,
            steps: 50,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("50 steps"));
        assert!(msg.contains("[-1, 1]"));
    }

    #[test]
    fn test_integration_error_display() {
        let err = IntegrationError::MaxSubdivisionsExceeded {
            lower: 0.0,
            upper: 1.0,
            max_depth: 20,
        };
        assert!(format!("{}", err).contains("depth 20"));
    }

    #[test]
    fn test_integration_error_non_finite() {
        let err = IntegrationError::NonFiniteIntegrand { x: 0.5 };
        assert!(format!("{}", err).contains("x = 0.5"));
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = InvalidParameterError::new("rho", 1.5, "must lie in (-1, 1)");
        assert_eq!(
            format!("{}", err),
            "Invalid parameter rho = 1.5: must lie in (-1, 1)"
        );
    }

    #[test]
    fn test_errors_implement_error_trait() {
        let _: &dyn std::error::Error = &SolverError::MaxIterationsExceeded { iterations: 1 };
        let _: &dyn std::error::Error = &IntegrationError::InvalidBounds {
            lower: 1.0,
            upper: 0.0,
        };
        let _: &dyn std::error::Error = &InvalidParameterError::new("nu", -1.0, "non-negative");
    }

    #[test]
    fn test_clone_and_equality() {
        let err1 = SolverError::NoBracket { a: 0.0, b: 2.0 };
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
