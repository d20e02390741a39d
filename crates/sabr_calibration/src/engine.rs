//! Successive root-finder calibration of the Hull-White volatility.

use sabr_core::market_data::curves::YieldCurve;
use sabr_core::market_data::MarketDataError;
use sabr_core::math::solvers::{bracket_root, RiddersSolver, SolverConfig};
use sabr_core::types::{InvalidParameterError, SolverError};
use thiserror::Error;

use crate::hull_white::{CapletTimes, HullWhiteModel};

/// Initial bracket for each volatility piece.
const VOLATILITY_BRACKET: (f64, f64) = (1.0e-4, 0.05);

/// Calibration failures, always naming the instrument that caused them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Discount factor lookup failed.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),
    /// The model rejected the calibrated parameters.
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameterError),
    /// Instrument expiries must be strictly increasing.
    #[error("calibration instrument {index} does not expire after its predecessor")]
    UnorderedInstruments {
        /// Position of the offending instrument in the target list.
        index: usize,
    },
    /// The root finder failed for one instrument. Earlier pieces are
    /// discarded rather than returned partially calibrated.
    #[error("root finding failed for calibration instrument {index}")]
    NonConvergence {
        /// Position of the failing instrument in the target list.
        index: usize,
        /// The underlying solver failure.
        source: SolverError,
    },
}

/// A calibrating caplet and the price the model must reproduce, typically a
/// SABR replication price.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationTarget {
    /// The calibrating caplet.
    pub caplet: CapletTimes,
    /// Price to match.
    pub target_price: f64,
}

/// Calibrates one Hull-White volatility piece per target caplet, in expiry
/// order, freezing the pieces already solved.
///
/// Instrument `i` extends the step grid at its fixing time and the newly
/// opened (last) piece is solved by Ridders root-finding so the model price
/// matches the target. Non-convergence aborts the whole calibration.
#[derive(Debug, Clone)]
pub struct SuccessiveCalibrationEngine {
    mean_reversion: f64,
    solver: RiddersSolver<f64>,
}

impl SuccessiveCalibrationEngine {
    /// Engine for a fixed mean reversion, with the default solver settings.
    pub fn new(mean_reversion: f64) -> Self {
        Self {
            mean_reversion,
            solver: RiddersSolver::new(SolverConfig::default()),
        }
    }

    /// Calibrate to `targets`, discounting on `curve`.
    pub fn calibrate(
        &self,
        targets: &[CalibrationTarget],
        curve: &dyn YieldCurve<f64>,
    ) -> Result<HullWhiteModel, CalibrationError> {
        let mut times: Vec<f64> = Vec::with_capacity(targets.len());
        let mut volatilities: Vec<f64> = vec![VOLATILITY_BRACKET.0];
        for (index, target) in targets.iter().enumerate() {
            let expiry = target.caplet.fixing_time;
            if expiry <= times.last().copied().unwrap_or(0.0) {
                return Err(CalibrationError::UnorderedInstruments { index });
            }
            let df_start = curve.discount_factor(target.caplet.period_start_time)?;
            let df_end = curve.discount_factor(target.caplet.period_end_time)?;
            let last = volatilities.len() - 1;
            let objective = |volatility: f64| {
                let mut trial = volatilities.clone();
                trial[last] = volatility;
                let model = HullWhiteModel {
                    mean_reversion: self.mean_reversion,
                    volatility_times: times.clone(),
                    volatilities: trial,
                };
                model.caplet_price_from_discounts(&target.caplet, df_start, df_end)
                    - target.target_price
            };
            let solved = bracket_root(&objective, VOLATILITY_BRACKET.0, VOLATILITY_BRACKET.1)
                .and_then(|(lo, hi)| self.solver.find_root(&objective, lo, hi))
                .map_err(|source| CalibrationError::NonConvergence { index, source })?;
            volatilities[last] = solved;
            tracing::debug!(index, expiry, volatility = solved, "calibrated piece");
            // Freeze this piece and open the next one at this expiry, seeded
            // with the value just solved.
            times.push(expiry);
            volatilities.push(solved);
        }
        Ok(HullWhiteModel::new(
            self.mean_reversion,
            times,
            volatilities,
        )?)
    }
}
