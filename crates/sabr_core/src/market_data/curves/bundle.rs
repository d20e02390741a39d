//! Named collection of yield curves.

use super::YieldCurve;
use crate::market_data::error::MarketDataError;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared handle to a yield curve usable across threads.
pub type CurveRef = Arc<dyn YieldCurve<f64> + Send + Sync>;

/// A set of yield curves keyed by name.
///
/// Pricers resolve discounting and forwarding curves by name, so a bumped
/// bundle for sensitivity runs is built by swapping a single entry with
/// [`CurveBundle::with_curve`].
#[derive(Clone, Default)]
pub struct CurveBundle {
    curves: HashMap<String, CurveRef>,
}

impl CurveBundle {
    /// An empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a curve, replacing any existing entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, curve: CurveRef) {
        self.curves.insert(name.into(), curve);
    }

    /// A copy of the bundle with `name` bound to `curve`.
    pub fn with_curve(&self, name: impl Into<String>, curve: CurveRef) -> Self {
        let mut out = self.clone();
        out.insert(name, curve);
        out
    }

    /// Look up a curve by name.
    pub fn curve(&self, name: &str) -> Result<&CurveRef, MarketDataError> {
        self.curves
            .get(name)
            .ok_or_else(|| MarketDataError::UnknownCurve {
                name: name.to_string(),
            })
    }

    /// Discount factor at `t` from the named curve.
    pub fn discount_factor(&self, name: &str, t: f64) -> Result<f64, MarketDataError> {
        self.curve(name)?.discount_factor(t)
    }

    /// Names of the curves held, in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.curves.keys().map(String::as_str)
    }

    /// Number of curves held.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Whether the bundle holds no curves.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

impl std::fmt::Debug for CurveBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("CurveBundle").field("curves", &names).finish()
    }
}
