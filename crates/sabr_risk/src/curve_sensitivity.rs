//! Present value sensitivity to yield-curve nodes.

use std::collections::HashMap;

/// Sensitivity of a present value to the zero rate of each curve, as a list
/// of (node time, dPV/dr) pairs per curve name.
///
/// The raw output of a pricing call may carry duplicate node times (the same
/// time touched by several cash flows); [`CurveSensitivity::cleaned`] merges
/// them. Containers are value objects; `plus` and `multiplied_by` return new
/// instances.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveSensitivity {
    sensitivities: HashMap<String, Vec<(f64, f64)>>,
}

impl CurveSensitivity {
    /// An empty sensitivity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a ready map.
    pub fn from_map(sensitivities: HashMap<String, Vec<(f64, f64)>>) -> Self {
        Self { sensitivities }
    }

    /// Append one (time, value) entry for `curve`.
    pub fn add(&mut self, curve: impl Into<String>, time: f64, value: f64) {
        self.sensitivities
            .entry(curve.into())
            .or_default()
            .push((time, value));
    }

    /// Entries for one curve, in insertion order.
    pub fn entries(&self, curve: &str) -> &[(f64, f64)] {
        self.sensitivities
            .get(curve)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Curve names present.
    pub fn curves(&self) -> impl Iterator<Item = &str> {
        self.sensitivities.keys().map(String::as_str)
    }

    /// Sum of all entries for one curve; the parallel-shift sensitivity.
    pub fn total(&self, curve: &str) -> f64 {
        self.entries(curve).iter().map(|(_, v)| v).sum()
    }

    /// Element-wise union of two sensitivities.
    pub fn plus(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (curve, entries) in &other.sensitivities {
            out.sensitivities
                .entry(curve.clone())
                .or_default()
                .extend_from_slice(entries);
        }
        out
    }

    /// All values scaled by `factor`.
    pub fn multiplied_by(&self, factor: f64) -> Self {
        let sensitivities = self
            .sensitivities
            .iter()
            .map(|(curve, entries)| {
                (
                    curve.clone(),
                    entries.iter().map(|&(t, v)| (t, v * factor)).collect(),
                )
            })
            .collect();
        Self { sensitivities }
    }

    /// Entries sorted by node time with duplicate times summed.
    pub fn cleaned(&self) -> Self {
        let sensitivities = self
            .sensitivities
            .iter()
            .map(|(curve, entries)| {
                let mut sorted = entries.clone();
                sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
                let mut merged: Vec<(f64, f64)> = Vec::with_capacity(sorted.len());
                for (t, v) in sorted {
                    match merged.last_mut() {
                        Some(last) if last.0 == t => last.1 += v,
                        _ => merged.push((t, v)),
                    }
                }
                (curve.clone(), merged)
            })
            .collect();
        Self { sensitivities }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plus_unions_curves() {
        let mut a = CurveSensitivity::new();
        a.add("discount", 1.0, 10.0);
        let mut b = CurveSensitivity::new();
        b.add("discount", 2.0, 20.0);
        b.add("forward", 1.0, 5.0);
        let sum = a.plus(&b);
        assert_eq!(sum.entries("discount").len(), 2);
        assert_eq!(sum.entries("forward"), &[(1.0, 5.0)]);
    }

    #[test]
    fn test_multiplied_by() {
        let mut s = CurveSensitivity::new();
        s.add("discount", 1.0, 10.0);
        s.add("discount", 2.0, -4.0);
        let scaled = s.multiplied_by(-0.5);
        assert_eq!(scaled.entries("discount"), &[(1.0, -5.0), (2.0, 2.0)]);
    }

    #[test]
    fn test_cleaned_merges_and_sorts() {
        let mut s = CurveSensitivity::new();
        s.add("discount", 3.0, 1.0);
        s.add("discount", 1.0, 2.0);
        s.add("discount", 3.0, 4.0);
        let clean = s.cleaned();
        assert_eq!(clean.entries("discount"), &[(1.0, 2.0), (3.0, 5.0)]);
        assert_relative_eq!(clean.total("discount"), s.total("discount"), epsilon = 1e-15);
    }

    #[test]
    fn test_missing_curve_is_empty() {
        let s = CurveSensitivity::new();
        assert!(s.entries("nope").is_empty());
        assert_eq!(s.total("nope"), 0.0);
    }
}
