//! Present value sensitivity to SABR surface parameters.

use std::collections::BTreeMap;

/// Surface coordinate (expiry, tenor) usable as an ordered map key.
///
/// Ordering is lexicographic via `f64::total_cmp`, so NaN coordinates are
/// admissible but sort last; pricing never produces them.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpiryTenor {
    /// Option expiry in years.
    pub expiry: f64,
    /// Underlying tenor in years.
    pub tenor: f64,
}

impl ExpiryTenor {
    /// A new surface coordinate.
    pub fn new(expiry: f64, tenor: f64) -> Self {
        Self { expiry, tenor }
    }
}

impl PartialEq for ExpiryTenor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for ExpiryTenor {}

impl PartialOrd for ExpiryTenor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExpiryTenor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.expiry
            .total_cmp(&other.expiry)
            .then(self.tenor.total_cmp(&other.tenor))
    }
}

/// Sensitivities to alpha, beta, rho and nu, keyed by surface coordinate.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SabrSensitivity {
    /// dPV/dAlpha per coordinate.
    pub alpha: BTreeMap<ExpiryTenor, f64>,
    /// dPV/dBeta per coordinate.
    pub beta: BTreeMap<ExpiryTenor, f64>,
    /// dPV/dRho per coordinate.
    pub rho: BTreeMap<ExpiryTenor, f64>,
    /// dPV/dNu per coordinate.
    pub nu: BTreeMap<ExpiryTenor, f64>,
}

impl SabrSensitivity {
    /// An empty sensitivity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record all four parameter sensitivities at one coordinate, adding to
    /// any existing entries.
    pub fn add(&mut self, key: ExpiryTenor, alpha: f64, beta: f64, rho: f64, nu: f64) {
        *self.alpha.entry(key).or_insert(0.0) += alpha;
        *self.beta.entry(key).or_insert(0.0) += beta;
        *self.rho.entry(key).or_insert(0.0) += rho;
        *self.nu.entry(key).or_insert(0.0) += nu;
    }

    /// Element-wise sum.
    pub fn plus(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (maps_out, maps_other) in [
            (&mut out.alpha, &other.alpha),
            (&mut out.beta, &other.beta),
            (&mut out.rho, &other.rho),
            (&mut out.nu, &other.nu),
        ] {
            for (k, v) in maps_other {
                *maps_out.entry(*k).or_insert(0.0) += v;
            }
        }
        out
    }

    /// All values scaled by `factor`.
    pub fn multiplied_by(&self, factor: f64) -> Self {
        let scale = |m: &BTreeMap<ExpiryTenor, f64>| {
            m.iter().map(|(k, v)| (*k, v * factor)).collect()
        };
        Self {
            alpha: scale(&self.alpha),
            beta: scale(&self.beta),
            rho: scale(&self.rho),
            nu: scale(&self.nu),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ordering() {
        let a = ExpiryTenor::new(1.0, 5.0);
        let b = ExpiryTenor::new(1.0, 10.0);
        let c = ExpiryTenor::new(2.0, 1.0);
        assert!(a < b);
        assert!(b < c);
        assert_eq!(a, ExpiryTenor::new(1.0, 5.0));
    }

    #[test]
    fn test_add_accumulates() {
        let key = ExpiryTenor::new(9.68, 5.0);
        let mut s = SabrSensitivity::new();
        s.add(key, 1.0, 2.0, 3.0, 4.0);
        s.add(key, 1.0, 0.0, 0.0, 0.0);
        assert_eq!(s.alpha[&key], 2.0);
        assert_eq!(s.nu[&key], 4.0);
    }

    #[test]
    fn test_plus_and_scale() {
        let k1 = ExpiryTenor::new(1.0, 5.0);
        let k2 = ExpiryTenor::new(2.0, 5.0);
        let mut a = SabrSensitivity::new();
        a.add(k1, 1.0, 1.0, 1.0, 1.0);
        let mut b = SabrSensitivity::new();
        b.add(k1, 1.0, 0.0, 0.0, 0.0);
        b.add(k2, 0.5, 0.5, 0.5, 0.5);
        let sum = a.plus(&b).multiplied_by(2.0);
        assert_eq!(sum.alpha[&k1], 4.0);
        assert_eq!(sum.rho[&k2], 1.0);
    }
}
