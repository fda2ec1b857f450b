//! Kinetic-energy time series.

/// Append-only record of the domain-integrated kinetic energy, one value per
/// completed time step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KineticEnergyHistory {
    values: Vec<f64>,
}

impl KineticEnergyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            values: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.values.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Largest relative increase over the first value, `max(KE) / KE_0 - 1`.
    ///
    /// Zero for an empty or single-entry history, or a zero first value.
    pub fn max_growth(&self) -> f64 {
        match self.first() {
            Some(first) if first > 0.0 => {
                let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                max / first - 1.0
            }
            _ => 0.0,
        }
    }

    /// Whether every value is finite and at most `factor` times the first.
    pub fn is_bounded(&self, factor: f64) -> bool {
        let Some(first) = self.first() else {
            return true;
        };
        self.values
            .iter()
            .all(|v| v.is_finite() && *v <= factor * first.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_growth_relative_to_first() {
        let mut h = KineticEnergyHistory::new();
        for v in [2.0, 2.1, 1.9, 2.2, 2.0] {
            h.push(v);
        }
        assert_eq!(h.len(), 5);
        assert_relative_eq!(h.max_growth(), 0.1, epsilon = 1e-12);
        assert!(h.is_bounded(1.2));
        assert!(!h.is_bounded(1.05));
    }

    #[test]
    fn test_empty_history() {
        let h = KineticEnergyHistory::new();
        assert_eq!(h.max_growth(), 0.0);
        assert!(h.is_bounded(1.0));
        assert_eq!(h.last(), None);
    }

    #[test]
    fn test_non_finite_is_unbounded() {
        let mut h = KineticEnergyHistory::new();
        h.push(1.0);
        h.push(f64::NAN);
        assert!(!h.is_bounded(10.0));
    }
}
