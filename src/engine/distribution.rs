//! Percentage distributions over the configured label enumeration.
//!
//! All vectors here are indexed by label position (see
//! [`Configuration::labels`](super::configuration::Configuration::labels)).

/// Residual the last candidate may absorb when cumulative weights fall
/// short of the random value through floating-point rounding.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Full distribution
// ---------------------------------------------------------------------------

/// Weights normalized to sum to 1 over every configured label.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    values: Vec<f64>,
}

impl Distribution {
    /// Normalize `weights` by their sum.
    ///
    /// A zero total yields all zeros rather than NaN.
    pub fn normalize(weights: &[f64]) -> Self {
        let total: f64 = weights.iter().sum();
        let values = if total > 0.0 {
            weights.iter().map(|w| w / total).collect()
        } else {
            vec![0.0; weights.len()]
        };
        Self { values }
    }

    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
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

    /// Sum of absolute per-label differences. Both sides must share a
    /// label enumeration.
    pub fn l1_distance(&self, other: &Distribution) -> f64 {
        self.values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| (a - b).abs())
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Partial distribution
// ---------------------------------------------------------------------------

/// Weights normalized over a subset of labels, kept in label order.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialDistribution {
    entries: Vec<(usize, f64)>,
}

impl PartialDistribution {
    /// Normalize `weights` restricted to `members`, which must be in
    /// ascending label order.
    pub fn normalize(weights: &[f64], members: &[usize]) -> Self {
        let total: f64 = members.iter().map(|&i| weights[i]).sum();
        let entries = members
            .iter()
            .map(|&i| (i, if total > 0.0 { weights[i] / total } else { 0.0 }))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inverse-CDF selection: subtract each weight from `random` in label
    /// order and return the first index at which the remainder is <= 0.
    ///
    /// `random` must lie in `[0, 1)` and the distribution must be non-empty.
    pub fn select(&self, random: f64) -> usize {
        let mut remaining = random;
        for &(index, weight) in &self.entries {
            remaining -= weight;
            if remaining <= 0.0 {
                return index;
            }
        }

        match self.entries.last() {
            Some(&(index, _)) if remaining <= WEIGHT_TOLERANCE => index,
            _ => unreachable!(
                "weighted draw fell through: {} candidates, residual {remaining}",
                self.entries.len()
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
