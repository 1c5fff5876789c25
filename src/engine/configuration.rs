//! Draw configuration.
//!
//! Fixes the label enumeration (wins first, then loses, each in the order
//! supplied), the per-label target ratio, and the gain. Everything is
//! validated once here; the engine indexes labels by position afterwards.

use std::collections::{HashMap, HashSet};

use super::WINDOW_PER_RATIO;
use crate::types::{InvalidConfigError, Label};

/// Immutable, validated draw configuration.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Wins followed by loses. Position in this vector is the label's index.
    labels: Vec<Label>,
    win_count: usize,
    /// Ratio per label, parallel to `labels`.
    ratio: Vec<f64>,
    gain: f64,
    index: HashMap<Label, usize>,
}

impl Configuration {
    /// Build a configuration.
    ///
    /// Fails if `loses` is empty, a label is repeated (within or across the
    /// two sets), any label lacks a ratio, any ratio is below 1 or not
    /// finite, a ratio names an unconfigured label, or `gain` is negative.
    /// The ratio total must also stay finite once scaled by the window
    /// factor and the gain, and the window must fit in a `usize`.
    pub fn new<W, L, R, K>(wins: W, loses: L, ratio: R, gain: f64) -> Result<Self, InvalidConfigError>
    where
        W: IntoIterator,
        W::Item: Into<Label>,
        L: IntoIterator,
        L::Item: Into<Label>,
        R: IntoIterator<Item = (K, f64)>,
        K: Into<Label>,
    {
        if !gain.is_finite() || gain < 0.0 {
            return Err(InvalidConfigError::InvalidGain(gain));
        }

        let wins: Vec<Label> = wins.into_iter().map(Into::into).collect();
        let loses: Vec<Label> = loses.into_iter().map(Into::into).collect();
        if loses.is_empty() {
            return Err(InvalidConfigError::EmptyLoses);
        }

        let win_count = wins.len();
        let labels: Vec<Label> = wins.into_iter().chain(loses).collect();

        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), i).is_some() {
                return Err(InvalidConfigError::DuplicateLabel { label: label.clone() });
            }
        }

        let supplied: HashMap<Label, f64> = ratio.into_iter().map(|(k, v)| (k.into(), v)).collect();

        let mut ratios = Vec::with_capacity(labels.len());
        for label in &labels {
            let value = *supplied
                .get(label)
                .ok_or_else(|| InvalidConfigError::MissingRatio { label: label.clone() })?;
            if !value.is_finite() {
                return Err(InvalidConfigError::NonFiniteRatio { label: label.clone() });
            }
            if value < 1.0 {
                return Err(InvalidConfigError::RatioBelowOne {
                    label: label.clone(),
                    ratio: value,
                });
            }
            ratios.push(value);
        }

        let total: f64 = ratios.iter().sum();
        let window = total * WINDOW_PER_RATIO;
        if !total.is_finite()
            || !(window * gain.max(1.0)).is_finite()
            || window >= usize::MAX as f64
        {
            return Err(InvalidConfigError::RatioTotalTooLarge { total, gain });
        }

        let known: HashSet<&Label> = labels.iter().collect();
        // Sorted so the reported label does not depend on hash order.
        let mut unknown: Vec<&Label> = supplied.keys().filter(|k| !known.contains(k)).collect();
        unknown.sort();
        if let Some(label) = unknown.first() {
            return Err(InvalidConfigError::UnknownRatioLabel { label: (*label).clone() });
        }

        Ok(Self {
            labels,
            win_count,
            ratio: ratios,
            gain,
            index,
        })
    }

    pub fn wins(&self) -> &[Label] {
        &self.labels[..self.win_count]
    }

    pub fn loses(&self) -> &[Label] {
        &self.labels[self.win_count..]
    }

    /// All labels in draw order: wins, then loses.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Ratios parallel to [`labels`](Self::labels).
    pub fn ratios(&self) -> &[f64] {
        &self.ratio
    }

    pub fn ratio(&self, label: &str) -> Option<f64> {
        self.index_of(label).map(|i| self.ratio[i])
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Sum of every configured ratio.
    pub fn total_ratio(&self) -> f64 {
        self.ratio.iter().sum()
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Whether the label at `index` is a stock-limited win label.
    pub fn is_win_index(&self, index: usize) -> bool {
        index < self.win_count
    }

    pub fn is_win(&self, label: &str) -> bool {
        self.index_of(label).is_some_and(|i| self.is_win_index(i))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false: a valid configuration has at least one lose label.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
