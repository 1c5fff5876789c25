//! Draw engine — history + stock → corrected distribution → weighted pick.
//!
//! Each call to [`Engine::execute`] compares the configured ideal
//! distribution with a gain-smoothed view of recent history, restricts the
//! draw to labels that are under-represented and in stock, and samples one
//! of them in proportion to its configured ratio.

pub mod configuration;
pub mod distribution;

use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::random::{RandomSource, ThreadRngSource};
use crate::repository::Repository;
use crate::types::{Label, RepositoryError, StockLedger};
use configuration::Configuration;
use distribution::{Distribution, PartialDistribution};

/// History window per unit of total configured ratio.
pub const WINDOW_PER_RATIO: f64 = 100.0;

pub struct Engine<R> {
    config: Arc<Configuration>,
    repository: R,
    random: Box<dyn RandomSource>,
}

impl<R: Repository> Engine<R> {
    /// Compose an engine drawing with the thread-local RNG.
    pub fn new(config: impl Into<Arc<Configuration>>, repository: R) -> Self {
        Self {
            config: config.into(),
            repository,
            random: Box::new(ThreadRngSource),
        }
    }

    /// Replace the uniform source, e.g. with a seeded one for replays.
    pub fn with_random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Long-run target: ratios normalized over every label.
    pub fn ideal_distribution(&self) -> Distribution {
        Distribution::normalize(self.config.ratios())
    }

    /// Number of past draws consulted: `100 × Σ ratio`.
    pub fn history_window(&self) -> usize {
        (self.config.total_ratio() * WINDOW_PER_RATIO).floor() as usize
    }

    /// Draw one label.
    ///
    /// Reads history and stock (concurrently) and fails with the
    /// repository's own error if either read fails. Never records the
    /// result or touches stock.
    pub async fn execute(&self) -> Result<Label, RepositoryError> {
        let config = &*self.config;
        let labels = config.labels();
        let ratios = config.ratios();

        let ideal = self.ideal_distribution();
        let window = self.history_window();

        let (history, stocks) = futures::try_join!(
            self.repository.past_result_histogram(window),
            self.repository.stocks(),
        )?;

        let gain = config.gain();
        let mut missing = 0usize;
        let adjusted: Vec<f64> = labels
            .iter()
            .zip(ratios)
            .map(|(label, ratio)| {
                let count = history.get(label.as_str()).copied().unwrap_or_else(|| {
                    missing += 1;
                    0
                });
                count as f64 + ratio * gain
            })
            .collect();
        if missing > 0 {
            warn!(missing, "Histogram is missing configured labels, counting them as 0");
        }

        let past = Distribution::normalize(&adjusted);

        let mut candidates: Vec<usize> = (0..labels.len())
            .filter(|&i| past.get(i) < ideal.get(i) && self.in_stock(i, &stocks))
            .collect();

        let fallback = candidates.is_empty();
        if fallback {
            // Lose labels are always in stock, so this is never empty.
            candidates = (0..labels.len()).filter(|&i| self.in_stock(i, &stocks)).collect();
        }

        let available = PartialDistribution::normalize(ratios, &candidates);
        trace!(
            ideal = ?ideal.values(),
            past = ?past.values(),
            available = ?available.entries(),
            "Draw distributions"
        );

        let selected = &labels[available.select(self.random.next_unit())];

        debug!(
            window,
            candidates = candidates.len(),
            fallback,
            selected = %selected,
            "Draw complete"
        );

        Ok(selected.clone())
    }

    /// Lose labels are unlimited. A win label absent from the ledger has
    /// no stock.
    fn in_stock(&self, index: usize, stocks: &StockLedger) -> bool {
        if !self.config.is_win_index(index) {
            return true;
        }
        let label = &self.config.labels()[index];
        stocks.get(label.as_str()).copied().unwrap_or(0) > 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
