//! Simulation harness.
//!
//! Drives an engine against an in-memory repository, recording every
//! result so history and stock reflect the running tally, then compares
//! the observed frequencies with the configured ideal.

use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::configuration::Configuration;
use crate::engine::distribution::Distribution;
use crate::engine::Engine;
use crate::random::SeededSource;
use crate::repository::memory::{InMemoryRepository, StockPolicy};
use crate::types::{Label, RepositoryError};

/// Draws between cooperative yields in [`run`].
const YIELD_EVERY: usize = 1024;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome of one simulation round.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub draws: usize,
    /// Draws the repository refused because the label was out of stock.
    pub rejected: usize,
    pub labels: Vec<Label>,
    /// Accepted draws per label, parallel to `labels`.
    pub counts: Vec<u64>,
    pub observed: Distribution,
    pub ideal: Distribution,
}

impl SimulationReport {
    pub fn count(&self, label: &str) -> u64 {
        self.position(label).map(|i| self.counts[i]).unwrap_or(0)
    }

    pub fn frequency(&self, label: &str) -> f64 {
        self.position(label).map(|i| self.observed.get(i)).unwrap_or(0.0)
    }

    /// Distance between observed and ideal frequencies.
    pub fn l1_distance(&self) -> f64 {
        self.observed.l1_distance(&self.ideal)
    }

    /// Distance a uniform draw over the same labels would have from ideal.
    pub fn uniform_l1_distance(&self) -> f64 {
        let uniform = Distribution::normalize(&vec![1.0; self.labels.len()]);
        uniform.l1_distance(&self.ideal)
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l.as_str() == label)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run {} | {} draws | {} rejected", self.run_id, self.draws, self.rejected)?;
        for (i, label) in self.labels.iter().enumerate() {
            writeln!(
                f,
                "  {:<12} {:>9}  observed {:>7.3}%  ideal {:>7.3}%",
                label.as_str(),
                self.counts[i],
                self.observed.get(i) * 100.0,
                self.ideal.get(i) * 100.0,
            )?;
        }
        write!(
            f,
            "  L1 {:.4} (uniform baseline {:.4})",
            self.l1_distance(),
            self.uniform_l1_distance()
        )
    }
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Runs independent rounds, each on a fresh repository.
pub struct Simulator {
    config: Arc<Configuration>,
    policy: StockPolicy,
    seed: Option<u64>,
}

impl Simulator {
    /// `seed` makes rounds reproducible; round `i` uses `seed + i`.
    pub fn new(config: Arc<Configuration>, policy: StockPolicy, seed: Option<u64>) -> Self {
        Self { config, policy, seed }
    }

    /// Fresh engine and repository for round `round`.
    pub fn engine_for_round(&self, round: u64) -> Engine<InMemoryRepository> {
        let repo = InMemoryRepository::new(self.config.clone(), self.policy.clone());
        let engine = Engine::new(self.config.clone(), repo);
        match self.seed {
            Some(seed) => engine.with_random_source(SeededSource::new(seed.wrapping_add(round))),
            None => engine,
        }
    }

    pub async fn run_rounds(&self, rounds: u64, draws: usize) -> Result<Vec<SimulationReport>, RepositoryError> {
        let mut reports = Vec::new();
        for round in 0..rounds {
            let engine = self.engine_for_round(round);
            let report = run(&engine, draws).await?;
            info!(
                round = round + 1,
                run_id = %report.run_id,
                draws = report.draws,
                rejected = report.rejected,
                l1 = format!("{:.4}", report.l1_distance()),
                "Simulation round complete"
            );
            reports.push(report);
        }
        Ok(reports)
    }
}

/// Execute `draws` sequential draws, recording each into the engine's
/// repository before the next draw.
pub async fn run(engine: &Engine<InMemoryRepository>, draws: usize) -> Result<SimulationReport, RepositoryError> {
    let config = engine.config();
    let mut counts = vec![0u64; config.len()];
    let mut rejected = 0usize;

    for i in 0..draws {
        // Let a surrounding select! observe shutdown between batches.
        if i % YIELD_EVERY == YIELD_EVERY - 1 {
            tokio::task::yield_now().await;
        }
        let label = engine.execute().await?;
        if engine.repository().record(&label)? {
            if let Some(i) = config.index_of(&label) {
                counts[i] += 1;
            }
        } else {
            rejected += 1;
        }
    }

    if rejected > 0 {
        warn!(rejected, "Engine selected out-of-stock labels");
    }

    let weights: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
    Ok(SimulationReport {
        run_id: Uuid::new_v4(),
        draws,
        rejected,
        labels: config.labels().to_vec(),
        counts,
        observed: Distribution::normalize(&weights),
        ideal: engine.ideal_distribution(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
