//! In-memory repository.
//!
//! Keeps the full draw history and an optional stock ledger behind a
//! mutex. Used by the simulation harness and as a reference
//! implementation of the `Repository` contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use super::Repository;
use crate::engine::configuration::Configuration;
use crate::types::{Histogram, Label, RepositoryError, StockLedger};

/// Stock reported for every win label when stock is unmanaged.
pub const UNMANAGED_STOCK: u64 = u64::MAX;

/// How win-label inventory is tracked.
#[derive(Debug, Clone, PartialEq)]
pub enum StockPolicy {
    /// Win labels never run out and are never decremented.
    Unmanaged,
    /// Initial stock per win label. Missing win labels start at 0.
    Managed(StockLedger),
}

/// Serializable copy of a repository's contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub saved_at: DateTime<Utc>,
    /// Oldest first.
    pub history: Vec<Label>,
    /// `None` when stock is unmanaged.
    pub stocks: Option<StockLedger>,
}

struct State {
    /// Label indices, oldest first.
    history: Vec<usize>,
    /// Parallel to the configured win labels; `None` when unmanaged.
    stocks: Option<Vec<u64>>,
}

pub struct InMemoryRepository {
    config: Arc<Configuration>,
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new(config: Arc<Configuration>, policy: StockPolicy) -> Self {
        let stocks = match policy {
            StockPolicy::Unmanaged => None,
            StockPolicy::Managed(ledger) => {
                for label in ledger.keys() {
                    if !config.is_win(label) {
                        warn!(label = %label, "Ignoring stock for a label that is not a win label");
                    }
                }
                Some(
                    config
                        .wins()
                        .iter()
                        .map(|w| ledger.get(w).copied().unwrap_or(0))
                        .collect(),
                )
            }
        };

        Self {
            config,
            state: Mutex::new(State {
                history: Vec::new(),
                stocks,
            }),
        }
    }

    /// Rebuild a repository from a snapshot taken against the same
    /// configuration.
    pub fn restore(config: Arc<Configuration>, snapshot: RepositorySnapshot) -> Result<Self, RepositoryError> {
        let history = snapshot
            .history
            .iter()
            .map(|label| {
                config
                    .index_of(label)
                    .ok_or_else(|| RepositoryError::Corrupt(format!("unknown label '{label}' in history")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let policy = match snapshot.stocks {
            Some(ledger) => StockPolicy::Managed(ledger),
            None => StockPolicy::Unmanaged,
        };
        let repo = Self::new(config, policy);
        repo.lock()?.history = history;
        Ok(repo)
    }

    pub fn snapshot(&self) -> Result<RepositorySnapshot, RepositoryError> {
        let state = self.lock()?;
        let labels = self.config.labels();
        Ok(RepositorySnapshot {
            saved_at: Utc::now(),
            history: state.history.iter().map(|&i| labels[i].clone()).collect(),
            stocks: state.stocks.as_ref().map(|s| self.stock_ledger(s)),
        })
    }

    /// Append a draw result.
    ///
    /// A managed win label is decremented; if its stock is already 0 the
    /// draw is refused and `Ok(false)` returned. Lose labels are always
    /// accepted.
    pub fn record(&self, label: &Label) -> Result<bool, RepositoryError> {
        let index = self
            .config
            .index_of(label)
            .ok_or_else(|| RepositoryError::Corrupt(format!("cannot record unknown label '{label}'")))?;

        let mut state = self.lock()?;
        if self.config.is_win_index(index) {
            if let Some(stocks) = state.stocks.as_mut() {
                if stocks[index] == 0 {
                    warn!(label = %label, "Out of stock, draw not recorded");
                    return Ok(false);
                }
                stocks[index] -= 1;
                debug!(label = %label, remaining = stocks[index], "Stock decremented");
            }
        }
        state.history.push(index);
        Ok(true)
    }

    /// Counts over the entire history.
    pub fn tally(&self) -> Result<Histogram, RepositoryError> {
        let state = self.lock()?;
        Ok(self.count(state.history.iter()))
    }

    /// Number of recorded draws.
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.history.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }

    fn count<'a>(&self, draws: impl Iterator<Item = &'a usize>) -> Histogram {
        let mut counts = vec![0u64; self.config.len()];
        for &i in draws {
            counts[i] += 1;
        }
        self.config.labels().iter().cloned().zip(counts).collect()
    }

    fn stock_ledger(&self, stocks: &[u64]) -> StockLedger {
        self.config.wins().iter().cloned().zip(stocks.iter().copied()).collect()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository state lock poisoned".into()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn past_result_histogram(&self, n: usize) -> Result<Histogram, RepositoryError> {
        let state = self.lock()?;
        Ok(self.count(state.history.iter().rev().take(n)))
    }

    async fn stocks(&self) -> Result<StockLedger, RepositoryError> {
        let state = self.lock()?;
        Ok(match &state.stocks {
            Some(stocks) => self.stock_ledger(stocks),
            None => self
                .config
                .wins()
                .iter()
                .map(|w| (w.clone(), UNMANAGED_STOCK))
                .collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
