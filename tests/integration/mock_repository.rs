//! Mock repository for integration testing.
//!
//! Provides a deterministic `Repository` implementation that serves a
//! fixed histogram and stock ledger, records the window sizes it was
//! asked for, and can be forced to fail either read.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gacha::{Configuration, Histogram, Repository, RepositoryError, StockLedger};

/// A mock repository with fully controllable contents.
pub struct MockRepository {
    histogram: Arc<Mutex<Histogram>>,
    stocks: Arc<Mutex<StockLedger>>,
    requested_windows: Arc<Mutex<Vec<usize>>>,
    stock_reads: AtomicUsize,
    /// If set, `past_result_histogram` returns this error.
    history_error: Arc<Mutex<Option<RepositoryError>>>,
    /// If set, `stocks` returns this error.
    stock_error: Arc<Mutex<Option<RepositoryError>>>,
}

impl MockRepository {
    pub fn new(histogram: Histogram, stocks: StockLedger) -> Self {
        Self {
            histogram: Arc::new(Mutex::new(histogram)),
            stocks: Arc::new(Mutex::new(stocks)),
            requested_windows: Arc::new(Mutex::new(Vec::new())),
            stock_reads: AtomicUsize::new(0),
            history_error: Arc::new(Mutex::new(None)),
            stock_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Empty history, no stock.
    pub fn empty() -> Self {
        Self::new(Histogram::new(), StockLedger::new())
    }

    pub fn set_history_error(&self, err: RepositoryError) {
        *self.history_error.lock().unwrap() = Some(err);
    }

    pub fn set_stock_error(&self, err: RepositoryError) {
        *self.stock_error.lock().unwrap() = Some(err);
    }

    pub fn clear_errors(&self) {
        *self.history_error.lock().unwrap() = None;
        *self.stock_error.lock().unwrap() = None;
    }

    pub fn set_stock(&self, label: &str, stock: u64) {
        self.stocks.lock().unwrap().insert(label.into(), stock);
    }

    pub fn set_count(&self, label: &str, count: u64) {
        self.histogram.lock().unwrap().insert(label.into(), count);
    }

    /// Window sizes requested so far, in call order.
    pub fn requested_windows(&self) -> Vec<usize> {
        self.requested_windows.lock().unwrap().clone()
    }

    pub fn stock_reads(&self) -> usize {
        self.stock_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Repository for MockRepository {
    async fn past_result_histogram(&self, n: usize) -> Result<Histogram, RepositoryError> {
        self.requested_windows.lock().unwrap().push(n);
        if let Some(err) = self.history_error.lock().unwrap().as_ref() {
            return Err(err.clone());
        }
        Ok(self.histogram.lock().unwrap().clone())
    }

    async fn stocks(&self) -> Result<StockLedger, RepositoryError> {
        self.stock_reads.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.stock_error.lock().unwrap().as_ref() {
            return Err(err.clone());
        }
        Ok(self.stocks.lock().unwrap().clone())
    }
}

/// The five-label prize table used across the integration tests.
pub fn prize_config() -> Configuration {
    Configuration::new(
        ["gold", "silver", "bronze"],
        ["none1", "none2"],
        [
            ("gold", 1.0),
            ("silver", 20.0),
            ("bronze", 30.0),
            ("none1", 20.0),
            ("none2", 50.0),
        ],
        100.0,
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gacha::random::SequenceSource;
    use gacha::{Engine, Label};

    fn all_in_stock() -> StockLedger {
        StockLedger::from([
            ("gold".into(), 1),
            ("silver".into(), 20),
            ("bronze".into(), 30),
        ])
    }

    #[tokio::test]
    async fn test_engine_requests_scaled_window() {
        let repo = Arc::new(MockRepository::new(Histogram::new(), all_in_stock()));
        let engine = Engine::new(prize_config(), repo.clone());

        engine.execute().await.unwrap();
        engine.execute().await.unwrap();

        assert_eq!(repo.requested_windows(), vec![12_100, 12_100]);
        assert_eq!(repo.stock_reads(), 2);
    }

    #[tokio::test]
    async fn test_history_error_is_returned_unchanged() {
        let repo = Arc::new(MockRepository::new(Histogram::new(), all_in_stock()));
        repo.set_history_error(RepositoryError::Unavailable("simulated disconnect".into()));
        let engine = Engine::new(prize_config(), repo.clone());

        let err = engine.execute().await.unwrap_err();
        assert_eq!(err, RepositoryError::Unavailable("simulated disconnect".into()));
    }

    #[tokio::test]
    async fn test_history_error_wins_when_both_reads_fail() {
        let repo = Arc::new(MockRepository::empty());
        repo.set_history_error(RepositoryError::Unavailable("history".into()));
        repo.set_stock_error(RepositoryError::Unavailable("stock".into()));
        let engine = Engine::new(prize_config(), repo.clone());

        let err = engine.execute().await.unwrap_err();
        assert_eq!(err, RepositoryError::Unavailable("history".into()));
    }

    #[tokio::test]
    async fn test_stock_error_is_returned_unchanged() {
        let repo = Arc::new(MockRepository::new(Histogram::new(), all_in_stock()));
        repo.set_stock_error(RepositoryError::Corrupt("ledger checksum".into()));
        let engine = Engine::new(prize_config(), repo.clone());

        let err = engine.execute().await.unwrap_err();
        assert_eq!(err, RepositoryError::Corrupt("ledger checksum".into()));
    }

    #[tokio::test]
    async fn test_recovers_after_errors_cleared() {
        let repo = Arc::new(MockRepository::new(Histogram::new(), all_in_stock()));
        repo.set_history_error(RepositoryError::Unavailable("blip".into()));
        let engine = Engine::new(prize_config(), repo.clone());

        assert!(engine.execute().await.is_err());
        repo.clear_errors();
        assert!(engine.execute().await.is_ok());
    }

    #[tokio::test]
    async fn test_zero_stock_win_never_drawn_across_random_values() {
        // gold is far below its share but has no stock left.
        let repo = Arc::new(MockRepository::new(
            Histogram::from([
                (Label::from("gold"), 0),
                (Label::from("silver"), 40),
                (Label::from("bronze"), 60),
                (Label::from("none1"), 40),
                (Label::from("none2"), 100),
            ]),
            all_in_stock(),
        ));
        repo.set_stock("gold", 0);

        let values: Vec<f64> = (0..100).map(|i| i as f64 / 100.0).collect();
        let engine = Engine::new(prize_config(), repo.clone()).with_random_source(SequenceSource::new(values));

        for _ in 0..100 {
            let label = engine.execute().await.unwrap();
            assert_ne!(label.as_str(), "gold");
        }
    }

    #[tokio::test]
    async fn test_every_label_out_of_stock_still_draws() {
        let repo = Arc::new(MockRepository::new(
            Histogram::new(),
            StockLedger::from([("gold".into(), 0), ("silver".into(), 0), ("bronze".into(), 0)]),
        ));
        let engine = Engine::new(prize_config(), repo.clone())
            .with_random_source(SequenceSource::new(vec![0.0, 0.4, 0.999]));

        for _ in 0..3 {
            let label = engine.execute().await.unwrap();
            assert!(matches!(label.as_str(), "none1" | "none2"));
        }
    }

    #[tokio::test]
    async fn test_over_represented_label_is_not_drawn() {
        // none2 far above its share; silver under. Only under-represented
        // labels are eligible while any exist.
        let repo = Arc::new(MockRepository::new(Histogram::new(), all_in_stock()));
        repo.set_count("none2", 10_000);
        let engine = Engine::new(prize_config(), repo.clone())
            .with_random_source(SequenceSource::new(vec![0.0, 0.25, 0.5, 0.75, 0.999]));

        for _ in 0..5 {
            let label = engine.execute().await.unwrap();
            assert_ne!(label.as_str(), "none2");
        }
    }
}
