//! Draw history and stock storage.
//!
//! Defines the `Repository` trait the engine reads from, plus an
//! in-memory implementation used by the simulation harness.

pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::{Histogram, RepositoryError, StockLedger};

/// Source of recent draw counts and remaining stock.
///
/// Implementors own persistence, concurrency control, and stock
/// decrement. The engine only reads, once per draw, and never caches.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Repository: Send + Sync {
    /// Counts per configured label among the most recent `n` draws.
    /// Labels never drawn in that window map to 0.
    async fn past_result_histogram(&self, n: usize) -> Result<Histogram, RepositoryError>;

    /// Remaining stock per win label.
    async fn stocks(&self) -> Result<StockLedger, RepositoryError>;
}

#[async_trait]
impl<T: Repository + ?Sized> Repository for Arc<T> {
    async fn past_result_histogram(&self, n: usize) -> Result<Histogram, RepositoryError> {
        (**self).past_result_histogram(n).await
    }

    async fn stocks(&self) -> Result<StockLedger, RepositoryError> {
        (**self).stocks().await
    }
}
