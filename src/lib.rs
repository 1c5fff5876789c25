//! GACHA — self-correcting weighted draw engine
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod engine;
pub mod repository;
pub mod random;
pub mod simulation;
pub mod storage;

pub use engine::configuration::Configuration;
pub use engine::Engine;
pub use repository::Repository;
pub use types::{Histogram, InvalidConfigError, Label, RepositoryError, StockLedger};
