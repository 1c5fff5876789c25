//! Shared types for the gacha engine.
//!
//! Outcome labels, the repository-facing count maps, and the crate's
//! domain error types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Opaque outcome identifier ("gold", "none1", ...).
///
/// Cheap to clone; the engine hands out copies of the configured labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(Arc<str>);

impl Label {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl std::ops::Deref for Label {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for Label {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Repository data
// ---------------------------------------------------------------------------

/// Occurrence counts per label over a recent window of draws.
pub type Histogram = HashMap<Label, u64>;

/// Remaining inventory per win label. Lose labels never appear here.
pub type StockLedger = HashMap<Label, u64>;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Malformed configuration data, rejected at construction time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidConfigError {
    #[error("At least one lose label is required")]
    EmptyLoses,

    #[error("No ratio configured for label '{label}'")]
    MissingRatio { label: Label },

    #[error("Ratio for label '{label}' must be >= 1, got {ratio}")]
    RatioBelowOne { label: Label, ratio: f64 },

    #[error("Ratio for label '{label}' is not finite")]
    NonFiniteRatio { label: Label },

    #[error("Label '{label}' is configured more than once")]
    DuplicateLabel { label: Label },

    #[error("Ratio configured for unknown label '{label}'")]
    UnknownRatioLabel { label: Label },

    #[error("Gain must be a finite non-negative number, got {0}")]
    InvalidGain(f64),

    #[error("Ratio total {total} with gain {gain} is too large to size a history window")]
    RatioTotalTooLarge { total: f64, gain: f64 },
}

/// Failure reported by a repository read or write.
///
/// The engine hands these back to its caller untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    #[error("Repository data error: {0}")]
    Corrupt(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
