//! Draw history persistence.
//!
//! A [`RepositorySnapshot`] carries the full draw history (oldest first, as
//! label names) and the remaining win stock. Stock is stored as
//! `"stocks": null` when the repository runs unmanaged, and as a ledger of
//! win label to remaining count when it is managed; a managed ledger only
//! ever shrinks between saves, since every recorded win decrements it.
//!
//! On resume the snapshot's stock mode is authoritative. A `[stock]` table
//! added to (or removed from) the config after a save does not reset the
//! ledger; it is only reported.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::engine::configuration::Configuration;
use crate::repository::memory::{InMemoryRepository, RepositorySnapshot, StockPolicy};

/// Default state file path.
pub const DEFAULT_STATE_FILE: &str = "gacha_state.json";

/// Write a snapshot as pretty JSON, replacing any previous file.
pub fn save_state(snapshot: &RepositorySnapshot, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_STATE_FILE);
    let json = serde_json::to_string_pretty(snapshot)
        .context("Failed to serialise repository snapshot")?;

    std::fs::write(path, &json)
        .with_context(|| format!("Failed to write state to {path}"))?;

    debug!(
        path,
        draws = snapshot.history.len(),
        managed_stock = snapshot.stocks.is_some(),
        "State saved"
    );
    Ok(())
}

/// Read a snapshot back. `Ok(None)` when there is no file yet.
pub fn load_state(path: Option<&str>) -> Result<Option<RepositorySnapshot>> {
    let path = path.unwrap_or(DEFAULT_STATE_FILE);

    if !Path::new(path).exists() {
        info!(path, "No saved draw history, starting fresh");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state from {path}"))?;

    let snapshot: RepositorySnapshot = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse state from {path}"))?;

    info!(
        path,
        draws = snapshot.history.len(),
        managed_stock = snapshot.stocks.is_some(),
        saved_at = %snapshot.saved_at,
        "Draw history loaded from disk"
    );

    Ok(Some(snapshot))
}

/// Snapshot `repo` and write it to `path`.
pub fn save_repository(repo: &InMemoryRepository, path: Option<&str>) -> Result<RepositorySnapshot> {
    let snapshot = repo.snapshot().context("Failed to snapshot repository")?;
    save_state(&snapshot, path)?;
    Ok(snapshot)
}

/// Rebuild a repository from `path`, or start an empty one under `policy`
/// when nothing has been saved.
///
/// Fails if the saved history names a label `config` does not know.
pub fn load_repository(
    config: Arc<Configuration>,
    policy: StockPolicy,
    path: Option<&str>,
) -> Result<InMemoryRepository> {
    let Some(snapshot) = load_state(path)? else {
        return Ok(InMemoryRepository::new(config, policy));
    };

    let configured_managed = matches!(policy, StockPolicy::Managed(_));
    if snapshot.stocks.is_some() != configured_managed {
        warn!(
            saved_managed = snapshot.stocks.is_some(),
            configured_managed,
            "Stock mode differs from the saved state; keeping the saved one"
        );
    }

    InMemoryRepository::restore(config, snapshot)
        .context("Saved state does not match the configured labels")
}

/// Remove the state file if present.
pub fn delete_state(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_STATE_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to delete state file {path}"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
