//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs, then
//! validates the `[gacha]` section into an engine [`Configuration`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

use crate::engine::configuration::Configuration;
use crate::repository::memory::StockPolicy;
use crate::types::StockLedger;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub gacha: GachaConfig,
    /// Initial stock per win label. Absent means stock is unmanaged.
    #[serde(default)]
    pub stock: Option<HashMap<String, u64>>,
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GachaConfig {
    pub wins: Vec<String>,
    pub loses: Vec<String>,
    pub ratio: HashMap<String, f64>,
    pub gain: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    pub rounds: u64,
    pub draws_per_round: usize,
    /// Fixed seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    /// Snapshot file to resume from and save to. Persistence is off when unset.
    #[serde(default)]
    pub state_file: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Validate the `[gacha]` section into an engine configuration.
    pub fn configuration(&self) -> Result<Configuration> {
        let g = &self.gacha;
        let config = Configuration::new(
            g.wins.iter().map(String::as_str),
            g.loses.iter().map(String::as_str),
            g.ratio.iter().map(|(k, v)| (k.as_str(), *v)),
            g.gain,
        )
        .context("Invalid [gacha] configuration")?;
        Ok(config)
    }

    pub fn stock_policy(&self) -> StockPolicy {
        match &self.stock {
            Some(stock) => StockPolicy::Managed(
                stock
                    .iter()
                    .map(|(k, v)| (k.as_str().into(), *v))
                    .collect::<StockLedger>(),
            ),
            None => StockPolicy::Unmanaged,
        }
    }
}
