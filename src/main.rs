//! Gacha draw simulator.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores repository state from disk when configured, and runs
//! simulation rounds with graceful shutdown.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use gacha::config;
use gacha::engine::configuration::Configuration;
use gacha::engine::Engine;
use gacha::random::SeededSource;
use gacha::simulation::{self, Simulator};
use gacha::storage;

const BANNER: &str = r#"
   ____    _    ____ _   _    _
  / ___|  / \  / ___| | | |  / \
 | |  _  / _ \| |   | |_| | / _ \
 | |_| |/ ___ \ |___|  _  |/ ___ \
  \____/_/   \_\____|_| |_/_/   \_\

  Self-correcting weighted draw engine
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");

    let engine_config = Arc::new(cfg.configuration()?);
    info!(
        wins = engine_config.wins().len(),
        loses = engine_config.loses().len(),
        total_ratio = engine_config.total_ratio(),
        gain = engine_config.gain(),
        rounds = cfg.simulation.rounds,
        draws_per_round = cfg.simulation.draws_per_round,
        "Gacha simulator starting up"
    );

    match cfg.storage.state_file.as_deref() {
        Some(path) => run_persistent(&cfg, engine_config, path).await,
        None => run_rounds(&cfg, engine_config).await,
    }
}

/// Independent rounds, each on a fresh repository, printed as they finish.
async fn run_rounds(cfg: &config::AppConfig, engine_config: Arc<Configuration>) -> Result<()> {
    let simulator = Simulator::new(engine_config, cfg.stock_policy(), cfg.simulation.seed);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    for round in 0..cfg.simulation.rounds {
        let engine = simulator.engine_for_round(round);
        tokio::select! {
            report = simulation::run(&engine, cfg.simulation.draws_per_round) => {
                let report = report.context("Simulation round failed")?;
                println!("round #{}\n{report}\n", round + 1);
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!("Simulation finished.");
    Ok(())
}

/// One round against a repository restored from (and saved back to) disk.
async fn run_persistent(
    cfg: &config::AppConfig,
    engine_config: Arc<Configuration>,
    path: &str,
) -> Result<()> {
    let repo = storage::load_repository(engine_config.clone(), cfg.stock_policy(), Some(path))?;
    let draws = repo.len()?;
    info!(draws, "Repository ready");

    let mut engine = Engine::new(engine_config, repo);
    if let Some(seed) = cfg.simulation.seed {
        engine = engine.with_random_source(SeededSource::new(seed));
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tokio::select! {
        report = simulation::run(&engine, cfg.simulation.draws_per_round) => {
            let report = report.context("Simulation failed")?;
            println!("{report}\n");
        }
        _ = &mut shutdown => {
            warn!("Shutdown signal received, saving partial history.");
        }
    }

    let snapshot = storage::save_repository(engine.repository(), Some(path))?;
    info!(path, draws = snapshot.history.len(), "State saved. Shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gacha=info"));

    let json_logging = std::env::var("GACHA_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
