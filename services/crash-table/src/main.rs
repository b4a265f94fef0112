//! Crashline table.
//!
//! Usage:
//!   crashline-table play --wallet-file wallets.json
//!   crashline-table --config table.yaml simulate --rounds 100000 --target 2.0

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::info;

mod command;
mod config;
mod driver;
mod render;
mod simulate;
mod store;

use config::TableConfig;
use driver::Table;
use simulate::{simulate, SimulationParams};

#[derive(Parser, Debug)]
#[command(author, version, about = "Single-player crash betting table")]
struct Args {
    /// YAML table configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Seed for the crash point RNG.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Emit JSON lines instead of status text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Mode {
    /// Play interactively from stdin.
    Play {
        #[arg(long)]
        wallet_file: Option<PathBuf>,

        #[arg(long)]
        wallet_id: Option<String>,

        #[arg(long)]
        tick_ms: Option<u64>,
    },
    /// Play many rounds on a synthetic clock and report the house edge.
    Simulate {
        #[arg(long, default_value = "10000")]
        rounds: u64,

        /// Cash-out multiplier.
        #[arg(long, default_value = "2.0")]
        target: f64,

        #[arg(long, default_value = "50")]
        step_ms: u64,
    },
}

/// Load the config file and apply CLI overrides.
fn build_config(args: &Args) -> Result<TableConfig> {
    let mut config = TableConfig::load(args.config.as_deref())?;
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if args.json {
        config.json = true;
    }
    if let Some(Mode::Play {
        wallet_file,
        wallet_id,
        tick_ms,
    }) = &args.command
    {
        if let Some(wallet_file) = wallet_file {
            config.wallet_file = Some(wallet_file.clone());
        }
        if let Some(wallet_id) = wallet_id {
            config.wallet_id = wallet_id.clone();
        }
        if let Some(tick_ms) = tick_ms {
            config.tick_ms = *tick_ms;
        }
    }
    config.validate().context("invalid table configuration")?;
    Ok(config)
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args)?;

    // Logs go to stderr; stdout carries the game transcript.
    tracing_subscriber::fmt()
        .with_max_level(config.level()?)
        .with_writer(std::io::stderr)
        .init();

    let rng = make_rng(config.seed);
    match args.command.clone().unwrap_or(Mode::Play {
        wallet_file: None,
        wallet_id: None,
        tick_ms: None,
    }) {
        Mode::Play { .. } => {
            info!(
                tick_ms = config.tick_ms,
                seeded = config.seed.is_some(),
                wallet_file = ?config.wallet_file,
                "starting table"
            );
            let store = store::open_store(config.wallet_file.as_deref());
            let mut table = Table::open(&config, rng, store)?;
            driver::run(
                &mut table,
                config.tick_ms,
                BufReader::new(tokio::io::stdin()),
                tokio::signal::ctrl_c(),
            )
            .await
        }
        Mode::Simulate {
            rounds,
            target,
            step_ms,
        } => {
            let params = SimulationParams {
                rounds,
                target,
                step_ms,
            };
            let report = simulate(&config.round, rng, &params)?;
            if config.json {
                println!(
                    "{}",
                    serde_json::to_string(&report).context("Failed to serialize report")?
                );
            } else {
                println!("{report}");
            }
            Ok(())
        }
    }
}
