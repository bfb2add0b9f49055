//! t8n-chain binary
//!
//! Builds a genesis through an external state-transition tool and replays a
//! file of raw blocks on top of it, printing the resulting chain as JSON.

mod cli;
mod replay;

use anyhow::{Context, Result};
use cli::Cli;
use t8n_engine::{ChainParams, EngineConfig, Session};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = engine_config(&cli)?;
    let params = load_chain_params(&cli.chain_params)?;

    let mut session = Session::from_config(&config)?;
    session.set_chain_params(params)?;
    tracing::info!(genesis = %session.store().genesis_hash()?, "Chain ready");

    let blocks = match &cli.blocks {
        Some(path) => replay::load_blocks(path)?,
        None => Vec::new(),
    };
    let report = replay::replay(&mut session, &blocks)?;
    tracing::info!(
        imported = report.imported.len(),
        failed = report.failed.len(),
        calls = session.calls(),
        "Replay finished"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Config file, if any, with command-line overrides applied
fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(tool) = &cli.tool {
        config.tool_path = tool.clone();
    }
    if let Some(dir) = &cli.work_dir {
        config.work_dir = Some(dir.clone());
    }
    if let Some(limit) = cli.call_limit {
        config.call_limit = Some(limit);
    }
    Ok(config)
}

/// Load chain params from file
fn load_chain_params(path: &std::path::Path) -> Result<ChainParams> {
    ChainParams::from_file(path).with_context(|| format!("chain params {}", path.display()))
}
