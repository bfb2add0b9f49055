//! CLI argument parsing for t8n-chain

use clap::Parser;
use std::path::PathBuf;

/// Chain engine driven by an external state-transition tool
#[derive(Parser, Debug, Clone)]
#[command(name = "t8n-chain")]
#[command(about = "Build a genesis with a t8n tool and replay raw blocks on top of it")]
#[command(version)]
pub struct Cli {
    /// Engine config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// State-transition tool binary, overrides the config file
    #[arg(long)]
    pub tool: Option<PathBuf>,

    /// Directory for per-block tool files, overrides the config file
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Chain params file (JSON, as passed to test_setChainParams)
    #[arg(long)]
    pub chain_params: PathBuf,

    /// File with one hex-encoded block per line
    #[arg(long)]
    pub blocks: Option<PathBuf>,

    /// Maximum number of engine calls (0 for unlimited)
    #[arg(long)]
    pub call_limit: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["t8n-chain", "--chain-params", "genesis.json"]);
        assert_eq!(cli.chain_params, PathBuf::from("genesis.json"));
        assert!(cli.config.is_none());
        assert!(cli.tool.is_none());
        assert!(cli.work_dir.is_none());
        assert!(cli.blocks.is_none());
        assert!(cli.call_limit.is_none());
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_cli_custom_values() {
        let cli = Cli::parse_from([
            "t8n-chain",
            "--config", "/etc/t8n/engine.toml",
            "--tool", "/usr/local/bin/evm-t8n",
            "--work-dir", "/tmp/t8n",
            "--chain-params", "/tests/genesis.json",
            "--blocks", "/tests/blocks.txt",
            "--call-limit", "500",
            "--log-level", "debug",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/t8n/engine.toml")));
        assert_eq!(cli.tool, Some(PathBuf::from("/usr/local/bin/evm-t8n")));
        assert_eq!(cli.work_dir, Some(PathBuf::from("/tmp/t8n")));
        assert_eq!(cli.chain_params, PathBuf::from("/tests/genesis.json"));
        assert_eq!(cli.blocks, Some(PathBuf::from("/tests/blocks.txt")));
        assert_eq!(cli.call_limit, Some(500));
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_cli_requires_chain_params() {
        assert!(Cli::try_parse_from(["t8n-chain"]).is_err());
    }
}
