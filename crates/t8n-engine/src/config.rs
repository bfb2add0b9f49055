//! Engine configuration and chain parameters

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use t8n_primitives::{serde_hex, Address, H256, H64, U256};
use t8n_tool::{RewardTable, NO_PROOF};
use t8n_types::PostState;

use crate::error::{EngineError, EngineResult};

/// Engine configuration, usually read from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path of the state-transition tool binary
    pub tool_path: PathBuf,
    /// Where per-block tool files are written, system temp dir if unset
    pub work_dir: Option<PathBuf>,
    /// Maximum number of calls per session, unlimited if unset or zero
    pub call_limit: Option<u64>,
    /// Per-fork reward overrides in wei (hex or decimal)
    pub rewards: BTreeMap<String, String>,
}

impl EngineConfig {
    /// Parse from TOML text
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Load from a TOML file
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        tracing::info!("Loading engine config from {:?}", path);
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Reward table with the configured overrides applied
    pub fn reward_table(&self) -> EngineResult<RewardTable> {
        RewardTable::with_overrides(&self.rewards).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Effective call budget, `0` meaning unlimited
    pub fn call_limit(&self) -> u64 {
        self.call_limit.unwrap_or(0)
    }
}

/// Chain parameters passed to `setChainParams`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainParams {
    /// Seal engine; `NoProof` makes the tool apply block rewards
    #[serde(default = "default_seal_engine")]
    pub seal_engine: String,
    /// Fork rules
    pub params: ForkParams,
    /// Genesis header values
    pub genesis: GenesisParams,
    /// Genesis allocation
    #[serde(default)]
    pub accounts: PostState,
}

fn default_seal_engine() -> String {
    NO_PROOF.to_string()
}

/// The `params` section of chain parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkParams {
    /// Fork name handed to the tool as `--state.fork`
    pub fork: String,
}

/// The `genesis` section of chain parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisParams {
    /// Genesis author
    pub author: Address,
    /// Genesis difficulty
    #[serde(with = "serde_hex::quantity")]
    pub difficulty: U256,
    /// Genesis gas limit
    #[serde(with = "serde_hex::quantity")]
    pub gas_limit: U256,
    /// Genesis extra data
    #[serde(default, with = "serde_hex::bytes")]
    pub extra_data: Vec<u8>,
    /// Genesis timestamp
    #[serde(default, with = "serde_hex::quantity_u64")]
    pub timestamp: u64,
    /// Genesis nonce
    #[serde(default)]
    pub nonce: H64,
    /// Genesis mix hash
    #[serde(default)]
    pub mix_hash: H256,
}

impl ChainParams {
    /// Parse from the JSON object a test driver sends
    pub fn from_json(content: &str) -> EngineResult<Self> {
        serde_json::from_str(content).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Load from a JSON file
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        tracing::info!("Loading chain params from {:?}", path);
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Fork name
    pub fn fork(&self) -> &str {
        &self.params.fork
    }
}
