//! Replaying a block file through a session

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use t8n_engine::Session;
use t8n_primitives::H256;

/// A block the engine refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    /// 1-based line in the block file
    pub line: usize,
    /// Reason reported by the engine
    pub error: String,
}

/// Outcome of a replay, printed as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    /// Genesis hash
    pub genesis: H256,
    /// Height of the canonical chain after the replay
    pub block_number: String,
    /// Hash of the canonical tip, genesis on an empty chain
    pub tip: H256,
    /// Hashes of accepted blocks, in file order
    pub imported: Vec<H256>,
    /// Refused blocks
    pub failed: Vec<ImportFailure>,
}

/// Read hex blocks from `path`, one per line. Blank lines and `#` comments are skipped.
pub fn load_blocks(path: &Path) -> Result<Vec<(usize, String)>> {
    tracing::info!("Loading blocks from {:?}", path);
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading block file {}", path.display()))?;
    Ok(content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| (n, line.to_string()))
        .collect())
}

/// Import every block in order. Refused blocks are collected; fatal engine errors abort.
pub fn replay(session: &mut Session, blocks: &[(usize, String)]) -> Result<ReplayReport> {
    let mut imported = Vec::new();
    let mut failed = Vec::new();

    for (line, raw) in blocks {
        let result = session
            .import_raw_block(raw)
            .with_context(|| format!("importing block on line {}", line))?;
        match result {
            Some(hash) => {
                tracing::info!(line, hash = %hash, "Imported block");
                imported.push(hash);
            }
            None => {
                let error = session.last_error().unwrap_or("unknown error").to_string();
                tracing::warn!(line, "Block refused: {}", error);
                failed.push(ImportFailure { line: *line, error });
            }
        }
    }

    let genesis = session.store().genesis_hash()?;
    let tip = session.store().tip().map(|b| b.hash()).unwrap_or(genesis);
    Ok(ReplayReport {
        genesis,
        block_number: session.block_number()?,
        tip,
        imported,
        failed,
    })
}
