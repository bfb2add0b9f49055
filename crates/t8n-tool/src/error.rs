//! Error types for tool invocation

use std::path::PathBuf;

use thiserror::Error;

/// Tool invocation error
#[derive(Debug, Error)]
pub enum ToolError {
    /// IO error around the exchange files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Exchange file is not valid JSON for its shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The tool binary could not be started
    #[error("failed to start {path:?}: {source}")]
    Spawn {
        /// Tool path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The tool exited unsuccessfully
    #[error("tool exited with {status}: {stderr}")]
    Exit {
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// The tool did not write an expected output file
    #[error("missing tool output: {0:?}")]
    MissingOutput(PathBuf),

    /// No mining reward is known for the fork
    #[error("no mining reward configured for fork {0}")]
    UnknownFork(String),

    /// Reward override is not a quantity
    #[error("invalid reward for fork {fork}: {value}")]
    InvalidReward {
        /// Fork name
        fork: String,
        /// Rejected value
        value: String,
    },
}

/// Tool result type
pub type ToolResult<T> = Result<T, ToolError>;
