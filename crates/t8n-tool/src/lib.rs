//! # t8n-tool
//!
//! The contract between the chain engine and an external state-transition
//! tool. The engine never executes transactions itself: for every block it
//! hands the tool a pre-state, a transaction list and a block environment,
//! and reads back roots, receipts and the post-state.
//!
//! [`ProcessTool`] runs a binary speaking the `t8n` file protocol; tests
//! substitute their own [`TransitionTool`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod process;
mod rewards;
pub mod types;

pub use error::{ToolError, ToolResult};
pub use process::ProcessTool;
pub use rewards::{RewardTable, NO_PROOF};
pub use types::{ExecutionResult, Ommer, RejectedTx, ToolEnv, ToolReceipt, ToolTransaction};

use t8n_primitives::U256;
use t8n_types::PostState;

/// Everything the tool needs for one block
#[derive(Clone, Debug)]
pub struct ToolRequest<'a> {
    /// Pre-state
    pub alloc: &'a PostState,
    /// Transactions in submission order
    pub txs: &'a [ToolTransaction],
    /// Block environment
    pub env: &'a ToolEnv,
    /// Fork name passed as `--state.fork`
    pub fork: &'a str,
    /// Block reward passed as `--state.reward`, if any
    pub reward: Option<U256>,
}

/// What the tool produced for one block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolOutput {
    /// Result file
    pub result: ExecutionResult,
    /// Post-state
    pub alloc: PostState,
}

/// A stateless state-transition function
pub trait TransitionTool: Send {
    /// Apply `request.txs` to `request.alloc` in block context `request.env`
    fn transition(&self, request: &ToolRequest<'_>) -> ToolResult<ToolOutput>;
}
