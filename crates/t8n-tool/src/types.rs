//! JSON shapes exchanged with the tool.
//!
//! Input: `env.json` ([`ToolEnv`]), `txs.json` (list of [`ToolTransaction`]),
//! `alloc.json` ([`PostState`](t8n_types::PostState)).
//! Output: the result file ([`ExecutionResult`]) and the post-state alloc.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use t8n_primitives::{serde_hex, Address, H256, U256};
use t8n_types::{Bloom, Transaction};

/// Block context for one transition
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolEnv {
    /// Block author
    pub current_coinbase: Address,
    /// Block difficulty
    #[serde(with = "serde_hex::quantity")]
    pub current_difficulty: U256,
    /// Block gas limit
    #[serde(with = "serde_hex::quantity")]
    pub current_gas_limit: U256,
    /// Block number
    #[serde(with = "serde_hex::quantity_u64")]
    pub current_number: u64,
    /// Block timestamp
    #[serde(with = "serde_hex::quantity_u64")]
    pub current_timestamp: u64,
    /// Parent hash
    pub previous_hash: H256,
    /// Ancestor hashes by height, genesis at `0`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub block_hashes: BTreeMap<u64, H256>,
    /// Uncles to reward
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ommers: Vec<Ommer>,
}

/// Uncle reward entry: author and height distance from the including block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ommer {
    /// Including block number minus uncle number
    pub delta: u64,
    /// Uncle author
    pub address: Address,
}

/// Transaction as the tool reads it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolTransaction {
    /// Call data
    #[serde(with = "serde_hex::bytes")]
    pub input: Vec<u8>,
    /// Gas limit
    #[serde(with = "serde_hex::quantity")]
    pub gas: U256,
    /// Gas price
    #[serde(with = "serde_hex::quantity")]
    pub gas_price: U256,
    /// Sender nonce
    #[serde(with = "serde_hex::quantity")]
    pub nonce: U256,
    /// Recipient, omitted for contract creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Value in wei
    #[serde(with = "serde_hex::quantity")]
    pub value: U256,
    /// Signature v
    #[serde(with = "serde_hex::quantity")]
    pub v: U256,
    /// Signature r
    #[serde(with = "serde_hex::quantity")]
    pub r: U256,
    /// Signature s
    #[serde(with = "serde_hex::quantity")]
    pub s: U256,
    /// Transaction hash, echoed back in receipts
    pub hash: H256,
}

impl From<&Transaction> for ToolTransaction {
    fn from(tx: &Transaction) -> Self {
        Self {
            input: tx.data.clone(),
            gas: tx.gas_limit,
            gas_price: tx.gas_price,
            nonce: tx.nonce,
            to: tx.to,
            value: tx.value,
            v: tx.v,
            r: tx.r,
            s: tx.s,
            hash: tx.hash(),
        }
    }
}

/// Receipt fields the engine consumes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolReceipt {
    /// Hash of the executed transaction
    pub transaction_hash: H256,
    /// Position in the block
    #[serde(default, with = "serde_hex::quantity_u64")]
    pub transaction_index: u64,
    /// Gas used up to and including this transaction
    #[serde(with = "serde_hex::quantity")]
    pub cumulative_gas_used: U256,
    /// Bloom of this transaction's logs
    #[serde(default)]
    pub logs_bloom: Bloom,
}

/// Transaction the tool refused to execute
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedTx {
    /// Index into the submitted transaction list
    pub index: u64,
    /// Reason given by the tool
    #[serde(default)]
    pub error: String,
}

/// The tool's result file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Post-state root
    pub state_root: H256,
    /// Transactions root
    pub tx_root: H256,
    /// Receipts root
    #[serde(alias = "receiptsRoot")]
    pub receipt_root: H256,
    /// Aggregate logs hash
    #[serde(default)]
    pub logs_hash: H256,
    /// One receipt per executed transaction
    #[serde(default)]
    pub receipts: Vec<ToolReceipt>,
    /// Refused transactions
    #[serde(default)]
    pub rejected: Vec<RejectedTx>,
}

impl ExecutionResult {
    /// Cumulative gas of the last receipt, zero without receipts
    pub fn gas_used(&self) -> U256 {
        self.receipts
            .last()
            .map(|r| r.cumulative_gas_used)
            .unwrap_or_default()
    }

    /// Bloom of the last receipt, all-zero without receipts
    pub fn logs_bloom(&self) -> Bloom {
        self.receipts
            .last()
            .map(|r| r.logs_bloom.clone())
            .unwrap_or_default()
    }
}
