//! RPC-shaped block and transaction records.
//!
//! These are the objects a caller receives from `getBlockByNumber` and
//! `getBlockByHash`. Quantities render as even-length hex (`0x01`), the way
//! the reference clients answer.

use serde::{Deserialize, Serialize};
use t8n_primitives::{serde_hex, Address, H256, H64, U256};

use crate::block::{Bloom, Header};
use crate::transaction::{opt_address, Transaction};

/// Transaction record inside an RPC block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    /// Hash of the containing block
    pub block_hash: H256,
    /// Number of the containing block
    #[serde(with = "serde_hex::even_u64")]
    pub block_number: u64,
    /// Recovered sender
    pub from: Address,
    /// Gas limit
    #[serde(with = "serde_hex::even")]
    pub gas: U256,
    /// Gas price
    #[serde(with = "serde_hex::even")]
    pub gas_price: U256,
    /// Transaction hash
    pub hash: H256,
    /// Call data
    #[serde(with = "serde_hex::bytes")]
    pub input: Vec<u8>,
    /// Sender nonce
    #[serde(with = "serde_hex::even")]
    pub nonce: U256,
    /// Recipient, empty for contract creation
    #[serde(with = "opt_address")]
    pub to: Option<Address>,
    /// Position in the block
    #[serde(with = "serde_hex::even_u64")]
    pub transaction_index: u64,
    /// Value in wei
    #[serde(with = "serde_hex::even")]
    pub value: U256,
    /// Signature v
    #[serde(with = "serde_hex::even")]
    pub v: U256,
    /// Signature r
    #[serde(with = "serde_hex::even")]
    pub r: U256,
    /// Signature s
    #[serde(with = "serde_hex::even")]
    pub s: U256,
}

impl RpcTransaction {
    /// Expand a buffered transaction into its mined record
    pub fn new(tx: &Transaction, block_hash: H256, block_number: u64, index: u64) -> Self {
        Self {
            block_hash,
            block_number,
            from: tx.sender(),
            gas: tx.gas_limit,
            gas_price: tx.gas_price,
            hash: tx.hash(),
            input: tx.data.clone(),
            nonce: tx.nonce,
            to: tx.to,
            transaction_index: index,
            value: tx.value,
            v: tx.v,
            r: tx.r,
            s: tx.s,
        }
    }

    /// Rebuild the signed transaction this record was expanded from
    pub fn to_transaction(&self) -> Transaction {
        Transaction {
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas,
            to: self.to,
            value: self.value,
            data: self.input.clone(),
            v: self.v,
            r: self.r,
            s: self.s,
        }
    }
}

/// Full block as answered by `getBlockBy*` with full transaction objects
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    /// Block number
    #[serde(with = "serde_hex::even_u64")]
    pub number: u64,
    /// Block hash, recomputed from the header
    pub hash: H256,
    /// Parent hash
    pub parent_hash: H256,
    /// Uncle list hash
    pub sha3_uncles: H256,
    /// Block author
    pub miner: Address,
    /// State root
    pub state_root: H256,
    /// Transactions root
    pub transactions_root: H256,
    /// Receipts root
    pub receipts_root: H256,
    /// Logs bloom
    pub logs_bloom: Bloom,
    /// Difficulty
    #[serde(with = "serde_hex::even")]
    pub difficulty: U256,
    /// Gas limit
    #[serde(with = "serde_hex::even")]
    pub gas_limit: U256,
    /// Gas used
    #[serde(with = "serde_hex::even")]
    pub gas_used: U256,
    /// Timestamp
    #[serde(with = "serde_hex::even_u64")]
    pub timestamp: u64,
    /// Extra data
    #[serde(with = "serde_hex::bytes")]
    pub extra_data: Vec<u8>,
    /// Mix hash
    pub mix_hash: H256,
    /// Nonce
    pub nonce: H64,
    /// Encoded size, not tracked
    pub size: String,
    /// Full transaction records
    pub transactions: Vec<RpcTransaction>,
    /// Uncle hashes
    pub uncles: Vec<H256>,
}

impl RpcBlock {
    /// Assemble the response for `header`
    pub fn new(header: &Header, transactions: Vec<RpcTransaction>, uncles: &[Header]) -> Self {
        Self {
            number: header.number,
            hash: header.hash(),
            parent_hash: header.parent_hash,
            sha3_uncles: header.ommers_hash,
            miner: header.coinbase,
            state_root: header.state_root,
            transactions_root: header.transactions_root,
            receipts_root: header.receipts_root,
            logs_bloom: header.logs_bloom.clone(),
            difficulty: header.difficulty,
            gas_limit: header.gas_limit,
            gas_used: header.gas_used,
            timestamp: header.timestamp,
            extra_data: header.extra_data.clone(),
            mix_hash: header.mix_hash,
            nonce: header.nonce,
            size: "0x00".to_string(),
            transactions,
            uncles: uncles.iter().map(Header::hash).collect(),
        }
    }
}
