//! Shared fixtures: a deterministic in-process tool and chain builders

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use t8n_crypto::{keccak256, sign, PrivateKey};
use t8n_engine::{Block, ChainParams, EngineConfig, Session};
use t8n_primitives::{hex, Address, H256, U256};
use t8n_tool::{
    ExecutionResult, RejectedTx, ToolEnv, ToolError, ToolOutput, ToolReceipt, ToolRequest,
    ToolResult, TransitionTool,
};
use t8n_types::{
    encode_block, uncles_hash, Header, PostState, Transaction, EMPTY_OMMERS_HASH, EMPTY_TRIE_ROOT,
};

/// Private key of the funded test account
pub const SENDER_KEY: &str = "45a915e4d060149eb4365960e6a7a45f334393093061116b197e3240065ff2d8";

/// Address of the funded test account
pub const SENDER: &str = "0xa94f5374fce5edbc8e2a8697c15331677e6ebf0b";

/// Genesis author
pub const AUTHOR: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

/// Intrinsic gas of a plain transfer
pub const TRANSFER_GAS: u64 = 21_000;

/// Istanbul block reward
pub const REWARD: u128 = 2_000_000_000_000_000_000;

/// One recorded tool invocation
#[derive(Clone, Debug)]
pub struct Call {
    pub env: ToolEnv,
    pub reward: Option<U256>,
    pub fork: String,
    pub txs: usize,
    pub alloc: PostState,
}

/// What the fake tool does besides executing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Report a receipt for a transaction nobody sent
    PhantomReceipt,
    /// Exit non-zero
    Crash,
}

/// Deterministic stand-in for a t8n binary.
///
/// Credits the reward to the coinbase, moves `value` to the recipient,
/// charges a flat 21000 gas per transaction and rejects anything with a
/// lower gas limit. Roots are hashes of what it produced.
#[derive(Clone)]
pub struct FakeTool {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub mode: Mode,
}

impl FakeTool {
    pub fn new(mode: Mode) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            mode,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Call {
        self.calls().last().cloned().expect("tool was never called")
    }
}

/// Post-state the fake produces for a block without transactions
pub fn rewarded(pre: &PostState, coinbase: Address, reward: Option<U256>) -> PostState {
    let mut alloc = pre.clone();
    if let Some(reward) = reward {
        alloc.entry(coinbase).or_default().balance += reward;
    }
    alloc
}

/// State root the fake reports for `alloc`
pub fn state_root(alloc: &PostState) -> H256 {
    keccak256(&serde_json::to_vec(alloc).unwrap())
}

fn root_of(items: &[Vec<u8>]) -> H256 {
    if items.is_empty() {
        EMPTY_TRIE_ROOT
    } else {
        keccak256(&items.concat())
    }
}

impl TransitionTool for FakeTool {
    fn transition(&self, request: &ToolRequest<'_>) -> ToolResult<ToolOutput> {
        self.calls.lock().unwrap().push(Call {
            env: request.env.clone(),
            reward: request.reward,
            fork: request.fork.to_string(),
            txs: request.txs.len(),
            alloc: request.alloc.clone(),
        });

        if self.mode == Mode::Crash {
            return Err(ToolError::Exit {
                status: "exit status: 3".into(),
                stderr: "boom".into(),
            });
        }

        let mut alloc = rewarded(request.alloc, request.env.current_coinbase, request.reward);
        let mut receipts = Vec::new();
        let mut rejected = Vec::new();
        let mut cumulative = U256::zero();
        for (index, tx) in request.txs.iter().enumerate() {
            if tx.gas < U256::from(TRANSFER_GAS) {
                rejected.push(RejectedTx {
                    index: index as u64,
                    error: "intrinsic gas too low".into(),
                });
                continue;
            }
            if let Some(to) = tx.to {
                alloc.entry(to).or_default().balance += tx.value;
            }
            cumulative += U256::from(TRANSFER_GAS);
            receipts.push(ToolReceipt {
                transaction_hash: tx.hash,
                transaction_index: receipts.len() as u64,
                cumulative_gas_used: cumulative,
                logs_bloom: Default::default(),
            });
        }

        // genesis runs without a reward; the phantom only shows up in mined blocks
        if self.mode == Mode::PhantomReceipt && request.reward.is_some() {
            receipts.push(ToolReceipt {
                transaction_hash: H256::from_bytes([0xfa; 32]),
                transaction_index: receipts.len() as u64,
                cumulative_gas_used: cumulative,
                logs_bloom: Default::default(),
            });
        }

        let tx_items: Vec<Vec<u8>> = receipts
            .iter()
            .map(|r| r.transaction_hash.as_bytes().to_vec())
            .collect();
        let receipt_items: Vec<Vec<u8>> = receipts
            .iter()
            .map(|r| {
                let mut word = [0u8; 32];
                r.cumulative_gas_used.to_big_endian(&mut word);
                word.to_vec()
            })
            .collect();
        let logs_hash = if receipts.is_empty() {
            EMPTY_OMMERS_HASH
        } else {
            keccak256(&tx_items.concat())
        };

        Ok(ToolOutput {
            result: ExecutionResult {
                state_root: state_root(&alloc),
                tx_root: root_of(&tx_items),
                receipt_root: root_of(&receipt_items),
                logs_hash,
                receipts,
                rejected,
            },
            alloc,
        })
    }
}

/// Chain params: Istanbul, NoProof, one funded account with a storage slot
pub fn chain_params() -> ChainParams {
    ChainParams::from_json(&format!(
        r#"{{
            "sealEngine": "NoProof",
            "params": {{"fork": "Istanbul"}},
            "genesis": {{
                "author": "{AUTHOR}",
                "difficulty": "0x020000",
                "gasLimit": "0x2fefd8",
                "extraData": "0x00",
                "timestamp": "0x00"
            }},
            "accounts": {{
                "{SENDER}": {{
                    "balance": "0x0de0b6b3a7640000",
                    "nonce": "0x00",
                    "code": "0x",
                    "storage": {{}}
                }},
                "0x095e7baea6a6c7c4c2dfeb977efac326af552d87": {{
                    "balance": "0x0a",
                    "nonce": "0x01",
                    "code": "0x600160010160005500",
                    "storage": {{"0x00": "0x02", "0x01": "0x0100"}}
                }}
            }}
        }}"#
    ))
    .unwrap()
}

/// Session with genesis set, plus a handle on its tool
pub fn session_with(mode: Mode, config: &EngineConfig) -> (Session, FakeTool) {
    let tool = FakeTool::new(mode);
    let mut session = Session::new(Box::new(tool.clone()), config).unwrap();
    session.set_chain_params(chain_params()).unwrap();
    (session, tool)
}

pub fn session() -> (Session, FakeTool) {
    session_with(Mode::Normal, &EngineConfig::default())
}

pub fn address(s: &str) -> Address {
    Address::from_hex(s).unwrap()
}

/// Transfer from the funded account, signed pre-EIP-155
pub fn transfer(nonce: u64, to: Address, value: u64, gas: u64) -> Transaction {
    let key = PrivateKey::from_slice(&hex::parse_bytes(SENDER_KEY).unwrap()).unwrap();
    let mut tx = Transaction {
        nonce: U256::from(nonce),
        gas_price: U256::from(10),
        gas_limit: U256::from(gas),
        to: Some(to),
        value: U256::from(value),
        ..Default::default()
    };
    let sig = sign(&tx.signing_hash(), &key).unwrap();
    tx.v = U256::from(sig.v);
    tx.r = U256::from_big_endian(&sig.r);
    tx.s = U256::from_big_endian(&sig.s);
    tx
}

/// Hex of a mined block in wire form
pub fn encode(block: &Block) -> String {
    let txs: Vec<Transaction> = block.transactions.iter().map(|t| t.to_transaction()).collect();
    hex::bytes_to_hex(&encode_block(&block.header, &txs, &block.uncles))
}

/// Hex of a block assembled from parts
pub fn encode_parts(header: &Header, txs: &[Transaction], uncles: &[Header]) -> String {
    hex::bytes_to_hex(&encode_block(header, txs, uncles))
}

/// Empty child of `parent` whose roots match what the fake tool will report
pub fn child_header(parent: &Block, difficulty: u64, uncles: &[Header]) -> Header {
    let post = rewarded(
        &parent.post_state,
        parent.header.coinbase,
        Some(U256::from(REWARD)),
    );
    Header {
        parent_hash: parent.hash(),
        ommers_hash: uncles_hash(uncles),
        coinbase: parent.header.coinbase,
        state_root: state_root(&post),
        transactions_root: EMPTY_TRIE_ROOT,
        receipts_root: EMPTY_TRIE_ROOT,
        logs_bloom: Default::default(),
        difficulty: U256::from(difficulty),
        number: parent.number() + 1,
        gas_limit: parent.header.gas_limit,
        gas_used: U256::zero(),
        timestamp: parent.header.timestamp + 15,
        extra_data: parent.header.extra_data.clone(),
        mix_hash: H256::ZERO,
        nonce: Default::default(),
    }
}

/// Block at `number` on the current chain of `session`
pub fn block_at(session: &Session, number: u64) -> Arc<Block> {
    session.store().by_number(number).unwrap().unwrap()
}
