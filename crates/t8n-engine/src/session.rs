//! The RPC-shaped call surface a test driver talks to

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use t8n_primitives::{hex, Address, H256, U256};
use t8n_tool::{ProcessTool, RewardTable, TransitionTool};
use t8n_types::{Header, RpcBlock, Transaction, EMPTY_OMMERS_HASH, EMPTY_TRIE_ROOT};

use crate::accumulator::HeaderAccumulator;
use crate::config::{ChainParams, EngineConfig};
use crate::error::{EngineError, EngineResult};
use crate::store::{Block, ChainId, ChainStore};

/// Response of `debug_accountRange`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRange {
    /// Enumeration index to address
    pub address_map: BTreeMap<String, Address>,
    /// Always zero, the whole range is returned at once
    pub next_key: H256,
}

/// One storage slot in a `debug_storageRangeAt` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageSlot {
    /// Slot key, even-length hex
    pub key: String,
    /// Slot value, even-length hex
    pub value: String,
}

/// Response of `debug_storageRangeAt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageRange {
    /// Whether the account exists
    pub complete: bool,
    /// Enumeration index to slot
    pub storage: BTreeMap<String, StorageSlot>,
}

/// One engine instance impersonating an execution client.
///
/// Every public method counts against the optional call budget and runs to
/// completion before returning; the only blocking step is the tool call.
pub struct Session {
    pub(crate) tool: Box<dyn TransitionTool>,
    pub(crate) rewards: RewardTable,
    pub(crate) params: Option<ChainParams>,
    pub(crate) store: ChainStore,
    pub(crate) header: HeaderAccumulator,
    pub(crate) pending: Vec<Transaction>,
    call_limit: u64,
    calls: u64,
    pub(crate) last_error: Option<String>,
}

impl Session {
    /// Create a session driving `tool`
    pub fn new(tool: Box<dyn TransitionTool>, config: &EngineConfig) -> EngineResult<Self> {
        Ok(Self {
            tool,
            rewards: config.reward_table()?,
            params: None,
            store: ChainStore::new(),
            header: HeaderAccumulator::default(),
            pending: Vec::new(),
            call_limit: config.call_limit(),
            calls: 0,
            last_error: None,
        })
    }

    /// Create a session running the tool binary named in `config`
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        if config.tool_path.as_os_str().is_empty() {
            return Err(EngineError::Config("tool_path is not set".into()));
        }
        let mut tool = ProcessTool::new(&config.tool_path);
        if let Some(dir) = &config.work_dir {
            tool = tool.with_work_dir(dir);
        }
        tracing::info!("Using state-transition tool {:?}", config.tool_path);
        Self::new(Box::new(tool), config)
    }

    // ========== Accessors ==========

    /// Block store
    pub fn store(&self) -> &ChainStore {
        &self.store
    }

    /// Header fields of the next block
    pub fn header(&self) -> &HeaderAccumulator {
        &self.header
    }

    /// Transactions waiting for the next block
    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    /// Chain parameters, once set
    pub fn chain_params(&self) -> EngineResult<&ChainParams> {
        self.params
            .as_ref()
            .ok_or_else(|| EngineError::Internal("chain params are not set".into()))
    }

    /// Reason the last raw import returned no hash
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Calls made so far
    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub(crate) fn rpc_call(&mut self, method: &str) -> EngineResult<()> {
        self.calls += 1;
        if self.call_limit != 0 && self.calls > self.call_limit {
            tracing::error!("Call limit {} exceeded at {}", self.call_limit, method);
            return Err(EngineError::CallLimitExceeded(self.call_limit));
        }
        tracing::debug!("Request: {}", method);
        Ok(())
    }

    // ========== eth_* ==========

    /// Buffer a transaction for the next block
    pub fn send_transaction(&mut self, tx: Transaction) -> EngineResult<H256> {
        self.rpc_call("eth_sendRawTransaction")?;
        Ok(self.buffer_transaction(tx))
    }

    /// Buffer an RLP-encoded signed transaction given as hex
    pub fn send_raw_transaction(&mut self, raw: &str) -> EngineResult<H256> {
        self.rpc_call("eth_sendRawTransaction")?;
        let bytes =
            hex::parse_bytes(raw).map_err(|e| EngineError::MalformedInput(e.to_string()))?;
        let tx: Transaction = t8n_rlp::decode(&bytes)
            .map_err(|e| EngineError::MalformedInput(format!("transaction rlp: {}", e)))?;
        Ok(self.buffer_transaction(tx))
    }

    pub(crate) fn buffer_transaction(&mut self, tx: Transaction) -> H256 {
        let hash = tx.hash();
        tracing::trace!(hash = %hash, nonce = %tx.nonce, "Buffered transaction");
        self.pending.push(tx);
        hash
    }

    /// Height of the current tip, `0x00` on an empty chain
    pub fn block_number(&mut self) -> EngineResult<String> {
        self.rpc_call("eth_blockNumber")?;
        let number = hex::u64_to_even_hex(self.store.current_len());
        tracing::debug!("Response: eth_blockNumber {{{}}}", number);
        Ok(number)
    }

    /// Block with `hash` in any chain
    pub fn get_block_by_hash(
        &mut self,
        hash: &H256,
        _full_objects: bool,
    ) -> EngineResult<Option<RpcBlock>> {
        self.rpc_call("eth_getBlockByHash")?;
        Ok(self.store.find_by_hash(hash).map(|block| block.rpc()))
    }

    /// Block at `number` on the current chain, `0` being genesis
    pub fn get_block_by_number(
        &mut self,
        number: u64,
        _full_objects: bool,
    ) -> EngineResult<Option<RpcBlock>> {
        self.rpc_call("eth_getBlockByNumber")?;
        Ok(self.store.by_number(number)?.map(|block| block.rpc()))
    }

    /// Nonce of `address` after block `block`, `0` if absent
    pub fn get_transaction_count(&mut self, address: &Address, block: &str) -> EngineResult<u64> {
        self.rpc_call("eth_getTransactionCount")?;
        let block = self.store.lookup(block)?;
        Ok(block.post_state.get(address).map(|a| a.nonce).unwrap_or(0))
    }

    /// Code of `address` after block `block`, `0x` if absent
    pub fn get_code(&mut self, address: &Address, block: &str) -> EngineResult<String> {
        self.rpc_call("eth_getCode")?;
        let block = self.store.lookup(block)?;
        Ok(block
            .post_state
            .get(address)
            .map(|a| hex::bytes_to_hex(&a.code))
            .unwrap_or_else(|| "0x".to_string()))
    }

    /// Balance of `address` after block `block`, `0x` if absent
    pub fn get_balance(&mut self, address: &Address, block: &str) -> EngineResult<String> {
        self.rpc_call("eth_getBalance")?;
        let block = self.store.lookup(block)?;
        Ok(block
            .post_state
            .get(address)
            .map(|a| hex::to_compact_hex(a.balance))
            .unwrap_or_else(|| "0x".to_string()))
    }

    // ========== debug_* ==========

    /// First `max_results` accounts of the post-state at `block`, in address order
    pub fn debug_account_range(
        &mut self,
        block: &str,
        max_results: usize,
    ) -> EngineResult<AccountRange> {
        self.rpc_call("debug_accountRange")?;
        let block = self.store.lookup(block)?;
        let address_map = block
            .post_state
            .keys()
            .take(max_results)
            .enumerate()
            .map(|(i, address)| (i.to_string(), *address))
            .collect();
        Ok(AccountRange {
            address_map,
            next_key: H256::ZERO,
        })
    }

    /// First `max_results` storage slots of `address` at `block`
    pub fn debug_storage_range_at(
        &mut self,
        block: &str,
        address: &Address,
        max_results: usize,
    ) -> EngineResult<StorageRange> {
        self.rpc_call("debug_storageRangeAt")?;
        let block = self.store.lookup(block)?;
        let Some(account) = block.post_state.get(address) else {
            return Ok(StorageRange {
                complete: false,
                storage: BTreeMap::new(),
            });
        };
        let storage = account
            .storage
            .iter()
            .take(max_results)
            .enumerate()
            .map(|(i, (key, value))| {
                let slot = StorageSlot {
                    key: hex::to_even_hex(*key),
                    value: hex::to_even_hex(*value),
                };
                (i.to_string(), slot)
            })
            .collect();
        Ok(StorageRange {
            complete: true,
            storage,
        })
    }

    // ========== test_* ==========

    /// Reset everything and build the genesis block for `params`
    pub fn set_chain_params(&mut self, params: ChainParams) -> EngineResult<()> {
        self.rpc_call("test_setChainParams")?;
        self.store.clear();
        self.pending.clear();
        self.last_error = None;

        let genesis = params.genesis.clone();
        self.header = HeaderAccumulator {
            coinbase: genesis.author,
            difficulty: genesis.difficulty,
            gas_limit: genesis.gas_limit,
            extra_data: genesis.extra_data.clone(),
            timestamp: genesis.timestamp,
            is_mining_genesis: true,
            ..Default::default()
        };
        self.params = Some(params);

        let mined = self.mine_one_block()?;
        self.header.is_mining_genesis = false;
        if self.store.current_len() != 1 {
            return Err(EngineError::Internal(
                "genesis pass must mine exactly one block".into(),
            ));
        }
        self.store.pop();

        let mined = Arc::try_unwrap(mined).unwrap_or_else(|shared| (*shared).clone());
        let header = Header {
            parent_hash: H256::ZERO,
            ommers_hash: EMPTY_OMMERS_HASH,
            coinbase: genesis.author,
            state_root: mined.header.state_root,
            transactions_root: EMPTY_TRIE_ROOT,
            receipts_root: EMPTY_TRIE_ROOT,
            logs_bloom: Default::default(),
            difficulty: genesis.difficulty,
            number: 0,
            gas_limit: genesis.gas_limit,
            gas_used: U256::zero(),
            timestamp: genesis.timestamp,
            extra_data: genesis.extra_data,
            mix_hash: genesis.mix_hash,
            nonce: genesis.nonce,
        };
        let block = Block {
            header,
            transactions: Vec::new(),
            uncles: Vec::new(),
            post_state: mined.post_state,
            rejected: Vec::new(),
            logs_hash: mined.logs_hash,
        };
        tracing::info!(hash = %block.hash(), state_root = %block.header.state_root, "Genesis set");
        self.store.set_genesis(block);
        Ok(())
    }

    /// Truncate the current chain to `height` blocks
    pub fn rewind_to_block(&mut self, height: u64) -> EngineResult<()> {
        self.rpc_call("test_rewindToBlock")?;
        if height > self.store.current_len() {
            return Err(EngineError::NotFound(format!(
                "cannot rewind to {} on a chain of {} blocks",
                height,
                self.store.current_len()
            )));
        }
        self.store.rewind(height);
        self.header.reset();

        let tail = match self.store.tip() {
            Some(tip) => Arc::clone(tip),
            None => Arc::clone(self.store.genesis()?),
        };
        self.header.inherit(&tail.header);
        self.header.parent_hash = if height == 0 { H256::ZERO } else { tail.hash() };
        tracing::debug!(height, chain = self.store.current_id(), "Rewound");
        Ok(())
    }

    /// Override the timestamp of the next block
    pub fn modify_timestamp(&mut self, timestamp: u64) -> EngineResult<()> {
        self.rpc_call("test_modifyTimestamp")?;
        self.header.timestamp = timestamp;
        Ok(())
    }

    /// Mine the pending transactions. Only `count == 1` is supported.
    pub fn mine_blocks(&mut self, count: u64) -> EngineResult<String> {
        self.rpc_call("test_mineBlocks")?;
        if count != 1 {
            return Err(EngineError::Internal(format!(
                "test_mineBlocks must mine exactly 1 block, asked for {}",
                count
            )));
        }
        self.mine_one_block()?;
        let len = self.store.current_len().to_string();
        tracing::debug!("Response test_mineBlocks {{{}}}", len);
        Ok(len)
    }

    /// Logs hash of the current-chain block that includes `tx_hash`
    pub fn get_log_hash(&mut self, tx_hash: &H256) -> EngineResult<H256> {
        self.rpc_call("test_getLogHash")?;
        let found = self
            .store
            .current_chain()
            .iter()
            .find(|block| block.transactions.iter().any(|tx| tx.hash == *tx_hash))
            .map(|block| block.logs_hash);
        Ok(found.unwrap_or_else(|| {
            tracing::warn!("test_getLogHash: transaction {} not found", tx_hash);
            EMPTY_OMMERS_HASH
        }))
    }

    /// Run fork choice over every known chain
    pub fn select_current_chain_by_total_difficulty(&mut self) -> ChainId {
        self.store.select_current_chain_by_total_difficulty()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("current_chain", &self.store.current_id())
            .field("chain_len", &self.store.current_len())
            .field("pending", &self.pending.len())
            .field("calls", &self.calls)
            .finish()
    }
}
