//! Block store: genesis plus a set of candidate chains

use std::collections::BTreeMap;
use std::sync::Arc;

use t8n_primitives::{hex, H256, U256};
use t8n_tool::RejectedTx;
use t8n_types::{Header, PostState, RpcBlock, RpcTransaction};

use crate::error::{EngineError, EngineResult};

/// Chain identifier, `0` is the chain the session starts on
pub type ChainId = u64;

/// Heights at or above this are treated as garbage input, not lookups
pub const MAX_BLOCK_REFERENCE: u64 = 10_000;

/// A mined block. Shared between chains that branched off a common prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// Finalized header
    pub header: Header,
    /// Full transaction records, in receipt order
    pub transactions: Vec<RpcTransaction>,
    /// Included uncle headers
    pub uncles: Vec<Header>,
    /// Allocation after executing the block
    pub post_state: PostState,
    /// Transactions the tool refused
    pub rejected: Vec<RejectedTx>,
    /// Aggregate logs hash reported by the tool
    pub logs_hash: H256,
}

impl Block {
    /// Block hash
    pub fn hash(&self) -> H256 {
        self.header.hash()
    }

    /// Block number
    pub fn number(&self) -> u64 {
        self.header.number
    }

    /// Block difficulty
    pub fn difficulty(&self) -> U256 {
        self.header.difficulty
    }

    /// Whether the tool refused any transaction of this block
    pub fn has_rejected(&self) -> bool {
        !self.rejected.is_empty()
    }

    /// RPC response for this block
    pub fn rpc(&self) -> RpcBlock {
        RpcBlock::new(&self.header, self.transactions.clone(), &self.uncles)
    }
}

/// Genesis plus every known chain, one of them current.
///
/// Chains are contiguous from height 1; block `n` of a chain sits at index `n - 1`.
#[derive(Debug, Clone)]
pub struct ChainStore {
    pub(crate) chains: BTreeMap<ChainId, Vec<Arc<Block>>>,
    pub(crate) current: ChainId,
    pub(crate) max_id: ChainId,
    genesis: Option<Arc<Block>>,
}

impl Default for ChainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainStore {
    /// Empty store with chain `0` current and no genesis
    pub fn new() -> Self {
        let mut chains = BTreeMap::new();
        chains.insert(0, Vec::new());
        Self {
            chains,
            current: 0,
            max_id: 0,
            genesis: None,
        }
    }

    /// Drop every chain and the genesis
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    // ========== Genesis ==========

    /// The genesis block
    pub fn genesis(&self) -> EngineResult<&Arc<Block>> {
        self.genesis
            .as_ref()
            .ok_or_else(|| EngineError::Internal("genesis is not set".into()))
    }

    /// Hash of the genesis block
    pub fn genesis_hash(&self) -> EngineResult<H256> {
        self.genesis().map(|g| g.hash())
    }

    pub(crate) fn set_genesis(&mut self, block: Block) {
        self.genesis = Some(Arc::new(block));
    }

    // ========== Chains ==========

    /// Id of the current chain
    pub fn current_id(&self) -> ChainId {
        self.current
    }

    /// Blocks of the current chain
    pub fn current_chain(&self) -> &[Arc<Block>] {
        self.chain(self.current).unwrap_or(&[])
    }

    /// Blocks of chain `id`
    pub fn chain(&self, id: ChainId) -> Option<&[Arc<Block>]> {
        self.chains.get(&id).map(Vec::as_slice)
    }

    /// Ids of every known chain, ascending
    pub fn chain_ids(&self) -> Vec<ChainId> {
        self.chains.keys().copied().collect()
    }

    /// Number of blocks on the current chain
    pub fn current_len(&self) -> u64 {
        self.current_chain().len() as u64
    }

    /// Last block of the current chain
    pub fn tip(&self) -> Option<&Arc<Block>> {
        self.current_chain().last()
    }

    /// Append to the current chain
    pub fn append(&mut self, block: Block) -> Arc<Block> {
        let block = Arc::new(block);
        self.chains
            .entry(self.current)
            .or_default()
            .push(Arc::clone(&block));
        block
    }

    /// Remove the last block of the current chain
    pub fn pop(&mut self) -> Option<Arc<Block>> {
        self.chains.get_mut(&self.current).and_then(Vec::pop)
    }

    /// Truncate the current chain to `height` blocks. `0` empties it.
    pub fn rewind(&mut self, height: u64) {
        let chain = self.chains.entry(self.current).or_default();
        if height == 0 {
            chain.clear();
        } else {
            chain.truncate(height as usize);
        }
    }

    /// Register a new chain holding `blocks` and make it current
    pub(crate) fn open_chain(&mut self, blocks: Vec<Arc<Block>>) -> ChainId {
        self.max_id += 1;
        self.chains.insert(self.max_id, blocks);
        self.current = self.max_id;
        self.max_id
    }

    // ========== Lookup ==========

    /// Find a block by hash in any chain, genesis included
    pub fn find_by_hash(&self, hash: &H256) -> Option<Arc<Block>> {
        if let Some(genesis) = &self.genesis {
            if genesis.hash() == *hash {
                return Some(Arc::clone(genesis));
            }
        }
        self.chains
            .values()
            .flat_map(|chain| chain.iter())
            .find(|block| block.hash() == *hash)
            .cloned()
    }

    /// Block at `number` on the current chain, `0` being genesis
    pub fn by_number(&self, number: u64) -> EngineResult<Option<Arc<Block>>> {
        if number == 0 {
            return self.genesis().map(|g| Some(Arc::clone(g)));
        }
        Ok(self.current_chain().get(number as usize - 1).cloned())
    }

    /// Resolve a block reference: a 32-byte hash, `latest`, or a height
    pub fn lookup(&self, reference: &str) -> EngineResult<Arc<Block>> {
        if hex::is_hash32(reference) {
            let hash = H256::from_hex(reference)
                .map_err(|e| EngineError::MalformedInput(e.to_string()))?;
            return self
                .find_by_hash(&hash)
                .ok_or_else(|| EngineError::NotFound(format!("block {}", reference)));
        }

        let number = if reference == "latest" {
            self.current_len()
        } else {
            hex::parse_u64(reference).map_err(|e| match e {
                hex::QuantityError::Overflow(_) => EngineError::Internal(format!(
                    "block reference {} exceeds sanity bound {}",
                    reference, MAX_BLOCK_REFERENCE
                )),
                e => EngineError::MalformedInput(e.to_string()),
            })?
        };
        if number >= MAX_BLOCK_REFERENCE {
            return Err(EngineError::Internal(format!(
                "block reference {} exceeds sanity bound {}",
                reference, MAX_BLOCK_REFERENCE
            )));
        }
        self.by_number(number)?
            .ok_or_else(|| EngineError::NotFound(format!("block {}", reference)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use t8n_primitives::Address;

    /// Block with a distinct hash for `(parent, number, difficulty)`
    pub(crate) fn block(parent: H256, number: u64, difficulty: u64) -> Block {
        Block {
            header: Header {
                parent_hash: parent,
                coinbase: Address::from_bytes([0xaa; 20]),
                difficulty: U256::from(difficulty),
                number,
                gas_limit: U256::from(0x2fefd8),
                ..Default::default()
            },
            transactions: vec![],
            uncles: vec![],
            post_state: PostState::new(),
            rejected: vec![],
            logs_hash: H256::ZERO,
        }
    }

    /// Store with genesis and `len` blocks on chain 0
    pub(crate) fn store_with_chain(len: u64, difficulty: u64) -> ChainStore {
        let mut store = ChainStore::new();
        store.set_genesis(block(H256::ZERO, 0, 0x20000));
        let mut parent = store.genesis_hash().unwrap();
        for n in 1..=len {
            parent = store.append(block(parent, n, difficulty)).hash();
        }
        store
    }

    // ==================== Chain bookkeeping ====================

    #[test]
    fn test_new_store_has_empty_default_chain() {
        let store = ChainStore::new();
        assert_eq!(store.current_id(), 0);
        assert!(store.current_chain().is_empty());
        assert!(store.tip().is_none());
        assert!(matches!(store.genesis(), Err(EngineError::Internal(_))));
    }

    #[test]
    fn test_append_and_pop() {
        let mut store = store_with_chain(2, 1);
        assert_eq!(store.current_len(), 2);
        assert_eq!(store.tip().unwrap().number(), 2);
        assert_eq!(store.pop().unwrap().number(), 2);
        assert_eq!(store.current_len(), 1);
    }

    #[test]
    fn test_rewind() {
        let mut store = store_with_chain(5, 1);
        store.rewind(3);
        assert_eq!(store.current_len(), 3);
        store.rewind(7);
        assert_eq!(store.current_len(), 3);
        store.rewind(0);
        assert_eq!(store.current_len(), 0);
        assert!(store.genesis().is_ok());
    }

    #[test]
    fn test_clear_drops_genesis() {
        let mut store = store_with_chain(1, 1);
        store.clear();
        assert!(store.genesis().is_err());
        assert_eq!(store.chain_ids(), vec![0]);
    }

    // ==================== Lookup ====================

    #[test]
    fn test_lookup_by_number() {
        let store = store_with_chain(3, 1);
        assert_eq!(store.lookup("0x00").unwrap().number(), 0);
        assert_eq!(store.lookup("0x01").unwrap().number(), 1);
        assert_eq!(store.lookup("3").unwrap().number(), 3);
        assert_eq!(store.lookup("latest").unwrap().number(), 3);
        assert!(matches!(store.lookup("0x04"), Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_lookup_latest_on_empty_chain_is_genesis() {
        let store = store_with_chain(0, 1);
        assert_eq!(store.lookup("latest").unwrap().number(), 0);
    }

    #[test]
    fn test_lookup_sanity_bound() {
        let store = store_with_chain(1, 1);
        assert!(matches!(store.lookup("10000"), Err(EngineError::Internal(_))));
        assert!(matches!(store.lookup("0x2710"), Err(EngineError::Internal(_))));
        assert!(matches!(store.lookup("9999"), Err(EngineError::NotFound(_))));
        assert!(matches!(
            store.lookup("0xffffffffffffffffff"),
            Err(EngineError::Internal(_))
        ));
    }

    #[test]
    fn test_lookup_garbage() {
        let store = store_with_chain(1, 1);
        assert!(matches!(store.lookup("0xzz"), Err(EngineError::MalformedInput(_))));
    }

    #[test]
    fn test_lookup_by_hash_in_any_chain() {
        let mut store = store_with_chain(2, 1);
        let genesis = store.genesis_hash().unwrap();
        let side = store.append_on_new_chain(block(genesis, 1, 99));

        store.current = 0;
        assert_eq!(store.lookup(&side.to_hex()).unwrap().difficulty(), U256::from(99));
        assert_eq!(store.lookup(&genesis.to_hex()).unwrap().number(), 0);
        assert!(matches!(
            store.lookup(&H256::from_bytes([0xee; 32]).to_hex()),
            Err(EngineError::NotFound(_))
        ));
    }

    impl ChainStore {
        fn append_on_new_chain(&mut self, block: Block) -> H256 {
            self.open_chain(vec![]);
            self.append(block).hash()
        }
    }
}
