//! Raw block import: decode, replay through the miner, verify, roll back on failure

use t8n_primitives::{hex, H256};
use t8n_types::{codec::decode_block, DecodedBlock, Header};

use crate::error::{EngineError, EngineResult};
use crate::session::Session;
use crate::store::{Block, MAX_BLOCK_REFERENCE};

impl Session {
    /// Import a hex-encoded block.
    ///
    /// Returns the block hash on success and `None` when the block is
    /// malformed or fails validation; the reason is kept in
    /// [`last_error`](Session::last_error). Tool failures and internal
    /// inconsistencies are returned as errors.
    pub fn import_raw_block(&mut self, raw: &str) -> EngineResult<Option<H256>> {
        self.rpc_call("test_importRawBlock")?;
        // fork choice compares against the chain that was current before the import
        let previous = self.store.current_id();
        let result = self.try_import(raw);
        self.store.current = previous;

        match result {
            Ok(hash) => {
                self.store.select_current_chain_by_total_difficulty();
                self.last_error = None;
                tracing::debug!("Response test_importRawBlock: {}", hash);
                Ok(Some(hash))
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Import raw block failed: {}", e);
                self.pending.clear();
                self.header.reset();
                self.store.select_current_chain_by_total_difficulty();
                self.last_error = Some(format!("Import raw block failed: {}", e));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn try_import(&mut self, raw: &str) -> EngineResult<H256> {
        let bytes =
            hex::parse_bytes(raw).map_err(|e| EngineError::MalformedInput(e.to_string()))?;
        let block = decode_block(&bytes)?;
        let parent = block.header.parent_hash;

        tracing::debug!(
            number = block.header.number,
            chain_len = self.store.current_len(),
            parent = %parent,
            "Attempt to import"
        );
        self.store.attach_to_parent(&parent)?;

        self.header.import(&block.header);
        self.pending.clear();
        for tx in &block.transactions {
            self.buffer_transaction(tx.clone());
        }
        for uncle in &block.uncles {
            self.accept_uncle(uncle, &parent)?;
        }

        let mined = self.mine_one_block()?;
        if let Err(e) = self.verify_import(&mined, &block) {
            self.store.pop();
            return Err(e);
        }

        Ok(block.raw_hash)
    }

    /// Queue `uncle` for the block being imported, whose parent is `parent`
    fn accept_uncle(&mut self, uncle: &Header, parent: &H256) -> EngineResult<()> {
        let hash = uncle.hash();
        if uncle.parent_hash == *parent {
            return Err(EngineError::Validation(format!(
                "uncle {} is a sibling of the imported block",
                hash
            )));
        }

        let chain = self.store.current_chain();
        let known_ancestor = self.store.genesis_hash()? == uncle.parent_hash
            || chain.iter().any(|b| b.hash() == uncle.parent_hash);
        if !known_ancestor {
            return Err(EngineError::Validation(format!(
                "uncle {} is derived from unknown block {}",
                hash, uncle.parent_hash
            )));
        }

        for block in chain {
            if block.hash() == hash {
                return Err(EngineError::Validation(format!(
                    "uncle {} is already a block of the chain",
                    hash
                )));
            }
            if block.uncles.iter().any(|u| u.hash() == hash) {
                return Err(EngineError::Validation(format!(
                    "uncle {} is already included in block {}",
                    hash,
                    block.number()
                )));
            }
        }

        if self.header.uncles.iter().any(|u| u.hash() == hash) {
            return Err(EngineError::Validation(format!(
                "uncle {} is attached twice",
                hash
            )));
        }

        self.header.uncles.push(uncle.clone());
        Ok(())
    }

    /// Checks on the replayed block; any failure rolls it back
    fn verify_import(&self, mined: &Block, decoded: &DecodedBlock) -> EngineResult<()> {
        if mined.has_rejected() {
            return Err(EngineError::Validation(
                "raw block transaction execution failed".into(),
            ));
        }

        let hash = mined.hash();
        if hash != decoded.raw_hash {
            return Err(EngineError::Validation(format!(
                "replayed hash {} differs from imported hash {}",
                hash, decoded.raw_hash
            )));
        }

        let number = decoded.header.number;
        if number >= MAX_BLOCK_REFERENCE {
            return Err(EngineError::Internal(format!(
                "imported block number {} exceeds sanity bound",
                number
            )));
        }
        let len = self.store.current_len();
        if len != number {
            return Err(EngineError::Validation(format!(
                "block number {} does not follow a chain of {} blocks",
                number,
                len - 1
            )));
        }

        let expected_parent = match number {
            1 => self.store.genesis_hash()?,
            _ => self.store.current_chain()[len as usize - 2].hash(),
        };
        if expected_parent != mined.header.parent_hash {
            return Err(EngineError::Validation(format!(
                "parent hash {} is not the previous block {}",
                mined.header.parent_hash, expected_parent
            )));
        }
        Ok(())
    }
}
