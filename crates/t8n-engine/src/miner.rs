//! Mining: one tool invocation per block

use std::sync::Arc;

use t8n_tool::{Ommer, ToolEnv, ToolOutput, ToolRequest, ToolTransaction};
use t8n_types::{uncles_hash, Header, PostState, RpcTransaction};

use crate::error::{EngineError, EngineResult};
use crate::session::Session;
use crate::store::Block;

impl Session {
    /// Block context handed to the tool
    fn tool_env(&self) -> EngineResult<ToolEnv> {
        let acc = &self.header;
        let mut env = ToolEnv {
            current_coinbase: acc.coinbase,
            current_difficulty: acc.difficulty,
            current_gas_limit: acc.gas_limit,
            current_number: acc.number,
            current_timestamp: acc.timestamp,
            previous_hash: acc.parent_hash,
            ..Default::default()
        };

        if !acc.is_mining_genesis {
            env.block_hashes.insert(0, self.store.genesis_hash()?);
            for (height, block) in (1u64..).zip(self.store.current_chain()) {
                env.block_hashes.insert(height, block.hash());
            }
            env.ommers = acc
                .uncles
                .iter()
                .map(|uncle| Ommer {
                    delta: acc.number.saturating_sub(uncle.number),
                    address: uncle.coinbase,
                })
                .collect();
        }
        Ok(env)
    }

    /// Pre-state: the tip's post-state, or the genesis allocation for block 1
    fn tool_alloc(&self) -> EngineResult<&PostState> {
        if self.header.number > 1 {
            if let Some(tip) = self.store.tip() {
                return Ok(&tip.post_state);
            }
        }
        Ok(&self.chain_params()?.accounts)
    }

    /// Mine the pending transactions into one block on the current chain.
    ///
    /// Outside genesis and raw-import mode the block extends the current tip.
    /// The pending buffer is always drained; the accumulator is reset unless
    /// the genesis pass is running.
    pub(crate) fn mine_one_block(&mut self) -> EngineResult<Arc<Block>> {
        if !self.header.is_import_raw_block && !self.header.is_mining_genesis {
            self.header.number = self.store.current_len() + 1;
            self.header.parent_hash = match self.store.tip() {
                Some(tip) => tip.hash(),
                None => self.store.genesis_hash()?,
            };
        }

        let params = self.chain_params()?;
        let reward = if self.header.is_mining_genesis {
            None
        } else {
            self.rewards
                .mining_reward(&params.seal_engine, params.fork())
                .map_err(|e| EngineError::Config(e.to_string()))?
        };
        let env = self.tool_env()?;
        let txs: Vec<ToolTransaction> = self.pending.iter().map(ToolTransaction::from).collect();
        let request = ToolRequest {
            alloc: self.tool_alloc()?,
            txs: &txs,
            env: &env,
            fork: params.fork(),
            reward,
        };

        tracing::debug!(
            number = self.header.number,
            parent = %self.header.parent_hash,
            txs = txs.len(),
            uncles = self.header.uncles.len(),
            "Mining block"
        );
        let ToolOutput { result, alloc } = self.tool.transition(&request)?;

        let header = Header {
            parent_hash: self.header.parent_hash,
            ommers_hash: uncles_hash(&self.header.uncles),
            coinbase: self.header.coinbase,
            state_root: result.state_root,
            transactions_root: result.tx_root,
            receipts_root: result.receipt_root,
            logs_bloom: result.logs_bloom(),
            difficulty: self.header.difficulty,
            number: self.header.number,
            gas_limit: self.header.gas_limit,
            gas_used: result.gas_used(),
            timestamp: self.header.timestamp,
            extra_data: self.header.extra_data.clone(),
            mix_hash: self.header.mix_hash,
            nonce: self.header.nonce,
        };
        let hash = header.hash();

        let mut transactions = Vec::with_capacity(result.receipts.len());
        for receipt in &result.receipts {
            let source = self
                .pending
                .iter()
                .zip(&txs)
                .find(|(_, sent)| sent.hash == receipt.transaction_hash)
                .map(|(tx, _)| tx)
                .ok_or_else(|| {
                    EngineError::Internal(format!(
                        "receipt references unknown transaction {}",
                        receipt.transaction_hash
                    ))
                })?;
            transactions.push(RpcTransaction::new(
                source,
                hash,
                header.number,
                receipt.transaction_index,
            ));
        }

        if !result.rejected.is_empty() {
            tracing::warn!(
                number = header.number,
                rejected = result.rejected.len(),
                "Tool rejected transactions"
            );
        }

        let block = Block {
            header,
            transactions,
            uncles: self.header.uncles.clone(),
            post_state: alloc,
            rejected: result.rejected,
            logs_hash: result.logs_hash,
        };

        self.pending.clear();
        if !self.header.is_mining_genesis {
            self.header.reset();
        }

        let block = self.store.append(block);
        tracing::debug!(
            number = block.number(),
            hash = %block.hash(),
            chain = self.store.current_id(),
            "Mined block"
        );
        Ok(block)
    }
}
