//! Fork choice and branching

use std::sync::Arc;

use t8n_primitives::{H256, U256};

use crate::error::{EngineError, EngineResult};
use crate::store::{Block, ChainId, ChainStore};

fn total_difficulty(chain: &[Arc<Block>]) -> U256 {
    chain
        .iter()
        .fold(U256::zero(), |acc, block| acc.saturating_add(block.difficulty()))
}

impl ChainStore {
    /// Make the chain with the strictly greatest total difficulty current.
    ///
    /// Genesis is shared and not counted. On a tie with the current chain the
    /// current chain stays; among equally heavy challengers the lowest id wins.
    pub fn select_current_chain_by_total_difficulty(&mut self) -> ChainId {
        let mut best_id = self.current;
        let mut best_total = total_difficulty(self.current_chain());

        for (id, chain) in &self.chains {
            let total = total_difficulty(chain);
            if total > best_total {
                best_id = *id;
                best_total = total;
            }
        }

        if best_id != self.current {
            tracing::info!(
                from = self.current,
                to = best_id,
                total_difficulty = %best_total,
                "Chain reorg"
            );
            self.current = best_id;
        }
        best_id
    }

    /// Make `parent` the tip of the current chain.
    ///
    /// Genesis opens a fresh empty chain. A chain tip continues that chain.
    /// A block below a tip opens a new chain sharing the prefix up to it.
    pub fn attach_to_parent(&mut self, parent: &H256) -> EngineResult<ChainId> {
        if self.genesis_hash()? == *parent {
            let id = self.open_chain(Vec::new());
            tracing::debug!(chain = id, "Branching from genesis");
            return Ok(id);
        }

        let found = self.chains.iter().find_map(|(id, chain)| {
            chain
                .iter()
                .position(|block| block.hash() == *parent)
                .map(|index| (*id, index, chain.len()))
        });

        match found {
            Some((id, index, len)) if index + 1 == len => {
                self.current = id;
                Ok(id)
            }
            Some((id, index, _)) => {
                let prefix = self.chains[&id][..=index].to_vec();
                let new_id = self.open_chain(prefix);
                tracing::debug!(from = id, chain = new_id, height = index + 1, "Branching");
                Ok(new_id)
            }
            None => Err(EngineError::ParentNotFound(*parent)),
        }
    }
}
