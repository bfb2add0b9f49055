//! Header fields of the block being built

use t8n_primitives::{Address, H256, H64, U256};
use t8n_types::Header;

/// Transient state for the next block.
///
/// Author, difficulty, gas limit, extra data and timestamp survive [`reset`](Self::reset)
/// so consecutive mined blocks inherit them until a caller changes them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderAccumulator {
    /// Block author
    pub coinbase: Address,
    /// Block difficulty
    pub difficulty: U256,
    /// Block gas limit
    pub gas_limit: U256,
    /// Extra data
    pub extra_data: Vec<u8>,
    /// Block timestamp
    pub timestamp: u64,
    /// Parent hash
    pub parent_hash: H256,
    /// Mix hash, only set by raw import
    pub mix_hash: H256,
    /// Nonce, only set by raw import
    pub nonce: H64,
    /// Height of the block being built
    pub number: u64,
    /// Uncles accepted for the block being built
    pub uncles: Vec<Header>,
    /// Genesis pass: no reward, zero parent, no ancestor hashes
    pub is_mining_genesis: bool,
    /// Header fields come from an imported block
    pub is_import_raw_block: bool,
}

impl HeaderAccumulator {
    /// Clear mode flags, uncles and the import-only seal fields
    pub fn reset(&mut self) {
        self.is_mining_genesis = false;
        self.is_import_raw_block = false;
        self.uncles.clear();
        self.mix_hash = H256::ZERO;
        self.nonce = H64::ZERO;
    }

    /// Take block context from `header`, the current tip after a rewind
    pub fn inherit(&mut self, header: &Header) {
        self.coinbase = header.coinbase;
        self.difficulty = header.difficulty;
        self.gas_limit = header.gas_limit;
        self.extra_data = header.extra_data.clone();
        self.timestamp = header.timestamp;
        self.number = header.number;
    }

    /// Take every field an imported header dictates
    pub fn import(&mut self, header: &Header) {
        self.reset();
        self.inherit(header);
        self.parent_hash = header.parent_hash;
        self.mix_hash = header.mix_hash;
        self.nonce = header.nonce;
        self.is_import_raw_block = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header {
        Header {
            parent_hash: H256::from_bytes([0x11; 32]),
            coinbase: Address::from_bytes([0xbb; 20]),
            difficulty: U256::from(0x20040),
            number: 7,
            gas_limit: U256::from(0x2fefd8),
            timestamp: 0x54c98c81,
            extra_data: vec![0x42],
            mix_hash: H256::from_bytes([0x22; 32]),
            nonce: H64::from_bytes([0x33; 8]),
            ..Default::default()
        }
    }

    #[test]
    fn test_reset_keeps_block_context() {
        let mut acc = HeaderAccumulator::default();
        acc.import(&header());
        acc.uncles.push(header());
        acc.reset();

        assert!(!acc.is_import_raw_block);
        assert!(acc.uncles.is_empty());
        assert_eq!(acc.mix_hash, H256::ZERO);
        assert_eq!(acc.nonce, H64::ZERO);
        assert_eq!(acc.coinbase, Address::from_bytes([0xbb; 20]));
        assert_eq!(acc.timestamp, 0x54c98c81);
        assert_eq!(acc.extra_data, vec![0x42]);
    }

    #[test]
    fn test_import_takes_seal_fields() {
        let mut acc = HeaderAccumulator {
            is_mining_genesis: true,
            ..Default::default()
        };
        acc.import(&header());
        assert!(acc.is_import_raw_block);
        assert!(!acc.is_mining_genesis);
        assert_eq!(acc.number, 7);
        assert_eq!(acc.parent_hash, H256::from_bytes([0x11; 32]));
        assert_eq!(acc.mix_hash, H256::from_bytes([0x22; 32]));
        assert_eq!(acc.nonce, H64::from_bytes([0x33; 8]));
    }

    #[test]
    fn test_inherit_leaves_parent_alone() {
        let mut acc = HeaderAccumulator {
            parent_hash: H256::from_bytes([0x99; 32]),
            ..Default::default()
        };
        acc.inherit(&header());
        assert_eq!(acc.parent_hash, H256::from_bytes([0x99; 32]));
        assert_eq!(acc.difficulty, U256::from(0x20040));
    }
}
