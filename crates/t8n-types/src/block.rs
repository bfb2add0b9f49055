//! Block header, logs bloom and the well-known empty roots

use std::fmt;

use t8n_crypto::keccak256;
use t8n_primitives::{Address, H256, H64, U256};
use t8n_rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

/// Number of RLP items in a header
pub const HEADER_FIELDS: usize = 15;

/// Maximum extra data length accepted in a header
pub const MAX_EXTRA_DATA: usize = 32;

/// Empty ommers hash (keccak256 of the empty RLP list)
pub const EMPTY_OMMERS_HASH: H256 = H256::from_bytes([
    0x1d, 0xcc, 0x4d, 0xe8, 0xde, 0xc7, 0x5d, 0x7a,
    0xab, 0x85, 0xb5, 0x67, 0xb6, 0xcc, 0xd4, 0x1a,
    0xd3, 0x12, 0x45, 0x1b, 0x94, 0x8a, 0x74, 0x13,
    0xf0, 0xa1, 0x42, 0xfd, 0x40, 0xd4, 0x93, 0x47,
]);

/// Empty trie root (keccak256 of the empty RLP string)
pub const EMPTY_TRIE_ROOT: H256 = H256::from_bytes([
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6,
    0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0,
    0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
]);

/// Logs bloom filter (2048 bits = 256 bytes)
#[derive(Clone, PartialEq, Eq)]
pub struct Bloom(pub [u8; 256]);

impl Default for Bloom {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Bloom {
    /// Empty bloom filter
    pub const ZERO: Bloom = Bloom([0u8; 256]);

    /// Create bloom from bytes
    pub fn from_bytes(bytes: [u8; 256]) -> Self {
        Self(bytes)
    }

    /// Create bloom from a 256-byte slice
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 256] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Check if bloom filter is empty
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Lowercase `0x`-prefixed hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Bloom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Bloom(empty)")
        } else {
            write!(f, "Bloom({})", self.to_hex())
        }
    }
}

impl Encodable for Bloom {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.encoder().encode_value(&self.0);
    }
}

impl Decodable for Bloom {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        rlp.decoder()
            .decode_value(|bytes| Bloom::from_slice(bytes).ok_or(DecoderError::RlpInvalidLength))
    }
}

mod bloom_serde {
    use super::Bloom;
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Bloom {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for Bloom {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(D::Error::custom)?;
            Bloom::from_slice(&bytes).ok_or_else(|| {
                D::Error::custom(format!("bloom must be 256 bytes, got {}", bytes.len()))
            })
        }
    }
}

/// Block header in consensus field order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    /// Parent block hash
    pub parent_hash: H256,
    /// Hash of the RLP list of uncle headers
    pub ommers_hash: H256,
    /// Block author
    pub coinbase: Address,
    /// State root after executing the block
    pub state_root: H256,
    /// Transactions trie root
    pub transactions_root: H256,
    /// Receipts trie root
    pub receipts_root: H256,
    /// Logs bloom filter
    pub logs_bloom: Bloom,
    /// Difficulty
    pub difficulty: U256,
    /// Block number (height)
    pub number: u64,
    /// Gas limit for the block
    pub gas_limit: U256,
    /// Gas used by all transactions
    pub gas_used: U256,
    /// Block timestamp (Unix seconds)
    pub timestamp: u64,
    /// Extra data, at most 32 bytes
    pub extra_data: Vec<u8>,
    /// Mix hash
    pub mix_hash: H256,
    /// Proof-of-work nonce
    pub nonce: H64,
}

impl Header {
    /// keccak256 of the RLP-encoded header
    pub fn hash(&self) -> H256 {
        keccak256(&t8n_rlp::encode(self))
    }
}

impl Encodable for Header {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(HEADER_FIELDS);
        s.append(&self.parent_hash);
        s.append(&self.ommers_hash);
        s.append(&self.coinbase);
        s.append(&self.state_root);
        s.append(&self.transactions_root);
        s.append(&self.receipts_root);
        s.append(&self.logs_bloom);
        s.append(&self.difficulty);
        s.append(&self.number);
        s.append(&self.gas_limit);
        s.append(&self.gas_used);
        s.append(&self.timestamp);
        s.append(&self.extra_data);
        s.append(&self.mix_hash);
        s.append(&self.nonce);
    }
}

impl Decodable for Header {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != HEADER_FIELDS {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Header {
            parent_hash: rlp.val_at(0)?,
            ommers_hash: rlp.val_at(1)?,
            coinbase: rlp.val_at(2)?,
            state_root: rlp.val_at(3)?,
            transactions_root: rlp.val_at(4)?,
            receipts_root: rlp.val_at(5)?,
            logs_bloom: rlp.val_at(6)?,
            difficulty: rlp.val_at(7)?,
            number: rlp.val_at(8)?,
            gas_limit: rlp.val_at(9)?,
            gas_used: rlp.val_at(10)?,
            timestamp: rlp.val_at(11)?,
            extra_data: rlp.val_at(12)?,
            mix_hash: rlp.val_at(13)?,
            nonce: rlp.val_at(14)?,
        })
    }
}

/// Hash of an uncle list as it appears in `sha3Uncles`
pub fn uncles_hash(uncles: &[Header]) -> H256 {
    keccak256(&t8n_rlp::encode_list(uncles))
}
