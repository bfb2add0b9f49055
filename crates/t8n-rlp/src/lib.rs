//! # t8n-rlp
//!
//! RLP (Recursive Length Prefix) helpers for the t8n chain engine.
//!
//! Thin layer over the `rlp` crate. Hashes, nonces and addresses get their
//! codecs from `t8n-primitives`; this crate adds the list splicing that block
//! assembly needs, since a block carries its header and uncle headers as
//! already-encoded items.
//!
//! ## RLP Encoding Rules
//!
//! - Single byte `[0x00, 0x7f]`: itself
//! - Short string (0-55 bytes): `0x80 + len` + data
//! - Long string (>55 bytes): `0xb7 + len_of_len` + len + data
//! - Short list (0-55 bytes payload): `0xc0 + len` + items
//! - Long list (>55 bytes payload): `0xf7 + len_of_len` + len + items

#![warn(missing_docs)]
#![warn(clippy::all)]

use bytes::{BufMut, BytesMut};

pub use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
pub use t8n_primitives::{Address, H256, H64};

/// Encode a value to RLP bytes
pub fn encode<T: Encodable>(value: &T) -> Vec<u8> {
    rlp::encode(value).to_vec()
}

/// Decode RLP bytes to a value
pub fn decode<T: Decodable>(data: &[u8]) -> Result<T, DecoderError> {
    rlp::decode(data)
}

/// Encode a list of values, each already implementing [`Encodable`]
pub fn encode_list<T: Encodable>(items: &[T]) -> Vec<u8> {
    rlp::encode_list::<T, T>(items).to_vec()
}

/// RLP structural helpers
pub mod utils {
    use super::*;

    /// List header for a payload of `payload_len` bytes
    pub fn list_header(payload_len: usize) -> Vec<u8> {
        if payload_len < 56 {
            vec![0xc0 + payload_len as u8]
        } else {
            let len_bytes = encode_length(payload_len);
            let mut header = vec![0xf7 + len_bytes.len() as u8];
            header.extend(len_bytes);
            header
        }
    }

    /// Wrap already-encoded items into a list without re-encoding them
    pub fn wrap_raw_list<I, B>(items: I) -> Vec<u8>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut payload = BytesMut::new();
        for item in items {
            payload.put_slice(item.as_ref());
        }
        let mut out = list_header(payload.len());
        out.extend_from_slice(&payload);
        out
    }

    /// Number of items in `rlp`, failing if it is not a list
    pub fn list_len(rlp: &Rlp) -> Result<usize, DecoderError> {
        if !rlp.is_list() {
            return Err(DecoderError::RlpExpectedToBeList);
        }
        rlp.item_count()
    }

    /// Encode length as minimal big-endian bytes
    fn encode_length(len: usize) -> Vec<u8> {
        let bytes = (len as u64).to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
        bytes[start..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Primitive codecs ====================

    #[test]
    fn test_encode_decode_h256() {
        let hash = H256::from_bytes([0x42; 32]);
        let decoded: H256 = decode(&encode(&hash)).unwrap();
        assert_eq!(hash, decoded);
    }

    #[test]
    fn test_encode_decode_address() {
        let addr = Address::from_bytes([0x42; 20]);
        let decoded: Address = decode(&encode(&addr)).unwrap();
        assert_eq!(addr, decoded);
    }

    // ==================== List headers ====================

    #[test]
    fn test_list_header_short() {
        assert_eq!(utils::list_header(0), vec![0xc0]);
        assert_eq!(utils::list_header(55), vec![0xf7]);
    }

    #[test]
    fn test_list_header_long() {
        assert_eq!(utils::list_header(56), vec![0xf8, 56]);
        assert_eq!(utils::list_header(1024), vec![0xf9, 0x04, 0x00]);
    }

    // ==================== Raw list splicing ====================

    #[test]
    fn test_wrap_raw_list_matches_stream() {
        let a = encode(&1u64);
        let b = encode(&"abc");
        let spliced = utils::wrap_raw_list([&a, &b]);

        let mut stream = RlpStream::new_list(2);
        stream.append(&1u64);
        stream.append(&"abc");
        assert_eq!(spliced, stream.out().to_vec());
    }

    #[test]
    fn test_wrap_raw_list_empty() {
        let empty: [Vec<u8>; 0] = [];
        assert_eq!(utils::wrap_raw_list(empty), vec![0xc0]);
    }

    #[test]
    fn test_wrap_raw_list_long_payload() {
        let item = encode(&vec![0x42u8; 60]);
        let spliced = utils::wrap_raw_list([&item]);
        assert_eq!(spliced[0], 0xf8);
        assert_eq!(spliced[1] as usize, item.len());
        assert_eq!(utils::list_len(&Rlp::new(&spliced)).unwrap(), 1);
    }

    #[test]
    fn test_list_len_rejects_string() {
        let data = encode(&"abc");
        assert_eq!(
            utils::list_len(&Rlp::new(&data)),
            Err(DecoderError::RlpExpectedToBeList)
        );
    }

    #[test]
    fn test_nested_list() {
        let inner = RlpStream::new_list(0).out();
        let spliced = utils::wrap_raw_list([&inner[..]]);
        assert_eq!(spliced, vec![0xc1, 0xc0]);
    }
}
