//! Binary block decoding and encoding.
//!
//! A block is the RLP list `[header, [tx, ...], [uncle_header, ...]]`.
//! Decoding keeps the hash of the header bytes exactly as received so an
//! import can compare it with the hash of the block it replays.

use t8n_crypto::keccak256;
use t8n_primitives::H256;
use t8n_rlp::{utils, Rlp};

use crate::block::{Header, HEADER_FIELDS, MAX_EXTRA_DATA};
use crate::error::{TypesError, TypesResult};
use crate::transaction::Transaction;

/// A block decoded from its binary form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedBlock {
    /// Decoded header
    pub header: Header,
    /// keccak256 of the header bytes as received
    pub raw_hash: H256,
    /// Transactions in block order
    pub transactions: Vec<Transaction>,
    /// Uncle headers in block order
    pub uncles: Vec<Header>,
}

/// Decode a binary block
pub fn decode_block(bytes: &[u8]) -> TypesResult<DecodedBlock> {
    let rlp = Rlp::new(bytes);
    let info = rlp.payload_info()?;
    if info.header_len + info.value_len != bytes.len() {
        return Err(TypesError::Malformed(format!(
            "trailing bytes after block: {} of {} consumed",
            info.header_len + info.value_len,
            bytes.len()
        )));
    }
    let items = utils::list_len(&rlp)
        .map_err(|_| TypesError::Malformed("block rlp is expected to be list".into()))?;
    if items < 3 {
        return Err(TypesError::Malformed(format!(
            "block rlp must carry header, transactions and uncles, got {} items",
            items
        )));
    }

    let header_rlp = rlp.at(0)?;
    let header = decode_header(&header_rlp, "block header")?;
    let raw_hash = keccak256(header_rlp.as_raw());

    let txs_rlp = rlp.at(1)?;
    if !txs_rlp.is_list() {
        return Err(TypesError::Malformed("transactions rlp is expected to be list".into()));
    }
    let mut transactions = Vec::with_capacity(txs_rlp.item_count()?);
    for tx_rlp in txs_rlp.iter() {
        if !tx_rlp.is_list() {
            return Err(TypesError::Malformed("transaction rlp is expected to be list".into()));
        }
        transactions.push(tx_rlp.as_val::<Transaction>()?);
    }

    let uncles_rlp = rlp.at(2)?;
    if !uncles_rlp.is_list() {
        return Err(TypesError::Malformed("uncles rlp is expected to be list".into()));
    }
    let mut uncles = Vec::with_capacity(uncles_rlp.item_count()?);
    for uncle_rlp in uncles_rlp.iter() {
        uncles.push(decode_header(&uncle_rlp, "uncle header")?);
    }

    Ok(DecodedBlock {
        header,
        raw_hash,
        transactions,
        uncles,
    })
}

fn decode_header(rlp: &Rlp, what: &str) -> TypesResult<Header> {
    if !rlp.is_list() {
        return Err(TypesError::Malformed(format!("{} is expected to be list", what)));
    }
    let count = rlp.item_count()?;
    if count != HEADER_FIELDS {
        return Err(TypesError::Malformed(format!(
            "{} must have {} fields, got {}",
            what, HEADER_FIELDS, count
        )));
    }
    let header: Header = rlp.as_val()?;
    if header.extra_data.len() > MAX_EXTRA_DATA {
        return Err(TypesError::ExtraDataTooLong(header.extra_data.len()));
    }
    Ok(header)
}

/// Encode a block from its parts
pub fn encode_block(header: &Header, transactions: &[Transaction], uncles: &[Header]) -> Vec<u8> {
    utils::wrap_raw_list([
        t8n_rlp::encode(header),
        t8n_rlp::encode_list(transactions),
        t8n_rlp::encode_list(uncles),
    ])
}
