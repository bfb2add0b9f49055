//! # t8n-types
//!
//! Typed chain records for the t8n chain engine.
//!
//! - [`Header`] - the fifteen-field block header and its hash
//! - [`Transaction`] - legacy signed transactions with sender recovery
//! - [`Account`] / [`PostState`] - per-block allocation as reported by the tool
//! - [`RpcBlock`] / [`RpcTransaction`] - the response shapes callers compare against
//! - [`codec`] - binary block decoding and encoding

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod account;
pub mod block;
pub mod codec;
mod error;
pub mod rpc;
pub mod transaction;

pub use account::{Account, PostState};
pub use block::{uncles_hash, Bloom, Header, EMPTY_OMMERS_HASH, EMPTY_TRIE_ROOT};
pub use codec::{decode_block, encode_block, DecodedBlock};
pub use error::{TypesError, TypesResult};
pub use rpc::{RpcBlock, RpcTransaction};
pub use transaction::Transaction;
