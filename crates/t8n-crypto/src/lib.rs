//! # t8n-crypto
//!
//! Cryptographic primitives for the t8n chain engine.
//!
//! - Keccak-256 hashing (block, uncle and transaction hashes)
//! - secp256k1 signing, used to build fixtures
//! - Public key recovery and address derivation, used to attribute
//!   transactions to senders

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod signature;

pub use error::{CryptoError, CryptoResult};
pub use hash::keccak256;
pub use signature::{
    public_key_to_address, recover_address, recover_public_key, sign, PrivateKey, PublicKey,
    Signature,
};
