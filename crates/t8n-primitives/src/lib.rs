//! # t8n-primitives
//!
//! Primitive types shared by every t8n crate.
//!
//! Hashes and addresses are fixed-width byte arrays; quantities are `U256`.
//! The [`hex`] module holds the canonical hex renderings the engine emits
//! (compact `0x1`, even-length `0x01`) and the lenient parsers it accepts.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;
pub mod hex;
#[cfg(feature = "serde")]
pub mod serde_hex;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{HashError, H256, H64};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Block height type
pub type BlockHeight = u64;
