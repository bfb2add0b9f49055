//! Error types for chain records

use t8n_rlp::DecoderError;
use thiserror::Error;

/// Result alias for record decoding
pub type TypesResult<T> = Result<T, TypesError>;

/// Record decoding error
#[derive(Debug, Error)]
pub enum TypesError {
    /// Underlying RLP error
    #[error("rlp: {0}")]
    Rlp(#[from] DecoderError),

    /// Structurally wrong block
    #[error("malformed block: {0}")]
    Malformed(String),

    /// Header extra data longer than 32 bytes
    #[error("extraData is too long: {0} bytes")]
    ExtraDataTooLong(usize),
}
