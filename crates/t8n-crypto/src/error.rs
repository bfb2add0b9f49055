//! Signing and sender recovery errors

use thiserror::Error;

/// Result alias for signing and recovery
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Failure to sign a transaction or recover its sender
#[derive(Debug, Error)]
pub enum CryptoError {
    /// k256 refused to sign
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// r and s do not form a valid signature
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// `v` does not reduce to a recovery id
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// No public key matches the signature
    #[error("sender recovery failed: {0}")]
    RecoveryFailed(String),
}
