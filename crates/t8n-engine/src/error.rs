//! Engine error types

use t8n_primitives::H256;
use t8n_tool::ToolError;
use t8n_types::TypesError;
use thiserror::Error;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Undecodable block, bad hash width, oversized extra data
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Block rejected by import rules
    #[error("validation failed: {0}")]
    Validation(String),

    /// Claimed parent is neither genesis nor in any chain
    #[error("parent hash not found: {0}")]
    ParentNotFound(H256),

    /// The engine's own bookkeeping is inconsistent
    #[error("internal invariant violated: {0}")]
    Internal(String),

    /// Tool invocation failed
    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    /// Unknown block reference
    #[error("not found: {0}")]
    NotFound(String),

    /// Call budget exhausted
    #[error("call limit of {0} exceeded")]
    CallLimitExceeded(u64),

    /// Bad configuration or chain params
    #[error("config error: {0}")]
    Config(String),
}

impl EngineError {
    /// Whether a raw import reports this as an empty result instead of failing
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::MalformedInput(_)
                | EngineError::Validation(_)
                | EngineError::ParentNotFound(_)
        )
    }
}

impl From<TypesError> for EngineError {
    fn from(e: TypesError) -> Self {
        EngineError::MalformedInput(e.to_string())
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_kinds() {
        assert!(EngineError::MalformedInput("x".into()).is_recoverable());
        assert!(EngineError::Validation("x".into()).is_recoverable());
        assert!(EngineError::ParentNotFound(H256::ZERO).is_recoverable());
        assert!(!EngineError::Internal("x".into()).is_recoverable());
        assert!(!EngineError::NotFound("x".into()).is_recoverable());
        assert!(!EngineError::CallLimitExceeded(3).is_recoverable());
        assert!(!EngineError::Tool(ToolError::UnknownFork("Nope".into())).is_recoverable());
    }

    #[test]
    fn test_types_error_is_malformed_input() {
        let err: EngineError = TypesError::ExtraDataTooLong(33).into();
        assert!(matches!(err, EngineError::MalformedInput(_)));
    }
}
