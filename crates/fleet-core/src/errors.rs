//! Error types for the fleet control channel
//!
//! Every error here is local to a single message or a single collaborator
//! call. None of them is allowed to stop the agent: callers log and drop.

use crate::rpc::RpcFunc;

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Failures while turning raw bytes into a typed RPC call
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("RPC decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("RPC schema version mismatch: expected {expected}, got {actual}")]
    SchemaVersionMismatch { expected: i64, actual: i64 },

    #[error("Malformed RPC schema: {reason}")]
    MalformedSchema { reason: String },

    #[error("Malformed {func} payload: {source}")]
    MalformedPayload {
        func: RpcFunc,
        #[source]
        source: serde_json::Error,
    },
}

impl RpcError {
    /// Whether the error belongs to the malformed-schema class.
    ///
    /// A typed payload that fails to decode is a malformed schema for that
    /// specific function.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            RpcError::MalformedSchema { .. } | RpcError::MalformedPayload { .. }
        )
    }
}

/// Failures reported by the publish/subscribe transport
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Subscribe to channel {channel_id} failed: {reason}")]
    SubscribeFailed { channel_id: String, reason: String },
    #[error("Unsubscribe from channel {channel_id} failed: {reason}")]
    UnsubscribeFailed { channel_id: String, reason: String },
}

/// Invalid agent configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Agent id must not be empty")]
    EmptyAgentId,
    #[error("Topic {name} must not be empty")]
    EmptyTopic { name: &'static str },
}

// ----------------------------------------------------------------------------
// Main Error Type
// ----------------------------------------------------------------------------

/// Core error type for the fleet agent
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type FleetResult<T> = core::result::Result<T, FleetError>;

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_classification() {
        let err = RpcError::MalformedSchema {
            reason: "func is empty".to_string(),
        };
        assert!(err.is_malformed());

        let err = RpcError::SchemaVersionMismatch {
            expected: 1,
            actual: 2,
        };
        assert!(!err.is_malformed());
        assert_eq!(
            err.to_string(),
            "RPC schema version mismatch: expected 1, got 2"
        );
    }

    #[test]
    fn test_fleet_error_conversion() {
        let err: FleetError = TransportError::SubscribeFailed {
            channel_id: "c1".to_string(),
            reason: "refused".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Transport error: Subscribe to channel c1 failed: refused"
        );

        let err: FleetError = ConfigError::EmptyAgentId.into();
        assert_eq!(err.to_string(), "Configuration error: Agent id must not be empty");
    }
}
