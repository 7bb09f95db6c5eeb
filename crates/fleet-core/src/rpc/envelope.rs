//! RPC envelope codec
//!
//! Decoding and validation are two separate steps. `decode_envelope` only
//! fails on bytes that are not a well-formed envelope; an envelope with the
//! wrong version or a missing field still decodes, and is rejected by
//! [`Envelope::validate`] before any typed payload decode happens.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::RpcError;

/// Protocol version this agent speaks
pub const CURRENT_RPC_SCHEMA_VERSION: i64 = 1;

/// Versioned wrapper around every RPC pushed by the control plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Any JSON integer decodes; the version gate decides
    #[serde(default)]
    pub schema_version: i64,
    #[serde(default)]
    pub func: String,
    /// `None` both when the field is missing and when it is JSON `null`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Envelope {
    /// Build an envelope at the current schema version
    pub fn new(func: impl Into<String>, payload: Value) -> Self {
        Self {
            schema_version: CURRENT_RPC_SCHEMA_VERSION,
            func: func.into(),
            payload: Some(payload),
        }
    }

    /// Apply the version gate, then the shape gate
    pub fn validate(&self) -> Result<(), RpcError> {
        if self.schema_version != CURRENT_RPC_SCHEMA_VERSION {
            return Err(RpcError::SchemaVersionMismatch {
                expected: CURRENT_RPC_SCHEMA_VERSION,
                actual: self.schema_version,
            });
        }
        if self.func.is_empty() {
            return Err(RpcError::MalformedSchema {
                reason: "func is empty".to_string(),
            });
        }
        if self.payload.is_none() {
            return Err(RpcError::MalformedSchema {
                reason: format!("payload of {} is null", self.func),
            });
        }
        Ok(())
    }
}

/// Decode raw message bytes into an envelope without semantic validation
pub fn decode_envelope(bytes: &[u8]) -> Result<Envelope, RpcError> {
    Ok(serde_json::from_slice(bytes)?)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_envelope(b"{not json").unwrap_err();
        assert!(matches!(err, RpcError::Decode(_)));

        let err = decode_envelope(br#"{"schema_version": "one"}"#).unwrap_err();
        assert!(matches!(err, RpcError::Decode(_)));
    }

    #[test]
    fn test_decode_keeps_semantically_invalid_envelopes() {
        let envelope = decode_envelope(br#"{"schema_version": 7, "func": ""}"#).unwrap();
        assert_eq!(envelope.schema_version, 7);
        assert!(envelope.func.is_empty());
        assert!(envelope.payload.is_none());
    }

    #[test]
    fn test_out_of_range_versions_reach_the_gate() {
        for raw in [
            &br#"{"schema_version": -1, "func": "agent_policy", "payload": []}"#[..],
            &br#"{"schema_version": 4294967296, "func": "agent_policy", "payload": []}"#[..],
        ] {
            let envelope = decode_envelope(raw).unwrap();
            assert!(matches!(
                envelope.validate(),
                Err(RpcError::SchemaVersionMismatch { expected: 1, .. })
            ));
        }
    }

    #[test]
    fn test_null_payload_decodes_as_absent() {
        let envelope =
            decode_envelope(br#"{"schema_version": 1, "func": "agent_policy", "payload": null}"#)
                .unwrap();
        assert!(envelope.payload.is_none());
        assert!(envelope.validate().unwrap_err().is_malformed());
    }

    #[test]
    fn test_version_gate_runs_first() {
        let envelope = Envelope {
            schema_version: 2,
            func: String::new(),
            payload: None,
        };
        assert!(matches!(
            envelope.validate(),
            Err(RpcError::SchemaVersionMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_empty_func_is_malformed() {
        let envelope = Envelope::new("", json!({}));
        assert!(matches!(
            envelope.validate(),
            Err(RpcError::MalformedSchema { .. })
        ));
    }

    #[test]
    fn test_valid_envelope_passes() {
        let envelope = Envelope::new("future_op", json!({"anything": true}));
        assert!(envelope.validate().is_ok());

        let bytes = serde_json::to_vec(&envelope).unwrap();
        assert_eq!(decode_envelope(&bytes).unwrap(), envelope);
    }
}
