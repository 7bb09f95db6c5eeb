//! Typed RPC calls
//!
//! Only envelopes that already passed [`Envelope::validate`] reach this
//! decode step.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::envelope::Envelope;
use super::func::RpcFunc;
use super::payload::{
    AgentPolicyPayload, DatasetRemovedPayload, GroupMembershipPayload, GroupRemovedPayload,
};
use crate::errors::RpcError;
use crate::types::ChannelId;

/// A decoded RPC, one variant per known function
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "func", content = "payload", rename_all = "snake_case")]
pub enum RpcCall {
    GroupMembership(GroupMembershipPayload),
    AgentPolicy(Vec<AgentPolicyPayload>),
    GroupRemoved(GroupRemovedPayload),
    DatasetRemoved(DatasetRemovedPayload),
}

impl RpcCall {
    /// Decode the payload of a validated envelope for a known function
    pub fn decode(func: RpcFunc, envelope: &Envelope) -> Result<Self, RpcError> {
        let payload = envelope
            .payload
            .as_ref()
            .ok_or_else(|| RpcError::MalformedSchema {
                reason: format!("payload of {} is null", func),
            })?;

        let call = match func {
            RpcFunc::GroupMembership => RpcCall::GroupMembership(decode_payload(func, payload)?),
            RpcFunc::AgentPolicy => RpcCall::AgentPolicy(decode_payload(func, payload)?),
            RpcFunc::GroupRemoved => {
                let removed: GroupRemovedPayload = decode_payload(func, payload)?;
                require_channel(func, &removed.channel_id)?;
                RpcCall::GroupRemoved(removed)
            }
            RpcFunc::DatasetRemoved => {
                let removed: DatasetRemovedPayload = decode_payload(func, payload)?;
                require_channel(func, &removed.channel_id)?;
                RpcCall::DatasetRemoved(removed)
            }
        };
        Ok(call)
    }

    pub fn func(&self) -> RpcFunc {
        match self {
            RpcCall::GroupMembership(_) => RpcFunc::GroupMembership,
            RpcCall::AgentPolicy(_) => RpcFunc::AgentPolicy,
            RpcCall::GroupRemoved(_) => RpcFunc::GroupRemoved,
            RpcCall::DatasetRemoved(_) => RpcFunc::DatasetRemoved,
        }
    }
}

fn decode_payload<T: DeserializeOwned>(func: RpcFunc, payload: &Value) -> Result<T, RpcError> {
    serde_json::from_value(payload.clone())
        .map_err(|source| RpcError::MalformedPayload { func, source })
}

fn require_channel(func: RpcFunc, channel_id: &ChannelId) -> Result<(), RpcError> {
    if channel_id.is_empty() {
        return Err(RpcError::MalformedSchema {
            reason: format!("{} payload has an empty channel_id", func),
        });
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
