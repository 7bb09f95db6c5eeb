//! Contracts of the external collaborators the engine drives
//!
//! The publish/subscribe client, the policy engine and the heartbeat
//! publisher live outside this workspace. The engine only sees them through
//! these traits.

use async_trait::async_trait;

use crate::errors::TransportError;
use crate::heartbeat::AgentState;
use crate::rpc::{AgentPolicyPayload, ChannelRef};
use crate::types::{ChannelId, Timestamp};

// ----------------------------------------------------------------------------
// Channel Transport
// ----------------------------------------------------------------------------

/// Per-channel subscribe/unsubscribe on the publish/subscribe transport
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Join a channel; returns the identifier the subscription is tracked by
    async fn subscribe(&self, channel: &ChannelRef) -> Result<ChannelId, TransportError>;

    /// Leave a channel
    async fn unsubscribe(&self, channel_id: &ChannelId) -> Result<(), TransportError>;
}

// ----------------------------------------------------------------------------
// Policy Engine
// ----------------------------------------------------------------------------

/// Entry point of the policy-application engine
///
/// Errors are the engine's own concern and never surface here.
#[async_trait]
pub trait PolicyEngine: Send + Sync {
    async fn manage_policy(&self, payload: AgentPolicyPayload);
}

// ----------------------------------------------------------------------------
// Heartbeat Sink
// ----------------------------------------------------------------------------

/// Publisher of liveness records to the control plane
#[async_trait]
pub trait HeartbeatSink: Send + Sync {
    async fn send_heartbeat(&self, timestamp: Timestamp, state: AgentState);
}
