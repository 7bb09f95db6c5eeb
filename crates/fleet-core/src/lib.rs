//! Fleet Core Protocol Implementation
//!
//! This crate provides the wire types, error taxonomy, configuration and
//! collaborator contracts for the control-plane RPC channel of a fleet edge
//! agent. The stateful engine that acts on these types lives in `fleet-agent`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod collaborators;
pub mod config;
pub mod errors;
pub mod heartbeat;
pub mod rpc;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use collaborators::{ChannelTransport, HeartbeatSink, PolicyEngine};
pub use config::{AgentConfig, SubscriptionConfig, TopicConfig};
pub use errors::{ConfigError, FleetError, FleetResult, RpcError, TransportError};
pub use heartbeat::{AgentState, Heartbeat};
pub use rpc::{
    decode_envelope, AgentPolicyPayload, ChannelRef, DatasetRemovedPayload, Envelope,
    GroupMembershipPayload, GroupRemovedPayload, PolicyAction, RpcCall, RpcFunc, TopicScope,
    CURRENT_RPC_SCHEMA_VERSION,
};
pub use types::{ChannelId, SystemTimeSource, TimeSource, Timestamp};
