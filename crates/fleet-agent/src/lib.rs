//! Fleet Agent RPC Engine
//!
//! This crate contains the remote-control synchronization engine of the
//! fleet edge agent:
//! - `SubscriptionReconciler`: owns the set of subscribed channels
//! - `PolicyBridge`: forwards policy batches to the policy engine, then heartbeats
//! - `RpcDispatcher`: routes validated envelopes to the two components above
//! - `CoreRpcHandler`: the per-topic entry points registered with the transport
//!
//! `fleet-core` provides the wire types and collaborator contracts; this
//! crate provides the state and the orchestration.

pub mod builder;
pub mod dispatcher;
pub mod handler;
pub mod managers;
pub mod memory;

pub use builder::AgentBuilder;
pub use dispatcher::{Dispatch, RpcDispatcher, RpcOutcome};
pub use handler::{CoreRpcHandler, HandlerStats};
pub use managers::*;
pub use memory::{InMemoryTransport, RecordingHeartbeatSink, RecordingPolicyEngine};

// Re-export core types for convenience
pub use fleet_core::{
    AgentConfig, AgentPolicyPayload, AgentState, ChannelId, ChannelRef, ChannelTransport,
    Envelope, FleetError, FleetResult, HeartbeatSink, PolicyEngine, RpcCall, RpcError, RpcFunc,
    TopicScope,
};
