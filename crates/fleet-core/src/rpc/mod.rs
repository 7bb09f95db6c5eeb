//! RPC Module
//!
//! Wire format of the control-plane RPC channel:
//! - `envelope`: the versioned wrapper and its two validation gates
//! - `func`: the closed set of function names and topic scopes
//! - `payload`: function-specific payload shapes
//! - `call`: typed decode of a validated envelope into a tagged union

pub mod call;
pub mod envelope;
pub mod func;
pub mod payload;

pub use call::RpcCall;
pub use envelope::{decode_envelope, Envelope, CURRENT_RPC_SCHEMA_VERSION};
pub use func::{RpcFunc, TopicScope};
pub use payload::{
    AgentPolicyPayload, ChannelRef, DatasetRemovedPayload, GroupMembershipPayload,
    GroupRemovedPayload, PolicyAction,
};
