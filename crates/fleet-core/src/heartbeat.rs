//! Heartbeat records emitted by the agent to the control plane

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::rpc::CURRENT_RPC_SCHEMA_VERSION;
use crate::types::Timestamp;

/// Liveness state reported in a heartbeat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    New,
    Online,
    Offline,
    Stale,
    Removed,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentState::New => "new",
            AgentState::Online => "online",
            AgentState::Offline => "offline",
            AgentState::Stale => "stale",
            AgentState::Removed => "removed",
        };
        f.write_str(name)
    }
}

/// A single heartbeat, ready to be serialized by a sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    pub schema_version: i64,
    pub timestamp: Timestamp,
    pub state: AgentState,
}

impl Heartbeat {
    pub fn new(timestamp: Timestamp, state: AgentState) -> Self {
        Self {
            schema_version: CURRENT_RPC_SCHEMA_VERSION,
            timestamp,
            state,
        }
    }
}
