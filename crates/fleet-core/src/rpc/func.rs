//! RPC function names and the topic scopes that accept them

use core::fmt;
use serde::{Deserialize, Serialize};

/// Closed set of functions the control plane may invoke on the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcFunc {
    GroupMembership,
    AgentPolicy,
    GroupRemoved,
    DatasetRemoved,
}

impl RpcFunc {
    pub const ALL: [RpcFunc; 4] = [
        RpcFunc::GroupMembership,
        RpcFunc::AgentPolicy,
        RpcFunc::GroupRemoved,
        RpcFunc::DatasetRemoved,
    ];

    /// Wire name of the function
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcFunc::GroupMembership => "group_membership",
            RpcFunc::AgentPolicy => "agent_policy",
            RpcFunc::GroupRemoved => "group_removed",
            RpcFunc::DatasetRemoved => "dataset_removed",
        }
    }

    /// Look up a function by wire name; `None` for names this agent does not know
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|func| func.as_str() == name)
    }
}

impl fmt::Display for RpcFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which subscribed topic a message arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicScope {
    /// Agent-wide RPC topic, accepts every function
    Agent,
    /// Group-wide RPC topic, accepts policy updates and group removal only
    Group,
}

impl TopicScope {
    pub fn accepts(&self, func: RpcFunc) -> bool {
        match self {
            TopicScope::Agent => true,
            TopicScope::Group => matches!(func, RpcFunc::AgentPolicy | RpcFunc::GroupRemoved),
        }
    }
}

impl fmt::Display for TopicScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicScope::Agent => f.write_str("agent"),
            TopicScope::Group => f.write_str("group"),
        }
    }
}
