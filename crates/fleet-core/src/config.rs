//! Centralized Configuration Management
//!
//! Configuration for the RPC engine. All structs are serde-friendly so a
//! host application can load them from TOML or JSON.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::rpc::TopicScope;
use crate::types::ChannelId;

// ----------------------------------------------------------------------------
// Subscription Configuration
// ----------------------------------------------------------------------------

/// Behavior of the subscription reconciler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Emit the full subscription set after every mutation, and the body of
    /// every incoming RPC, at debug level
    pub trace_changes: bool,
}

// ----------------------------------------------------------------------------
// Topic Configuration
// ----------------------------------------------------------------------------

/// Topics the RPC entry points are registered against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    /// Agent-wide RPC topic
    pub agent_rpc_topic: String,
    /// Group RPC topics are `{group_rpc_prefix}{channel_id}{group_rpc_suffix}`
    pub group_rpc_prefix: String,
    pub group_rpc_suffix: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            agent_rpc_topic: "agent/fromcore".to_string(),
            group_rpc_prefix: "channels/".to_string(),
            group_rpc_suffix: "/messages/fromcore".to_string(),
        }
    }
}

impl TopicConfig {
    /// RPC topic of a group channel
    pub fn group_rpc_topic(&self, channel_id: &ChannelId) -> String {
        format!(
            "{}{}{}",
            self.group_rpc_prefix, channel_id, self.group_rpc_suffix
        )
    }

    /// Map an incoming topic to the entry point that should handle it
    pub fn scope_for(&self, topic: &str) -> Option<TopicScope> {
        if topic == self.agent_rpc_topic {
            return Some(TopicScope::Agent);
        }
        let channel = topic
            .strip_prefix(self.group_rpc_prefix.as_str())?
            .strip_suffix(self.group_rpc_suffix.as_str())?;
        if channel.is_empty() {
            None
        } else {
            Some(TopicScope::Group)
        }
    }
}

// ----------------------------------------------------------------------------
// Agent Configuration
// ----------------------------------------------------------------------------

/// Complete configuration of the RPC engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Identifier of this agent, used in log records
    pub agent_id: String,
    pub subscriptions: SubscriptionConfig,
    pub topics: TopicConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: "fleet-agent".to_string(),
            subscriptions: SubscriptionConfig::default(),
            topics: TopicConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Create configuration for tests, with subscription tracing enabled
    pub fn testing() -> Self {
        Self {
            agent_id: "test-agent".to_string(),
            subscriptions: SubscriptionConfig {
                trace_changes: true,
            },
            topics: TopicConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_id.trim().is_empty() {
            return Err(ConfigError::EmptyAgentId);
        }
        if self.topics.agent_rpc_topic.is_empty() {
            return Err(ConfigError::EmptyTopic {
                name: "agent_rpc_topic",
            });
        }
        if self.topics.group_rpc_prefix.is_empty() && self.topics.group_rpc_suffix.is_empty() {
            return Err(ConfigError::EmptyTopic {
                name: "group_rpc_prefix",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_for_topics() {
        let topics = TopicConfig::default();
        assert_eq!(topics.scope_for("agent/fromcore"), Some(TopicScope::Agent));

        let group_topic = topics.group_rpc_topic(&ChannelId::new("c9"));
        assert_eq!(group_topic, "channels/c9/messages/fromcore");
        assert_eq!(topics.scope_for(&group_topic), Some(TopicScope::Group));

        assert_eq!(topics.scope_for("channels//messages/fromcore"), None);
        assert_eq!(topics.scope_for("heartbeats"), None);
    }

    #[test]
    fn test_validate() {
        assert!(AgentConfig::default().validate().is_ok());
        assert!(AgentConfig::testing().validate().is_ok());

        let mut config = AgentConfig::default();
        config.agent_id = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptyAgentId));

        let mut config = AgentConfig::default();
        config.topics.agent_rpc_topic.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyTopic { .. })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AgentConfig =
            serde_json::from_str(r#"{"subscriptions": {"trace_changes": true}}"#).unwrap();
        assert!(config.subscriptions.trace_changes);
        assert_eq!(config.agent_id, "fleet-agent");
        assert_eq!(config.topics, TopicConfig::default());
    }
}
