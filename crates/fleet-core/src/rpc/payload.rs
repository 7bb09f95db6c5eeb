//! Function-specific payload shapes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::ChannelId;

// ----------------------------------------------------------------------------
// Group Membership
// ----------------------------------------------------------------------------

/// A channel the control plane wants the agent to join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub channel_id: ChannelId,
    /// Human-readable group name, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl ChannelRef {
    pub fn new(channel_id: impl Into<ChannelId>) -> Self {
        Self {
            channel_id: channel_id.into(),
            name: None,
            group_id: None,
        }
    }
}

/// Full-list or incremental group membership update
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupMembershipPayload {
    #[serde(default)]
    pub full_list: bool,
    #[serde(default)]
    pub groups: Vec<ChannelRef>,
}

// ----------------------------------------------------------------------------
// Agent Policy
// ----------------------------------------------------------------------------

/// What the policy engine should do with a policy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PolicyAction {
    #[default]
    Manage,
    Remove,
    /// Action introduced by a newer control plane, passed through verbatim
    Other(String),
}

impl PolicyAction {
    pub fn as_str(&self) -> &str {
        match self {
            PolicyAction::Manage => "manage",
            PolicyAction::Remove => "remove",
            PolicyAction::Other(action) => action,
        }
    }
}

impl From<String> for PolicyAction {
    fn from(action: String) -> Self {
        match action.as_str() {
            "manage" => PolicyAction::Manage,
            "remove" => PolicyAction::Remove,
            _ => PolicyAction::Other(action),
        }
    }
}

impl From<PolicyAction> for String {
    fn from(action: PolicyAction) -> Self {
        match action {
            PolicyAction::Other(action) => action,
            known => known.as_str().to_string(),
        }
    }
}

/// One policy in an `agent_policy` batch; the body is opaque to this crate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPolicyPayload {
    pub id: String,
    #[serde(default)]
    pub action: PolicyAction,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub backend: String,
    #[serde(default)]
    pub version: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_group_id: Option<String>,
    #[serde(default)]
    pub data: Value,
    /// Fields this agent does not model, kept for the policy engine
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AgentPolicyPayload {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: PolicyAction::Manage,
            name: String::new(),
            backend: String::new(),
            version: 0,
            format: None,
            dataset_id: None,
            agent_group_id: None,
            data: Value::Null,
            extra: Map::new(),
        }
    }
}

// ----------------------------------------------------------------------------
// Removals
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRemovedPayload {
    pub channel_id: ChannelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRemovedPayload {
    pub channel_id: ChannelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_payload_keeps_unknown_fields() {
        let payload: AgentPolicyPayload = serde_json::from_value(json!({
            "id": "p-1",
            "name": "default",
            "backend": "pktvisor",
            "version": 3,
            "data": {"kind": "collection"},
            "sink_ids": ["s-1"]
        }))
        .unwrap();

        assert_eq!(payload.id, "p-1");
        assert_eq!(payload.action, PolicyAction::Manage);
        assert_eq!(payload.version, 3);
        assert_eq!(payload.data, json!({"kind": "collection"}));
        assert_eq!(payload.extra.get("sink_ids"), Some(&json!(["s-1"])));
    }

    #[test]
    fn test_unknown_policy_action_reaches_engine_verbatim() {
        let payload: AgentPolicyPayload =
            serde_json::from_value(json!({"id": "p-2", "action": "sanitize"})).unwrap();
        assert_eq!(payload.action, PolicyAction::Other("sanitize".to_string()));
        assert!(!payload.extra.contains_key("action"));

        let forwarded = serde_json::to_value(&payload).unwrap();
        assert_eq!(forwarded["action"], json!("sanitize"));
    }

    #[test]
    fn test_known_policy_actions() {
        let payload: AgentPolicyPayload =
            serde_json::from_value(json!({"id": "p-3", "action": "remove"})).unwrap();
        assert_eq!(payload.action, PolicyAction::Remove);
        assert_eq!(serde_json::to_value(&payload).unwrap()["action"], json!("remove"));
    }

    #[test]
    fn test_membership_defaults() {
        let payload: GroupMembershipPayload = serde_json::from_value(json!({})).unwrap();
        assert!(!payload.full_list);
        assert!(payload.groups.is_empty());

        let payload: GroupMembershipPayload = serde_json::from_value(json!({
            "full_list": true,
            "groups": [{"channel_id": "c1", "name": "edge"}]
        }))
        .unwrap();
        assert!(payload.full_list);
        assert_eq!(payload.groups[0].channel_id, ChannelId::new("c1"));
        assert_eq!(payload.groups[0].name.as_deref(), Some("edge"));
    }
}
