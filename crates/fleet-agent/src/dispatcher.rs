//! RPC Dispatcher
//!
//! Routes a validated envelope to the component that handles its function.
//! Routing is a closed match on [`RpcFunc`]; names outside the set accepted
//! by the topic scope fall through to a deliberate catch-all that logs and
//! drops, so a newer control plane can speak a superset of this protocol.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use fleet_core::{Envelope, RpcCall, RpcError, RpcFunc, TopicScope};

use crate::managers::{PolicyBridge, SubscriptionReconciler};

// ----------------------------------------------------------------------------
// Routing Results
// ----------------------------------------------------------------------------

/// Result of routing an envelope
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// A known function accepted by the scope, with its typed payload
    Call(RpcCall),
    /// A function this agent or this topic does not handle
    Unsupported { func: String, payload: Value },
}

/// What happened to one delivered message
#[derive(Debug)]
pub enum RpcOutcome {
    Applied(RpcFunc),
    Unsupported { func: String },
    Dropped(RpcError),
}

impl RpcOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RpcOutcome::Applied(_))
    }

    /// Short label for reports
    pub fn label(&self) -> String {
        match self {
            RpcOutcome::Applied(func) => format!("applied:{}", func),
            RpcOutcome::Unsupported { func } => format!("unsupported:{}", func),
            RpcOutcome::Dropped(e) => format!("dropped:{}", e),
        }
    }
}

// ----------------------------------------------------------------------------
// Dispatcher
// ----------------------------------------------------------------------------

/// Routes typed calls to the subscription reconciler and the policy bridge
pub struct RpcDispatcher {
    reconciler: Arc<SubscriptionReconciler>,
    policies: Arc<PolicyBridge>,
}

impl RpcDispatcher {
    pub fn new(reconciler: Arc<SubscriptionReconciler>, policies: Arc<PolicyBridge>) -> Self {
        Self {
            reconciler,
            policies,
        }
    }

    /// Decide what a validated envelope means for the given scope
    pub fn route(scope: TopicScope, envelope: &Envelope) -> Result<Dispatch, RpcError> {
        match RpcFunc::from_name(&envelope.func) {
            Some(func) if scope.accepts(func) => Ok(Dispatch::Call(RpcCall::decode(func, envelope)?)),
            _ => Ok(Dispatch::Unsupported {
                func: envelope.func.clone(),
                payload: envelope.payload.clone().unwrap_or(Value::Null),
            }),
        }
    }

    /// Route a validated envelope and run the matching handler
    pub async fn dispatch(
        &self,
        scope: TopicScope,
        envelope: &Envelope,
    ) -> Result<RpcOutcome, RpcError> {
        match Self::route(scope, envelope)? {
            Dispatch::Call(call) => {
                let func = call.func();
                self.execute(call).await;
                Ok(RpcOutcome::Applied(func))
            }
            Dispatch::Unsupported { func, payload } => {
                warn!(
                    %scope,
                    func = %func,
                    payload = %payload,
                    "unsupported/unhandled core RPC, ignoring"
                );
                Ok(RpcOutcome::Unsupported { func })
            }
        }
    }

    /// Run the handler of an already decoded call
    pub async fn execute(&self, call: RpcCall) {
        match call {
            RpcCall::GroupMembership(payload) => {
                self.reconciler
                    .apply_group_membership(payload.full_list, &payload.groups)
                    .await;
            }
            RpcCall::AgentPolicy(payloads) => {
                self.policies.apply_policies(payloads).await;
            }
            RpcCall::GroupRemoved(payload) => {
                self.reconciler.remove_channel(&payload.channel_id).await;
            }
            RpcCall::DatasetRemoved(payload) => {
                self.reconciler.remove_channel(&payload.channel_id).await;
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_route_known_function() {
        let envelope = Envelope::new("group_removed", json!({"channel_id": "c1"}));
        let dispatch = RpcDispatcher::route(TopicScope::Agent, &envelope).unwrap();
        assert!(matches!(dispatch, Dispatch::Call(RpcCall::GroupRemoved(_))));
    }

    #[test]
    fn test_route_unknown_function_is_not_an_error() {
        let envelope = Envelope::new("future_op", json!({"x": 1}));
        let dispatch = RpcDispatcher::route(TopicScope::Agent, &envelope).unwrap();
        assert_eq!(
            dispatch,
            Dispatch::Unsupported {
                func: "future_op".to_string(),
                payload: json!({"x": 1}),
            }
        );
    }

    #[test]
    fn test_group_scope_drops_agent_only_functions() {
        let envelope = Envelope::new(
            "group_membership",
            json!({"full_list": true, "groups": [{"channel_id": "c1"}]}),
        );
        assert!(matches!(
            RpcDispatcher::route(TopicScope::Group, &envelope).unwrap(),
            Dispatch::Unsupported { .. }
        ));

        let envelope = Envelope::new("dataset_removed", json!({"channel_id": "c1"}));
        assert!(matches!(
            RpcDispatcher::route(TopicScope::Group, &envelope).unwrap(),
            Dispatch::Unsupported { .. }
        ));
    }

    #[test]
    fn test_typed_decode_failure_is_malformed() {
        let envelope = Envelope::new("group_membership", json!("not an object"));
        let err = RpcDispatcher::route(TopicScope::Agent, &envelope).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(
            RpcOutcome::Applied(RpcFunc::AgentPolicy).label(),
            "applied:agent_policy"
        );
        assert_eq!(
            RpcOutcome::Unsupported {
                func: "future_op".to_string()
            }
            .label(),
            "unsupported:future_op"
        );
    }
}
