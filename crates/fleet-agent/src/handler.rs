//! Core-bound RPC handler
//!
//! Composition root of the engine. Exposes one entry point per subscribed
//! topic; each performs decode, validate and dispatch, and never returns an
//! error to the transport callback. A message that fails any step is logged
//! and dropped without touching agent state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use fleet_core::{decode_envelope, AgentConfig, ChannelId, RpcError, TopicScope};

use crate::dispatcher::{RpcDispatcher, RpcOutcome};
use crate::managers::{PolicyBridge, SubscriptionReconciler};

// ----------------------------------------------------------------------------
// Handler Statistics
// ----------------------------------------------------------------------------

/// Counters of handled messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HandlerStats {
    pub received: u64,
    pub applied: u64,
    pub unsupported: u64,
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct HandlerCounters {
    received: AtomicU64,
    applied: AtomicU64,
    unsupported: AtomicU64,
    dropped: AtomicU64,
}

impl HandlerCounters {
    fn record(&self, outcome: &RpcOutcome) {
        let counter = match outcome {
            RpcOutcome::Applied(_) => &self.applied,
            RpcOutcome::Unsupported { .. } => &self.unsupported,
            RpcOutcome::Dropped(_) => &self.dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> HandlerStats {
        HandlerStats {
            received: self.received.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            unsupported: self.unsupported.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

// ----------------------------------------------------------------------------
// Core RPC Handler
// ----------------------------------------------------------------------------

/// Entry points for RPC messages pushed by the control plane
pub struct CoreRpcHandler {
    config: AgentConfig,
    reconciler: Arc<SubscriptionReconciler>,
    dispatcher: RpcDispatcher,
    counters: HandlerCounters,
}

impl CoreRpcHandler {
    pub fn new(
        config: AgentConfig,
        reconciler: Arc<SubscriptionReconciler>,
        policies: Arc<PolicyBridge>,
    ) -> Self {
        let dispatcher = RpcDispatcher::new(reconciler.clone(), policies);
        Self {
            config,
            reconciler,
            dispatcher,
            counters: HandlerCounters::default(),
        }
    }

    /// Entry point for the agent-wide RPC topic
    pub async fn handle_agent_rpc(&self, topic: &str, payload: &[u8]) -> RpcOutcome {
        self.handle(TopicScope::Agent, topic, payload).await
    }

    /// Entry point for group RPC topics
    pub async fn handle_group_rpc(&self, topic: &str, payload: &[u8]) -> RpcOutcome {
        self.handle(TopicScope::Group, topic, payload).await
    }

    /// Decode, validate and dispatch one message delivered on `topic`
    pub async fn handle(&self, scope: TopicScope, topic: &str, payload: &[u8]) -> RpcOutcome {
        debug!(
            agent_id = %self.config.agent_id,
            %scope,
            topic,
            payload_len = payload.len(),
            "RPC message from core"
        );
        if let Some(body) = self.payload_trace(payload) {
            debug!(topic, payload = %body, "RPC payload");
        }
        self.counters.received.fetch_add(1, Ordering::Relaxed);

        let outcome = match self.process(scope, payload).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    agent_id = %self.config.agent_id,
                    topic,
                    error = %e,
                    "error decoding RPC message from core"
                );
                RpcOutcome::Dropped(e)
            }
        };
        self.counters.record(&outcome);
        outcome
    }

    async fn process(&self, scope: TopicScope, payload: &[u8]) -> Result<RpcOutcome, RpcError> {
        let envelope = decode_envelope(payload)?;
        envelope.validate()?;
        self.dispatcher.dispatch(scope, &envelope).await
    }

    /// Full message body for debug logs, only when tracing is enabled
    fn payload_trace(&self, payload: &[u8]) -> Option<String> {
        self.config
            .subscriptions
            .trace_changes
            .then(|| String::from_utf8_lossy(payload).into_owned())
    }

    /// Copy of the current subscription set
    pub async fn subscriptions(&self) -> Vec<ChannelId> {
        self.reconciler.snapshot().await
    }

    pub fn stats(&self) -> HandlerStats {
        self.counters.snapshot()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
