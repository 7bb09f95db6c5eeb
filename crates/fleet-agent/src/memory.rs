//! In-memory collaborators
//!
//! Deterministic stand-ins for the publish/subscribe transport, the policy
//! engine and the heartbeat publisher. Used by the test suites and by the
//! replay CLI.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use fleet_core::{
    AgentPolicyPayload, AgentState, ChannelId, ChannelRef, ChannelTransport, Heartbeat,
    HeartbeatSink, PolicyEngine, Timestamp, TopicConfig, TransportError,
};

// ----------------------------------------------------------------------------
// In-Memory Transport
// ----------------------------------------------------------------------------

/// Transport that tracks subscriptions in memory
///
/// Channels marked as failing are refused on subscribe and on unsubscribe.
/// Unsubscribing a channel that is not subscribed succeeds.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    topics: TopicConfig,
    subscribe_delay: Option<Duration>,
    failing: Mutex<HashSet<ChannelId>>,
    subscribed: Mutex<Vec<ChannelId>>,
    unsubscribe_calls: Mutex<Vec<ChannelId>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topics(mut self, topics: TopicConfig) -> Self {
        self.topics = topics;
        self
    }

    /// Refuse every operation on this channel
    pub fn with_failing_channel(mut self, channel_id: impl Into<ChannelId>) -> Self {
        self.failing.get_mut().insert(channel_id.into());
        self
    }

    /// Sleep before each subscribe, to widen interleavings in concurrency tests
    pub fn with_subscribe_delay(mut self, delay: Duration) -> Self {
        self.subscribe_delay = Some(delay);
        self
    }

    pub async fn fail_channel(&self, channel_id: ChannelId) {
        self.failing.lock().await.insert(channel_id);
    }

    /// Channels currently subscribed at the transport, in join order
    pub async fn subscribed(&self) -> Vec<ChannelId> {
        self.subscribed.lock().await.clone()
    }

    /// Every unsubscribe request received, failed ones included
    pub async fn unsubscribe_calls(&self) -> Vec<ChannelId> {
        self.unsubscribe_calls.lock().await.clone()
    }

    pub async fn is_subscribed(&self, channel_id: &ChannelId) -> bool {
        self.subscribed.lock().await.contains(channel_id)
    }

    /// RPC topics of the subscribed group channels
    pub async fn active_topics(&self) -> Vec<String> {
        self.subscribed
            .lock()
            .await
            .iter()
            .map(|channel_id| self.topics.group_rpc_topic(channel_id))
            .collect()
    }

    async fn is_failing(&self, channel_id: &ChannelId) -> bool {
        self.failing.lock().await.contains(channel_id)
    }
}

#[async_trait]
impl ChannelTransport for InMemoryTransport {
    async fn subscribe(&self, channel: &ChannelRef) -> Result<ChannelId, TransportError> {
        if let Some(delay) = self.subscribe_delay {
            tokio::time::sleep(delay).await;
        }
        let channel_id = channel.channel_id.clone();
        if channel_id.is_empty() || self.is_failing(&channel_id).await {
            return Err(TransportError::SubscribeFailed {
                channel_id: channel_id.to_string(),
                reason: "refused by transport".to_string(),
            });
        }

        let mut subscribed = self.subscribed.lock().await;
        if !subscribed.contains(&channel_id) {
            subscribed.push(channel_id.clone());
        }
        debug!(topic = %self.topics.group_rpc_topic(&channel_id), "subscribed");
        Ok(channel_id)
    }

    async fn unsubscribe(&self, channel_id: &ChannelId) -> Result<(), TransportError> {
        self.unsubscribe_calls.lock().await.push(channel_id.clone());
        if self.is_failing(channel_id).await {
            return Err(TransportError::UnsubscribeFailed {
                channel_id: channel_id.to_string(),
                reason: "refused by transport".to_string(),
            });
        }
        self.subscribed
            .lock()
            .await
            .retain(|existing| existing != channel_id);
        debug!(topic = %self.topics.group_rpc_topic(channel_id), "unsubscribed");
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Recording Policy Engine
// ----------------------------------------------------------------------------

/// Policy engine that records every payload it is asked to manage
#[derive(Debug, Default)]
pub struct RecordingPolicyEngine {
    managed: Mutex<Vec<AgentPolicyPayload>>,
}

impl RecordingPolicyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn managed(&self) -> Vec<AgentPolicyPayload> {
        self.managed.lock().await.clone()
    }

    pub async fn managed_ids(&self) -> Vec<String> {
        self.managed
            .lock()
            .await
            .iter()
            .map(|payload| payload.id.clone())
            .collect()
    }
}

#[async_trait]
impl PolicyEngine for RecordingPolicyEngine {
    async fn manage_policy(&self, payload: AgentPolicyPayload) {
        self.managed.lock().await.push(payload);
    }
}

// ----------------------------------------------------------------------------
// Recording Heartbeat Sink
// ----------------------------------------------------------------------------

/// Heartbeat sink that keeps every heartbeat it receives
#[derive(Debug, Default)]
pub struct RecordingHeartbeatSink {
    heartbeats: Mutex<Vec<Heartbeat>>,
}

impl RecordingHeartbeatSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn heartbeats(&self) -> Vec<Heartbeat> {
        self.heartbeats.lock().await.clone()
    }
}

#[async_trait]
impl HeartbeatSink for RecordingHeartbeatSink {
    async fn send_heartbeat(&self, timestamp: Timestamp, state: AgentState) {
        self.heartbeats
            .lock()
            .await
            .push(Heartbeat::new(timestamp, state));
    }
}
