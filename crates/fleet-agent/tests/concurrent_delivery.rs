//! Concurrent delivery tests
//!
//! The transport may run callbacks for the same or different topics at the
//! same time. These tests race full-list replaces against removals and
//! check the subscription set always converges.

use std::sync::Arc;
use std::time::Duration;

use fleet_agent::{
    AgentBuilder, CoreRpcHandler, InMemoryTransport, RecordingHeartbeatSink,
    RecordingPolicyEngine,
};
use fleet_core::{AgentConfig, ChannelId};
use serde_json::json;

// ----------------------------------------------------------------------------
// Test Utilities
// ----------------------------------------------------------------------------

const AGENT_TOPIC: &str = "agent/fromcore";

fn create_handler(transport: Arc<InMemoryTransport>) -> Arc<CoreRpcHandler> {
    let handler = AgentBuilder::new(
        transport,
        Arc::new(RecordingPolicyEngine::new()),
        Arc::new(RecordingHeartbeatSink::new()),
    )
    .with_config(AgentConfig::testing())
    .build()
    .expect("testing config is valid");
    Arc::new(handler)
}

fn full_list(channels: &[&str]) -> Vec<u8> {
    let groups: Vec<_> = channels.iter().map(|id| json!({"channel_id": id})).collect();
    serde_json::to_vec(&json!({
        "schema_version": 1,
        "func": "group_membership",
        "payload": {"full_list": true, "groups": groups}
    }))
    .unwrap()
}

fn incremental(channel: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "schema_version": 1,
        "func": "group_membership",
        "payload": {"full_list": false, "groups": [{"channel_id": channel}]}
    }))
    .unwrap()
}

fn group_removed(channel: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "schema_version": 1,
        "func": "group_removed",
        "payload": {"channel_id": channel}
    }))
    .unwrap()
}

fn ids(ids: &[&str]) -> Vec<ChannelId> {
    ids.iter().map(|id| ChannelId::new(*id)).collect()
}

async fn seeded_handler() -> (Arc<CoreRpcHandler>, Arc<InMemoryTransport>) {
    let transport = Arc::new(InMemoryTransport::new().with_subscribe_delay(Duration::from_millis(1)));
    let handler = create_handler(transport.clone());
    handler
        .handle_agent_rpc(AGENT_TOPIC, &full_list(&["a", "b", "c"]))
        .await;
    (handler, transport)
}

// ----------------------------------------------------------------------------
// Full Replace vs Remove
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_replace_then_remove_converges() {
    let (handler, transport) = seeded_handler().await;

    handler.handle_agent_rpc(AGENT_TOPIC, &full_list(&["c", "d"])).await;
    handler.handle_agent_rpc(AGENT_TOPIC, &group_removed("b")).await;

    assert_eq!(handler.subscriptions().await, ids(&["c", "d"]));
    assert_eq!(transport.subscribed().await, ids(&["c", "d"]));
}

#[tokio::test]
async fn test_remove_then_replace_converges() {
    let (handler, transport) = seeded_handler().await;

    handler.handle_agent_rpc(AGENT_TOPIC, &group_removed("b")).await;
    handler.handle_agent_rpc(AGENT_TOPIC, &full_list(&["c", "d"])).await;

    assert_eq!(handler.subscriptions().await, ids(&["c", "d"]));
    assert_eq!(transport.subscribed().await, ids(&["c", "d"]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_replace_and_remove_converge() {
    for _ in 0..25 {
        let (handler, _transport) = seeded_handler().await;

        let replace = {
            let handler = handler.clone();
            tokio::spawn(async move {
                handler.handle_agent_rpc(AGENT_TOPIC, &full_list(&["c", "d"])).await;
            })
        };
        let remove = {
            let handler = handler.clone();
            tokio::spawn(async move {
                handler
                    .handle_group_rpc("channels/b/messages/fromcore", &group_removed("b"))
                    .await;
            })
        };
        let (replaced, removed) = tokio::join!(replace, remove);
        replaced.unwrap();
        removed.unwrap();

        assert_eq!(handler.subscriptions().await, ids(&["c", "d"]));
    }
}

// ----------------------------------------------------------------------------
// Concurrent Incremental Adds
// ----------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_incremental_adds_lose_nothing() {
    let transport = Arc::new(InMemoryTransport::new().with_subscribe_delay(Duration::from_millis(1)));
    let handler = create_handler(transport);

    let channels: Vec<String> = (0..16).map(|i| format!("ch-{}", i)).collect();
    let mut tasks = Vec::new();
    for channel in channels.clone() {
        let handler = handler.clone();
        tasks.push(tokio::spawn(async move {
            handler.handle_agent_rpc(AGENT_TOPIC, &incremental(&channel)).await;
        }));
    }
    for task in futures::future::join_all(tasks).await {
        task.unwrap();
    }

    let mut subscribed: Vec<String> = handler
        .subscriptions()
        .await
        .iter()
        .map(|id| id.to_string())
        .collect();
    subscribed.sort();
    let mut expected = channels;
    expected.sort();
    assert_eq!(subscribed, expected);
    assert_eq!(handler.stats().applied, 16);
}
