//! Policy application bridge
//!
//! Applying a policy batch is a two-step contract: every policy goes to the
//! engine in order, then exactly one `Online` heartbeat goes out for the
//! whole batch.

use std::sync::Arc;

use tracing::{debug, info};

use fleet_core::{
    AgentPolicyPayload, AgentState, HeartbeatSink, PolicyEngine, TimeSource, Timestamp,
};

/// Forwards policy batches to the policy engine and reports liveness after
pub struct PolicyBridge {
    engine: Arc<dyn PolicyEngine>,
    heartbeats: Arc<dyn HeartbeatSink>,
    time_source: Arc<dyn TimeSource>,
}

impl PolicyBridge {
    pub fn new(
        engine: Arc<dyn PolicyEngine>,
        heartbeats: Arc<dyn HeartbeatSink>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            engine,
            heartbeats,
            time_source,
        }
    }

    /// Apply a batch, then heartbeat once. Returns the number of policies applied.
    pub async fn apply_policies(&self, payloads: Vec<AgentPolicyPayload>) -> usize {
        let applied = self.apply_all(payloads).await;
        let timestamp = self.send_online_heartbeat().await;
        info!(applied, %timestamp, "applied agent policies");
        applied
    }

    /// Hand each payload to the engine, sequentially and in the given order
    pub async fn apply_all(&self, payloads: Vec<AgentPolicyPayload>) -> usize {
        let mut applied = 0;
        for payload in payloads {
            debug!(policy_id = %payload.id, action = payload.action.as_str(), "managing policy");
            self.engine.manage_policy(payload).await;
            applied += 1;
        }
        applied
    }

    /// Report the agent as online at the current time
    pub async fn send_online_heartbeat(&self) -> Timestamp {
        let timestamp = self.time_source.now();
        self.heartbeats
            .send_heartbeat(timestamp, AgentState::Online)
            .await;
        timestamp
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Records engine calls and heartbeats in one log so their order is visible
    #[derive(Default)]
    struct CallLog {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PolicyEngine for CallLog {
        async fn manage_policy(&self, payload: AgentPolicyPayload) {
            self.calls.lock().await.push(format!("policy:{}", payload.id));
        }
    }

    #[async_trait]
    impl HeartbeatSink for CallLog {
        async fn send_heartbeat(&self, timestamp: Timestamp, state: AgentState) {
            self.calls
                .lock()
                .await
                .push(format!("heartbeat:{}:{}", state, timestamp.as_millis()));
        }
    }

    struct FixedClock(u64);

    impl TimeSource for FixedClock {
        fn now(&self) -> Timestamp {
            Timestamp::new(self.0)
        }
    }

    fn bridge(log: Arc<CallLog>) -> PolicyBridge {
        PolicyBridge::new(log.clone(), log, Arc::new(FixedClock(1_000)))
    }

    #[tokio::test]
    async fn test_batch_applies_in_order_then_heartbeats_once() {
        let log = Arc::new(CallLog::default());
        let bridge = bridge(log.clone());

        let payloads = ["p3", "p1", "p2"]
            .into_iter()
            .map(AgentPolicyPayload::new)
            .collect();
        assert_eq!(bridge.apply_policies(payloads).await, 3);

        assert_eq!(
            *log.calls.lock().await,
            vec![
                "policy:p3".to_string(),
                "policy:p1".to_string(),
                "policy:p2".to_string(),
                "heartbeat:online:1000".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_batch_still_heartbeats() {
        let log = Arc::new(CallLog::default());
        let bridge = bridge(log.clone());

        assert_eq!(bridge.apply_policies(Vec::new()).await, 0);
        assert_eq!(
            *log.calls.lock().await,
            vec!["heartbeat:online:1000".to_string()]
        );
    }

    #[tokio::test]
    async fn test_steps_are_independent() {
        let log = Arc::new(CallLog::default());
        let bridge = bridge(log.clone());

        bridge.apply_all(vec![AgentPolicyPayload::new("p1")]).await;
        assert_eq!(*log.calls.lock().await, vec!["policy:p1".to_string()]);

        assert_eq!(bridge.send_online_heartbeat().await, Timestamp::new(1_000));
        assert_eq!(log.calls.lock().await.len(), 2);
    }
}
