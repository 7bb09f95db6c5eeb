//! NDJSON replay of control-plane RPC traffic
//!
//! Each input line is `{"topic": "...", "message": <envelope>}`. A string
//! `message` is delivered as raw bytes, which makes undecodable payloads
//! reproducible. Lines are routed to the entry point of their topic.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::warn;

use fleet_agent::{
    AgentBuilder, CoreRpcHandler, HandlerStats, InMemoryTransport, RecordingHeartbeatSink,
    RecordingPolicyEngine,
};
use fleet_core::{ChannelId, Heartbeat, TopicConfig, TopicScope};

use crate::config::AppConfig;
use crate::error::Result;

// ----------------------------------------------------------------------------
// Replay Types
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct ReplayLine {
    topic: String,
    message: Value,
}

impl ReplayLine {
    fn payload_bytes(&self) -> Result<Vec<u8>> {
        match &self.message {
            Value::String(raw) => Ok(raw.as_bytes().to_vec()),
            other => Ok(serde_json::to_vec(other)?),
        }
    }
}

/// Outcome of one input line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineOutcome {
    pub line: usize,
    pub topic: String,
    pub outcome: String,
}

/// Summary printed after a replay
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub outcomes: Vec<LineOutcome>,
    pub subscriptions: Vec<ChannelId>,
    pub transport_topics: Vec<String>,
    pub policies: Vec<String>,
    pub heartbeats: Vec<Heartbeat>,
    pub stats: HandlerStats,
}

// ----------------------------------------------------------------------------
// Replayer
// ----------------------------------------------------------------------------

/// Engine wired to in-memory collaborators
pub struct Replayer {
    config: AppConfig,
    handler: Arc<CoreRpcHandler>,
    transport: Arc<InMemoryTransport>,
    engine: Arc<RecordingPolicyEngine>,
    heartbeats: Arc<RecordingHeartbeatSink>,
}

impl Replayer {
    pub fn new(config: AppConfig) -> Result<Self> {
        let mut transport = InMemoryTransport::new().with_topics(config.agent.topics.clone());
        for channel in &config.replay.fail_channels {
            transport = transport.with_failing_channel(channel.as_str());
        }
        if config.replay.subscribe_delay_ms > 0 {
            transport = transport
                .with_subscribe_delay(Duration::from_millis(config.replay.subscribe_delay_ms));
        }

        let transport = Arc::new(transport);
        let engine = Arc::new(RecordingPolicyEngine::new());
        let heartbeats = Arc::new(RecordingHeartbeatSink::new());
        let handler = AgentBuilder::new(transport.clone(), engine.clone(), heartbeats.clone())
            .with_config(config.agent.clone())
            .build()?;

        Ok(Self {
            config,
            handler: Arc::new(handler),
            transport,
            engine,
            heartbeats,
        })
    }

    /// Replay every line of `input`, sequentially or all at once
    pub async fn run(&self, input: &str, concurrent: bool) -> Result<ReplayReport> {
        let lines: Vec<(usize, &str)> = input
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();

        let mut outcomes = Vec::with_capacity(lines.len());
        if concurrent {
            let mut tasks = JoinSet::new();
            for (number, line) in lines {
                let handler = self.handler.clone();
                let topics = self.config.agent.topics.clone();
                let line = line.to_string();
                tasks.spawn(async move { deliver(&handler, &topics, number, &line).await });
            }
            while let Some(joined) = tasks.join_next().await {
                outcomes.push(joined??);
            }
            outcomes.sort_by_key(|outcome: &LineOutcome| outcome.line);
        } else {
            for (number, line) in lines {
                let outcome = deliver(&self.handler, &self.config.agent.topics, number, line).await?;
                outcomes.push(outcome);
            }
        }

        Ok(ReplayReport {
            outcomes,
            subscriptions: self.handler.subscriptions().await,
            transport_topics: self.transport.active_topics().await,
            policies: self.engine.managed_ids().await,
            heartbeats: self.heartbeats.heartbeats().await,
            stats: self.handler.stats(),
        })
    }
}

async fn deliver(
    handler: &CoreRpcHandler,
    topics: &TopicConfig,
    number: usize,
    line: &str,
) -> Result<LineOutcome> {
    let parsed: ReplayLine = match serde_json::from_str(line) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(line = number, error = %e, "skipping unparseable replay line");
            return Ok(LineOutcome {
                line: number,
                topic: String::new(),
                outcome: format!("invalid_line:{}", e),
            });
        }
    };

    let payload = parsed.payload_bytes()?;
    let outcome = match topics.scope_for(&parsed.topic) {
        Some(TopicScope::Agent) => handler.handle_agent_rpc(&parsed.topic, &payload).await,
        Some(TopicScope::Group) => handler.handle_group_rpc(&parsed.topic, &payload).await,
        None => {
            warn!(line = number, topic = %parsed.topic, "no RPC entry point for topic");
            return Ok(LineOutcome {
                line: number,
                topic: parsed.topic,
                outcome: "unrouted".to_string(),
            });
        }
    };

    Ok(LineOutcome {
        line: number,
        topic: parsed.topic,
        outcome: outcome.label(),
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
