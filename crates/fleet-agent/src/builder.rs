//! Agent Builder API
//!
//! Wires configuration and the external collaborators into a
//! [`CoreRpcHandler`] ready to be registered with the transport.

use std::sync::Arc;

use tracing::info;

use fleet_core::{
    AgentConfig, ChannelTransport, FleetResult, HeartbeatSink, PolicyEngine, SystemTimeSource,
    TimeSource,
};

use crate::handler::CoreRpcHandler;
use crate::managers::{PolicyBridge, SubscriptionReconciler};

/// Builder for the RPC engine of one agent
pub struct AgentBuilder {
    config: AgentConfig,
    transport: Arc<dyn ChannelTransport>,
    policy_engine: Arc<dyn PolicyEngine>,
    heartbeat_sink: Arc<dyn HeartbeatSink>,
    time_source: Arc<dyn TimeSource>,
}

impl AgentBuilder {
    /// Create a builder with default configuration and the system clock
    pub fn new(
        transport: Arc<dyn ChannelTransport>,
        policy_engine: Arc<dyn PolicyEngine>,
        heartbeat_sink: Arc<dyn HeartbeatSink>,
    ) -> Self {
        Self {
            config: AgentConfig::default(),
            transport,
            policy_engine,
            heartbeat_sink,
            time_source: Arc::new(SystemTimeSource::new()),
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the clock used for heartbeat timestamps
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    /// Validate the configuration and assemble the handler
    pub fn build(self) -> FleetResult<CoreRpcHandler> {
        self.config.validate()?;
        info!(agent_id = %self.config.agent_id, "building RPC handler");

        let reconciler = Arc::new(SubscriptionReconciler::new(
            self.transport,
            self.config.subscriptions.clone(),
        ));
        let policies = Arc::new(PolicyBridge::new(
            self.policy_engine,
            self.heartbeat_sink,
            self.time_source,
        ));
        Ok(CoreRpcHandler::new(self.config, reconciler, policies))
    }
}
