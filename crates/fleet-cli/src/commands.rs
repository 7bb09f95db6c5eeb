//! Command handlers for the fleet CLI

use std::path::Path;

use serde_json::{json, Value};
use tracing::{info, warn};

use fleet_agent::{Dispatch, RpcDispatcher};
use fleet_core::{decode_envelope, TopicScope};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::Result;
use crate::replay::Replayer;

/// Command dispatcher for handling CLI commands
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Execute a CLI command
    pub async fn execute(cli: Cli, config: AppConfig) -> Result<()> {
        match cli.command {
            Commands::Replay {
                file,
                concurrent,
                fail_channels,
            } => Self::handle_replay_command(config, &file, concurrent, fail_channels).await,
            Commands::Validate { file, group } => Self::handle_validate_command(&file, group),
        }
    }

    /// Handle the replay command
    async fn handle_replay_command(
        mut config: AppConfig,
        file: &Path,
        concurrent: bool,
        fail_channels: Vec<String>,
    ) -> Result<()> {
        config.replay.fail_channels.extend(fail_channels);
        let input = std::fs::read_to_string(file)?;

        info!(
            file = %file.display(),
            concurrent,
            agent_id = %config.agent.agent_id,
            "replaying RPC traffic"
        );
        let replayer = Replayer::new(config)?;
        let report = replayer.run(&input, concurrent).await?;

        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    /// Handle the validate command
    fn handle_validate_command(file: &Path, group: bool) -> Result<()> {
        let scope = if group {
            TopicScope::Group
        } else {
            TopicScope::Agent
        };
        let raw = std::fs::read(file)?;

        let report = Self::validate_envelope(&raw, scope)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    /// Decode, validate and route one envelope without executing it
    pub fn validate_envelope(raw: &[u8], scope: TopicScope) -> Result<Value> {
        let envelope = decode_envelope(raw)?;
        envelope.validate()?;
        let report = match RpcDispatcher::route(scope, &envelope)? {
            Dispatch::Call(call) => json!({
                "status": "supported",
                "scope": scope.to_string(),
                "call": call,
            }),
            Dispatch::Unsupported { func, payload } => {
                warn!(%scope, func = %func, "function is not handled on this scope");
                json!({
                    "status": "unsupported",
                    "scope": scope.to_string(),
                    "func": func,
                    "payload": payload,
                })
            }
        };
        Ok(report)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
