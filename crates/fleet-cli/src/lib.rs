//! Fleet CLI library
//!
//! Offline tooling around the fleet agent RPC engine: replaying recorded
//! control-plane traffic against in-memory collaborators and validating
//! single envelopes.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod replay;

pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use error::{CliError, Result};
pub use replay::{LineOutcome, ReplayReport, Replayer};
