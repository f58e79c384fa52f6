//! CLI support for tokensync
//!
//! Provides programmatic access to the `sync` and `plan` commands so they can
//! be embedded in other tools or driven from tests.

mod plan;
mod sync;

pub use plan::{PlanOptions, execute_plan};
pub use sync::{SyncOptions, SyncOutcome, execute_sync};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Token tree could not be read
    #[error("Token tree error: {0}")]
    Tree(#[from] crate::TreeError),
    /// Config document could not be read
    #[error("Config error: {0}")]
    Config(#[from] crate::ConfigError),
    /// Synchronization aborted
    #[error("Sync error: {0}")]
    Sync(#[from] crate::SyncError),
    /// Store snapshot could not be parsed, or output could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// No token tree provided
    #[error("No token tree provided. Use --tokens or pipe JSON to stdin.")]
    NoInput,
}

fn load_config(config: Option<&str>) -> Result<crate::SyncConfig, CliError> {
    match config {
        Some(json) => Ok(crate::SyncConfig::from_json_str(json)?),
        None => Ok(crate::SyncConfig::default()),
    }
}
