//! Run a synchronization against a JSON store snapshot

use super::{CliError, load_config};
use crate::{MemoryStore, SyncReport, TokenTree, synchronize};

/// Options for the sync command
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Token tree JSON, as emitted by the token compiler
    pub tokens: Option<String>,
    /// Store snapshot JSON
    pub store: String,
    /// Config JSON; the built-in config when absent
    pub config: Option<String>,
}

/// Result of a sync command
#[derive(Debug)]
pub struct SyncOutcome {
    pub report: SyncReport,
    /// The snapshot after the run
    pub store: MemoryStore,
}

/// Execute a sync against an in-memory copy of the snapshot
pub fn execute_sync(options: &SyncOptions) -> Result<SyncOutcome, CliError> {
    let tokens = options.tokens.as_ref().ok_or(CliError::NoInput)?;
    let tree = TokenTree::from_json_str(tokens)?;
    let config = load_config(options.config.as_deref())?;
    let mut store = MemoryStore::from_json_str(&options.store)?;

    let report = synchronize(&mut store, &tree, &config)?;
    Ok(SyncOutcome { report, store })
}
