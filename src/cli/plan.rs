//! Dry-run classification of a token tree

use super::{CliError, load_config};
use crate::{PlanEntry, TokenTree, plan};

/// Options for the plan command
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub tokens: Option<String>,
    pub config: Option<String>,
}

pub fn execute_plan(options: &PlanOptions) -> Result<Vec<PlanEntry>, CliError> {
    let tokens = options.tokens.as_ref().ok_or(CliError::NoInput)?;
    let tree = TokenTree::from_json_str(tokens)?;
    let config = load_config(options.config.as_deref())?;
    Ok(plan(&tree, &config.registry)?)
}
