//! Dry-run classification of a token tree.
//!
//! Reports, for every leaf, whether it would be skipped, written directly or
//! queued as an alias, without touching a store.

use serde::Serialize;

use crate::{
    store::VariableType,
    sync::SyncError,
    token::TokenTree,
    transform::TransformRegistry,
    value::VariableValue,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanAction {
    /// No rule matches
    Skip,
    /// Value written to every mapped mode during traversal
    Direct {
        name: String,
        #[serde(rename = "type")]
        target_type: VariableType,
        value: VariableValue,
    },
    /// Queued for the alias phase
    Alias {
        name: String,
        #[serde(rename = "type")]
        target_type: VariableType,
        target: String,
        /// False when the value must be copied instead of referenced
        referenceable: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanEntry {
    pub token: String,
    pub pattern: Option<String>,
    #[serde(flatten)]
    pub action: PlanAction,
}

/// Classifies every leaf in traversal order.
///
/// Fails on the same authoring defects a real run would abort on.
pub fn plan(tree: &TokenTree, registry: &TransformRegistry) -> Result<Vec<PlanEntry>, SyncError> {
    let mut entries = Vec::new();
    for token in tree.leaves() {
        let dot_path = token.dot_path();
        let Some(resolved) = registry.resolve(token)? else {
            entries.push(PlanEntry {
                token: dot_path,
                pattern: None,
                action: PlanAction::Skip,
            });
            continue;
        };

        let reference = token
            .reference()
            .map_err(|source| SyncError::MalformedReference {
                path: dot_path.clone(),
                source,
            })?;
        let action = match reference {
            Some(reference) => PlanAction::Alias {
                name: resolved.name,
                target_type: resolved.rule.target_type,
                target: reference.dot_path(),
                referenceable: resolved.value.is_referenceable(),
            },
            None => PlanAction::Direct {
                name: resolved.name,
                target_type: resolved.rule.target_type,
                value: resolved.value,
            },
        };
        entries.push(PlanEntry {
            token: dot_path,
            pattern: Some(resolved.rule.pattern.to_string()),
            action,
        });
    }
    Ok(entries)
}
