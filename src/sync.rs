//! The synchronization engine.
//!
//! A run has two phases separated by a barrier:
//!
//! 1. **Traversal** walks the token tree depth-first. Matched literal leaves
//!    are materialized right away; matched alias leaves are queued.
//! 2. **Alias resolution** drains the queue. Every direct value already
//!    exists at this point, so an alias may point at a token that appears
//!    later in the tree.
//!
//! All mutable state (the variable index and the alias queue) lives on a
//! [`SyncSession`], which is built for one run and consumed by it.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::SyncConfig,
    reference::ReferenceError,
    store::{CollectionInfo, ModeId, StoreError, VariableId, VariableRecord, VariableStore, VariableType},
    token::{Token, TokenNode, TokenTree},
    transform::{TransformError, TransformRegistry},
    value::VariableValue,
    variant::{VariantMap, VariantSet},
};

/// Errors produced by a synchronization run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No local collection carries the configured name
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// A value transform rejected a leaf
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// A leaf's authored literal holds a broken reference marker
    #[error("Token '{path}': {source}")]
    MalformedReference {
        path: String,
        #[source]
        source: ReferenceError,
    },

    /// The referenced token has no synchronized variable
    #[error("Alias '{alias}' references '{target}', which has no synchronized variable")]
    AliasTargetMissing { alias: String, target: String },

    /// The referenced token is itself an alias
    #[error("Alias '{alias}' references '{target}', which is itself an alias")]
    UnsupportedAliasChain { alias: String, target: String },

    /// The store refused to create a variable
    #[error("Store failed to create '{name}': {source}")]
    Store {
        name: String,
        #[source]
        source: StoreError,
    },
}

/// Kinds of failures that are collected instead of aborting the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    AliasTargetMissing,
    UnsupportedAliasChain,
    StoreRejected,
}

/// A collected, non-fatal failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncFailure {
    pub kind: FailureKind,
    /// Dot path of the token being synchronized
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ModeId>,
    pub message: String,
}

/// What a run did to the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    /// Names of variables created during the run
    pub created: Vec<String>,
    /// Per-mode value assignments that succeeded
    pub values_set: usize,
    /// Per-mode alias assignments that succeeded
    pub aliases_set: usize,
    /// Leaves no rule matched
    pub skipped: Vec<String>,
    /// Alias leaves whose value was copied because it cannot be referenced
    pub materialized: Vec<String>,
    /// Queued aliases that no longer exist in the tree
    pub stale: Vec<String>,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A leaf queued for the alias phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAlias {
    pub dot_path: String,
}

#[derive(Clone, Copy)]
enum Assignment<'v> {
    Value(&'v VariableValue),
    Alias(&'v str),
}

/// State for one synchronization run against one collection.
pub struct SyncSession<'a, S: VariableStore> {
    store: &'a mut S,
    tree: &'a TokenTree,
    registry: &'a TransformRegistry,
    variants: &'a VariantSet,
    collection: CollectionInfo,
    modes: VariantMap,
    /// Cache over the store, keyed by variable id
    index: HashMap<VariableId, VariableRecord>,
    by_name: HashMap<String, VariableId>,
    pending: Vec<PendingAlias>,
    report: SyncReport,
}

impl<'a, S: VariableStore> SyncSession<'a, S> {
    /// Locates the target collection, maps its modes and indexes the
    /// variables it already holds.
    pub fn new(store: &'a mut S, tree: &'a TokenTree, config: &'a SyncConfig) -> Result<Self, SyncError> {
        let collection = store
            .local_collections()
            .into_iter()
            .find(|c| c.name == config.collection)
            .ok_or_else(|| SyncError::CollectionNotFound(config.collection.clone()))?;

        let modes = VariantMap::from_modes(&config.variants, &collection.modes);
        if modes.is_empty() {
            warn!(
                collection = %collection.name,
                "None of the configured variants exist as modes; nothing will be assigned"
            );
        }

        let mut session = SyncSession {
            store,
            tree,
            registry: &config.registry,
            variants: &config.variants,
            collection,
            modes,
            index: HashMap::new(),
            by_name: HashMap::new(),
            pending: Vec::new(),
            report: SyncReport::default(),
        };
        let ids = session.collection.variable_ids.clone();
        for id in ids {
            if let Some(record) = session.store.variable_by_id(&id) {
                session.remember(record);
            }
        }
        debug!(
            collection = %session.collection.name,
            variables = session.index.len(),
            modes = session.modes.len(),
            "Session ready"
        );
        Ok(session)
    }

    /// Runs both phases and returns the report.
    pub fn run(mut self) -> Result<SyncReport, SyncError> {
        self.traverse()?;
        self.resolve_aliases()?;
        info!(
            created = self.report.created.len(),
            values = self.report.values_set,
            aliases = self.report.aliases_set,
            failures = self.report.failures.len(),
            "Synchronization finished"
        );
        Ok(self.report)
    }

    pub fn pending(&self) -> &[PendingAlias] {
        &self.pending
    }

    pub fn report(&self) -> &SyncReport {
        &self.report
    }

    pub fn variant_map(&self) -> &VariantMap {
        &self.modes
    }

    // ========================================
    // Traversal
    // ========================================

    /// Walks the whole tree, materializing literals and queueing aliases.
    pub fn traverse(&mut self) -> Result<(), SyncError> {
        let tree = self.tree;
        self.visit(tree.root())
    }

    fn visit(&mut self, node: &'a TokenNode) -> Result<(), SyncError> {
        match node {
            TokenNode::Group(children) => {
                for (_, child) in children {
                    self.visit(child)?;
                }
                Ok(())
            }
            TokenNode::Leaf(token) => self.visit_leaf(token),
        }
    }

    fn visit_leaf(&mut self, token: &'a Token) -> Result<(), SyncError> {
        let dot_path = token.dot_path();
        let registry = self.registry;

        let Some(resolved) = registry.resolve(token)? else {
            debug!(token = %dot_path, "No transform matches, skipping");
            self.report.skipped.push(dot_path);
            return Ok(());
        };
        debug!(token = %dot_path, pattern = %resolved.rule.pattern, name = %resolved.name, "Transform matched");

        let reference = token
            .reference()
            .map_err(|source| SyncError::MalformedReference {
                path: dot_path.clone(),
                source,
            })?;
        if reference.is_some() {
            debug!(token = %dot_path, "Deferring alias");
            self.pending.push(PendingAlias { dot_path });
            return Ok(());
        }

        let variable = self.find_or_create(&resolved.name, resolved.rule.target_type)?;
        self.assign(None, &dot_path, &variable, &resolved.name, Assignment::Value(&resolved.value));
        Ok(())
    }

    // ========================================
    // Alias resolution
    // ========================================

    /// Drains the alias queue.
    ///
    /// Missing targets and alias chains are collected as failures; transform
    /// and store-creation errors abort.
    pub fn resolve_aliases(&mut self) -> Result<(), SyncError> {
        let pending = std::mem::take(&mut self.pending);
        for alias in &pending {
            match self.resolve_alias(alias) {
                Ok(()) => {}
                Err(err @ SyncError::AliasTargetMissing { .. }) => {
                    self.collect(FailureKind::AliasTargetMissing, &alias.dot_path, &err)
                }
                Err(err @ SyncError::UnsupportedAliasChain { .. }) => {
                    self.collect(FailureKind::UnsupportedAliasChain, &alias.dot_path, &err)
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn resolve_alias(&mut self, alias: &PendingAlias) -> Result<(), SyncError> {
        let tree = self.tree;
        let registry = self.registry;

        let Some(token) = tree.get(&alias.dot_path) else {
            warn!(token = %alias.dot_path, "Queued alias no longer exists in the tree");
            self.report.stale.push(alias.dot_path.clone());
            return Ok(());
        };
        let variant = self.variants.variant_of(&token.path);

        let Some(resolved) = registry.resolve(token)? else {
            return Ok(());
        };
        let variable = self.find_or_create(&resolved.name, resolved.rule.target_type)?;

        let reference = token
            .reference()
            .map_err(|source| SyncError::MalformedReference {
                path: alias.dot_path.clone(),
                source,
            })?;
        let reference = match reference {
            Some(reference) if resolved.value.is_referenceable() => reference,
            _ => {
                info!(token = %alias.dot_path, name = %resolved.name, "Value cannot be referenced, copying it");
                self.report.materialized.push(alias.dot_path.clone());
                self.assign(variant, &alias.dot_path, &variable, &resolved.name, Assignment::Value(&resolved.value));
                return Ok(());
            }
        };

        let target_path = reference.dot_path();
        let missing = || SyncError::AliasTargetMissing {
            alias: alias.dot_path.clone(),
            target: target_path.clone(),
        };

        let target = tree.get_path(&reference.path).ok_or_else(missing)?;
        if target.is_alias() {
            return Err(SyncError::UnsupportedAliasChain {
                alias: alias.dot_path.clone(),
                target: target_path.clone(),
            });
        }
        let target_resolved = registry.resolve(target)?.ok_or_else(missing)?;
        let target_id = self.lookup(&target_resolved.name).ok_or_else(missing)?;

        info!(token = %alias.dot_path, name = %resolved.name, target = %target_resolved.name, "Creating alias");
        self.assign(variant, &alias.dot_path, &variable, &resolved.name, Assignment::Alias(&target_id));
        Ok(())
    }

    // ========================================
    // Store access
    // ========================================

    fn remember(&mut self, record: VariableRecord) -> VariableId {
        let id = record.id.clone();
        self.by_name.insert(record.name.clone(), id.clone());
        self.index.insert(id.clone(), record);
        id
    }

    /// Finds a variable by name, in the index first and then in the store.
    fn lookup(&mut self, name: &str) -> Option<VariableId> {
        if let Some(id) = self.by_name.get(name) {
            return Some(id.clone());
        }
        let record = self.store.find_variable_by_name(&self.collection.id, name)?;
        Some(self.remember(record))
    }

    fn find_or_create(&mut self, name: &str, kind: VariableType) -> Result<VariableId, SyncError> {
        if let Some(id) = self.lookup(name) {
            return Ok(id);
        }

        let record = self
            .store
            .create_variable(name, &self.collection.id, kind)
            .map_err(|source| SyncError::Store {
                name: name.to_string(),
                source,
            })?;
        info!(name = %name, kind = %kind, id = %record.id, "Created variable");
        self.report.created.push(name.to_string());
        Ok(self.remember(record))
    }

    /// Assigns a value or alias for one variant's mode, or for every mapped
    /// mode when `variant` is `None`. Store rejections are collected.
    fn assign(
        &mut self,
        variant: Option<&str>,
        token: &str,
        variable: &str,
        name: &str,
        assignment: Assignment<'_>,
    ) {
        let modes: Vec<ModeId> = match variant {
            Some(variant) => match self.modes.mode(variant) {
                Some(mode) => vec![mode.clone()],
                None => {
                    debug!(token = %token, variant = %variant, "Variant has no mode in the collection");
                    Vec::new()
                }
            },
            None => self.modes.modes().cloned().collect(),
        };

        for mode in modes {
            let result = match assignment {
                Assignment::Value(value) => self.store.set_value_for_mode(variable, &mode, value),
                Assignment::Alias(target) => self.store.set_alias_for_mode(variable, &mode, target),
            };
            match (result, &assignment) {
                (Ok(()), Assignment::Value(_)) => self.report.values_set += 1,
                (Ok(()), Assignment::Alias(_)) => self.report.aliases_set += 1,
                (Err(err), _) => {
                    warn!(token = %token, name = %name, mode = %mode, error = %err, "Store rejected assignment");
                    self.report.failures.push(SyncFailure {
                        kind: FailureKind::StoreRejected,
                        token: token.to_string(),
                        variable: Some(name.to_string()),
                        mode: Some(mode),
                        message: err.to_string(),
                    });
                }
            }
        }
    }

    fn collect(&mut self, kind: FailureKind, token: &str, err: &SyncError) {
        warn!(token = %token, error = %err, "Alias not resolved");
        self.report.failures.push(SyncFailure {
            kind,
            token: token.to_string(),
            variable: None,
            mode: None,
            message: err.to_string(),
        });
    }
}

/// Runs a full synchronization of `tree` into `store`.
///
/// # Examples
///
/// ```
/// use tokensync::{synchronize, MemoryStore, SyncConfig, TokenTree};
///
/// let tree = TokenTree::from_json_str(r#"{
///     "corner": { "small": { "value": "4px", "original": { "value": "4px" },
///                            "path": ["corner", "small"] } }
/// }"#).unwrap();
///
/// let mut store = MemoryStore::new();
/// store.add_collection("Demo Collection", &["light", "dark"]);
///
/// let report = synchronize(&mut store, &tree, &SyncConfig::default()).unwrap();
/// assert_eq!(report.created, vec!["corner/small"]);
/// assert_eq!(report.values_set, 2);
/// ```
pub fn synchronize<S: VariableStore>(
    store: &mut S,
    tree: &TokenTree,
    config: &SyncConfig,
) -> Result<SyncReport, SyncError> {
    SyncSession::new(store, tree, config)?.run()
}
