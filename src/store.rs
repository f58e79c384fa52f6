//! The host's variable store, seen through the four operations the
//! synchronizer needs, plus an in-memory implementation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::VariableValue;

pub type VariableId = String;
pub type ModeId = String;
pub type CollectionId = String;

/// Resolved data type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableType {
    Boolean,
    Float,
    String,
    Color,
}

impl std::fmt::Display for VariableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VariableType::Boolean => "BOOLEAN",
            VariableType::Float => "FLOAT",
            VariableType::String => "STRING",
            VariableType::Color => "COLOR",
        };
        f.write_str(name)
    }
}

/// Failures reported by the store. The synchronizer never retries them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Unknown collection: {0}")]
    UnknownCollection(CollectionId),

    #[error("Unknown variable: {0}")]
    UnknownVariable(VariableId),

    #[error("Mode {mode} does not exist in the collection of variable {variable}")]
    UnknownMode { variable: VariableId, mode: ModeId },

    #[error("Variable '{name}' is {expected}, cannot hold a {found} value")]
    TypeMismatch {
        name: String,
        expected: VariableType,
        found: VariableType,
    },

    #[error("A variable named '{0}' already exists in the collection")]
    DuplicateName(String),

    #[error("Variable {0} cannot alias itself")]
    SelfAlias(VariableId),

    /// Host-specific refusal with no dedicated variant, raised by adapters
    /// over a real host store.
    #[error("Rejected by host: {0}")]
    Rejected(String),
}

/// A named mode of a collection (e.g. "light").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mode {
    pub mode_id: ModeId,
    pub name: String,
}

/// A variable collection as the host describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    pub id: CollectionId,
    pub name: String,
    pub modes: Vec<Mode>,
    #[serde(default)]
    pub variable_ids: Vec<VariableId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AliasKind {
    VariableAlias,
}

/// A per-mode reference to another variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableAlias {
    #[serde(rename = "type")]
    pub kind: AliasKind,
    pub id: VariableId,
}

impl VariableAlias {
    pub fn to(id: impl Into<VariableId>) -> Self {
        VariableAlias {
            kind: AliasKind::VariableAlias,
            id: id.into(),
        }
    }
}

/// What a variable holds for one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModeValue {
    Alias(VariableAlias),
    Value(VariableValue),
}

impl ModeValue {
    pub fn alias_target(&self) -> Option<&str> {
        match self {
            ModeValue::Alias(alias) => Some(&alias.id),
            ModeValue::Value(_) => None,
        }
    }

    pub fn value(&self) -> Option<&VariableValue> {
        match self {
            ModeValue::Value(value) => Some(value),
            ModeValue::Alias(_) => None,
        }
    }
}

/// A variable owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableRecord {
    pub id: VariableId,
    pub name: String,
    pub variable_collection_id: CollectionId,
    pub resolved_type: VariableType,
    #[serde(default)]
    pub values_by_mode: BTreeMap<ModeId, ModeValue>,
}

/// Capability interface over the host's variable store.
///
/// All calls are synchronous and side-effecting.
pub trait VariableStore {
    /// Collections visible to the synchronizer.
    fn local_collections(&self) -> Vec<CollectionInfo>;

    fn variable_by_id(&self, id: &str) -> Option<VariableRecord>;

    fn find_variable_by_name(&self, collection_id: &str, name: &str) -> Option<VariableRecord>;

    fn create_variable(
        &mut self,
        name: &str,
        collection_id: &str,
        kind: VariableType,
    ) -> Result<VariableRecord, StoreError>;

    fn set_value_for_mode(
        &mut self,
        variable_id: &str,
        mode_id: &str,
        value: &VariableValue,
    ) -> Result<(), StoreError>;

    fn set_alias_for_mode(
        &mut self,
        variable_id: &str,
        mode_id: &str,
        target_id: &str,
    ) -> Result<(), StoreError>;
}

/// An in-memory store that enforces the host's checks: values must match the
/// variable type, modes must belong to the variable's collection, and alias
/// targets must exist with the same type.
///
/// Serializes to the snapshot format read and written by the CLI.
///
/// # Examples
///
/// ```
/// use tokensync::store::{MemoryStore, VariableStore, VariableType};
/// use tokensync::VariableValue;
///
/// let mut store = MemoryStore::new();
/// let collection = store.add_collection("Demo Collection", &["light", "dark"]);
/// let var = store
///     .create_variable("corner/small", &collection, VariableType::Float)
///     .unwrap();
/// let light = store.mode_id(&collection, "light").unwrap();
///
/// store.set_value_for_mode(&var.id, &light, &VariableValue::Float(4.0)).unwrap();
/// assert!(store
///     .set_value_for_mode(&var.id, &light, &VariableValue::String("4px".into()))
///     .is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    collections: Vec<CollectionInfo>,
    #[serde(default)]
    variables: BTreeMap<VariableId, VariableRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Adds a collection with the given mode names and returns its id.
    pub fn add_collection(&mut self, name: &str, modes: &[&str]) -> CollectionId {
        let index = self.collections.len() + 1;
        let id = format!("VariableCollectionId:{}", index);
        let modes = modes
            .iter()
            .enumerate()
            .map(|(m, mode)| Mode {
                mode_id: format!("{}:{}", index, m),
                name: mode.to_string(),
            })
            .collect();
        self.collections.push(CollectionInfo {
            id: id.clone(),
            name: name.to_string(),
            modes,
            variable_ids: Vec::new(),
        });
        id
    }

    pub fn mode_id(&self, collection_id: &str, mode_name: &str) -> Option<ModeId> {
        self.collection(collection_id)?
            .modes
            .iter()
            .find(|mode| mode.name == mode_name)
            .map(|mode| mode.mode_id.clone())
    }

    pub fn collection(&self, collection_id: &str) -> Option<&CollectionInfo> {
        self.collections.iter().find(|c| c.id == collection_id)
    }

    pub fn variable(&self, id: &str) -> Option<&VariableRecord> {
        self.variables.get(id)
    }

    /// First variable with this name in any collection.
    pub fn variable_named(&self, name: &str) -> Option<&VariableRecord> {
        self.variables.values().find(|v| v.name == name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableRecord> {
        self.variables.values()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    fn next_variable_id(&self) -> VariableId {
        let mut n = self.variables.len() + 1;
        loop {
            let id = format!("VariableID:{}", n);
            if !self.variables.contains_key(&id) {
                return id;
            }
            n += 1;
        }
    }

    fn check_mode(&self, variable: &VariableRecord, mode_id: &str) -> Result<(), StoreError> {
        let known = self
            .collection(&variable.variable_collection_id)
            .is_some_and(|c| c.modes.iter().any(|m| m.mode_id == mode_id));
        if known {
            Ok(())
        } else {
            Err(StoreError::UnknownMode {
                variable: variable.id.clone(),
                mode: mode_id.to_string(),
            })
        }
    }
}

impl VariableStore for MemoryStore {
    fn local_collections(&self) -> Vec<CollectionInfo> {
        self.collections.clone()
    }

    fn variable_by_id(&self, id: &str) -> Option<VariableRecord> {
        self.variables.get(id).cloned()
    }

    fn find_variable_by_name(&self, collection_id: &str, name: &str) -> Option<VariableRecord> {
        self.variables
            .values()
            .find(|v| v.variable_collection_id == collection_id && v.name == name)
            .cloned()
    }

    fn create_variable(
        &mut self,
        name: &str,
        collection_id: &str,
        kind: VariableType,
    ) -> Result<VariableRecord, StoreError> {
        if self.collection(collection_id).is_none() {
            return Err(StoreError::UnknownCollection(collection_id.to_string()));
        }
        if self.find_variable_by_name(collection_id, name).is_some() {
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        let record = VariableRecord {
            id: self.next_variable_id(),
            name: name.to_string(),
            variable_collection_id: collection_id.to_string(),
            resolved_type: kind,
            values_by_mode: BTreeMap::new(),
        };
        if let Some(collection) = self.collections.iter_mut().find(|c| c.id == collection_id) {
            collection.variable_ids.push(record.id.clone());
        }
        self.variables.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn set_value_for_mode(
        &mut self,
        variable_id: &str,
        mode_id: &str,
        value: &VariableValue,
    ) -> Result<(), StoreError> {
        let variable = self
            .variables
            .get(variable_id)
            .ok_or_else(|| StoreError::UnknownVariable(variable_id.to_string()))?;
        self.check_mode(variable, mode_id)?;
        if value.kind() != variable.resolved_type {
            return Err(StoreError::TypeMismatch {
                name: variable.name.clone(),
                expected: variable.resolved_type,
                found: value.kind(),
            });
        }

        if let Some(variable) = self.variables.get_mut(variable_id) {
            variable
                .values_by_mode
                .insert(mode_id.to_string(), ModeValue::Value(value.clone()));
        }
        Ok(())
    }

    fn set_alias_for_mode(
        &mut self,
        variable_id: &str,
        mode_id: &str,
        target_id: &str,
    ) -> Result<(), StoreError> {
        if variable_id == target_id {
            return Err(StoreError::SelfAlias(variable_id.to_string()));
        }
        let variable = self
            .variables
            .get(variable_id)
            .ok_or_else(|| StoreError::UnknownVariable(variable_id.to_string()))?;
        let target = self
            .variables
            .get(target_id)
            .ok_or_else(|| StoreError::UnknownVariable(target_id.to_string()))?;
        self.check_mode(variable, mode_id)?;
        if target.resolved_type != variable.resolved_type {
            return Err(StoreError::TypeMismatch {
                name: variable.name.clone(),
                expected: variable.resolved_type,
                found: target.resolved_type,
            });
        }

        if let Some(variable) = self.variables.get_mut(variable_id) {
            variable
                .values_by_mode
                .insert(mode_id.to_string(), ModeValue::Alias(VariableAlias::to(target_id)));
        }
        Ok(())
    }
}
