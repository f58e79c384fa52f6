//! Synchronization settings: target collection, supported variants and the
//! ordered transform rules.
//!
//! Rules can be built in code with arbitrary name/value closures, or loaded
//! from JSON using the built-in name strategies and value transforms:
//!
//! ```json
//! {
//!   "collection": "Demo Collection",
//!   "variants": ["light", "dark"],
//!   "rules": [
//!     { "pattern": "corner", "type": "FLOAT", "name": { "join": "/" }, "value": "px-to-number" },
//!     { "pattern": "theme/*", "type": "COLOR",
//!       "name": { "prefix": "themed/", "skip": 2, "separator": "-" }, "value": "hex-to-rgba" }
//!   ]
//! }
//! ```

use serde::Deserialize;

use crate::{
    store::VariableType,
    transform::{TransformRegistry, TransformRule, names, values},
    variant::VariantSet,
};

pub const DEFAULT_COLLECTION: &str = "Demo Collection";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rule {index} has an empty pattern")]
    EmptyPattern { index: usize },

    #[error("The variant list is empty")]
    NoVariants,
}

/// Everything a run needs besides the tree and the store.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Name of the variable collection to update
    pub collection: String,
    pub variants: VariantSet,
    pub registry: TransformRegistry,
}

impl SyncConfig {
    pub fn new(collection: impl Into<String>, variants: VariantSet, registry: TransformRegistry) -> Self {
        SyncConfig {
            collection: collection.into(),
            variants,
            registry,
        }
    }

    /// Loads a config document. Missing fields fall back to the defaults.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(input)?;
        file.into_config()
    }
}

impl Default for SyncConfig {
    /// Corner radii, base colors and themed colors, synchronized into
    /// "Demo Collection" with light and dark modes.
    fn default() -> Self {
        let registry = TransformRegistry::new()
            .with_rule(
                TransformRule::new("corner", VariableType::Float, names::join("/"))
                    .with_value(values::dimension),
            )
            .with_rule(
                TransformRule::new("color", VariableType::Color, names::join("/"))
                    .with_value(values::color),
            )
            .with_rule(
                // ["theme", "light", "background"] -> "themed/background"
                TransformRule::new("theme/*", VariableType::Color, names::prefixed("themed/", 2, "-"))
                    .with_value(values::color),
            );
        SyncConfig::new(DEFAULT_COLLECTION, VariantSet::default(), registry)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    collection: Option<String>,
    variants: Option<Vec<String>>,
    rules: Option<Vec<RuleSpec>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSpec {
    pattern: String,
    #[serde(rename = "type")]
    target_type: VariableType,
    #[serde(default)]
    name: NameSpec,
    #[serde(default)]
    value: Option<ValueSpec>,
}

/// How a rule derives the variable name from the token path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NameSpec {
    /// `{"join": "/"}`
    Join { join: String },
    /// `{"prefix": "themed/", "skip": 2, "separator": "-"}`
    Prefixed {
        prefix: String,
        #[serde(default)]
        skip: usize,
        #[serde(default = "default_separator")]
        separator: String,
    },
}

fn default_separator() -> String {
    "/".to_string()
}

impl Default for NameSpec {
    fn default() -> Self {
        NameSpec::Join {
            join: default_separator(),
        }
    }
}

/// Built-in value transforms addressable from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ValueSpec {
    #[serde(rename = "px-to-number", alias = "dimension")]
    PxToNumber,
    #[serde(rename = "hex-to-rgba", alias = "color")]
    HexToRgba,
}

impl RuleSpec {
    fn into_rule(self) -> TransformRule {
        let rule = match self.name {
            NameSpec::Join { join } => TransformRule::new(&self.pattern, self.target_type, names::join(&join)),
            NameSpec::Prefixed {
                prefix,
                skip,
                separator,
            } => TransformRule::new(
                &self.pattern,
                self.target_type,
                names::prefixed(&prefix, skip, &separator),
            ),
        };
        match self.value {
            Some(ValueSpec::PxToNumber) => rule.with_value(values::dimension),
            Some(ValueSpec::HexToRgba) => rule.with_value(values::color),
            None => rule,
        }
    }
}

impl ConfigFile {
    fn into_config(self) -> Result<SyncConfig, ConfigError> {
        let defaults = SyncConfig::default();

        let variants = match self.variants {
            Some(names) if names.is_empty() => return Err(ConfigError::NoVariants),
            Some(names) => VariantSet::new(names),
            None => defaults.variants,
        };

        let registry = match self.rules {
            Some(specs) => {
                let mut registry = TransformRegistry::new();
                for (index, spec) in specs.into_iter().enumerate() {
                    let rule = spec.into_rule();
                    if rule.pattern.segments().is_empty() {
                        return Err(ConfigError::EmptyPattern { index });
                    }
                    registry.register(rule);
                }
                registry
            }
            None => defaults.registry,
        };

        Ok(SyncConfig {
            collection: self.collection.unwrap_or(defaults.collection),
            variants,
            registry,
        })
    }
}
