use serde::{Deserialize, Serialize};

use crate::store::{Mode, ModeId};

/// The fixed set of variant names a synchronization supports, in order.
///
/// # Examples
///
/// ```
/// use tokensync::VariantSet;
///
/// let variants = VariantSet::new(["light", "dark"]);
/// let path = ["theme", "dark", "background"];
/// assert_eq!(variants.variant_of(&path), Some("dark"));
/// assert_eq!(variants.variant_of(&["corner", "small"]), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantSet(Vec<String>);

impl VariantSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !set.contains(&name) {
                set.push(name);
            }
        }
        VariantSet(set)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|v| v == name)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// The first path segment that names a supported variant.
    pub fn variant_of<'a, S: AsRef<str>>(&self, path: &'a [S]) -> Option<&'a str> {
        for segment in path {
            let segment: &str = segment.as_ref();
            if self.contains(segment) {
                return Some(segment);
            }
        }
        None
    }
}

impl Default for VariantSet {
    fn default() -> Self {
        VariantSet::new(["light", "dark"])
    }
}

/// Supported variant names mapped to the host's mode ids.
///
/// Built once per run from the target collection's modes. Variants the
/// collection does not declare get no entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantMap {
    entries: Vec<(String, ModeId)>,
}

impl VariantMap {
    pub fn from_modes(variants: &VariantSet, modes: &[Mode]) -> Self {
        let entries = variants
            .names()
            .iter()
            .filter_map(|variant| {
                modes
                    .iter()
                    .find(|mode| &mode.name == variant)
                    .map(|mode| (variant.clone(), mode.mode_id.clone()))
            })
            .collect();
        VariantMap { entries }
    }

    /// Mode for one variant, if the collection declares it.
    pub fn mode(&self, variant: &str) -> Option<&ModeId> {
        self.entries
            .iter()
            .find(|(name, _)| name == variant)
            .map(|(_, mode)| mode)
    }

    /// Every mapped mode, in variant order.
    pub fn modes(&self) -> impl Iterator<Item = &ModeId> {
        self.entries.iter().map(|(_, mode)| mode)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
