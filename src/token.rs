//! The resolved token tree handed over by the token compiler.
//!
//! The compiler emits a nested JSON mapping keyed by path segment. Any object
//! carrying a `value` key is a leaf token; every other object is a group whose
//! entries are child nodes. Children keep the order they were written in.
//!
//! A leaf in the compiler's output looks like this:
//!
//! ```json
//! {
//!   "value": "#212121",
//!   "original": { "value": "{color.base.black.value}" },
//!   "attributes": { "category": "theme", "type": "light", "item": "background" },
//!   "path": ["theme", "light", "background"]
//! }
//! ```

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    reference::{Reference, ReferenceError},
    value::TokenValue,
};

/// Errors raised while ingesting a token tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("Invalid token JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Groups may only contain objects
    #[error("Token node at '{path}' is a {found}, expected an object")]
    NotAnObject { path: String, found: &'static str },

    /// The leaf's `path` field is not an array of non-empty strings
    #[error("Token at '{path}' has an invalid path field")]
    InvalidPath { path: String },
}

/// Advisory classification copied from the compiler output.
///
/// Nothing in the synchronizer depends on these fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenMetadata {
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub item: Option<String>,
    pub name: Option<String>,
    pub file_path: Option<String>,
    pub is_source: Option<bool>,
}

/// A leaf token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Position in the tree, also the dot-notation lookup key
    pub path: Vec<String>,
    /// Fully resolved value
    pub value: TokenValue,
    /// The literal as authored, before references were resolved
    pub original_value: String,
    /// Opacity override carried next to the value
    pub alpha: Option<f64>,
    pub metadata: TokenMetadata,
}

impl Token {
    /// The path joined with dots, as used for lookups and alias markers.
    pub fn dot_path(&self) -> String {
        self.path.join(".")
    }

    /// Parses the reference marker out of the authored literal.
    ///
    /// `Ok(None)` means the token holds a literal. A literal that looks like
    /// a marker but does not follow the grammar is an error.
    pub fn reference(&self) -> Result<Option<Reference>, ReferenceError> {
        Reference::parse(&self.original_value)
    }

    pub fn is_alias(&self) -> bool {
        matches!(self.reference(), Ok(Some(_)))
    }
}

/// A node of the tree: either a group of named children or a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenNode {
    Group(Vec<(String, TokenNode)>),
    Leaf(Token),
}

impl TokenNode {
    /// Looks up a direct child of a group. Leaves have no children.
    pub fn child(&self, segment: &str) -> Option<&TokenNode> {
        match self {
            TokenNode::Group(children) => children
                .iter()
                .find(|(name, _)| name == segment)
                .map(|(_, node)| node),
            TokenNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Token> {
        match self {
            TokenNode::Leaf(token) => Some(token),
            TokenNode::Group(_) => None,
        }
    }
}

/// The immutable input of a synchronization run.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenTree {
    root: TokenNode,
}

impl TokenTree {
    pub fn new(root: TokenNode) -> Self {
        TokenTree { root }
    }

    /// Parses the compiler's JSON output.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokensync::TokenTree;
    ///
    /// let tree = TokenTree::from_json_str(
    ///     r#"{"corner": {"small": {"value": "4px", "original": {"value": "4px"}}}}"#,
    /// ).unwrap();
    /// let token = tree.get("corner.small").unwrap();
    /// assert_eq!(token.path, vec!["corner", "small"]);
    /// assert!(!token.is_alias());
    /// ```
    pub fn from_json_str(input: &str) -> Result<Self, TreeError> {
        let json: serde_json::Value = serde_json::from_str(input)?;
        Self::from_json(json)
    }

    pub fn from_json(json: serde_json::Value) -> Result<Self, TreeError> {
        let mut trail = Vec::new();
        let root = node_from_json(json, &mut trail)?;
        Ok(TokenTree { root })
    }

    pub fn root(&self) -> &TokenNode {
        &self.root
    }

    /// Finds a leaf by dot-notation key, e.g. `color.base.black`.
    pub fn get(&self, dot_path: &str) -> Option<&Token> {
        let mut node = &self.root;
        for segment in dot_path.split('.') {
            node = node.child(segment)?;
        }
        node.as_leaf()
    }

    /// Finds a leaf by path segments.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Token> {
        let mut node = &self.root;
        for segment in path {
            node = node.child(segment.as_ref())?;
        }
        node.as_leaf()
    }

    /// All leaves in depth-first, insertion order.
    pub fn leaves(&self) -> Vec<&Token> {
        fn collect<'a>(node: &'a TokenNode, out: &mut Vec<&'a Token>) {
            match node {
                TokenNode::Leaf(token) => out.push(token),
                TokenNode::Group(children) => {
                    for (_, child) in children {
                        collect(child, out);
                    }
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.root, &mut out);
        out
    }
}

fn node_from_json(json: serde_json::Value, trail: &mut Vec<String>) -> Result<TokenNode, TreeError> {
    let serde_json::Value::Object(mut obj) = json else {
        return Err(TreeError::NotAnObject {
            path: trail.join("."),
            found: json_type_name(&json),
        });
    };

    if let Some(value) = obj.remove("value") {
        return leaf_from_json(value, obj, trail).map(TokenNode::Leaf);
    }

    let mut children = Vec::with_capacity(obj.len());
    for (key, child) in obj {
        trail.push(key.clone());
        let node = node_from_json(child, trail)?;
        trail.pop();
        children.push((key, node));
    }
    Ok(TokenNode::Group(children))
}

fn leaf_from_json(
    value: serde_json::Value,
    mut fields: serde_json::Map<String, serde_json::Value>,
    trail: &[String],
) -> Result<Token, TreeError> {
    let path = match fields.remove("path") {
        None => trail.to_vec(),
        Some(serde_json::Value::Array(segments)) => segments
            .into_iter()
            .map(|segment| match segment {
                serde_json::Value::String(s) if !s.is_empty() => Ok(s),
                _ => Err(TreeError::InvalidPath {
                    path: trail.join("."),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(TreeError::InvalidPath {
                path: trail.join("."),
            });
        }
    };

    // Style Dictionary nests the authored literal under `original.value`;
    // flattened outputs use `originalValue`.
    let original = fields
        .get("original")
        .and_then(|o| o.get("value"))
        .or_else(|| fields.get("originalValue"))
        .unwrap_or(&value);
    let original_value = match original {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let alpha = fields.get("alpha").and_then(serde_json::Value::as_f64);

    let attributes = fields.get("attributes");
    let attribute = |key: &str| {
        attributes
            .and_then(|a| a.get(key))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    };
    let metadata = TokenMetadata {
        category: attribute("category"),
        kind: attribute("type"),
        item: attribute("item"),
        name: fields.get("name").and_then(|v| v.as_str()).map(str::to_string),
        file_path: fields
            .get("filePath")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        is_source: fields.get("isSource").and_then(serde_json::Value::as_bool),
    };

    Ok(Token {
        path,
        value: json_to_token_value(value),
        original_value,
        alpha,
        metadata,
    })
}

/// Convert serde_json::Value to TokenValue
pub fn json_to_token_value(v: serde_json::Value) -> TokenValue {
    match v {
        serde_json::Value::Null => TokenValue::Null,
        serde_json::Value::Bool(b) => TokenValue::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => TokenValue::Integer(i),
            None => n
                .as_f64()
                .map(TokenValue::Float)
                .unwrap_or(TokenValue::Null),
        },
        serde_json::Value::String(s) => TokenValue::String(s),
        serde_json::Value::Array(arr) => {
            TokenValue::Array(arr.into_iter().map(json_to_token_value).collect())
        }
        serde_json::Value::Object(obj) => TokenValue::Object(
            obj.into_iter()
                .map(|(k, v)| (k, json_to_token_value(v)))
                .collect::<HashMap<_, _>>(),
        ),
    }
}

fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
