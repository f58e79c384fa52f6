use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::store::VariableType;

/// A raw leaf value as emitted by the token compiler.
///
/// The compiler writes plain JSON, so this mirrors the JSON types with
/// integers kept apart from floats. Leaves are usually strings (`"4px"`,
/// `"#212121"`), sometimes numbers, and occasionally structured colors
/// (`{"r": .., "g": .., "b": .., "a": ..}`).
///
/// # Examples
///
/// ```
/// use tokensync::TokenValue;
///
/// let hex = TokenValue::String("#212121".to_string());
/// assert_eq!(hex.as_str(), Some("#212121"));
/// assert_eq!(TokenValue::Integer(4).as_float(), Some(4.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Array of values
    Array(Vec<TokenValue>),

    /// Object with string keys
    Object(HashMap<String, TokenValue>),
}

impl TokenValue {
    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            TokenValue::Integer(n) => Some(*n as f64),
            TokenValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string slice, only for string values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable type name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            TokenValue::Null => "null",
            TokenValue::Boolean(_) => "boolean",
            TokenValue::Integer(_) => "integer",
            TokenValue::Float(_) => "float",
            TokenValue::String(_) => "string",
            TokenValue::Array(_) => "array",
            TokenValue::Object(_) => "object",
        }
    }

    /// Reads a structured color object. `a` is optional and defaults to 1.
    pub fn as_color(&self) -> Option<Rgba> {
        let TokenValue::Object(obj) = self else {
            return None;
        };
        let channel = |key: &str| obj.get(key).and_then(TokenValue::as_float);
        Some(Rgba {
            r: channel("r")?,
            g: channel("g")?,
            b: channel("b")?,
            a: match obj.get("a") {
                Some(a) => a.as_float()?,
                None => 1.0,
            },
        })
    }
}

/// A color with every channel normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Rgba {
    /// Builds a color from 8-bit channels and a normalized alpha.
    pub fn from_rgb8(r: u8, g: u8, b: u8, a: f64) -> Self {
        Rgba {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
            a,
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }
}

/// A store-ready value, the payload of a "set value for mode" call.
///
/// Serialized the way the host writes values: numbers, strings and booleans
/// as bare JSON, colors as `{"r", "g", "b", "a"}` objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Boolean(bool),
    Float(f64),
    String(String),
    Color(Rgba),
}

impl VariableValue {
    /// The variable type this value can be stored under.
    pub fn kind(&self) -> VariableType {
        match self {
            VariableValue::Boolean(_) => VariableType::Boolean,
            VariableValue::Float(_) => VariableType::Float,
            VariableValue::String(_) => VariableType::String,
            VariableValue::Color(_) => VariableType::Color,
        }
    }

    /// Whether the store can hold this value as a reference to another
    /// variable. Colors with partial opacity cannot be aliased.
    pub fn is_referenceable(&self) -> bool {
        match self {
            VariableValue::Color(color) => color.is_opaque(),
            _ => true,
        }
    }

    /// Passes a raw leaf value through unchanged, for rules without a value
    /// transform. Returns `None` for shapes the store cannot hold.
    pub fn from_raw(raw: &TokenValue) -> Option<Self> {
        match raw {
            TokenValue::Boolean(b) => Some(VariableValue::Boolean(*b)),
            TokenValue::Integer(n) => Some(VariableValue::Float(*n as f64)),
            TokenValue::Float(n) => Some(VariableValue::Float(*n)),
            TokenValue::String(s) => Some(VariableValue::String(s.clone())),
            TokenValue::Object(_) => raw.as_color().map(VariableValue::Color),
            TokenValue::Null | TokenValue::Array(_) => None,
        }
    }
}
