use std::{fmt, str::FromStr, sync::Arc};

use regex::Regex;
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    color::parse_color,
    store::VariableType,
    token::Token,
    value::{TokenValue, VariableValue},
};

/// Errors raised by value transforms.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// The leaf's raw value is not the shape the transform expects
    #[error("Invalid token shape at '{path}': expected {expected}, got {found}")]
    InvalidTokenShape {
        path: String,
        expected: &'static str,
        found: String,
    },
}

impl TransformError {
    fn shape(token: &Token, expected: &'static str, found: impl Into<String>) -> Self {
        TransformError::InvalidTokenShape {
            path: token.dot_path(),
            expected,
            found: found.into(),
        }
    }
}

/// A segment of a rule pattern, matched positionally against a token path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Matches exactly this path segment
    ///
    /// # Examples
    /// - `color` → `Literal("color")`
    Literal(String),

    /// Matches any single path segment
    ///
    /// # Examples
    /// - `theme/*` → `[Literal("theme"), Wildcard]`
    Wildcard,
}

/// A `/`-separated rule pattern such as `theme/*`.
///
/// Patterns match by prefix: path segments beyond the pattern's length are
/// unconstrained, so `theme/*` matches `["theme", "light", "background"]`.
/// A path shorter than the pattern never matches.
///
/// # Examples
///
/// ```
/// use tokensync::transform::Pattern;
///
/// let pattern: Pattern = "theme/*".parse().unwrap();
/// assert!(pattern.matches(&["theme", "light", "background"]));
/// assert!(!pattern.matches(&["color", "base", "black"]));
/// assert!(!pattern.matches(&["theme"]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<PatternSegment>,
}

impl Pattern {
    pub fn new(segments: Vec<PatternSegment>) -> Self {
        Pattern { segments }
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    pub fn matches<S: AsRef<str>>(&self, path: &[S]) -> bool {
        if path.len() < self.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(path)
            .all(|(segment, part)| segment.matches(part.as_ref()))
    }
}

impl PatternSegment {
    pub fn matches(&self, part: &str) -> bool {
        match self {
            PatternSegment::Wildcard => true,
            PatternSegment::Literal(literal) => literal == part,
        }
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        let segments = s
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| match part {
                "*" => PatternSegment::Wildcard,
                literal => PatternSegment::Literal(literal.to_string()),
            })
            .collect();
        Pattern { segments }
    }
}

impl FromStr for Pattern {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Pattern::from(s))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self
            .segments
            .iter()
            .map(|segment| match segment {
                PatternSegment::Wildcard => "*",
                PatternSegment::Literal(literal) => literal.as_str(),
            })
            .collect();
        f.write_str(&parts.join("/"))
    }
}

/// Produces the canonical variable name from a token path.
pub type NameFn = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

/// Produces the store-ready value from a leaf token.
pub type ValueFn = Arc<dyn Fn(&Token) -> Result<VariableValue, TransformError> + Send + Sync>;

/// Maps matching token paths to a variable name, type and value.
#[derive(Clone)]
pub struct TransformRule {
    pub pattern: Pattern,
    pub target_type: VariableType,
    name_fn: NameFn,
    value_fn: Option<ValueFn>,
}

impl TransformRule {
    /// A rule that passes raw values through unchanged.
    pub fn new<F>(pattern: &str, target_type: VariableType, name_fn: F) -> Self
    where
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        TransformRule {
            pattern: Pattern::from(pattern),
            target_type,
            name_fn: Arc::new(name_fn),
            value_fn: None,
        }
    }

    pub fn with_value<F>(mut self, value_fn: F) -> Self
    where
        F: Fn(&Token) -> Result<VariableValue, TransformError> + Send + Sync + 'static,
    {
        self.value_fn = Some(Arc::new(value_fn));
        self
    }

    pub fn with_value_fn(mut self, value_fn: ValueFn) -> Self {
        self.value_fn = Some(value_fn);
        self
    }

    pub fn name(&self, path: &[String]) -> String {
        (self.name_fn)(path)
    }

    /// Runs the value transform, or passes the raw value through.
    pub fn value(&self, token: &Token) -> Result<VariableValue, TransformError> {
        match &self.value_fn {
            Some(value_fn) => value_fn(token),
            None => VariableValue::from_raw(&token.value).ok_or_else(|| {
                TransformError::shape(token, "a storable value", token.value.type_name())
            }),
        }
    }
}

impl fmt::Debug for TransformRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRule")
            .field("pattern", &self.pattern.to_string())
            .field("target_type", &self.target_type)
            .field("value_fn", &self.value_fn.is_some())
            .finish()
    }
}

/// The outcome of matching a leaf against the registry.
#[derive(Debug, Clone)]
pub struct Resolved<'r> {
    pub name: String,
    pub value: VariableValue,
    pub rule: &'r TransformRule,
}

/// Ordered transform rules. The first matching rule wins.
///
/// # Examples
///
/// ```
/// use tokensync::transform::{TransformRegistry, TransformRule, names, values};
/// use tokensync::store::VariableType;
///
/// let registry = TransformRegistry::new()
///     .with_rule(TransformRule::new("corner", VariableType::Float, names::join("/"))
///         .with_value(values::dimension));
///
/// let path: Vec<String> = vec!["corner".into(), "small".into()];
/// let rule = registry.rule_for(&path).unwrap();
/// assert_eq!(rule.name(&path), "corner/small");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransformRegistry {
    rules: Vec<TransformRule>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: TransformRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn register(&mut self, rule: TransformRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[TransformRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule, in registration order, whose pattern matches the path.
    pub fn rule_for<S: AsRef<str>>(&self, path: &[S]) -> Option<&TransformRule> {
        self.rules.iter().find(|rule| rule.pattern.matches(path))
    }

    /// Matches a leaf and computes its name and value.
    ///
    /// `Ok(None)` means no rule matched and the leaf is not synchronized.
    pub fn resolve(&self, token: &Token) -> Result<Option<Resolved<'_>>, TransformError> {
        let Some(rule) = self.rule_for(&token.path) else {
            return Ok(None);
        };
        Ok(Some(Resolved {
            name: rule.name(&token.path),
            value: rule.value(token)?,
            rule,
        }))
    }
}

/// Built-in name functions.
pub mod names {
    /// Joins every path segment, e.g. `color/base/black`.
    pub fn join(separator: &str) -> impl Fn(&[String]) -> String + Send + Sync + use<> {
        let separator = separator.to_string();
        move |path| path.join(&separator)
    }

    /// Drops the first `skip` segments, joins the rest and prepends `prefix`.
    ///
    /// `prefixed("themed/", 2, "-")` turns `["theme", "light", "background"]`
    /// into `themed/background`.
    pub fn prefixed(
        prefix: &str,
        skip: usize,
        separator: &str,
    ) -> impl Fn(&[String]) -> String + Send + Sync + use<> {
        let prefix = prefix.to_string();
        let separator = separator.to_string();
        move |path| {
            let rest = path.get(skip..).unwrap_or_default();
            format!("{}{}", prefix, rest.join(&separator))
        }
    }
}

/// Built-in value transforms.
pub mod values {
    use super::*;

    const DIMENSION_PATTERN: &str = r"^\s*([+-]?\d*\.?\d+)\s*([a-zA-Z%]*)\s*$";

    /// Strips a unit suffix from a dimension string: `"4px"` becomes `4`.
    pub fn dimension(token: &Token) -> Result<VariableValue, TransformError> {
        let raw = expect_string(token)?;
        let re = Regex::new(DIMENSION_PATTERN)
            .map_err(|_| TransformError::shape(token, "a dimension string", raw))?;
        let number = re
            .captures(raw)
            .and_then(|captures| Decimal::from_str(&normalize_number(&captures[1])).ok())
            .and_then(|decimal| decimal.to_f64())
            .ok_or_else(|| TransformError::shape(token, "a dimension string", raw))?;
        Ok(VariableValue::Float(number))
    }

    /// Normalizes a color string to RGBA channels in `[0, 1]`.
    ///
    /// Alpha comes from the literal when it encodes one, otherwise from the
    /// token's `alpha` field, otherwise it is fully opaque.
    pub fn color(token: &Token) -> Result<VariableValue, TransformError> {
        let raw = expect_string(token)?;
        let mut color =
            parse_color(raw).ok_or_else(|| TransformError::shape(token, "a color string", raw))?;
        if color.is_opaque()
            && let Some(alpha) = token.alpha
        {
            color.a = alpha.clamp(0.0, 1.0);
        }
        Ok(VariableValue::Color(color))
    }

    /// `+.5` -> `0.5`, `-.5` -> `-0.5`
    fn normalize_number(number: &str) -> String {
        let (sign, digits) = match number.strip_prefix('-') {
            Some(digits) => ("-", digits),
            None => ("", number.trim_start_matches('+')),
        };
        if digits.starts_with('.') {
            format!("{}0{}", sign, digits)
        } else {
            format!("{}{}", sign, digits)
        }
    }

    fn expect_string(token: &Token) -> Result<&str, TransformError> {
        match &token.value {
            TokenValue::String(s) => Ok(s),
            other => Err(TransformError::shape(token, "a string", other.type_name())),
        }
    }
}
