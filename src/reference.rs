//! Reference markers inside authored literals.
//!
//! An alias token is authored as `{<dot.path>.value}`, for example
//! `{color.base.black.value}`. Anything containing a brace that does not
//! follow that grammar is rejected instead of being treated as a literal.

use regex::Regex;

const MARKER_PATTERN: &str = r"^\{([^{}.\s]+(?:\.[^{}.\s]+)*)\.value\}$";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReferenceError {
    #[error("Malformed reference marker '{literal}': expected {{<dot.path>.value}}")]
    Malformed { literal: String },

    #[error("Invalid reference grammar: {0}")]
    Grammar(String),
}

/// A parsed reference to another token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Path segments of the referenced token
    pub path: Vec<String>,
}

impl Reference {
    /// Parses an authored literal.
    ///
    /// Returns `Ok(None)` for plain literals (no braces at all).
    ///
    /// # Examples
    ///
    /// ```
    /// use tokensync::reference::Reference;
    ///
    /// let r = Reference::parse("{color.base.black.value}").unwrap().unwrap();
    /// assert_eq!(r.dot_path(), "color.base.black");
    ///
    /// assert!(Reference::parse("#212121").unwrap().is_none());
    /// assert!(Reference::parse("{color.base.black").is_err());
    /// ```
    pub fn parse(literal: &str) -> Result<Option<Reference>, ReferenceError> {
        if !literal.contains(['{', '}']) {
            return Ok(None);
        }

        let re = Regex::new(MARKER_PATTERN).map_err(|e| ReferenceError::Grammar(e.to_string()))?;
        let captures = re
            .captures(literal.trim())
            .ok_or_else(|| ReferenceError::Malformed {
                literal: literal.to_string(),
            })?;

        let path = captures[1].split('.').map(str::to_string).collect();
        Ok(Some(Reference { path }))
    }

    pub fn dot_path(&self) -> String {
        self.path.join(".")
    }
}

#[test]
fn test_plain_literals_are_not_references() {
    assert_eq!(Reference::parse("4px"), Ok(None));
    assert_eq!(Reference::parse("#212121"), Ok(None));
    assert_eq!(Reference::parse(""), Ok(None));
}

#[test]
fn test_parse_reference_path() {
    let reference = Reference::parse("{theme.light.background.value}")
        .unwrap()
        .unwrap();
    assert_eq!(reference.path, vec!["theme", "light", "background"]);
}

#[test]
fn test_single_segment_reference() {
    let reference = Reference::parse("{black.value}").unwrap().unwrap();
    assert_eq!(reference.dot_path(), "black");
}

#[test]
fn test_malformed_markers_fail() {
    for literal in [
        "{color.base.black}",
        "{color.base.black.value",
        "color.base.black.value}",
        "{.value}",
        "{color..black.value}",
        "{a.value} {b.value}",
        "rgba({color.black.value}, 0.5)",
    ] {
        assert!(
            matches!(Reference::parse(literal), Err(ReferenceError::Malformed { .. })),
            "expected '{}' to be rejected",
            literal
        );
    }
}
