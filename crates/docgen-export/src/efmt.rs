//! Formatted expressions produced by the pretty-printer.
//!
//! The export encodes a formatted expression as either a JSON string, a
//! `["n", expr]` pair marking a named (function-position) node, or a
//! `["c", lhs, rhs]` triple concatenating two sub-expressions. Text leaves may
//! contain linkable spans delimited by [`LINK_OPEN`], [`LINK_SEP`] and
//! [`LINK_CLOSE`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Opens a linkable span: `LINK_OPEN name LINK_SEP display LINK_CLOSE`.
pub const LINK_OPEN: char = '\u{E000}';
/// Separates the declaration name from its display text.
pub const LINK_SEP: char = '\u{E001}';
/// Closes a linkable span.
pub const LINK_CLOSE: char = '\u{E002}';

/// A pretty-printed type or term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormattedExpr {
    /// Literal text, possibly containing linkable span markers.
    Text(String),
    /// A named node; rendered in function position.
    Named(Box<FormattedExpr>),
    /// Concatenation of two sub-expressions.
    Concat(Box<FormattedExpr>, Box<FormattedExpr>),
}

/// Error returned when a JSON value is not a valid formatted expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// The tag of a tagged array is not one the renderer understands.
    #[error("unknown formatted expression tag: {0:?}")]
    UnknownTag(String),
    /// The array has the wrong number of elements for its tag.
    #[error("formatted expression `{tag}` expects {expected} operands, got {actual}")]
    Arity {
        /// Tag of the malformed node.
        tag: String,
        /// Operands required by the tag.
        expected: usize,
        /// Operands present.
        actual: usize,
    },
    /// The value is neither a string nor a tagged array.
    #[error("formatted expression must be a string or a tagged array, got {0}")]
    Shape(String),
}

impl FormattedExpr {
    /// Create a text leaf.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Wrap an expression in a named node.
    #[must_use]
    pub fn named(inner: Self) -> Self {
        Self::Named(Box::new(inner))
    }

    /// Concatenate two expressions.
    #[must_use]
    pub fn concat(lhs: Self, rhs: Self) -> Self {
        Self::Concat(Box::new(lhs), Box::new(rhs))
    }

    /// Decode the export's JSON wire form.
    pub fn from_value(value: &Value) -> Result<Self, ExprError> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Array(items) => {
                let Some(Value::String(tag)) = items.first() else {
                    return Err(ExprError::Shape(value.to_string()));
                };
                let operands = &items[1..];
                match tag.as_str() {
                    "n" => {
                        let [inner] = operands else {
                            return Err(arity(tag, 1, operands.len()));
                        };
                        Ok(Self::named(Self::from_value(inner)?))
                    }
                    "c" => {
                        let [lhs, rhs] = operands else {
                            return Err(arity(tag, 2, operands.len()));
                        };
                        Ok(Self::concat(Self::from_value(lhs)?, Self::from_value(rhs)?))
                    }
                    other => Err(ExprError::UnknownTag(other.to_owned())),
                }
            }
            other => Err(ExprError::Shape(other.to_string())),
        }
    }

    /// Text content with link markers removed, keeping display text only.
    ///
    /// ```
    /// use docgen_export::FormattedExpr;
    ///
    /// let e = FormattedExpr::text("\u{E000}nat\u{E001}ℕ\u{E002} → Prop");
    /// assert_eq!(e.plain_text(), "ℕ → Prop");
    /// ```
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain(&mut out);
        out
    }

    fn push_plain(&self, out: &mut String) {
        match self {
            Self::Text(s) => {
                let mut in_name = false;
                for c in s.chars() {
                    match c {
                        LINK_OPEN => in_name = true,
                        LINK_SEP => in_name = false,
                        LINK_CLOSE => {}
                        _ if in_name => {}
                        _ => out.push(c),
                    }
                }
            }
            Self::Named(inner) => inner.push_plain(out),
            Self::Concat(lhs, rhs) => {
                lhs.push_plain(out);
                rhs.push_plain(out);
            }
        }
    }
}

fn arity(tag: &str, expected: usize, actual: usize) -> ExprError {
    ExprError::Arity {
        tag: tag.to_owned(),
        expected,
        actual,
    }
}

impl<'de> Deserialize<'de> for FormattedExpr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl Default for FormattedExpr {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_string_is_text_leaf() {
        let e: FormattedExpr = serde_json::from_value(json!("ℕ → ℕ")).unwrap();
        assert_eq!(e, FormattedExpr::text("ℕ → ℕ"));
    }

    #[test]
    fn test_nested_tags() {
        let e: FormattedExpr =
            serde_json::from_value(json!(["c", ["n", "f"], " x"])).unwrap();
        assert_eq!(
            e,
            FormattedExpr::concat(
                FormattedExpr::named(FormattedExpr::text("f")),
                FormattedExpr::text(" x")
            )
        );
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = FormattedExpr::from_value(&json!(["q", "x"])).unwrap_err();
        assert_eq!(err, ExprError::UnknownTag("q".to_owned()));
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let err = FormattedExpr::from_value(&json!(["c", "x"])).unwrap_err();
        assert!(matches!(err, ExprError::Arity { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_number_rejected() {
        assert!(matches!(
            FormattedExpr::from_value(&json!(3)),
            Err(ExprError::Shape(_))
        ));
    }

    #[test]
    fn test_plain_text_drops_link_names() {
        let e = FormattedExpr::concat(
            FormattedExpr::text("\u{E000}foo.bar\u{E001}bar\u{E002} "),
            FormattedExpr::named(FormattedExpr::text("x")),
        );
        assert_eq!(e.plain_text(), "bar x");
    }
}
