//! The closed set of value kinds and their declared-type tokens.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The kind of datum a value cell holds.
///
/// Declared type strings map onto these variants through
/// [`ValueKind::parse_declared`]. `Tuple` carries its arity when known
/// (`"3-tuple"`) and `None` for the generic `"n-tuple"` token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueKind {
    Int,
    Float,
    Boolean,
    Date,
    Time,
    Datetime,
    Url,
    Binary,
    Tuple(Option<usize>),
    Person,
    Text,
    String,
}

impl ValueKind {
    /// Parse a declared type token, returning `None` for unknown tokens.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn try_parse(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_lowercase();
        let kind = match token.as_str() {
            "int" | "integer" => Self::Int,
            "float" | "double" => Self::Float,
            "boolean" | "bool" => Self::Boolean,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::Datetime,
            "url" => Self::Url,
            "binary" => Self::Binary,
            "person" => Self::Person,
            "text" => Self::Text,
            "string" | "str" => Self::String,
            "n-tuple" | "tuple" => Self::Tuple(None),
            other => {
                let arity = other.strip_suffix("-tuple")?;
                let n: usize = arity.parse().ok()?;
                if n < 2 {
                    return None;
                }
                Self::Tuple(Some(n))
            }
        };
        Some(kind)
    }

    /// Parse a declared type token, degrading unknown tokens to `String`.
    pub fn parse_declared(token: &str) -> Self {
        match Self::try_parse(token) {
            Some(kind) => kind,
            None => {
                warn!(declared = token, "unknown declared value type; using string");
                Self::String
            }
        }
    }

    /// Kinds whose content is free text and accepts any textual input.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::String | Self::Text | Self::Person | Self::Url)
    }

    /// Whether text classified as `found` may be coerced into this kind.
    pub fn accepts(&self, found: ValueKind) -> bool {
        match (self, found) {
            (declared, _) if declared.is_textual() => true,
            // Binary text is normalized separately and never classified.
            (Self::Binary, _) => true,
            (Self::Int, Self::Int) => true,
            (Self::Float, Self::Int | Self::Float) => true,
            (Self::Boolean, Self::Boolean | Self::Int) => true,
            (Self::Date, Self::Date) => true,
            (Self::Time, Self::Time) => true,
            (Self::Datetime, Self::Datetime) => true,
            (Self::Tuple(_), Self::Tuple(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::Datetime => write!(f, "datetime"),
            Self::Url => write!(f, "url"),
            Self::Binary => write!(f, "binary"),
            Self::Tuple(Some(n)) => write!(f, "{n}-tuple"),
            Self::Tuple(None) => write!(f, "n-tuple"),
            Self::Person => write!(f, "person"),
            Self::Text => write!(f, "text"),
            Self::String => write!(f, "string"),
        }
    }
}

impl From<String> for ValueKind {
    fn from(token: String) -> Self {
        Self::parse_declared(&token)
    }
}

impl From<ValueKind> for String {
    fn from(kind: ValueKind) -> Self {
        kind.to_string()
    }
}
