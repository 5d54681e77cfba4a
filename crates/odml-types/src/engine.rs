//! The type engine: infers, validates, and coerces raw content.

use std::fmt;
use std::sync::Arc;

use crate::binary::{self, BinaryLoader, BinarySource, FsBinaryLoader};
use crate::classify::{classify, parse_bool, parse_date, parse_datetime, parse_time, parse_tuple};
use crate::content::{Content, RawContent};
use crate::error::{TypeError, TypeResult};
use crate::kind::ValueKind;

/// Outcome of typing one raw input.
#[derive(Clone, Debug, PartialEq)]
pub struct Typed {
    /// The kind the content was typed as.
    pub kind: ValueKind,
    /// The typed content, `None` for empty input.
    pub content: Option<Content>,
    /// File name implied by a binary file source.
    pub filename: Option<String>,
}

/// Infers and validates value kinds.
///
/// Stateless apart from the loader used to fetch binary sources.
#[derive(Clone)]
pub struct TypeEngine {
    loader: Arc<dyn BinaryLoader>,
}

impl TypeEngine {
    /// Engine with a filesystem-only binary loader.
    pub fn new() -> Self {
        Self::with_loader(Arc::new(FsBinaryLoader))
    }

    /// Engine with a caller-supplied binary loader.
    pub fn with_loader(loader: Arc<dyn BinaryLoader>) -> Self {
        Self { loader }
    }

    /// Infer the kind of `raw` without a declared type.
    pub fn infer(&self, raw: &RawContent) -> ValueKind {
        match raw {
            RawContent::Text(text) => classify(text),
            other => other.coarse_kind(),
        }
    }

    /// Type `raw` against an optional declared type string.
    ///
    /// An empty or missing declaration triggers inference. Unknown declared
    /// tokens degrade to `string`. Empty input yields `content: None` under
    /// the declared (or string) kind.
    pub fn resolve(&self, raw: RawContent, declared: Option<&str>) -> TypeResult<Typed> {
        let declared = declared
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(ValueKind::parse_declared);

        if raw.is_empty() {
            return Ok(Typed {
                kind: declared.unwrap_or(ValueKind::String),
                content: None,
                filename: None,
            });
        }

        let kind = declared.unwrap_or_else(|| self.infer(&raw));
        if kind == ValueKind::Binary {
            let source = BinarySource::from_raw(&raw);
            let payload = binary::normalize(&source, self.loader.as_ref())?;
            return Ok(Typed {
                kind,
                content: Some(Content::Binary(payload)),
                filename: source.file_name(),
            });
        }

        let content = match raw {
            RawContent::Text(text) => coerce_text(kind, &text)?,
            native => coerce_native(kind, native)?,
        };
        Ok(Typed {
            kind,
            content: Some(content),
            filename: None,
        })
    }
}

impl Default for TypeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEngine").finish_non_exhaustive()
    }
}

fn textual(kind: ValueKind, text: String) -> Content {
    match kind {
        ValueKind::Url => Content::Url(text),
        ValueKind::Person => Content::Person(text),
        ValueKind::Text => Content::Text(text),
        _ => Content::String(text),
    }
}

fn invalid(kind: ValueKind, text: &str) -> TypeError {
    TypeError::InvalidLiteral {
        kind,
        text: text.to_string(),
    }
}

fn coerce_text(kind: ValueKind, text: &str) -> TypeResult<Content> {
    let found = classify(text);
    if !kind.accepts(found) {
        return Err(TypeError::Mismatch {
            declared: kind,
            found,
            content: text.to_string(),
        });
    }

    let trimmed = text.trim();
    match kind {
        ValueKind::Int => trimmed
            .parse()
            .map(Content::Int)
            .map_err(|_| invalid(kind, text)),
        ValueKind::Float => trimmed
            .parse()
            .map(Content::Float)
            .map_err(|_| invalid(kind, text)),
        ValueKind::Boolean => parse_bool(trimmed)
            .map(Content::Boolean)
            .ok_or_else(|| invalid(kind, text)),
        ValueKind::Date => parse_date(trimmed)
            .map(Content::Date)
            .ok_or_else(|| invalid(kind, text)),
        ValueKind::Time => parse_time(trimmed)
            .map(Content::Time)
            .ok_or_else(|| invalid(kind, text)),
        ValueKind::Datetime => parse_datetime(trimmed)
            .map(Content::Datetime)
            .ok_or_else(|| invalid(kind, text)),
        ValueKind::Tuple(arity) => {
            let parts = parse_tuple(trimmed).ok_or_else(|| invalid(kind, text))?;
            match arity {
                Some(expected) if expected != parts.len() => Err(TypeError::TupleArity {
                    expected,
                    actual: parts.len(),
                }),
                _ => Ok(Content::Tuple(parts)),
            }
        }
        ValueKind::Binary => Ok(Content::Binary(binary::encode(text.as_bytes()))),
        ValueKind::Url | ValueKind::Person => Ok(textual(kind, trimmed.to_string())),
        ValueKind::Text | ValueKind::String => Ok(textual(kind, text.to_string())),
    }
}

fn coerce_native(kind: ValueKind, raw: RawContent) -> TypeResult<Content> {
    let content = match (kind, raw) {
        (ValueKind::Int, RawContent::Int(v)) => Content::Int(v),
        (ValueKind::Float, RawContent::Float(v)) => Content::Float(v),
        (ValueKind::Float, RawContent::Int(v)) => Content::Float(v as f64),
        (ValueKind::Boolean, RawContent::Bool(v)) => Content::Boolean(v),
        (ValueKind::Date, RawContent::Date(v)) => Content::Date(v),
        (ValueKind::Time, RawContent::Time(v)) => Content::Time(v),
        (ValueKind::Datetime, RawContent::Datetime(v)) => Content::Datetime(v),
        (kind, raw) if kind.is_textual() => textual(kind, raw.render()),
        (kind, raw) => {
            return Err(TypeError::Mismatch {
                declared: kind,
                found: raw.coarse_kind(),
                content: raw.render(),
            })
        }
    };
    Ok(content)
}
