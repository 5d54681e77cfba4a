//! Typed value content and the loosely-typed input it is built from.

use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::kind::ValueKind;

/// Fixed emission pattern for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Fixed emission pattern for times.
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Fixed emission pattern for datetimes.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The typed content of a value cell. One variant per [`ValueKind`].
///
/// Binary content is always stored as base64 text.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Int(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    Datetime(NaiveDateTime),
    Url(String),
    Binary(String),
    Tuple(Vec<String>),
    Person(String),
    Text(String),
    String(String),
}

impl Content {
    /// The runtime kind of this content. Tuples report their actual arity.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Date(_) => ValueKind::Date,
            Self::Time(_) => ValueKind::Time,
            Self::Datetime(_) => ValueKind::Datetime,
            Self::Url(_) => ValueKind::Url,
            Self::Binary(_) => ValueKind::Binary,
            Self::Tuple(parts) => ValueKind::Tuple(Some(parts.len())),
            Self::Person(_) => ValueKind::Person,
            Self::Text(_) => ValueKind::Text,
            Self::String(_) => ValueKind::String,
        }
    }

    /// Whether this content belongs to `kind`. A generic tuple kind accepts
    /// tuples of any arity.
    pub fn is_kind(&self, kind: ValueKind) -> bool {
        match (self, kind) {
            (Self::Tuple(_), ValueKind::Tuple(None)) => true,
            _ => self.kind() == kind,
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            Self::Time(v) => write!(f, "{}", v.format(TIME_FORMAT)),
            Self::Datetime(v) => write!(f, "{}", v.format(DATETIME_FORMAT)),
            Self::Tuple(parts) => write!(f, "({})", parts.join(";")),
            Self::Url(s) | Self::Binary(s) | Self::Person(s) | Self::Text(s) | Self::String(s) => {
                write!(f, "{s}")
            }
        }
    }
}

/// Raw input handed to the type engine, in its native representation.
///
/// Text is the loosely-typed form produced by document readers; the other
/// variants come from programmatic construction.
#[derive(Clone, Debug, PartialEq)]
pub enum RawContent {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    Datetime(NaiveDateTime),
    Url(String),
    /// A local file whose bytes become binary content.
    File(PathBuf),
    /// Raw bytes that become binary content.
    Bytes(Vec<u8>),
}

impl RawContent {
    /// The coarse kind implied by the native representation. Text reports
    /// `String`; the classifier refines it.
    pub fn coarse_kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::String,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Bool(_) => ValueKind::Boolean,
            Self::Date(_) => ValueKind::Date,
            Self::Time(_) => ValueKind::Time,
            Self::Datetime(_) => ValueKind::Datetime,
            Self::Url(_) => ValueKind::Url,
            Self::File(_) | Self::Bytes(_) => ValueKind::Binary,
        }
    }

    /// Textual rendering used when a native value lands in a textual kind.
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) | Self::Url(s) => s.clone(),
            Self::Int(v) => v.to_string(),
            Self::Float(v) => format!("{v:?}"),
            Self::Bool(v) => v.to_string(),
            Self::Date(v) => v.format(DATE_FORMAT).to_string(),
            Self::Time(v) => v.format(TIME_FORMAT).to_string(),
            Self::Datetime(v) => v.format(DATETIME_FORMAT).to_string(),
            Self::File(path) => path.display().to_string(),
            Self::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }

    /// Whether this input carries no datum at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Url(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for RawContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for RawContent {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for RawContent {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for RawContent {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for RawContent {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<NaiveDate> for RawContent {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveTime> for RawContent {
    fn from(v: NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<NaiveDateTime> for RawContent {
    fn from(v: NaiveDateTime) -> Self {
        Self::Datetime(v)
    }
}

impl From<Vec<u8>> for RawContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}
