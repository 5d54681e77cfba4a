//! A single typed datum with its unit, uncertainty, and provenance.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::binary;
use crate::checksum::{self, ChecksumAlgorithm};
use crate::content::{Content, RawContent};
use crate::engine::TypeEngine;
use crate::error::{TypeError, TypeResult};
use crate::kind::ValueKind;

/// Encoder name recorded on every binary value.
pub const BASE64_ENCODER: &str = "base64";

/// One typed datum.
///
/// The content and its kind are kept private so the kind always matches the
/// runtime variant of the content. Metadata fields are plain data.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueCell {
    content: Option<Content>,
    kind: ValueKind,
    declared_type: Option<String>,
    pub unit: Option<String>,
    pub uncertainty: Option<f64>,
    /// Original file name; only meaningful for binary values.
    pub filename: Option<String>,
    pub definition: Option<String>,
    pub reference: Option<String>,
    pub encoder: Option<String>,
    pub checksum: Option<String>,
}

impl ValueCell {
    /// Build a value with the default engine.
    pub fn new(raw: impl Into<RawContent>, declared: Option<&str>) -> TypeResult<Self> {
        Self::with_engine(&TypeEngine::default(), raw, declared)
    }

    /// Build a value, typing `raw` against `declared` with `engine`.
    ///
    /// The declared type string is kept verbatim for emission.
    pub fn with_engine(
        engine: &TypeEngine,
        raw: impl Into<RawContent>,
        declared: Option<&str>,
    ) -> TypeResult<Self> {
        let typed = engine.resolve(raw.into(), declared)?;
        let declared_type = declared
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let encoder = (typed.kind == ValueKind::Binary).then(|| BASE64_ENCODER.to_string());
        Ok(Self {
            content: typed.content,
            kind: typed.kind,
            declared_type,
            unit: None,
            uncertainty: None,
            filename: typed.filename,
            definition: None,
            reference: None,
            encoder,
            checksum: None,
        })
    }

    /// Wrap already-typed content.
    pub fn from_content(content: Content) -> Self {
        let mut cell = Self::empty(content.kind());
        if cell.kind == ValueKind::Binary {
            cell.encoder = Some(BASE64_ENCODER.to_string());
        }
        cell.content = Some(content);
        cell
    }

    /// A value of `kind` without content (kept by terminologies).
    pub fn empty(kind: ValueKind) -> Self {
        Self {
            content: None,
            kind,
            declared_type: None,
            unit: None,
            uncertainty: None,
            filename: None,
            definition: None,
            reference: None,
            encoder: None,
            checksum: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_uncertainty(mut self, uncertainty: f64) -> Self {
        self.uncertainty = Some(uncertainty);
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// The declared type string exactly as supplied, if any.
    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }

    /// The type token to emit: the declared string verbatim, else the kind.
    pub fn type_token(&self) -> String {
        match &self.declared_type {
            Some(declared) => declared.clone(),
            None => self.kind.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// Whether both values hold equal content. Empty values never match.
    pub fn same_content(&self, other: &ValueCell) -> bool {
        match (&self.content, &other.content) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Re-type `raw` under this value's kind and replace the content.
    pub fn set_content(&mut self, engine: &TypeEngine, raw: impl Into<RawContent>) -> TypeResult<()> {
        let token = self.kind.to_string();
        let typed = engine.resolve(raw.into(), Some(&token))?;
        self.content = typed.content;
        if typed.filename.is_some() {
            self.filename = typed.filename;
        }
        Ok(())
    }

    /// Replace the content with already-typed content of the same kind.
    pub fn replace_content(&mut self, content: Content) -> TypeResult<()> {
        if !content.is_kind(self.kind) {
            return Err(TypeError::Mismatch {
                declared: self.kind,
                found: content.kind(),
                content: content.to_string(),
            });
        }
        self.content = Some(content);
        Ok(())
    }

    /// Drop the content, keeping the kind and metadata.
    pub fn clear_content(&mut self) {
        self.content = None;
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.content {
            Some(Content::Int(v)) => Some(v),
            _ => None,
        }
    }

    /// Floats, with integers widened.
    pub fn as_float(&self) -> Option<f64> {
        match self.content {
            Some(Content::Float(v)) => Some(v),
            Some(Content::Int(v)) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.content {
            Some(Content::Boolean(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self.content {
            Some(Content::Date(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self.content {
            Some(Content::Time(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self.content {
            Some(Content::Datetime(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[String]> {
        match &self.content {
            Some(Content::Tuple(parts)) => Some(parts),
            _ => None,
        }
    }

    /// Text of the textual kinds (string, text, person, url, binary payload).
    pub fn as_str(&self) -> Option<&str> {
        match &self.content {
            Some(
                Content::String(s)
                | Content::Text(s)
                | Content::Person(s)
                | Content::Url(s)
                | Content::Binary(s),
            ) => Some(s),
            _ => None,
        }
    }

    /// Decoded bytes of a binary value.
    pub fn decode_binary(&self) -> TypeResult<Vec<u8>> {
        match &self.content {
            Some(Content::Binary(payload)) => binary::decode(payload),
            _ => Err(TypeError::Mismatch {
                declared: ValueKind::Binary,
                found: self.kind,
                content: self.to_string(),
            }),
        }
    }

    /// Compute and store a checksum over the decoded binary payload.
    pub fn update_checksum(&mut self, algorithm: ChecksumAlgorithm) -> TypeResult<&str> {
        let bytes = self.decode_binary()?;
        Ok(self.checksum.insert(checksum::compute(algorithm, &bytes)).as_str())
    }

    /// Verify the stored checksum. Values without a checksum verify trivially.
    pub fn verify_checksum(&self) -> TypeResult<bool> {
        match &self.checksum {
            Some(sum) => checksum::verify(sum, &self.decode_binary()?),
            None => Ok(true),
        }
    }
}

impl fmt::Display for ValueCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.content {
            Some(content) => write!(f, "{content}"),
            None => Ok(()),
        }
    }
}
