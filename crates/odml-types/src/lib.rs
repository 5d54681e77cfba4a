//! Value types for odml metadata documents.
//!
//! A property in an odml document holds an ordered list of typed values.
//! This crate defines those values and the engine that types them from
//! loosely-typed input.
//!
//! # Key Types
//!
//! - [`ValueKind`] — Closed set of value kinds (int, float, date, n-tuple, ...)
//! - [`Content`] — Typed content, one variant per kind
//! - [`RawContent`] — Native or textual input before typing
//! - [`TypeEngine`] — Inference, validation, and coercion of raw input
//! - [`ValueCell`] — A typed datum with unit, uncertainty, and provenance
//!
//! Binary content is always held as base64 text; see [`binary`].

pub mod binary;
pub mod checksum;
pub mod classify;
pub mod content;
pub mod engine;
pub mod error;
pub mod kind;
pub mod value;

pub use binary::{BinaryLoader, BinarySource, FsBinaryLoader};
pub use checksum::ChecksumAlgorithm;
pub use classify::classify;
pub use content::{Content, RawContent, DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT};
pub use engine::{TypeEngine, Typed};
pub use error::{TypeError, TypeResult};
pub use kind::ValueKind;
pub use value::{ValueCell, BASE64_ENCODER};
