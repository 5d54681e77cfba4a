//! Section/property tree for odml metadata documents.
//!
//! A [`Document`] stores its sections in an arena addressed by [`SectionId`]
//! handles. Sections hold ordered [`Property`] lists and subsections, and
//! can be addressed by path strings, searched by name or type, and merged
//! under a [`MergePolicy`].

pub mod document;
pub mod error;
pub mod id;
pub mod merge;
pub mod names;
pub mod path;
pub mod property;
pub mod search;
pub mod section;

#[cfg(test)]
mod testing;

pub use document::{Document, DocumentInfo};
pub use error::{ConflictReason, TreeError, TreeResult};
pub use id::{PropertyHandle, SectionId};
pub use merge::{merge_properties, merge_sections, MergePolicy, MergeReport};
pub use names::{normalize_type, type_matches, validate_name, ROOT_TYPE};
pub use path::{SectionPath, Segment};
pub use property::Property;
pub use section::SectionNode;
