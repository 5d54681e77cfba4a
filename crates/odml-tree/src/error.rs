//! Error types for tree operations.

use odml_types::TypeError;

use crate::id::SectionId;

/// Errors that can occur while building or mutating a document tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A section or property name is empty or malformed.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Which rule it breaks.
        reason: String,
    },

    /// A section type is empty or malformed.
    #[error("invalid section type {section_type:?}: {reason}")]
    InvalidType {
        /// The rejected type, as given.
        section_type: String,
        /// Which rule it breaks.
        reason: String,
    },

    /// The handle does not refer to a live section of this document.
    #[error("unknown section handle {0}")]
    UnknownSection(SectionId),

    /// The operation is not allowed on the document root.
    #[error("cannot {0} the document root")]
    RootOperation(&'static str),

    /// Reparenting would move a section below itself.
    #[error("cannot move section {section} below its own descendant {new_parent}")]
    CyclicReparent {
        /// The section being moved.
        section: SectionId,
        /// The requested parent, a descendant of `section`.
        new_parent: SectionId,
    },

    /// A link does not point at a compatible section.
    #[error("invalid link {link:?}: {reason}")]
    InvalidLink {
        /// The link path as given.
        link: String,
        /// Why the target is unusable.
        reason: String,
    },

    /// Merge operands are incompatible; nothing was changed.
    #[error("merge conflict at {path:?}: {reason}")]
    MergeConflict {
        /// Path of the target section where the conflict was detected.
        path: String,
        /// The incompatibility found there.
        reason: ConflictReason,
    },

    /// A value could not be typed.
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Why two sections cannot be merged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConflictReason {
    /// The sections have different types.
    #[error("section types differ ({ours} vs {theirs})")]
    TypeMismatch {
        /// Type of the target section.
        ours: String,
        /// Type of the section merged in.
        theirs: String,
    },

    /// Both sections name a repository and they differ.
    #[error("repositories differ ({ours} vs {theirs})")]
    RepositoryMismatch {
        /// Repository of the target section.
        ours: String,
        /// Repository of the section merged in.
        theirs: String,
    },

    /// Both sections name a mapping and they differ.
    #[error("mappings differ ({ours} vs {theirs})")]
    MappingMismatch {
        /// Mapping of the target section.
        ours: String,
        /// Mapping of the section merged in.
        theirs: String,
    },
}

/// Convenience alias for tree results.
pub type TreeResult<T> = Result<T, TreeError>;
