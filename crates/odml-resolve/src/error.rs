//! Error types for link, include, and terminology resolution.

use odml_tree::TreeError;

/// Errors from resolving links, includes, and terminologies.
///
/// A failed link or include leaves the section's `link`/`include` field in
/// place, so the failure can be found again by re-scanning the tree.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The link path does not lead to a section.
    #[error("link {link:?} on {section}: target not found")]
    LinkTargetNotFound {
        /// Path of the linking section.
        section: String,
        /// The link as written.
        link: String,
    },

    /// The link target has a different type than the linking section.
    #[error("link {link:?} on {section}: target type {found:?} differs from {expected:?}")]
    LinkTypeMismatch {
        /// Path of the linking section.
        section: String,
        /// The link as written.
        link: String,
        /// Type of the linking section.
        expected: String,
        /// Type of the target.
        found: String,
    },

    /// The link points at the section itself, an ancestor, or back into a
    /// chain of links being resolved.
    #[error("link {link:?} on {section} is cyclic")]
    LinkCycle {
        /// Path of the linking section.
        section: String,
        /// The link as written.
        link: String,
    },

    /// A chain of links is longer than the configured limit.
    #[error("link chain through {section} exceeds {max} steps")]
    LinkDepthExceeded {
        /// Path of the section whose chain was being resolved.
        section: String,
        /// The configured limit.
        max: usize,
    },

    /// A document could not be fetched or parsed.
    #[error("cannot load {url:?}: {reason}")]
    Fetch {
        /// The URL handed to the reader.
        url: String,
        /// The reader's explanation.
        reason: String,
    },

    /// The URL scheme is not supported by the reader.
    #[error("unsupported URL scheme in {0:?}")]
    UnsupportedScheme(String),

    /// No section of the included document matches.
    #[error("include {include:?} on {section}: no matching section")]
    IncludeTargetNotFound {
        /// Path of the including section.
        section: String,
        /// The include as written.
        include: String,
    },

    /// Several sections of the included document match equally well.
    #[error("include {include:?} on {section}: {candidates} candidate sections")]
    IncludeAmbiguous {
        /// Path of the including section.
        section: String,
        /// The include as written.
        include: String,
        /// How many sections matched.
        candidates: usize,
    },

    /// Includes nest deeper than the configured limit.
    #[error("includes below {section} nest deeper than {max}")]
    IncludeDepthExceeded {
        /// Path of the including section.
        section: String,
        /// The configured limit.
        max: usize,
    },

    /// A configuration file could not be parsed.
    #[error("invalid resolve configuration: {0}")]
    Config(String),

    /// A tree operation failed (merge conflict, unknown handle, ...).
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Result alias for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
