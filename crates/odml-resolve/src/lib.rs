//! Link, include, and terminology resolution for odml documents.
//!
//! Sections can inherit from other sections of the same document (`link`)
//! or of another document (`include`), and can be checked against the
//! terminology named by their repository. Documents are fetched through the
//! [`DocumentReader`] boundary, so this crate performs no I/O itself.
//!
//! # Modules
//!
//! - [`link`]: same-document inheritance
//! - [`include`]: cross-document inheritance
//! - [`terminology`]: cached terminology access and definition backfill
//! - [`validation`]: read-only consistency checks
//! - [`url`]: fragment splitting, cache keys, relative references

pub mod cache;
pub mod config;
pub mod error;
pub mod include;
pub mod link;
pub mod reader;
pub mod terminology;
pub mod url;
pub mod validation;

pub use cache::TerminologyCache;
pub use config::ResolveConfig;
pub use error::{ResolveError, ResolveResult};
pub use include::{unresolved_includes, IncludeReport, IncludeResolver};
pub use link::{resolve_all_links, resolve_link, unresolved_links, LinkReport};
pub use reader::{DocumentReader, InMemoryReader};
pub use terminology::TerminologyManager;
pub use validation::{validate, validate_with_terminology, Issue, IssueKind};
