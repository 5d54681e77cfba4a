//! The document ingestion boundary.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use odml_tree::Document;

use crate::error::{ResolveError, ResolveResult};
use crate::url::normalize_url;

/// Fetches and parses a document by URL.
///
/// Implementations decide which schemes they support and report others as
/// [`ResolveError::UnsupportedScheme`]. A fragment in `url` is ignored; the
/// whole document is returned. The returned document should have
/// `info.source_url` set so relative includes inside it can be resolved.
pub trait DocumentReader: Send + Sync {
    fn read(&self, url: &str) -> ResolveResult<Document>;
}

/// In-memory reader serving registered documents.
///
/// Intended for tests and embedding. Documents are keyed by normalized URL
/// and cloned on every read.
pub struct InMemoryReader {
    documents: RwLock<HashMap<String, Document>>,
    reads: AtomicUsize,
}

impl InMemoryReader {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            reads: AtomicUsize::new(0),
        }
    }

    /// Register `document` under `url`, replacing any earlier one.
    pub fn insert(&self, url: &str, mut document: Document) {
        document.info.source_url.get_or_insert_with(|| url.to_string());
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(normalize_url(url), document);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_document(self, url: &str, document: Document) -> Self {
        self.insert(url, document);
        self
    }

    /// Number of successful reads served so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentReader for InMemoryReader {
    fn read(&self, url: &str) -> ResolveResult<Document> {
        let map = self.documents.read().expect("lock poisoned");
        let document = map
            .get(&normalize_url(url))
            .cloned()
            .ok_or_else(|| ResolveError::Fetch {
                url: url.to_string(),
                reason: "no such document".into(),
            })?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(document)
    }
}
