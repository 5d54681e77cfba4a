use std::collections::HashMap;

use odml_tree::Document;

use crate::url::normalize_url;

/// Parsed terminology documents keyed by normalized URL.
///
/// There is no eviction; call [`clear`](Self::clear) to bound memory. The
/// cache is a plain value owned by whoever resolves terminologies, so
/// sharing it across threads means wrapping it in a lock.
#[derive(Debug, Default, Clone)]
pub struct TerminologyCache {
    documents: HashMap<String, Document>,
}

impl TerminologyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&Document> {
        self.documents.get(&normalize_url(url))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.documents.contains_key(&normalize_url(url))
    }

    /// Store `document` under `url` and return a reference to the cached copy.
    pub fn insert(&mut self, url: &str, document: Document) -> &Document {
        let key = normalize_url(url);
        self.documents.insert(key.clone(), document);
        &self.documents[&key]
    }

    pub fn remove(&mut self, url: &str) -> Option<Document> {
        self.documents.remove(&normalize_url(url))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }
}
