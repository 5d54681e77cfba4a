//! Access to terminology documents.
//!
//! A terminology is a reference document declaring the canonical sections
//! and properties for a vocabulary. Sections point at one through their
//! (possibly inherited) `repository` URL.

use std::sync::Arc;

use odml_tree::{normalize_type, Document, SectionId};
use tracing::{debug, info};

use crate::cache::TerminologyCache;
use crate::config::ResolveConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::reader::DocumentReader;

/// Loads terminology documents through a [`DocumentReader`] and keeps them
/// in an injected [`TerminologyCache`].
pub struct TerminologyManager {
    reader: Arc<dyn DocumentReader>,
    cache: TerminologyCache,
    config: ResolveConfig,
}

impl TerminologyManager {
    pub fn new(reader: Arc<dyn DocumentReader>, cache: TerminologyCache) -> Self {
        Self {
            reader,
            cache,
            config: ResolveConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolveConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache(&self) -> &TerminologyCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TerminologyCache {
        &mut self.cache
    }

    /// Give the cache back, e.g. to reuse it with another manager.
    pub fn into_cache(self) -> TerminologyCache {
        self.cache
    }

    /// The whole terminology document at `url`, loading it on first use.
    pub fn document(&mut self, url: &str) -> ResolveResult<&Document> {
        if !self.cache.contains(url) {
            let mut document = self.reader.read(url)?;
            if self.config.mark_terminologies {
                for id in document.walk(document.root()) {
                    if let Some(section) = document.section_mut(id) {
                        section.is_terminology = true;
                    }
                }
            }
            info!(url, sections = document.len(), "loaded terminology");
            return Ok(self.cache.insert(url, document));
        }
        debug!(url, "terminology cache hit");
        self.cache.get(url).ok_or_else(|| ResolveError::Fetch {
            url: url.to_string(),
            reason: "terminology vanished from cache".into(),
        })
    }

    /// A copy of the terminology at `url`.
    ///
    /// Without a filter the whole document is returned. With one, the first
    /// section of exactly that type is returned as the root of the copy,
    /// falling back to the first subtype; `None` if neither exists.
    pub fn terminology(&mut self, url: &str, type_filter: Option<&str>) -> ResolveResult<Option<Document>> {
        let document = self.document(url)?;
        let Some(filter) = type_filter else {
            return Ok(Some(document.clone()));
        };
        let Ok(wanted) = normalize_type(filter) else {
            return Ok(None);
        };
        let candidates = document.find_sections_by_type(document.root(), &wanted);
        let chosen = candidates
            .iter()
            .copied()
            .find(|id| document.section(*id).is_some_and(|s| s.section_type() == wanted))
            .or_else(|| candidates.first().copied());
        match chosen {
            Some(id) => Ok(Some(document.snapshot(id)?)),
            None => Ok(None),
        }
    }

    /// The terminology section matching `section`'s type under its
    /// effective repository. `None` when no repository applies or the
    /// terminology has no such section.
    pub fn terminology_for(&mut self, doc: &Document, section: SectionId) -> ResolveResult<Option<Document>> {
        let Some(node) = doc.section(section) else {
            return Ok(None);
        };
        let Some(repository) = doc.effective_repository(section) else {
            return Ok(None);
        };
        let repository = repository.to_string();
        let section_type = node.section_type().to_string();
        self.terminology(&repository, Some(&section_type))
    }

    /// Fill unset definitions of `section` and its properties from the
    /// section's terminology. Never adds properties or values. Returns the
    /// number of fields filled.
    pub fn backfill(&mut self, doc: &mut Document, section: SectionId) -> ResolveResult<usize> {
        let Some(terminology) = self.terminology_for(doc, section)? else {
            return Ok(0);
        };
        let Some(template) = terminology.section(terminology.root()) else {
            return Ok(0);
        };
        let Some(node) = doc.section_mut(section) else {
            return Ok(0);
        };

        let mut filled = 0;
        if node.definition.is_none() && template.definition.is_some() {
            node.definition = template.definition.clone();
            filled += 1;
        }
        for index in 0..node.properties().len() {
            let Some(property) = node.property_at_mut(index) else {
                continue;
            };
            if property.definition.is_some() {
                continue;
            }
            let definition = template
                .properties()
                .iter()
                .find(|t| t.answers_to(property.name()))
                .and_then(|t| t.definition.clone());
            if definition.is_some() {
                property.definition = definition;
                filled += 1;
            }
        }
        debug!(section = %section, filled, "backfilled from terminology");
        Ok(filled)
    }
}
