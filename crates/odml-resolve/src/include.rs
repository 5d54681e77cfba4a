//! Cross-document inheritance through `include`.
//!
//! An include is `url[#fragment]`. The document at `url` is fetched through
//! a [`DocumentReader`]; the fragment, if present, names the section to use
//! (a bare name is searched depth-first, anything containing `/` is a
//! path). Without a fragment, sections of the including section's type are
//! candidates. The chosen section is merged in with
//! [`MergePolicy::SelfWins`], so local data overrides the included defaults,
//! and the include is cleared.

use odml_tree::{Document, MergePolicy, MergeReport, SectionId, TreeError};
use tracing::{debug, warn};

use crate::config::ResolveConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::reader::DocumentReader;
use crate::terminology::TerminologyManager;
use crate::url::{resolve_relative, split_fragment};

/// Outcome of loading every include in a document.
#[derive(Debug, Default)]
pub struct IncludeReport {
    pub resolved: Vec<SectionId>,
    pub failed: Vec<(SectionId, ResolveError)>,
}

impl IncludeReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Resolves includes against documents served by a reader.
pub struct IncludeResolver<'a> {
    reader: &'a dyn DocumentReader,
    config: ResolveConfig,
    terminologies: Option<&'a mut TerminologyManager>,
}

impl<'a> IncludeResolver<'a> {
    pub fn new(reader: &'a dyn DocumentReader) -> Self {
        Self {
            reader,
            config: ResolveConfig::default(),
            terminologies: None,
        }
    }

    pub fn with_config(mut self, config: ResolveConfig) -> Self {
        self.config = config;
        self
    }

    /// Terminology manager used when `backfill_on_include` is set.
    pub fn with_terminologies(mut self, manager: &'a mut TerminologyManager) -> Self {
        self.terminologies = Some(manager);
        self
    }

    /// Load the include on `section`.
    ///
    /// Returns `Ok(None)` when the section has no include. On failure
    /// nothing is merged, the include stays in place, and the failure is
    /// logged.
    pub fn load_include(&mut self, doc: &mut Document, section: SectionId) -> ResolveResult<Option<MergeReport>> {
        self.load_at_depth(doc, section, 0)
    }

    /// Load every include in the document, parents before children.
    /// Sections added by one include are visited too.
    pub fn load_all_includes(&mut self, doc: &mut Document) -> IncludeReport {
        let root = doc.root();
        self.load_subtree_at_depth(doc, root, 0)
    }

    fn load_subtree_at_depth(&mut self, doc: &mut Document, start: SectionId, depth: usize) -> IncludeReport {
        let mut report = IncludeReport::default();
        let mut stack = vec![start];
        while let Some(section) = stack.pop() {
            match self.load_at_depth(doc, section, depth) {
                Ok(Some(_)) => report.resolved.push(section),
                Ok(None) => {}
                Err(e) => report.failed.push((section, e)),
            }
            if let Some(node) = doc.section(section) {
                stack.extend(node.subsections().iter().rev());
            }
        }
        report
    }

    fn load_at_depth(
        &mut self,
        doc: &mut Document,
        section: SectionId,
        depth: usize,
    ) -> ResolveResult<Option<MergeReport>> {
        let include = doc
            .section(section)
            .ok_or(TreeError::UnknownSection(section))?
            .include
            .clone();
        let Some(include) = include else {
            return Ok(None);
        };
        match self.merge_include(doc, section, &include, depth) {
            Ok(report) => {
                debug!(section = %section, include = %include, "loaded include");
                Ok(Some(report))
            }
            Err(e) => {
                let path = doc.path(section).unwrap_or_default();
                warn!(section = %path, include = %include, error = %e, "include left unresolved");
                Err(e)
            }
        }
    }

    fn merge_include(
        &mut self,
        doc: &mut Document,
        section: SectionId,
        include: &str,
        depth: usize,
    ) -> ResolveResult<MergeReport> {
        let section_path = doc.path(section).unwrap_or_default();
        if depth >= self.config.max_include_depth {
            return Err(ResolveError::IncludeDepthExceeded {
                section: section_path,
                max: self.config.max_include_depth,
            });
        }

        let (location, fragment) = split_fragment(include);
        let url = resolve_relative(doc.info.source_url.as_deref(), location);
        let mut included = self.reader.read(&url)?;
        included.info.source_url.get_or_insert(url);

        let candidate = select_candidate(doc, section, &included, fragment).map_err(|candidates| {
            if candidates == 0 {
                ResolveError::IncludeTargetNotFound {
                    section: section_path.clone(),
                    include: include.to_string(),
                }
            } else {
                ResolveError::IncludeAmbiguous {
                    section: section_path.clone(),
                    include: include.to_string(),
                    candidates,
                }
            }
        })?;

        // Includes outside the chosen subtree are left alone.
        let nested = self.load_subtree_at_depth(&mut included, candidate, depth + 1);
        if let Some((_, e)) = nested.failed.into_iter().next() {
            return Err(e);
        }

        let report = doc.merge_from(section, &included, candidate, MergePolicy::SelfWins)?;
        if let Some(node) = doc.section_mut(section) {
            node.include = None;
        }

        if self.config.backfill_on_include {
            if let Some(manager) = self.terminologies.as_deref_mut() {
                if let Err(e) = manager.backfill(doc, section) {
                    warn!(section = %section_path, error = %e, "terminology backfill failed");
                }
            }
        }
        Ok(report)
    }
}

/// Pick the section of `included` that `section` should be merged with.
/// On failure returns the number of candidates (0 or more than one).
fn select_candidate(
    doc: &Document,
    section: SectionId,
    included: &Document,
    fragment: Option<&str>,
) -> Result<SectionId, usize> {
    let root = included.root();
    if let Some(fragment) = fragment {
        let found = if fragment.contains('/') {
            included.resolve_section(root, fragment)
        } else {
            included.find_section(root, fragment)
        };
        return found.ok_or(0);
    }

    let Some(node) = doc.section(section) else {
        return Err(0);
    };
    let candidates = included.find_sections_by_type(root, node.section_type());
    if candidates.len() == 1 {
        return Ok(candidates[0]);
    }
    let exact: Vec<SectionId> = candidates
        .iter()
        .copied()
        .filter(|c| included.section(*c).is_some_and(|s| s.section_type() == node.section_type()))
        .collect();
    if exact.len() == 1 {
        return Ok(exact[0]);
    }
    let pool = if exact.is_empty() { &candidates } else { &exact };
    let named: Vec<SectionId> = pool
        .iter()
        .copied()
        .filter(|c| {
            included
                .section(*c)
                .is_some_and(|s| s.name().eq_ignore_ascii_case(node.name()))
        })
        .collect();
    match named.as_slice() {
        [only] => Ok(*only),
        _ => Err(candidates.len()),
    }
}

/// Sections that still carry an include.
pub fn unresolved_includes(doc: &Document) -> Vec<SectionId> {
    doc.walk(doc.root())
        .into_iter()
        .filter(|id| doc.section(*id).is_some_and(|s| s.include.is_some()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use odml_tree::{Property, SectionNode};
    use odml_types::ValueCell;

    use super::*;
    use crate::cache::TerminologyCache;
    use crate::reader::InMemoryReader;

    const SHARED: &str = "/lab/shared/hardware.json";

    fn int_prop(name: &str, v: i64) -> Property {
        Property::with_values(name, vec![ValueCell::new(v, None).unwrap()]).unwrap()
    }

    fn int_of(doc: &Document, id: SectionId, name: &str) -> Option<i64> {
        doc.section(id)?.get_property(name)?.value()?.as_int()
    }

    /// Shared document: `/amp` (amplifier) with gain 10 and channels 4, and
    /// `/rack/amp2` (amplifier) with gain 20.
    fn shared() -> Document {
        let mut doc = Document::new();
        let root = doc.root();
        let amp = doc.create_section(root, "amp", "amplifier").unwrap();
        doc.add_property(amp, int_prop("gain", 10)).unwrap();
        doc.add_property(amp, int_prop("channels", 4)).unwrap();
        let rack = doc.create_section(root, "rack", "rack").unwrap();
        let amp2 = doc.create_section(rack, "amp2", "amplifier").unwrap();
        doc.add_property(amp2, int_prop("gain", 20)).unwrap();
        doc
    }

    fn local(include: &str) -> (Document, SectionId) {
        let mut doc = Document::new();
        doc.info.source_url = Some("/lab/exp1/session.json".into());
        let node = SectionNode::new("amp", "amplifier")
            .unwrap()
            .with_include(include)
            .with_property(int_prop("gain", 3));
        let amp = doc.add_section(doc.root(), node).unwrap();
        (doc, amp)
    }

    #[test]
    fn fragment_by_name_merges_with_local_priority() {
        let reader = InMemoryReader::new().with_document(SHARED, shared());
        let (mut doc, amp) = local("../shared/hardware.json#amp");
        let report = IncludeResolver::new(&reader).load_include(&mut doc, amp).unwrap().unwrap();
        assert_eq!(report.properties_added, 1);
        assert_eq!(int_of(&doc, amp, "gain"), Some(3));
        assert_eq!(int_of(&doc, amp, "channels"), Some(4));
        assert!(doc.section(amp).unwrap().include.is_none());
    }

    #[test]
    fn second_load_is_noop() {
        let reader = InMemoryReader::new().with_document(SHARED, shared());
        let (mut doc, amp) = local("../shared/hardware.json#amp");
        let mut resolver = IncludeResolver::new(&reader);
        resolver.load_include(&mut doc, amp).unwrap();
        assert!(resolver.load_include(&mut doc, amp).unwrap().is_none());
        assert_eq!(reader.read_count(), 1);
    }

    #[test]
    fn fragment_path_selects_nested_section() {
        let reader = InMemoryReader::new().with_document(SHARED, shared());
        let (mut doc, amp) = local(&format!("{SHARED}#/rack/amp2"));
        doc.section_mut(amp).unwrap().remove_property("gain");
        IncludeResolver::new(&reader).load_include(&mut doc, amp).unwrap();
        assert_eq!(int_of(&doc, amp, "gain"), Some(20));
    }

    #[test]
    fn name_disambiguates_same_type_candidates() {
        let reader = InMemoryReader::new().with_document(SHARED, shared());
        let (mut doc, amp) = local(SHARED);
        IncludeResolver::new(&reader).load_include(&mut doc, amp).unwrap();
        assert_eq!(int_of(&doc, amp, "channels"), Some(4));
    }

    #[test]
    fn ambiguous_candidates_fail_without_mutation() {
        let reader = InMemoryReader::new().with_document(SHARED, shared());
        let (mut doc, amp) = local(SHARED);
        doc.rename_section(amp, "main_amp").unwrap();
        let err = IncludeResolver::new(&reader).load_include(&mut doc, amp).unwrap_err();
        assert!(matches!(err, ResolveError::IncludeAmbiguous { candidates: 2, .. }));
        assert_eq!(unresolved_includes(&doc), vec![amp]);
        assert!(doc.section(amp).unwrap().get_property("channels").is_none());
    }

    #[test]
    fn missing_document_is_reported() {
        let reader = InMemoryReader::new();
        let (mut doc, amp) = local("other.json");
        let report = IncludeResolver::new(&reader).load_all_includes(&mut doc);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].1, ResolveError::Fetch { .. }));
        assert_eq!(unresolved_includes(&doc), vec![amp]);
    }

    #[test]
    fn nested_includes_respect_depth_limit() {
        let mut inner = Document::new();
        let node = SectionNode::new("amp", "amplifier").unwrap().with_include("/lab/a.json");
        inner.add_section(inner.root(), node).unwrap();
        let reader = InMemoryReader::new().with_document("/lab/a.json", inner);
        let (mut doc, amp) = local("/lab/a.json");

        let err = IncludeResolver::new(&reader).load_include(&mut doc, amp).unwrap_err();
        assert!(matches!(err, ResolveError::IncludeDepthExceeded { max: 8, .. }));
        assert_eq!(reader.read_count(), 8);
    }

    #[test]
    fn included_sections_with_includes_are_loaded() {
        let mut parts = Document::new();
        let filter = parts.create_section(parts.root(), "filter", "filter").unwrap();
        parts.add_property(filter, int_prop("cutoff", 300)).unwrap();

        let mut hardware = shared();
        let amp = hardware.get_section(hardware.root(), "amp").unwrap();
        let node = SectionNode::new("filter", "filter").unwrap().with_include("parts.json");
        hardware.add_section(amp, node).unwrap();

        let reader = InMemoryReader::new()
            .with_document(SHARED, hardware)
            .with_document("/lab/shared/parts.json", parts);
        let (mut doc, local_amp) = local("../shared/hardware.json#amp");
        let report = IncludeResolver::new(&reader).load_all_includes(&mut doc);
        assert!(report.is_complete(), "{:?}", report.failed);

        let filter = doc.get_section(local_amp, "filter").unwrap();
        assert_eq!(int_of(&doc, filter, "cutoff"), Some(300));
        assert!(unresolved_includes(&doc).is_empty());
    }

    #[test]
    fn broken_include_outside_candidate_is_ignored() {
        let mut hardware = shared();
        let node = SectionNode::new("other", "misc").unwrap().with_include("/lab/missing.json");
        hardware.add_section(hardware.root(), node).unwrap();
        let reader = InMemoryReader::new().with_document(SHARED, hardware);

        let (mut doc, amp) = local("../shared/hardware.json#amp");
        IncludeResolver::new(&reader).load_include(&mut doc, amp).unwrap();
        assert_eq!(int_of(&doc, amp, "channels"), Some(4));
        assert!(unresolved_includes(&doc).is_empty());
    }

    #[test]
    fn broken_include_inside_candidate_fails() {
        let mut hardware = shared();
        let amp = hardware.get_section(hardware.root(), "amp").unwrap();
        let node = SectionNode::new("filter", "filter").unwrap().with_include("/lab/missing.json");
        hardware.add_section(amp, node).unwrap();
        let reader = InMemoryReader::new().with_document(SHARED, hardware);

        let (mut doc, local_amp) = local("../shared/hardware.json#amp");
        let err = IncludeResolver::new(&reader).load_include(&mut doc, local_amp).unwrap_err();
        assert!(matches!(err, ResolveError::Fetch { .. }));
        assert!(doc.section(local_amp).unwrap().get_property("channels").is_none());
        assert_eq!(unresolved_includes(&doc), vec![local_amp]);
    }

    #[test]
    fn exact_type_wins_over_subtypes() {
        let mut hardware = Document::new();
        let root = hardware.root();
        let tube = hardware.create_section(root, "tube", "amplifier/tube").unwrap();
        hardware.add_property(tube, int_prop("gain", 40)).unwrap();
        let plain = hardware.create_section(root, "plain", "amplifier").unwrap();
        hardware.add_property(plain, int_prop("channels", 2)).unwrap();
        let reader = InMemoryReader::new().with_document(SHARED, hardware);

        let (mut doc, amp) = local(SHARED);
        doc.rename_section(amp, "main_amp").unwrap();
        IncludeResolver::new(&reader).load_include(&mut doc, amp).unwrap();
        assert_eq!(int_of(&doc, amp, "channels"), Some(2));
        assert_eq!(int_of(&doc, amp, "gain"), Some(3));
    }

    #[test]
    fn backfill_runs_when_configured() {
        let mut terms = Document::new();
        let node = SectionNode::new("Amplifier", "amplifier")
            .unwrap()
            .with_definition("Signal amplifier");
        terms.add_section(terms.root(), node).unwrap();
        let term_reader = Arc::new(InMemoryReader::new().with_document("http://terms/hw.json", terms));
        let mut manager = TerminologyManager::new(term_reader, TerminologyCache::new());

        let reader = InMemoryReader::new().with_document(SHARED, shared());
        let (mut doc, amp) = local("../shared/hardware.json#amp");
        doc.section_mut(doc.root()).unwrap().repository = Some("http://terms/hw.json".into());
        let config = ResolveConfig {
            backfill_on_include: true,
            ..Default::default()
        };
        IncludeResolver::new(&reader)
            .with_config(config)
            .with_terminologies(&mut manager)
            .load_include(&mut doc, amp)
            .unwrap();
        assert_eq!(doc.section(amp).unwrap().definition.as_deref(), Some("Signal amplifier"));
    }
}
