//! Same-document inheritance through `link`.
//!
//! A section whose `link` names another section of the same type is
//! extended by that section: the target's properties and subsections are
//! merged in with [`MergePolicy::SelfWins`], then the link is cleared.
//! Absolute link paths start at the root; relative ones at the linking
//! section's parent.

use odml_tree::{Document, MergePolicy, MergeReport, SectionId};
use tracing::{debug, warn};

use crate::config::ResolveConfig;
use crate::error::{ResolveError, ResolveResult};

/// Outcome of resolving every link in a document.
#[derive(Debug, Default)]
pub struct LinkReport {
    pub resolved: Vec<SectionId>,
    pub failed: Vec<(SectionId, ResolveError)>,
}

impl LinkReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Resolve the link on `section`.
///
/// Returns `Ok(None)` when the section has no link, which makes a second
/// call a no-op. A target that itself links elsewhere is resolved first. On
/// failure nothing is merged, the link stays in place, and the failure is
/// logged.
pub fn resolve_link(
    doc: &mut Document,
    section: SectionId,
    config: &ResolveConfig,
) -> ResolveResult<Option<MergeReport>> {
    let has_link = doc
        .section(section)
        .ok_or(odml_tree::TreeError::UnknownSection(section))?
        .link
        .is_some();
    if !has_link {
        return Ok(None);
    }
    let mut chain = Vec::new();
    match resolve_chain(doc, section, config, &mut chain) {
        Ok(report) => Ok(Some(report)),
        Err(e) => {
            let path = doc.path(section).unwrap_or_default();
            warn!(section = %path, error = %e, "link left unresolved");
            Err(e)
        }
    }
}

fn resolve_chain(
    doc: &mut Document,
    section: SectionId,
    config: &ResolveConfig,
    chain: &mut Vec<SectionId>,
) -> ResolveResult<MergeReport> {
    let Some(node) = doc.section(section) else {
        return Err(odml_tree::TreeError::UnknownSection(section).into());
    };
    let Some(link) = node.link.clone() else {
        return Ok(MergeReport::default());
    };
    let section_type = node.section_type().to_string();
    let path = || doc.path(section).unwrap_or_default();

    if chain.len() >= config.max_link_depth {
        return Err(ResolveError::LinkDepthExceeded {
            section: path(),
            max: config.max_link_depth,
        });
    }
    let target = doc
        .link_target(section, &link)
        .ok_or_else(|| ResolveError::LinkTargetNotFound {
            section: path(),
            link: link.clone(),
        })?;
    if target == section || doc.ancestors(section).contains(&target) || chain.contains(&target) {
        return Err(ResolveError::LinkCycle {
            section: path(),
            link,
        });
    }
    let target_type = doc
        .section(target)
        .map(|t| t.section_type().to_string())
        .unwrap_or_default();
    if target_type != section_type {
        return Err(ResolveError::LinkTypeMismatch {
            section: path(),
            link,
            expected: section_type,
            found: target_type,
        });
    }

    chain.push(section);
    let upstream = resolve_chain(doc, target, config, chain);
    chain.pop();
    upstream?;

    let report = doc.merge_within(section, target, MergePolicy::SelfWins)?;
    if let Some(node) = doc.section_mut(section) {
        node.link = None;
    }
    debug!(section = %section, link = %link, "resolved link");
    Ok(report)
}

/// Resolve every link in the document, children before their parents.
/// Failures are collected; the remaining links are still attempted.
pub fn resolve_all_links(doc: &mut Document, config: &ResolveConfig) -> LinkReport {
    let mut report = LinkReport::default();
    for section in doc.walk_post_order(doc.root()) {
        match resolve_link(doc, section, config) {
            Ok(Some(_)) => report.resolved.push(section),
            Ok(None) => {}
            Err(e) => report.failed.push((section, e)),
        }
    }
    report
}

/// Sections that still carry a link.
pub fn unresolved_links(doc: &Document) -> Vec<SectionId> {
    doc.walk(doc.root())
        .into_iter()
        .filter(|id| doc.section(*id).is_some_and(|s| s.link.is_some()))
        .collect()
}
