//! Three-way merge of sections, properties, and values.
//!
//! One algorithm serves every granularity: each optional field is resolved
//! independently by [`MergePolicy`], and the same policy is applied while
//! recursing from sections to properties to values.
//!
//! Section merges run in two passes. The first walks both subtrees and checks
//! every pair of matched sections for a [`ConflictReason`]; only when the whole
//! plan is conflict-free does the second pass mutate the target. A conflict
//! anywhere therefore leaves the target untouched.

use odml_types::ValueCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{ConflictReason, TreeError, TreeResult};
use crate::id::SectionId;
use crate::names::same_name;
use crate::property::Property;
use crate::section::SectionNode;

/// How a field set on both sides is resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Keep our value when set; otherwise take theirs.
    SelfWins,
    /// Take their value whenever it is set.
    OtherWins,
    /// Like `SelfWins`, except text fields are joined and value lists are
    /// unioned.
    #[default]
    Combine,
}

/// Counts of what a merge changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub sections_added: usize,
    pub properties_added: usize,
    pub values_added: usize,
    pub values_replaced: usize,
    pub fields_updated: usize,
}

impl MergeReport {
    /// `true` when the merge changed nothing.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }

    fn absorb(&mut self, other: MergeReport) {
        self.sections_added += other.sections_added;
        self.properties_added += other.properties_added;
        self.values_added += other.values_added;
        self.values_replaced += other.values_replaced;
        self.fields_updated += other.fields_updated;
    }
}

/// Resolve one optional field. Returns `true` if `ours` changed.
pub fn resolve_scalar<T: Clone + PartialEq>(
    ours: &mut Option<T>,
    theirs: &Option<T>,
    policy: MergePolicy,
) -> bool {
    let Some(theirs) = theirs else {
        return false;
    };
    let take = match ours {
        None => true,
        Some(current) => policy == MergePolicy::OtherWins && current != theirs,
    };
    if take {
        *ours = Some(theirs.clone());
    }
    take
}

/// Resolve an optional free-text field; `Combine` joins differing texts
/// with a newline.
pub fn resolve_text(ours: &mut Option<String>, theirs: &Option<String>, policy: MergePolicy) -> bool {
    match (ours.as_mut(), theirs, policy) {
        (Some(current), Some(other), MergePolicy::Combine) => {
            if current == other || current.lines().any(|line| line == other) {
                return false;
            }
            current.push('\n');
            current.push_str(other);
            true
        }
        _ => resolve_scalar(ours, theirs, policy),
    }
}

/// Merge the annotation fields of two values with equal content. Content
/// itself is never touched.
pub fn merge_values(ours: &mut ValueCell, theirs: &ValueCell, policy: MergePolicy) -> usize {
    [
        resolve_scalar(&mut ours.uncertainty, &theirs.uncertainty, policy),
        resolve_scalar(&mut ours.filename, &theirs.filename, policy),
        resolve_text(&mut ours.definition, &theirs.definition, policy),
        resolve_scalar(&mut ours.reference, &theirs.reference, policy),
    ]
    .into_iter()
    .filter(|changed| *changed)
    .count()
}

/// Merge `theirs` into `ours`, which share a `(name, dependency)` key.
///
/// Values with equal content are never duplicated; their annotations are
/// merged field by field. Values only present in `theirs` are handled per
/// policy:
///
/// - `Combine` appends them.
/// - `OtherWins` replaces a single value by another single value, and
///   otherwise appends.
/// - `SelfWins` takes them only if `ours` holds no content at all.
pub fn merge_properties(ours: &mut Property, theirs: &Property, policy: MergePolicy) -> MergeReport {
    let mut report = MergeReport::default();
    report.fields_updated += [
        resolve_text(&mut ours.definition, &theirs.definition, policy),
        resolve_scalar(&mut ours.mapping, &theirs.mapping, policy),
        resolve_scalar(&mut ours.dependency, &theirs.dependency, policy),
        resolve_scalar(&mut ours.dependency_value, &theirs.dependency_value, policy),
    ]
    .into_iter()
    .filter(|changed| *changed)
    .count();

    for synonym in &theirs.synonyms {
        if !ours.synonyms.iter().any(|s| same_name(s, synonym)) {
            ours.synonyms.push(synonym.clone());
            report.fields_updated += 1;
        }
    }

    if ours.is_empty() {
        if !theirs.is_empty() || ours.values().is_empty() {
            report.values_added += theirs.len();
            ours.set_values(theirs.values().to_vec());
        }
        return report;
    }

    let single_swap = policy == MergePolicy::OtherWins
        && ours.len() == 1
        && theirs.len() == 1
        && !theirs.is_empty()
        && ours.position_of(&theirs.values()[0]).is_none();
    if single_swap {
        ours.set_values(theirs.values().to_vec());
        report.values_replaced += 1;
        return report;
    }

    for value in theirs.values().iter().filter(|v| !v.is_empty()) {
        match ours.position_of(value) {
            Some(index) => {
                if let Some(existing) = ours.value_mut(index) {
                    report.fields_updated += merge_values(existing, value, policy);
                }
            }
            None if policy != MergePolicy::SelfWins => {
                ours.push_value(value.clone());
                report.values_added += 1;
            }
            None => {}
        }
    }
    report
}

/// Merge the subtree at `source` (in `source_doc`) into `target`.
///
/// Fails with [`TreeError::MergeConflict`] before changing anything if the
/// section types differ, or if any matched pair of sections carries two
/// different repositories or mappings.
pub fn merge_sections(
    target_doc: &mut Document,
    target: SectionId,
    source_doc: &Document,
    source: SectionId,
    policy: MergePolicy,
) -> TreeResult<MergeReport> {
    target_doc.try_section(target)?;
    source_doc.try_section(source)?;

    if let Err(reason) = check(target_doc, target, source_doc, source) {
        let (at, reason) = reason;
        let path = target_doc.path(at).unwrap_or_default();
        warn!(path = %path, reason = %reason, "merge aborted");
        return Err(TreeError::MergeConflict { path, reason });
    }

    let report = apply(target_doc, target, source_doc, source, policy)?;
    debug!(
        target = %target,
        sections = report.sections_added,
        properties = report.properties_added,
        values = report.values_added,
        "merged section"
    );
    Ok(report)
}

type Conflict = (SectionId, ConflictReason);

fn check(
    target_doc: &Document,
    target: SectionId,
    source_doc: &Document,
    source: SectionId,
) -> Result<(), Conflict> {
    let ours = target_doc.node(target);
    let theirs = source_doc.node(source);
    conflict_between(ours, theirs).map_err(|reason| (target, reason))?;

    for child in theirs.subsections() {
        if let Some(matched) = matching_child(target_doc, target, source_doc.node(*child)) {
            check(target_doc, matched, source_doc, *child)?;
        }
    }
    Ok(())
}

fn conflict_between(ours: &SectionNode, theirs: &SectionNode) -> Result<(), ConflictReason> {
    if ours.section_type() != theirs.section_type() {
        return Err(ConflictReason::TypeMismatch {
            ours: ours.section_type().to_string(),
            theirs: theirs.section_type().to_string(),
        });
    }
    if let (Some(a), Some(b)) = (&ours.repository, &theirs.repository) {
        if a != b {
            return Err(ConflictReason::RepositoryMismatch {
                ours: a.clone(),
                theirs: b.clone(),
            });
        }
    }
    if let (Some(a), Some(b)) = (&ours.mapping, &theirs.mapping) {
        if a != b {
            return Err(ConflictReason::MappingMismatch {
                ours: a.clone(),
                theirs: b.clone(),
            });
        }
    }
    Ok(())
}

/// Child of `parent` with the same name and type as `wanted`.
fn matching_child(doc: &Document, parent: SectionId, wanted: &SectionNode) -> Option<SectionId> {
    doc.node(parent).subsections().iter().copied().find(|c| {
        let child = doc.node(*c);
        same_name(child.name(), wanted.name()) && child.section_type() == wanted.section_type()
    })
}

fn apply(
    target_doc: &mut Document,
    target: SectionId,
    source_doc: &Document,
    source: SectionId,
    policy: MergePolicy,
) -> TreeResult<MergeReport> {
    let theirs = source_doc.node(source);
    let mut report = MergeReport::default();

    let ours = target_doc.try_section_mut(target)?;
    report.fields_updated += [
        resolve_text(&mut ours.definition, &theirs.definition, policy),
        resolve_scalar(&mut ours.reference, &theirs.reference, policy),
        resolve_scalar(&mut ours.repository, &theirs.repository, policy),
        resolve_scalar(&mut ours.mapping, &theirs.mapping, policy),
    ]
    .into_iter()
    .filter(|changed| *changed)
    .count();

    for property in theirs.properties() {
        match ours.property_index(property.name(), property.dependency.as_deref()) {
            Some(index) => {
                if let Some(existing) = ours.property_at_mut(index) {
                    report.absorb(merge_properties(existing, property, policy));
                }
            }
            None => {
                ours.add_property(property.clone());
                report.properties_added += 1;
            }
        }
    }

    for child in theirs.subsections() {
        match matching_child(target_doc, target, source_doc.node(*child)) {
            Some(matched) => {
                report.absorb(apply(target_doc, matched, source_doc, *child, policy)?);
            }
            None => {
                target_doc.graft(target, source_doc, *child)?;
                report.sections_added += source_doc.walk(*child).len();
            }
        }
    }
    Ok(report)
}

impl Document {
    /// Merge a section of another document into `target`.
    pub fn merge_from(
        &mut self,
        target: SectionId,
        source_doc: &Document,
        source: SectionId,
        policy: MergePolicy,
    ) -> TreeResult<MergeReport> {
        merge_sections(self, target, source_doc, source, policy)
    }

    /// Merge another section of this document into `target`. The source is
    /// snapshotted first, so it is never modified.
    pub fn merge_within(
        &mut self,
        target: SectionId,
        source: SectionId,
        policy: MergePolicy,
    ) -> TreeResult<MergeReport> {
        let snapshot = self.snapshot(source)?;
        let root = snapshot.root();
        merge_sections(self, target, &snapshot, root, policy)
    }
}
