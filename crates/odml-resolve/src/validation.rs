//! Read-only consistency checks over a document.

use std::fmt;

use odml_tree::{Document, SectionId};
use odml_types::ValueKind;
use tracing::warn;

use crate::terminology::TerminologyManager;

/// What is wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssueKind {
    UnresolvedLink(String),
    UnresolvedInclude(String),
    /// The property holds no value with content.
    EmptyProperty,
    MixedKinds,
    /// The section's terminology has no property of this name.
    UnknownProperty,
    /// The value kind disagrees with the terminology's property.
    KindMismatch { expected: ValueKind, found: ValueKind },
    /// The section's repository could not be loaded.
    TerminologyUnavailable(String),
}

/// One finding of [`validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Issue {
    pub section: SectionId,
    pub path: String,
    pub property: Option<String>,
    pub kind: IssueKind,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = match &self.property {
            Some(property) => format!("{}:{}", self.path, property),
            None => self.path.clone(),
        };
        match &self.kind {
            IssueKind::UnresolvedLink(link) => write!(f, "{location}: unresolved link {link:?}"),
            IssueKind::UnresolvedInclude(include) => {
                write!(f, "{location}: unresolved include {include:?}")
            }
            IssueKind::EmptyProperty => write!(f, "{location}: property has no values"),
            IssueKind::MixedKinds => write!(f, "{location}: values of different kinds"),
            IssueKind::UnknownProperty => write!(f, "{location}: not defined by the terminology"),
            IssueKind::KindMismatch { expected, found } => {
                write!(f, "{location}: terminology expects {expected}, found {found}")
            }
            IssueKind::TerminologyUnavailable(url) => {
                write!(f, "{location}: terminology {url:?} unavailable")
            }
        }
    }
}

/// Structural checks only: unresolved links and includes, empty
/// properties, mixed value kinds.
pub fn validate(doc: &Document) -> Vec<Issue> {
    let mut issues = Vec::new();
    for id in doc.walk(doc.root()) {
        structural_issues(doc, id, &mut issues);
    }
    issues
}

/// [`validate`] plus checks against each section's terminology.
pub fn validate_with_terminology(doc: &Document, manager: &mut TerminologyManager) -> Vec<Issue> {
    let mut issues = Vec::new();
    for id in doc.walk(doc.root()) {
        structural_issues(doc, id, &mut issues);
        if id != doc.root() {
            terminology_issues(doc, id, manager, &mut issues);
        }
    }
    issues
}

fn structural_issues(doc: &Document, id: SectionId, issues: &mut Vec<Issue>) {
    let Some(section) = doc.section(id) else {
        return;
    };
    let path = doc.path(id).unwrap_or_default();
    let issue = |property: Option<&str>, kind| Issue {
        section: id,
        path: path.clone(),
        property: property.map(str::to_string),
        kind,
    };

    if let Some(link) = &section.link {
        issues.push(issue(None, IssueKind::UnresolvedLink(link.clone())));
    }
    if let Some(include) = &section.include {
        issues.push(issue(None, IssueKind::UnresolvedInclude(include.clone())));
    }
    // Terminology documents declare properties without values.
    if section.is_terminology {
        return;
    }
    for property in section.properties() {
        if property.is_empty() {
            issues.push(issue(Some(property.name()), IssueKind::EmptyProperty));
        } else if property.has_mixed_kinds() {
            issues.push(issue(Some(property.name()), IssueKind::MixedKinds));
        }
    }
}

fn terminology_issues(
    doc: &Document,
    id: SectionId,
    manager: &mut TerminologyManager,
    issues: &mut Vec<Issue>,
) {
    let Some(section) = doc.section(id) else {
        return;
    };
    let path = doc.path(id).unwrap_or_default();
    let terminology = match manager.terminology_for(doc, id) {
        Ok(Some(terminology)) => terminology,
        Ok(None) => return,
        Err(e) => {
            let url = doc.effective_repository(id).unwrap_or_default().to_string();
            warn!(section = %path, error = %e, "terminology unavailable");
            issues.push(Issue {
                section: id,
                path,
                property: None,
                kind: IssueKind::TerminologyUnavailable(url),
            });
            return;
        }
    };
    let Some(template) = terminology.section(terminology.root()) else {
        return;
    };

    for property in section.properties() {
        let kind = match template.properties().iter().find(|t| t.answers_to(property.name())) {
            None => Some(IssueKind::UnknownProperty),
            Some(defined) => match (defined.kind(), property.kind()) {
                (Some(expected), Some(found)) if !expected.accepts(found) => {
                    Some(IssueKind::KindMismatch { expected, found })
                }
                _ => None,
            },
        };
        if let Some(kind) = kind {
            issues.push(Issue {
                section: id,
                path: path.clone(),
                property: Some(property.name().to_string()),
                kind,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use odml_tree::{Property, SectionNode};
    use odml_types::ValueCell;

    use super::*;
    use crate::cache::TerminologyCache;
    use crate::reader::InMemoryReader;

    const TERMS: &str = "http://terms/cell.json";

    fn value(raw: &str) -> ValueCell {
        ValueCell::new(raw, None).unwrap()
    }

    fn manager() -> TerminologyManager {
        let mut terms = Document::new();
        let cell = SectionNode::new("Cell", "cell")
            .unwrap()
            .with_property(Property::with_values("Count", vec![ValueCell::empty(ValueKind::Int)]).unwrap())
            .with_property(Property::new("Label").unwrap());
        terms.add_section(terms.root(), cell).unwrap();
        let reader = Arc::new(InMemoryReader::new().with_document(TERMS, terms));
        TerminologyManager::new(reader, TerminologyCache::new())
    }

    #[test]
    fn clean_document_has_no_issues() {
        let mut doc = Document::new();
        let s = doc.create_section(doc.root(), "s", "x").unwrap();
        doc.add_property(s, Property::with_values("a", vec![value("1")]).unwrap()).unwrap();
        assert!(validate(&doc).is_empty());
    }

    #[test]
    fn structural_issues_are_reported() {
        let mut doc = Document::new();
        let root = doc.root();
        let s = doc.add_section(root, SectionNode::new("s", "x").unwrap().with_link("/gone")).unwrap();
        doc.add_section(root, SectionNode::new("t", "x").unwrap().with_include("gone.json"))
            .unwrap();
        doc.add_property(s, Property::new("empty").unwrap()).unwrap();
        doc.add_property(s, Property::with_values("mixed", vec![value("1"), value("abc")]).unwrap())
            .unwrap();

        let kinds: Vec<_> = validate(&doc).into_iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::UnresolvedLink("/gone".into()),
                IssueKind::EmptyProperty,
                IssueKind::MixedKinds,
                IssueKind::UnresolvedInclude("gone.json".into()),
            ]
        );
    }

    #[test]
    fn terminology_checks_names_and_kinds() {
        let mut manager = manager();
        let mut doc = Document::new();
        let root = doc.root();
        doc.section_mut(root).unwrap().repository = Some(TERMS.into());
        let c = doc.create_section(root, "c1", "cell").unwrap();
        doc.add_property(c, Property::with_values("count", vec![value("abc")]).unwrap()).unwrap();
        doc.add_property(c, Property::with_values("label", vec![value("x")]).unwrap()).unwrap();
        doc.add_property(c, Property::with_values("color", vec![value("red")]).unwrap()).unwrap();

        let issues = validate_with_terminology(&doc, &mut manager);
        assert_eq!(issues.len(), 2);
        assert_eq!(
            issues[0].kind,
            IssueKind::KindMismatch {
                expected: ValueKind::Int,
                found: ValueKind::String
            }
        );
        assert_eq!(issues[1].property.as_deref(), Some("color"));
        assert_eq!(issues[1].to_string(), "/c1:color: not defined by the terminology");
    }

    #[test]
    fn unreachable_terminology_is_an_issue() {
        let mut manager = manager();
        let mut doc = Document::new();
        let root = doc.root();
        let node = SectionNode::new("c1", "cell").unwrap().with_repository("http://elsewhere/x.json");
        doc.add_section(root, node).unwrap();
        let issues = validate_with_terminology(&doc, &mut manager);
        assert_eq!(
            issues[0].kind,
            IssueKind::TerminologyUnavailable("http://elsewhere/x.json".into())
        );
    }
}
