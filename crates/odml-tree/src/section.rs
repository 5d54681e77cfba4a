//! Section nodes: typed, named containers of properties and subsections.

use uuid::Uuid;

use crate::error::TreeResult;
use crate::id::SectionId;
use crate::merge::{merge_properties, MergePolicy};
use crate::names::{normalize_type, same_name, validate_name, ROOT_TYPE};
use crate::property::Property;

/// A section of a document.
///
/// A node is created detached, may collect properties, and is then attached
/// to a [`Document`](crate::Document), which owns it from then on and keeps
/// its structural fields (parent, subsections, level) consistent.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionNode {
    id: Uuid,
    name: String,
    section_type: String,
    pub reference: Option<String>,
    pub definition: Option<String>,
    /// Vocabulary URL; unset means inherited from the nearest ancestor.
    pub repository: Option<String>,
    pub mapping: Option<String>,
    /// Path of a same-type section this one extends.
    pub link: Option<String>,
    /// `url[#fragment]` of an external section this one extends.
    pub include: Option<String>,
    pub is_terminology: bool,
    pub(crate) parent: Option<SectionId>,
    pub(crate) children: Vec<SectionId>,
    pub(crate) level: usize,
    properties: Vec<Property>,
}

impl SectionNode {
    /// Create a detached section. Fails on an invalid name or type.
    pub fn new(name: impl Into<String>, section_type: &str) -> TreeResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        let section_type = normalize_type(section_type)?;
        Ok(Self::unchecked(name, section_type))
    }

    pub(crate) fn root() -> Self {
        Self::unchecked(String::new(), ROOT_TYPE.to_string())
    }

    fn unchecked(name: String, section_type: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            name,
            section_type,
            reference: None,
            definition: None,
            repository: None,
            mapping: None,
            link: None,
            include: None,
            is_terminology: false,
            parent: None,
            children: Vec::new(),
            level: 0,
            properties: Vec::new(),
        }
    }

    /// Replace the generated id, e.g. with one read from a document.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.include = Some(include.into());
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.add_property(property);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name_unchecked(&mut self, name: String) {
        self.name = name;
    }

    pub fn section_type(&self) -> &str {
        &self.section_type
    }

    /// Change the type. Fails on an invalid type, leaving the old one.
    pub fn set_type(&mut self, section_type: &str) -> TreeResult<()> {
        self.section_type = normalize_type(section_type)?;
        Ok(())
    }

    pub fn parent(&self) -> Option<SectionId> {
        self.parent
    }

    pub fn subsections(&self) -> &[SectionId] {
        &self.children
    }

    /// Depth below the document root (root = 0).
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property_at(&self, index: usize) -> Option<&Property> {
        self.properties.get(index)
    }

    pub fn property_at_mut(&mut self, index: usize) -> Option<&mut Property> {
        self.properties.get_mut(index)
    }

    /// Add a property and return its index.
    ///
    /// If a property with the same name and dependency already exists, the
    /// new values are merged into it (equal contents are not duplicated)
    /// and the existing index is returned.
    pub fn add_property(&mut self, property: Property) -> usize {
        match self.properties.iter().position(|p| p.same_key(&property)) {
            Some(index) => {
                merge_properties(&mut self.properties[index], &property, MergePolicy::Combine);
                index
            }
            None => {
                self.properties.push(property);
                self.properties.len() - 1
            }
        }
    }

    /// First property named `name` (case-insensitive), any dependency.
    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| same_name(p.name(), name))
    }

    pub fn get_property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| same_name(p.name(), name))
    }

    /// Index of the property identified by `(name, dependency)`.
    pub fn property_index(&self, name: &str, dependency: Option<&str>) -> Option<usize> {
        self.properties.iter().position(|p| p.has_key(name, dependency))
    }

    /// Remove the first property named `name`.
    pub fn remove_property(&mut self, name: &str) -> Option<Property> {
        let index = self.properties.iter().position(|p| same_name(p.name(), name))?;
        Some(self.properties.remove(index))
    }

    /// Copy of the node's own data without structural links.
    pub(crate) fn detached_copy(&self) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            level: 0,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use odml_types::ValueCell;

    use super::*;

    fn prop(name: &str, values: &[i64]) -> Property {
        let cells = values.iter().map(|v| ValueCell::new(*v, None).unwrap()).collect();
        Property::with_values(name, cells).unwrap()
    }

    #[test]
    fn construction_validates_fields() {
        let s = SectionNode::new("rec1", "Recording").unwrap();
        assert_eq!(s.name(), "rec1");
        assert_eq!(s.section_type(), "recording");
        assert!(SectionNode::new("", "recording").is_err());
        assert!(SectionNode::new("a/b", "recording").is_err());
        assert!(SectionNode::new("rec", "").is_err());
    }

    #[test]
    fn add_property_merges_same_key() {
        let mut s = SectionNode::new("rec", "recording").unwrap();
        assert_eq!(s.add_property(prop("gain", &[10])), 0);
        assert_eq!(s.add_property(prop("Gain", &[10, 20])), 0);
        assert_eq!(s.properties().len(), 1);
        let values: Vec<_> = s.properties()[0]
            .values()
            .iter()
            .filter_map(ValueCell::as_int)
            .collect();
        assert_eq!(values, vec![10, 20]);
    }

    #[test]
    fn different_dependency_is_a_different_property() {
        let mut s = SectionNode::new("rec", "recording").unwrap();
        s.add_property(prop("gain", &[1]));
        s.add_property(prop("gain", &[2]).with_dependency("mode", "fast"));
        assert_eq!(s.properties().len(), 2);
        assert_eq!(s.property_index("gain", Some("mode")), Some(1));
    }

    #[test]
    fn property_lookup_is_case_insensitive() {
        let s = SectionNode::new("rec", "recording")
            .unwrap()
            .with_property(prop("Gain", &[5]));
        assert!(s.get_property("gain").is_some());
        assert!(s.get_property("offset").is_none());
    }

    #[test]
    fn remove_property_by_name() {
        let mut s = SectionNode::new("rec", "recording")
            .unwrap()
            .with_property(prop("gain", &[5]));
        assert!(s.remove_property("GAIN").is_some());
        assert!(s.properties().is_empty());
    }

    #[test]
    fn set_type_keeps_old_type_on_error() {
        let mut s = SectionNode::new("rec", "recording").unwrap();
        assert!(s.set_type("").is_err());
        assert_eq!(s.section_type(), "recording");
    }
}
