//! The document arena.
//!
//! [`Document`] owns every section of one tree in a slot vector addressed by
//! [`SectionId`] handles. Parent links and child lists are both handles, so
//! back-references never own anything. Removing a section tombstones its
//! whole subtree; handles are never reused.
//!
//! # Invariants
//!
//! - Slot 0 is the root; it has no parent, an empty name, and level 0.
//! - Every live non-root section appears exactly once in its parent's
//!   child list, and `level == parent.level + 1`.
//! - Sibling names are unique (case-insensitive).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{TreeError, TreeResult};
use crate::id::{PropertyHandle, SectionId};
use crate::names::{same_name, validate_name};
use crate::property::Property;
use crate::section::SectionNode;

/// Document-level metadata carried by the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub author: Option<String>,
    pub date: Option<NaiveDate>,
    pub version: Option<String>,
    /// Where the document was loaded from, used to resolve relative includes.
    pub source_url: Option<String>,
}

/// A tree of sections rooted at an unnamed document root.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Option<SectionNode>>,
    pub info: DocumentInfo,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::with_root(SectionNode::root())
    }

    fn with_root(root: SectionNode) -> Self {
        Self {
            nodes: vec![Some(root)],
            info: DocumentInfo::default(),
        }
    }

    pub fn root(&self) -> SectionId {
        SectionId::from_index(0)
    }

    /// Number of live sections, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// `true` when the root has no subsections and no properties.
    pub fn is_empty(&self) -> bool {
        let root = self.node(self.root());
        root.subsections().is_empty() && root.properties().is_empty()
    }

    pub fn contains(&self, id: SectionId) -> bool {
        self.section(id).is_some()
    }

    pub fn section(&self, id: SectionId) -> Option<&SectionNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn section_mut(&mut self, id: SectionId) -> Option<&mut SectionNode> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub(crate) fn try_section(&self, id: SectionId) -> TreeResult<&SectionNode> {
        self.section(id).ok_or(TreeError::UnknownSection(id))
    }

    pub(crate) fn try_section_mut(&mut self, id: SectionId) -> TreeResult<&mut SectionNode> {
        self.section_mut(id).ok_or(TreeError::UnknownSection(id))
    }

    /// Access a node that is known to be live. Only used for handles read
    /// from the tree's own structure.
    pub(crate) fn node(&self, id: SectionId) -> &SectionNode {
        match self.section(id) {
            Some(node) => node,
            None => unreachable!("structural handle {id} points at a removed section"),
        }
    }

    fn node_mut(&mut self, id: SectionId) -> &mut SectionNode {
        match self.section_mut(id) {
            Some(node) => node,
            None => unreachable!("structural handle {id} points at a removed section"),
        }
    }

    pub fn property(&self, handle: PropertyHandle) -> Option<&Property> {
        self.section(handle.section)?.property_at(handle.index)
    }

    pub fn property_mut(&mut self, handle: PropertyHandle) -> Option<&mut Property> {
        self.section_mut(handle.section)?.property_at_mut(handle.index)
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Attach a detached section below `parent` and return its handle.
    ///
    /// On a sibling name collision the name gets a numeric suffix; this is
    /// logged, not an error.
    pub fn add_section(&mut self, parent: SectionId, mut node: SectionNode) -> TreeResult<SectionId> {
        let parent_level = self.try_section(parent)?.level;
        let name = self.unique_child_name(parent, node.name(), None);
        node.set_name_unchecked(name);
        node.parent = Some(parent);
        node.children.clear();
        node.level = parent_level + 1;

        let id = SectionId::from_index(self.nodes.len());
        debug!(section = %id, name = node.name(), parent = %parent, "added section");
        self.nodes.push(Some(node));
        self.node_mut(parent).children.push(id);
        Ok(id)
    }

    /// Construct and attach a section in one step.
    pub fn create_section(
        &mut self,
        parent: SectionId,
        name: &str,
        section_type: &str,
    ) -> TreeResult<SectionId> {
        let node = SectionNode::new(name, section_type)?;
        self.add_section(parent, node)
    }

    /// Add a property to a section; see [`SectionNode::add_property`].
    pub fn add_property(&mut self, section: SectionId, property: Property) -> TreeResult<PropertyHandle> {
        let index = self.try_section_mut(section)?.add_property(property);
        Ok(PropertyHandle::new(section, index))
    }

    /// Remove a section and all its descendants.
    pub fn remove_section(&mut self, id: SectionId) -> TreeResult<()> {
        if id == self.root() {
            return Err(TreeError::RootOperation("remove"));
        }
        let parent = self.try_section(id)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
        let doomed = self.walk(id);
        for section in &doomed {
            self.nodes[section.index()] = None;
        }
        debug!(section = %id, removed = doomed.len(), "removed section subtree");
        Ok(())
    }

    /// Move a section (with its subtree) below `new_parent`, appending it
    /// to the new parent's subsections.
    pub fn reparent(&mut self, id: SectionId, new_parent: SectionId) -> TreeResult<()> {
        if id == self.root() {
            return Err(TreeError::RootOperation("reparent"));
        }
        self.try_section(id)?;
        self.try_section(new_parent)?;
        if new_parent == id || self.ancestors(new_parent).contains(&id) {
            return Err(TreeError::CyclicReparent {
                section: id,
                new_parent,
            });
        }

        if let Some(old_parent) = self.node(id).parent {
            self.node_mut(old_parent).children.retain(|c| *c != id);
        }
        let name = self.unique_child_name(new_parent, self.node(id).name(), Some(id));
        let level = self.node(new_parent).level + 1;
        let node = self.node_mut(id);
        node.set_name_unchecked(name);
        node.parent = Some(new_parent);
        self.node_mut(new_parent).children.push(id);
        self.relevel(id, level);
        Ok(())
    }

    /// Rename a section, disambiguating among its siblings. Returns the
    /// name actually assigned.
    pub fn rename_section(&mut self, id: SectionId, name: &str) -> TreeResult<String> {
        if id == self.root() {
            return Err(TreeError::RootOperation("rename"));
        }
        validate_name(name)?;
        let name = match self.try_section(id)?.parent {
            Some(parent) => self.unique_child_name(parent, name, Some(id)),
            None => name.to_string(),
        };
        self.node_mut(id).set_name_unchecked(name.clone());
        Ok(name)
    }

    /// Point a section's link at `path`.
    ///
    /// The target must exist, have exactly the same type, and must not be
    /// the section itself or one of its ancestors.
    pub fn set_link(&mut self, id: SectionId, path: &str) -> TreeResult<()> {
        let section_type = self.try_section(id)?.section_type().to_string();
        let invalid = |reason: &str| TreeError::InvalidLink {
            link: path.to_string(),
            reason: reason.to_string(),
        };
        let target = self
            .link_target(id, path)
            .ok_or_else(|| invalid("target section not found"))?;
        if target == id || self.ancestors(id).contains(&target) {
            return Err(invalid("target is the section itself or an ancestor"));
        }
        if self.node(target).section_type() != section_type {
            return Err(invalid("target section has a different type"));
        }
        self.node_mut(id).link = Some(path.to_string());
        Ok(())
    }

    /// Change a section's type. An invalid type leaves the old one.
    pub fn set_section_type(&mut self, id: SectionId, section_type: &str) -> TreeResult<()> {
        self.try_section_mut(id)?.set_type(section_type)
    }

    // ---------------------------------------------------------------
    // Structure queries
    // ---------------------------------------------------------------

    /// Section a link on `id` points at. Relative link paths start at the
    /// linking section's parent, so siblings are addressed by name.
    pub fn link_target(&self, id: SectionId, path: &str) -> Option<SectionId> {
        let base = self.section(id)?.parent().unwrap_or(self.root());
        self.resolve_section(base, path)
    }

    /// `/`-joined names from the root down to `id`; the root's path is "".
    pub fn path(&self, id: SectionId) -> Option<String> {
        self.section(id)?;
        let mut names: Vec<&str> = std::iter::once(id)
            .chain(self.ancestors(id))
            .filter(|s| *s != self.root())
            .map(|s| self.node(s).name())
            .collect();
        names.reverse();
        Some(names.iter().map(|n| format!("/{n}")).collect())
    }

    /// Ancestors of `id`, nearest first, ending with the root.
    pub fn ancestors(&self, id: SectionId) -> Vec<SectionId> {
        let mut result = Vec::new();
        let mut current = self.section(id).and_then(SectionNode::parent);
        while let Some(parent) = current {
            result.push(parent);
            current = self.node(parent).parent;
        }
        result
    }

    /// `id` and all its descendants in depth-first pre-order.
    pub fn walk(&self, id: SectionId) -> Vec<SectionId> {
        let mut order = Vec::new();
        if !self.contains(id) {
            return order;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.node(current).children.iter().rev());
        }
        order
    }

    /// `id` and all its descendants, children before their parents.
    pub fn walk_post_order(&self, id: SectionId) -> Vec<SectionId> {
        let mut order = Vec::new();
        if !self.contains(id) {
            return order;
        }
        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                order.push(current);
                continue;
            }
            stack.push((current, true));
            for child in self.node(current).children.iter().rev() {
                stack.push((*child, false));
            }
        }
        order
    }

    /// The repository set on `id` or, failing that, its nearest ancestor.
    pub fn effective_repository(&self, id: SectionId) -> Option<&str> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|s| self.section(s))
            .find_map(|s| s.repository.as_deref())
    }

    // ---------------------------------------------------------------
    // Copying
    // ---------------------------------------------------------------

    /// Deep copy of the subtree at `id` as a new document whose root is the
    /// copied section. Shares no state with `self`.
    pub fn snapshot(&self, id: SectionId) -> TreeResult<Document> {
        let source_root = self.try_section(id)?;
        let mut copy = Document::with_root(source_root.detached_copy());
        copy.info = self.info.clone();
        let copy_root = copy.root();
        for child in &source_root.children {
            copy.copy_subtree(copy_root, self, *child)?;
        }
        Ok(copy)
    }

    /// Deep copy the subtree at `source_id` of `source` below `parent`.
    /// Returns the handle of the copied section.
    pub fn graft(
        &mut self,
        parent: SectionId,
        source: &Document,
        source_id: SectionId,
    ) -> TreeResult<SectionId> {
        source.try_section(source_id)?;
        self.try_section(parent)?;
        self.copy_subtree(parent, source, source_id)
    }

    fn copy_subtree(
        &mut self,
        parent: SectionId,
        source: &Document,
        source_id: SectionId,
    ) -> TreeResult<SectionId> {
        let mut pending = vec![(parent, source_id)];
        let mut top = None;
        while let Some((target_parent, from)) = pending.pop() {
            let node = source.node(from);
            let copied = self.add_section(target_parent, node.detached_copy())?;
            top.get_or_insert(copied);
            for child in node.children.iter().rev() {
                pending.push((copied, *child));
            }
        }
        top.ok_or(TreeError::UnknownSection(source_id))
    }

    // ---------------------------------------------------------------
    // Internal helpers
    // ---------------------------------------------------------------

    /// `wanted`, or `wanted-N` for the smallest N >= 2 that no sibling
    /// below `parent` (other than `exclude`) already uses.
    fn unique_child_name(&self, parent: SectionId, wanted: &str, exclude: Option<SectionId>) -> String {
        let taken = |candidate: &str| {
            self.node(parent)
                .children
                .iter()
                .filter(|c| Some(**c) != exclude)
                .any(|c| same_name(self.node(*c).name(), candidate))
        };
        if !taken(wanted) {
            return wanted.to_string();
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{wanted}-{n}");
            if !taken(&candidate) {
                warn!(
                    parent = %parent,
                    requested = wanted,
                    assigned = %candidate,
                    "sibling name collision; section renamed"
                );
                return candidate;
            }
            n += 1;
        }
    }

    fn relevel(&mut self, id: SectionId, level: usize) {
        let mut stack = vec![(id, level)];
        while let Some((current, level)) = stack.pop() {
            let node = self.node_mut(current);
            node.level = level;
            let children = node.children.clone();
            stack.extend(children.into_iter().map(|c| (c, level + 1)));
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use odml_types::ValueCell;

    use super::*;
    use crate::testing::with_captured_logs;

    /// Root with `/a/b` and `/c`.
    fn sample() -> (Document, SectionId, SectionId, SectionId) {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.create_section(root, "a", "x").unwrap();
        let b = doc.create_section(a, "b", "y").unwrap();
        let c = doc.create_section(root, "c", "x").unwrap();
        (doc, a, b, c)
    }

    #[test]
    fn root_path_is_empty() {
        let doc = Document::new();
        assert_eq!(doc.path(doc.root()).as_deref(), Some(""));
        assert_eq!(doc.node(doc.root()).level(), 0);
    }

    #[test]
    fn child_paths_and_levels() {
        let (doc, a, b, _) = sample();
        assert_eq!(doc.path(a).as_deref(), Some("/a"));
        assert_eq!(doc.path(b).as_deref(), Some("/a/b"));
        assert_eq!(doc.node(a).level(), 1);
        assert_eq!(doc.node(b).level(), 2);
        assert_eq!(doc.node(b).section_type(), "y");
    }

    #[test]
    fn duplicate_names_are_suffixed_and_logged() {
        let mut doc = Document::new();
        let rec = doc.create_section(doc.root(), "rec1", "recording").unwrap();
        let ((first, second), logs) = with_captured_logs(|| {
            let first = doc.create_section(rec, "data", "dataset").unwrap();
            let second = doc.create_section(rec, "data", "dataset").unwrap();
            (first, second)
        });
        assert_eq!(doc.node(first).name(), "data");
        assert_eq!(doc.node(second).name(), "data-2");
        assert_eq!(doc.node(rec).subsections().len(), 2);
        assert!(logs.contains("sibling name collision"), "logs: {logs}");
    }

    #[test]
    fn suffix_skips_existing_numbered_sibling() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.create_section(root, "data", "dataset").unwrap();
        doc.create_section(root, "data-2", "dataset").unwrap();
        let third = doc.create_section(root, "DATA", "dataset").unwrap();
        assert_eq!(doc.node(third).name(), "DATA-3");
    }

    #[test]
    fn remove_cascades_and_invalidates_handles() {
        let (mut doc, a, b, c) = sample();
        doc.remove_section(a).unwrap();
        assert!(doc.section(a).is_none());
        assert!(doc.section(b).is_none());
        assert!(doc.section(c).is_some());
        assert_eq!(doc.node(doc.root()).subsections(), &[c]);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut doc = Document::new();
        let root = doc.root();
        assert!(matches!(
            doc.remove_section(root),
            Err(TreeError::RootOperation(_))
        ));
    }

    #[test]
    fn reparent_recomputes_levels_transitively() {
        let (mut doc, a, b, c) = sample();
        doc.reparent(a, c).unwrap();
        assert_eq!(doc.path(b).as_deref(), Some("/c/a/b"));
        assert_eq!(doc.node(a).level(), 2);
        assert_eq!(doc.node(b).level(), 3);
        assert_eq!(doc.node(a).parent(), Some(c));
    }

    #[test]
    fn reparent_below_descendant_is_rejected() {
        let (mut doc, a, b, _) = sample();
        assert!(matches!(
            doc.reparent(a, b),
            Err(TreeError::CyclicReparent { .. })
        ));
        assert_eq!(doc.path(b).as_deref(), Some("/a/b"));
    }

    #[test]
    fn reparent_disambiguates_name() {
        let (mut doc, _, b, c) = sample();
        doc.create_section(c, "b", "y").unwrap();
        doc.reparent(b, c).unwrap();
        assert_eq!(doc.node(b).name(), "b-2");
    }

    #[test]
    fn snapshot_is_independent() {
        let (mut doc, a, b, _) = sample();
        doc.add_property(b, Property::with_values("gain", vec![ValueCell::new(5, None).unwrap()]).unwrap())
            .unwrap();
        let snap = doc.snapshot(a).unwrap();
        assert_eq!(snap.node(snap.root()).name(), "a");
        assert_eq!(snap.len(), 2);

        doc.section_mut(b).unwrap().get_property_mut("gain").unwrap().clear_values();
        let copied_b = snap.get_section(snap.root(), "b").unwrap();
        assert_eq!(
            snap.node(copied_b).get_property("gain").unwrap().value().unwrap().as_int(),
            Some(5)
        );
    }

    #[test]
    fn graft_copies_subtree_with_fresh_handles() {
        let (source, a, _, _) = sample();
        let mut target = Document::new();
        let root = target.root();
        let copied = target.graft(root, &source, a).unwrap();
        assert_eq!(target.path(copied).as_deref(), Some("/a"));
        assert!(target.resolve_section(root, "/a/b").is_some());
        assert_eq!(source.len(), 4);
    }

    #[test]
    fn effective_repository_is_inherited() {
        let (mut doc, a, b, c) = sample();
        doc.section_mut(doc.root()).unwrap().repository = Some("http://terms/root.xml".into());
        doc.section_mut(a).unwrap().repository = Some("http://terms/a.xml".into());
        assert_eq!(doc.effective_repository(b), Some("http://terms/a.xml"));
        assert_eq!(doc.effective_repository(c), Some("http://terms/root.xml"));
    }

    #[test]
    fn set_link_requires_same_type_target() {
        let (mut doc, a, b, c) = sample();
        assert!(doc.set_link(c, "/a").is_ok());
        assert_eq!(doc.node(c).link.as_deref(), Some("/a"));
        assert!(doc.set_link(b, "/a").is_err());
        assert!(doc.set_link(a, "/missing").is_err());
    }

    #[test]
    fn set_section_type_normalizes_or_keeps_old() {
        let (mut doc, a, _, _) = sample();
        doc.set_section_type(a, "White Noise").unwrap();
        assert_eq!(doc.node(a).section_type(), "white_noise");
        assert!(doc.set_section_type(a, "  ").is_err());
        assert_eq!(doc.node(a).section_type(), "white_noise");
    }

    #[test]
    fn post_order_visits_children_first() {
        let (doc, a, b, c) = sample();
        let root = doc.root();
        assert_eq!(doc.walk_post_order(root), vec![b, a, c, root]);
        assert_eq!(doc.walk(root), vec![root, a, b, c]);
    }
}
