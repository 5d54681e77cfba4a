//! Path addressing.
//!
//! Grammar:
//!
//! - A leading `/` starts at the document root; otherwise the path is
//!   relative to a starting section.
//! - Trailing `/` and empty segments are ignored.
//! - `.` as the first segment means "stay here"; anywhere else it is a
//!   literal (and never matching) name.
//! - `..` moves to the parent; at the root it stays put.
//!
//! A path string does not say whether it ends in a section or a property.
//! Section operations treat every segment as a section; property operations
//! treat the last segment as the property name and the rest as the section
//! path.
//!
//! Two policies share the grammar: `resolve_*` returns `None` on the first
//! missing segment, `ensure_sections`/`add_property_at` create missing
//! sections as they go.

use std::fmt;

use crate::document::Document;
use crate::error::{TreeError, TreeResult};
use crate::id::{PropertyHandle, SectionId};
use crate::names::same_name;
use crate::property::Property;
use crate::section::SectionNode;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Current,
    Parent,
    Name(String),
}

/// A parsed path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionPath {
    pub absolute: bool,
    pub segments: Vec<Segment>,
}

impl SectionPath {
    pub fn parse(path: &str) -> Self {
        let absolute = path.starts_with('/');
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .enumerate()
            .map(|(i, s)| match s {
                "." if i == 0 => Segment::Current,
                ".." => Segment::Parent,
                name => Segment::Name(name.to_string()),
            })
            .collect();
        Self { absolute, segments }
    }

    /// Split off the last segment as a property name.
    pub fn split_property(mut self) -> Option<(SectionPath, String)> {
        match self.segments.pop()? {
            Segment::Name(name) => Some((self, name)),
            Segment::Current | Segment::Parent => None,
        }
    }
}

impl fmt::Display for SectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            f.write_str("/")?;
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            match segment {
                Segment::Current => f.write_str(".")?,
                Segment::Parent => f.write_str("..")?,
                Segment::Name(name) => f.write_str(name)?,
            }
        }
        Ok(())
    }
}

impl Document {
    fn path_start(&self, from: SectionId, path: &SectionPath) -> Option<SectionId> {
        if path.absolute {
            Some(self.root())
        } else {
            self.section(from).map(|_| from)
        }
    }

    fn step(&self, at: SectionId, segment: &Segment) -> Option<SectionId> {
        match segment {
            Segment::Current => Some(at),
            Segment::Parent => Some(self.node(at).parent().unwrap_or(at)),
            Segment::Name(name) => self.get_section(at, name),
        }
    }

    fn walk_path(&self, from: SectionId, path: &SectionPath) -> Option<SectionId> {
        let start = self.path_start(from, path)?;
        path.segments
            .iter()
            .try_fold(start, |at, segment| self.step(at, segment))
    }

    /// Resolve a section path from `from`; `None` if any segment is missing.
    pub fn resolve_section(&self, from: SectionId, path: &str) -> Option<SectionId> {
        self.walk_path(from, &SectionPath::parse(path))
    }

    /// Resolve a property path from `from`.
    pub fn resolve_property(&self, from: SectionId, path: &str) -> Option<PropertyHandle> {
        let (sections, name) = SectionPath::parse(path).split_property()?;
        let section = self.walk_path(from, &sections)?;
        let index = self
            .node(section)
            .properties()
            .iter()
            .position(|p| same_name(p.name(), &name))?;
        Some(PropertyHandle::new(section, index))
    }

    /// Resolve a section path, creating missing sections of type
    /// `section_type` along the way.
    pub fn ensure_sections(
        &mut self,
        from: SectionId,
        path: &str,
        section_type: &str,
    ) -> TreeResult<SectionId> {
        let parsed = SectionPath::parse(path);
        self.ensure_parsed(from, &parsed, section_type)
    }

    fn ensure_parsed(
        &mut self,
        from: SectionId,
        path: &SectionPath,
        section_type: &str,
    ) -> TreeResult<SectionId> {
        let mut at = self
            .path_start(from, path)
            .ok_or(TreeError::UnknownSection(from))?;
        for segment in &path.segments {
            at = match segment {
                Segment::Name(name) => match self.get_section(at, name) {
                    Some(next) => next,
                    None => self.add_section(at, SectionNode::new(name.as_str(), section_type)?)?,
                },
                other => self.step(at, other).unwrap_or(at),
            };
        }
        Ok(at)
    }

    /// Add `property` to the section addressed by `path` (all segments are
    /// sections), creating missing sections of type `section_type`.
    pub fn add_property_at(
        &mut self,
        from: SectionId,
        path: &str,
        section_type: &str,
        property: Property,
    ) -> TreeResult<PropertyHandle> {
        let section = self.ensure_sections(from, path, section_type)?;
        self.add_property(section, property)
    }
}
