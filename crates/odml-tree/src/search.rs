//! Lookups by name and type.
//!
//! `get_*` looks at direct children only; `find_*` searches the whole
//! subtree depth-first and returns the first match in pre-order.

use crate::document::Document;
use crate::id::{PropertyHandle, SectionId};
use crate::names::{normalize_type, same_name, type_matches};

impl Document {
    /// Direct child of `parent` named `name` (case-insensitive).
    pub fn get_section(&self, parent: SectionId, name: &str) -> Option<SectionId> {
        self.section(parent)?
            .subsections()
            .iter()
            .copied()
            .find(|c| same_name(self.node(*c).name(), name))
    }

    /// Property of `section` named `name` (case-insensitive).
    pub fn get_property(&self, section: SectionId, name: &str) -> Option<PropertyHandle> {
        let index = self
            .section(section)?
            .properties()
            .iter()
            .position(|p| same_name(p.name(), name))?;
        Some(PropertyHandle::new(section, index))
    }

    fn descendants(&self, from: SectionId) -> impl Iterator<Item = SectionId> + '_ {
        self.walk(from).into_iter().skip(1)
    }

    /// First descendant of `from` named `name`.
    pub fn find_section(&self, from: SectionId, name: &str) -> Option<SectionId> {
        self.descendants(from)
            .find(|s| same_name(self.node(*s).name(), name))
    }

    /// First descendant of `from` whose type is `section_type` or a subtype.
    pub fn find_section_by_type(&self, from: SectionId, section_type: &str) -> Option<SectionId> {
        let wanted = normalize_type(section_type).ok()?;
        self.descendants(from)
            .find(|s| type_matches(self.node(*s).section_type(), &wanted))
    }

    /// All descendants of `from` whose type is `section_type` or a subtype.
    pub fn find_sections_by_type(&self, from: SectionId, section_type: &str) -> Vec<SectionId> {
        let Ok(wanted) = normalize_type(section_type) else {
            return Vec::new();
        };
        self.descendants(from)
            .filter(|s| type_matches(self.node(*s).section_type(), &wanted))
            .collect()
    }

    /// First property named `name` in `from` or any descendant. Synonyms
    /// count as names.
    pub fn find_property(&self, from: SectionId, name: &str) -> Option<PropertyHandle> {
        self.walk(from).into_iter().find_map(|s| {
            let index = self
                .node(s)
                .properties()
                .iter()
                .position(|p| p.answers_to(name))?;
            Some(PropertyHandle::new(s, index))
        })
    }

    /// Closest section of type `section_type` by tree distance.
    ///
    /// Searches the subtree of `from` first, then walks up the ancestors and
    /// checks each one's direct children, so children beat siblings, which
    /// beat the parent and its siblings. `from` itself never matches.
    pub fn related_section(&self, from: SectionId, section_type: &str) -> Option<SectionId> {
        if let Some(found) = self.find_section_by_type(from, section_type) {
            return Some(found);
        }
        let wanted = normalize_type(section_type).ok()?;
        self.ancestors(from).into_iter().find_map(|ancestor| {
            self.node(ancestor)
                .subsections()
                .iter()
                .copied()
                .find(|s| *s != from && type_matches(self.node(*s).section_type(), &wanted))
        })
    }
}

#[cfg(test)]
mod tests {
    use odml_types::ValueCell;

    use super::*;
    use crate::property::Property;

    /// ```text
    /// /subject (subject)
    ///   /rec1 (recording)
    ///     /cell (cell)
    ///   /stim (stimulus/white_noise)
    /// /setup (hardware)
    ///   /amp (hardware/amplifier)
    /// ```
    struct Fixture {
        doc: Document,
        subject: SectionId,
        rec1: SectionId,
        cell: SectionId,
        stim: SectionId,
        setup: SectionId,
        amp: SectionId,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new();
        let root = doc.root();
        let subject = doc.create_section(root, "subject", "subject").unwrap();
        let rec1 = doc.create_section(subject, "rec1", "recording").unwrap();
        let cell = doc.create_section(rec1, "cell", "cell").unwrap();
        let stim = doc.create_section(subject, "stim", "stimulus/white_noise").unwrap();
        let setup = doc.create_section(root, "setup", "hardware").unwrap();
        let amp = doc.create_section(setup, "amp", "hardware/amplifier").unwrap();
        let mut gain = Property::with_values("gain", vec![ValueCell::new(5, None).unwrap()]).unwrap();
        gain.synonyms.push("amplification".into());
        doc.add_property(amp, gain).unwrap();
        Fixture { doc, subject, rec1, cell, stim, setup, amp }
    }

    #[test]
    fn get_only_sees_direct_children() {
        let f = fixture();
        let root = f.doc.root();
        assert_eq!(f.doc.get_section(root, "Subject"), Some(f.subject));
        assert_eq!(f.doc.get_section(root, "rec1"), None);
        assert!(f.doc.get_property(f.amp, "GAIN").is_some());
        assert!(f.doc.get_property(f.setup, "gain").is_none());
    }

    #[test]
    fn find_searches_subtree() {
        let f = fixture();
        let root = f.doc.root();
        assert_eq!(f.doc.find_section(root, "cell"), Some(f.cell));
        assert_eq!(f.doc.find_section(f.setup, "cell"), None);
        let handle = f.doc.find_property(root, "amplification").unwrap();
        assert_eq!(handle.section, f.amp);
    }

    #[test]
    fn type_search_includes_subtypes() {
        let f = fixture();
        let root = f.doc.root();
        assert_eq!(f.doc.find_section_by_type(root, "stimulus"), Some(f.stim));
        assert_eq!(
            f.doc.find_sections_by_type(root, "hardware"),
            vec![f.setup, f.amp]
        );
        assert_eq!(
            f.doc.find_sections_by_type(root, "Hardware/Amplifier"),
            vec![f.amp]
        );
    }

    #[test]
    fn type_search_normalizes_wanted_type() {
        let f = fixture();
        let root = f.doc.root();
        assert_eq!(f.doc.find_section_by_type(root, "Stimulus/White Noise"), Some(f.stim));
        assert_eq!(f.doc.find_sections_by_type(root, " stimulus/white  noise "), vec![f.stim]);
        assert_eq!(f.doc.related_section(f.cell, "stimulus/white noise"), Some(f.stim));
        assert_eq!(f.doc.find_section_by_type(root, ""), None);
        assert!(f.doc.find_sections_by_type(root, "a//b").is_empty());
    }

    #[test]
    fn related_prefers_own_subtree() {
        let f = fixture();
        assert_eq!(f.doc.related_section(f.subject, "cell"), Some(f.cell));
    }

    #[test]
    fn related_walks_up_through_siblings() {
        let f = fixture();
        assert_eq!(f.doc.related_section(f.cell, "stimulus"), Some(f.stim));
        assert_eq!(f.doc.related_section(f.rec1, "hardware"), Some(f.setup));
        assert_eq!(f.doc.related_section(f.rec1, "missing"), None);
    }

    #[test]
    fn related_never_returns_self() {
        let f = fixture();
        assert_eq!(f.doc.related_section(f.stim, "stimulus"), None);
    }
}
