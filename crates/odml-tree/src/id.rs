//! Stable handles into a document arena.

use std::fmt;

/// Handle of a section inside one [`Document`](crate::Document).
///
/// Handles stay valid for the lifetime of the document; removed sections
/// leave a tombstone, so a stale handle resolves to `None` instead of
/// aliasing a newer section.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(u32);

impl SectionId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SectionId({})", self.0)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Address of a property: its owning section and position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropertyHandle {
    pub section: SectionId,
    pub index: usize,
}

impl PropertyHandle {
    pub fn new(section: SectionId, index: usize) -> Self {
        Self { section, index }
    }
}
