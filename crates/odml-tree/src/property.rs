//! Properties: named, ordered lists of values sharing one definition.

use odml_types::{RawContent, TypeEngine, TypeError, ValueCell, ValueKind};
use tracing::warn;
use uuid::Uuid;

use crate::error::TreeResult;
use crate::names::{same_name, validate_name};

/// A named collection of values.
///
/// `dependency`/`dependency_value` name another property (and the value it
/// must hold) for this one to apply. Together with the name, the dependency
/// identifies a property among its siblings.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    id: Uuid,
    name: String,
    pub definition: Option<String>,
    pub dependency: Option<String>,
    pub dependency_value: Option<String>,
    pub mapping: Option<String>,
    pub synonyms: Vec<String>,
    values: Vec<ValueCell>,
}

impl Property {
    /// Create an empty property. Fails on an invalid name.
    pub fn new(name: impl Into<String>) -> TreeResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            id: Uuid::now_v7(),
            name,
            definition: None,
            dependency: None,
            dependency_value: None,
            mapping: None,
            synonyms: Vec::new(),
            values: Vec::new(),
        })
    }

    /// Create a property holding `values`.
    pub fn with_values(name: impl Into<String>, values: Vec<ValueCell>) -> TreeResult<Self> {
        let mut property = Self::new(name)?;
        for value in values {
            property.push_value(value);
        }
        Ok(property)
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

    pub fn with_dependency(
        mut self,
        dependency: impl Into<String>,
        dependency_value: impl Into<String>,
    ) -> Self {
        self.dependency = Some(dependency.into());
        self.dependency_value = Some(dependency_value.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) -> TreeResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Whether this property is identified by `(name, dependency)`.
    pub fn has_key(&self, name: &str, dependency: Option<&str>) -> bool {
        same_name(&self.name, name) && self.dependency.as_deref() == dependency
    }

    /// Whether both properties share the same `(name, dependency)` identity.
    pub fn same_key(&self, other: &Property) -> bool {
        self.has_key(&other.name, other.dependency.as_deref())
    }

    /// Whether `name` is this property's name or one of its synonyms.
    pub fn answers_to(&self, name: &str) -> bool {
        same_name(&self.name, name) || self.synonyms.iter().any(|s| same_name(s, name))
    }

    pub fn values(&self) -> &[ValueCell] {
        &self.values
    }

    /// The first value, the common single-valued case.
    pub fn value(&self) -> Option<&ValueCell> {
        self.values.first()
    }

    pub fn value_at(&self, index: usize) -> Option<&ValueCell> {
        self.values.get(index)
    }

    pub fn value_mut(&mut self, index: usize) -> Option<&mut ValueCell> {
        self.values.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when the property holds no value with content.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(ValueCell::is_empty)
    }

    /// The kind shared by the values, taken from the first one.
    pub fn kind(&self) -> Option<ValueKind> {
        self.values.first().map(ValueCell::kind)
    }

    /// Whether the values disagree on their kind.
    pub fn has_mixed_kinds(&self) -> bool {
        match self.kind() {
            Some(kind) => self.values.iter().any(|v| v.kind() != kind),
            None => false,
        }
    }

    /// Index of the first value whose content equals `value`'s.
    pub fn position_of(&self, value: &ValueCell) -> Option<usize> {
        self.values.iter().position(|v| v.same_content(value))
    }

    /// Append a value and return its index.
    ///
    /// A value whose kind differs from the property's is still kept; the
    /// mismatch is only logged.
    pub fn push_value(&mut self, value: ValueCell) -> usize {
        self.warn_on_kind(&value);
        self.values.push(value);
        self.values.len() - 1
    }

    /// Insert a value at `index`, clamped to the end of the list.
    pub fn insert_value(&mut self, index: usize, value: ValueCell) -> usize {
        self.warn_on_kind(&value);
        let index = index.min(self.values.len());
        self.values.insert(index, value);
        index
    }

    pub fn remove_value(&mut self, index: usize) -> Option<ValueCell> {
        (index < self.values.len()).then(|| self.values.remove(index))
    }

    /// Replace all values at once.
    pub fn set_values(&mut self, values: Vec<ValueCell>) {
        self.values.clear();
        for value in values {
            self.push_value(value);
        }
    }

    pub fn clear_values(&mut self) {
        self.values.clear();
    }

    /// Type and append each raw input under one declared type.
    ///
    /// A value that fails to type is skipped and logged; the rest are still
    /// added. Returns the errors of the skipped values.
    pub fn extend_raw<I, R>(
        &mut self,
        engine: &TypeEngine,
        items: I,
        declared: Option<&str>,
    ) -> Vec<TypeError>
    where
        I: IntoIterator<Item = R>,
        R: Into<RawContent>,
    {
        let mut rejected = Vec::new();
        for item in items {
            match ValueCell::with_engine(engine, item, declared) {
                Ok(value) => {
                    self.push_value(value);
                }
                Err(e) => {
                    warn!(property = %self.name, error = %e, "skipping value");
                    rejected.push(e);
                }
            }
        }
        rejected
    }

    fn warn_on_kind(&self, value: &ValueCell) {
        if let Some(kind) = self.kind() {
            if value.kind() != kind {
                warn!(
                    property = %self.name,
                    expected = %kind,
                    found = %value.kind(),
                    "value kind differs from property kind"
                );
            }
        }
    }
}
