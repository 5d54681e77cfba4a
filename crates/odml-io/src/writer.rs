//! Emitting documents as JSON.

use std::fs;
use std::path::Path;

use odml_tree::{Document, Property, SectionId};
use odml_types::{Content, ValueCell, DATE_FORMAT};
use serde::{Deserialize, Serialize};

use crate::error::IoResult;
use crate::record::{DocumentRecord, PropertyRecord, SectionRecord, ValueRecord, FORMAT_VERSION};

/// Emission settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterOptions {
    /// Keep values without content (and properties holding only such
    /// values), as terminology documents declare them for their schema.
    pub terminology: bool,
    /// Indent the output.
    pub pretty: bool,
}

impl WriterOptions {
    pub fn terminology() -> Self {
        Self {
            terminology: true,
            ..Self::default()
        }
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

/// Serialize `doc` to JSON text.
pub fn write_document(doc: &Document, options: &WriterOptions) -> IoResult<String> {
    let record = document_to_record(doc, options);
    let text = if options.pretty {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string(&record)?
    };
    Ok(text)
}

/// Serialize `doc` into a file, replacing it.
pub fn write_document_file(doc: &Document, path: impl AsRef<Path>, options: &WriterOptions) -> IoResult<()> {
    fs::write(path, write_document(doc, options)?)?;
    Ok(())
}

/// The record form of `doc`.
pub fn document_to_record(doc: &Document, options: &WriterOptions) -> DocumentRecord {
    let root = doc.root();
    let (repository, properties) = match doc.section(root) {
        Some(node) => (node.repository.clone(), properties_to_records(node.properties(), options)),
        None => (None, Vec::new()),
    };
    DocumentRecord {
        odml_version: FORMAT_VERSION.to_string(),
        author: doc.info.author.clone(),
        date: doc.info.date.map(|d| d.format(DATE_FORMAT).to_string()),
        version: doc.info.version.clone(),
        repository,
        properties,
        sections: children_to_records(doc, root, options),
    }
}

fn children_to_records(doc: &Document, parent: SectionId, options: &WriterOptions) -> Vec<SectionRecord> {
    let Some(node) = doc.section(parent) else {
        return Vec::new();
    };
    node.subsections()
        .iter()
        .filter_map(|child| {
            let section = doc.section(*child)?;
            Some(SectionRecord {
                id: Some(section.id()),
                name: section.name().to_string(),
                section_type: section.section_type().to_string(),
                reference: section.reference.clone(),
                definition: section.definition.clone(),
                repository: section.repository.clone(),
                mapping: section.mapping.clone(),
                link: section.link.clone(),
                include: section.include.clone(),
                properties: properties_to_records(section.properties(), options),
                sections: children_to_records(doc, *child, options),
            })
        })
        .collect()
}

fn properties_to_records(properties: &[Property], options: &WriterOptions) -> Vec<PropertyRecord> {
    properties
        .iter()
        .filter_map(|property| {
            let values: Vec<ValueRecord> = property
                .values()
                .iter()
                .filter(|v| options.terminology || !v.is_empty())
                .map(value_to_record)
                .collect();
            if values.is_empty() && !options.terminology {
                return None;
            }
            Some(PropertyRecord {
                id: Some(property.id()),
                name: property.name().to_string(),
                definition: property.definition.clone(),
                dependency: property.dependency.clone(),
                dependency_value: property.dependency_value.clone(),
                mapping: property.mapping.clone(),
                synonyms: property.synonyms.clone(),
                values,
            })
        })
        .collect()
}

fn value_to_record(value: &ValueCell) -> ValueRecord {
    ValueRecord {
        value: content_to_json(value.content()),
        value_type: Some(value.type_token()),
        unit: value.unit.clone(),
        uncertainty: value.uncertainty,
        filename: value.filename.clone(),
        definition: value.definition.clone(),
        reference: value.reference.clone(),
        encoder: value.encoder.clone(),
        checksum: value.checksum.clone(),
    }
}

/// Numbers and booleans stay native; everything else is written in its
/// fixed textual form.
fn content_to_json(content: Option<&Content>) -> serde_json::Value {
    use serde_json::Value;

    match content {
        None => Value::Null,
        Some(Content::Int(v)) => Value::from(*v),
        Some(Content::Boolean(v)) => Value::Bool(*v),
        Some(Content::Float(v)) => serde_json::Number::from_f64(*v)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(v.to_string())),
        Some(other) => Value::String(other.to_string()),
    }
}
