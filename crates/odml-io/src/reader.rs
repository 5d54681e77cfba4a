//! Building documents from JSON.
//!
//! Structural problems (malformed JSON, an invalid section name or type)
//! fail the whole read. A value that cannot be typed is skipped with a
//! warning and the rest of the document is still read.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use odml_tree::{Document, Property, SectionId, SectionNode};
use odml_types::{RawContent, TypeEngine, ValueCell, ValueKind, DATE_FORMAT};
use tracing::{debug, warn};

use crate::error::IoResult;
use crate::record::{DocumentRecord, PropertyRecord, SectionRecord, ValueRecord};

/// Parse a document from JSON text with the default type engine.
pub fn read_document_str(text: &str) -> IoResult<Document> {
    read_document_with(text, &TypeEngine::new())
}

/// Parse a document from JSON text, typing values with `engine`.
pub fn read_document_with(text: &str, engine: &TypeEngine) -> IoResult<Document> {
    let record: DocumentRecord = serde_json::from_str(text)?;
    document_from_record(record, engine)
}

/// Read a document from a file. The path becomes the document's source URL.
pub fn read_document_file(path: impl AsRef<Path>) -> IoResult<Document> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let mut document = read_document_str(&text)?;
    document.info.source_url = Some(path.display().to_string());
    Ok(document)
}

/// Build a document from its record.
pub fn document_from_record(record: DocumentRecord, engine: &TypeEngine) -> IoResult<Document> {
    let mut document = Document::new();
    document.info.author = record.author;
    document.info.version = record.version;
    document.info.date = record.date.as_deref().and_then(|text| {
        let parsed = NaiveDate::parse_from_str(text, DATE_FORMAT).ok();
        if parsed.is_none() {
            warn!(date = text, "ignoring malformed document date");
        }
        parsed
    });

    let root = document.root();
    if let Some(node) = document.section_mut(root) {
        node.repository = record.repository;
        for property in &record.properties {
            node.add_property(property_from_record(property, engine)?);
        }
    }
    add_sections(&mut document, root, record.sections, engine)?;
    debug!(sections = document.len(), "read document");
    Ok(document)
}

fn add_sections(
    document: &mut Document,
    parent: SectionId,
    records: Vec<SectionRecord>,
    engine: &TypeEngine,
) -> IoResult<()> {
    for record in records {
        let mut node = SectionNode::new(record.name, &record.section_type)?;
        if let Some(id) = record.id {
            node = node.with_id(id);
        }
        node.reference = record.reference;
        node.definition = record.definition;
        node.repository = record.repository;
        node.mapping = record.mapping;
        node.link = record.link;
        node.include = record.include;
        for property in &record.properties {
            node.add_property(property_from_record(property, engine)?);
        }
        let id = document.add_section(parent, node)?;
        add_sections(document, id, record.sections, engine)?;
    }
    Ok(())
}

fn property_from_record(record: &PropertyRecord, engine: &TypeEngine) -> IoResult<Property> {
    let mut property = Property::new(record.name.as_str())?;
    if let Some(id) = record.id {
        property = property.with_id(id);
    }
    property.definition = record.definition.clone();
    property.dependency = record.dependency.clone();
    property.dependency_value = record.dependency_value.clone();
    property.mapping = record.mapping.clone();
    property.synonyms = record.synonyms.clone();

    for (index, value) in record.values.iter().enumerate() {
        match value_from_record(value, engine) {
            Some(cell) => {
                property.push_value(cell);
            }
            None => warn!(property = %record.name, index, "skipping value"),
        }
    }
    Ok(property)
}

fn value_from_record(record: &ValueRecord, engine: &TypeEngine) -> Option<ValueCell> {
    let raw = match (&record.value, declared_binary(record)) {
        // `""` is an empty binary payload; only null means no content.
        (serde_json::Value::String(s), true) if s.is_empty() => RawContent::Bytes(Vec::new()),
        (value, _) => raw_content(value)?,
    };
    let mut cell = match ValueCell::with_engine(engine, raw, record.value_type.as_deref()) {
        Ok(cell) => cell,
        Err(e) => {
            warn!(error = %e, "value rejected by type engine");
            return None;
        }
    };
    cell.unit = record.unit.clone();
    cell.uncertainty = record.uncertainty;
    cell.definition = record.definition.clone();
    cell.reference = record.reference.clone();
    cell.checksum = record.checksum.clone();
    if record.filename.is_some() {
        cell.filename = record.filename.clone();
    }
    if record.encoder.is_some() {
        cell.encoder = record.encoder.clone();
    }
    Some(cell)
}

fn declared_binary(record: &ValueRecord) -> bool {
    record
        .value_type
        .as_deref()
        .and_then(ValueKind::try_parse)
        == Some(ValueKind::Binary)
}

/// Map JSON content onto the type engine's input. Objects have no meaning
/// as content.
fn raw_content(value: &serde_json::Value) -> Option<RawContent> {
    use serde_json::Value;

    match value {
        Value::Null => Some(RawContent::Text(String::new())),
        Value::Bool(b) => Some(RawContent::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(RawContent::Int(i)),
            None => n.as_f64().map(RawContent::Float),
        },
        Value::String(s) => Some(RawContent::Text(s.clone())),
        Value::Array(items) => {
            let parts: Option<Vec<String>> = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect();
            parts.map(|parts| RawContent::Text(format!("({})", parts.join(";"))))
        }
        Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "author": "J. Doe",
        "date": "2021-06-01",
        "version": "3",
        "repository": "http://terms.example.org/neuro.json",
        "sections": [
            {
                "id": "01890a5d-ac96-774b-bcce-b302099a8057",
                "name": "rec1",
                "type": "Recording",
                "definition": "First session",
                "properties": [
                    { "name": "gain", "values": [ { "value": "5", "type": "int", "unit": "dB" } ] },
                    { "name": "channels", "values": [ { "value": [1, 2] } ] },
                    { "name": "rate", "values": [ { "value": 2.5 }, { "value": "fast", "type": "float" }, { "value": 3.0 } ] }
                ],
                "sections": [
                    { "name": "amp", "type": "hardware", "link": "/setup/amp" }
                ]
            }
        ]
    }"#;

    #[test]
    fn reads_document_fields() {
        let doc = read_document_str(SAMPLE).unwrap();
        assert_eq!(doc.info.author.as_deref(), Some("J. Doe"));
        assert_eq!(doc.info.date, NaiveDate::from_ymd_opt(2021, 6, 1));
        assert_eq!(
            doc.effective_repository(doc.root()),
            Some("http://terms.example.org/neuro.json")
        );
    }

    #[test]
    fn reads_sections_and_values() {
        let doc = read_document_str(SAMPLE).unwrap();
        let rec = doc.resolve_section(doc.root(), "/rec1").unwrap();
        let node = doc.section(rec).unwrap();
        assert_eq!(node.section_type(), "recording");
        assert_eq!(node.id().to_string(), "01890a5d-ac96-774b-bcce-b302099a8057");

        let gain = node.get_property("gain").unwrap().value().unwrap();
        assert_eq!(gain.as_int(), Some(5));
        assert_eq!(gain.unit.as_deref(), Some("dB"));
        assert_eq!(gain.declared_type(), Some("int"));

        let channels = node.get_property("channels").unwrap().value().unwrap();
        assert_eq!(channels.kind(), ValueKind::Tuple(Some(2)));

        let amp = doc.resolve_section(rec, "amp").unwrap();
        assert_eq!(doc.section(amp).unwrap().link.as_deref(), Some("/setup/amp"));
    }

    #[test]
    fn bad_values_are_skipped() {
        let doc = read_document_str(SAMPLE).unwrap();
        let rate = doc.resolve_property(doc.root(), "/rec1/rate").unwrap();
        let values: Vec<_> = doc
            .property(rate)
            .unwrap()
            .values()
            .iter()
            .filter_map(ValueCell::as_float)
            .collect();
        assert_eq!(values, vec![2.5, 3.0]);
    }

    #[test]
    fn invalid_section_name_fails_the_read() {
        let text = r#"{ "sections": [ { "name": "a/b", "type": "x" } ] }"#;
        assert!(read_document_str(text).is_err());
    }

    #[test]
    fn malformed_json_fails() {
        assert!(matches!(
            read_document_str("{ not json"),
            Err(crate::error::IoError::Json(_))
        ));
    }

    #[test]
    fn null_values_stay_as_empty_cells() {
        let text = r#"{ "sections": [ { "name": "cell", "type": "cell", "properties": [
            { "name": "count", "values": [ { "value": null, "type": "int" } ] } ] } ] }"#;
        let doc = read_document_str(text).unwrap();
        let handle = doc.resolve_property(doc.root(), "cell/count").unwrap();
        let property = doc.property(handle).unwrap();
        assert_eq!(property.len(), 1);
        assert!(property.is_empty());
        assert_eq!(property.kind(), Some(ValueKind::Int));
    }
}
