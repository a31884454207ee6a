//! Dataset loading and record-to-document conversion.
//!
//! Each JSON record becomes one [`Document`]. The text body lists a fixed
//! set of descriptive fields as `"<field>: <value>"` lines; records carrying
//! none of them fall back to their full pretty-printed JSON so nothing in
//! the dataset is unsearchable.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

use crate::models::{Document, DocumentMetadata};

/// Fields rendered into the document text, in output order.
pub const TEXT_FIELDS: &[&str] = &[
    "name",
    "title",
    "description",
    "category",
    "type",
    "address",
    "location",
    "product",
    "service",
    "notes",
];

/// Fields copied into [`DocumentMetadata::fields`].
pub const METADATA_FIELDS: &[&str] = &["id", "category", "type", "address", "city", "province"];

/// Read and parse the dataset file into a list of records.
///
/// Accepts a top-level array, an object whose only key holds an array
/// (e.g. `{"data": [...]}`), or any other value treated as one record.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;
    let root: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse dataset file as JSON: {}", path.display()))?;
    Ok(records_from_value(root))
}

fn records_from_value(root: Value) -> Vec<Value> {
    match root {
        Value::Array(items) => items,
        Value::Object(map) if map.len() == 1 && map.values().all(Value::is_array) => map
            .into_iter()
            .next()
            .and_then(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        other => vec![other],
    }
}

/// Build the searchable document for the record at `index`.
pub fn build_document(record: &Value, index: usize, source_label: &str) -> Document {
    let lines: Vec<String> = TEXT_FIELDS
        .iter()
        .filter_map(|field| {
            let value = record.get(*field).filter(|v| is_present(v))?;
            Some(format!("{}: {}", field, render_value(value)))
        })
        .collect();

    let text = if lines.is_empty() {
        serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string())
    } else {
        lines.join("\n")
    };

    let mut fields = Map::new();
    for field in METADATA_FIELDS {
        if let Some(value) = record.get(*field).filter(|v| is_present(v)) {
            fields.insert((*field).to_string(), value.clone());
        }
    }

    Document {
        text,
        metadata: DocumentMetadata {
            source: source_label.to_string(),
            index,
            fields,
        },
    }
}

/// Build one document per record, keeping dataset order.
pub fn build_documents(records: &[Value], source_label: &str) -> Vec<Document> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| build_document(record, index, source_label))
        .collect()
}

/// `null` and blank strings count as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_lists_allowed_fields_in_order() {
        let record = json!({
            "category": "Kuliner",
            "name": "Warung Bu Sri",
            "owner": "Sri",
            "description": "Nasi pecel dan rawon",
        });
        let doc = build_document(&record, 0, "UMKM Dataset");
        assert_eq!(
            doc.text,
            "name: Warung Bu Sri\ndescription: Nasi pecel dan rawon\ncategory: Kuliner"
        );
        assert!(!doc.text.contains("owner"));
    }

    #[test]
    fn test_non_string_values_rendered_as_json() {
        let record = json!({ "name": "Batik Lestari", "product": ["kain", "kemeja"] });
        let doc = build_document(&record, 3, "UMKM Dataset");
        assert_eq!(doc.text, "name: Batik Lestari\nproduct: [\"kain\",\"kemeja\"]");
    }

    #[test]
    fn test_fallback_to_pretty_json() {
        let record = json!({ "omzet": 1200000, "pemilik": "Budi" });
        let doc = build_document(&record, 7, "UMKM Dataset");
        assert_eq!(doc.text, serde_json::to_string_pretty(&record).unwrap());
        assert!(doc.text.contains('\n'));
    }

    #[test]
    fn test_null_and_blank_fields_are_skipped() {
        let record = json!({ "name": "Kopi Senja", "notes": null, "service": "  " });
        let doc = build_document(&record, 0, "UMKM Dataset");
        assert_eq!(doc.text, "name: Kopi Senja");
    }

    #[test]
    fn test_metadata_copies_allowed_fields() {
        let record = json!({
            "id": 42,
            "name": "Keripik Maju",
            "city": "Malang",
            "province": "Jawa Timur",
            "phone": "0812",
        });
        let doc = build_document(&record, 5, "UMKM Dataset");
        assert_eq!(doc.metadata.source, "UMKM Dataset");
        assert_eq!(doc.metadata.index, 5);
        assert_eq!(doc.metadata.fields.get("id"), Some(&json!(42)));
        assert_eq!(doc.metadata.fields.get("city"), Some(&json!("Malang")));
        assert_eq!(
            doc.metadata.fields.get("province"),
            Some(&json!("Jawa Timur"))
        );
        assert!(doc.metadata.fields.get("phone").is_none());
        assert!(doc.metadata.fields.get("category").is_none());
    }

    #[test]
    fn test_build_documents_keeps_positions() {
        let records = vec![json!({"name": "A"}), json!({"name": "B"})];
        let docs = build_documents(&records, "src");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].metadata.index, 0);
        assert_eq!(docs[1].metadata.index, 1);
        assert_eq!(docs[1].text, "name: B");
    }

    #[test]
    fn test_records_from_wrapped_array() {
        let records = records_from_value(json!({ "data": [{"name": "A"}, {"name": "B"}] }));
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_records_from_single_object() {
        let records = records_from_value(json!({ "name": "A", "tags": ["x"] }));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "A");
    }

    #[test]
    fn test_load_records_reports_path_on_parse_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_records(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.json"));
    }

    #[test]
    fn test_load_records_array() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("umkm.json");
        std::fs::write(&path, r#"[{"name": "A"}, {"name": "B"}, {"name": "C"}]"#).unwrap();
        assert_eq!(load_records(&path).unwrap().len(), 3);
    }
}
