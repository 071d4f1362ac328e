use super::document::SegmentQueryDocument;
use super::error::SegmentError;
use super::row::RuleRow;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Parse JSON text leniently (comments, trailing commas, unquoted keys)
pub fn parse_json_text(text: &str, origin: &str) -> Result<Value, SegmentError> {
    json5::from_str::<Value>(text).map_err(|e| SegmentError::Syntax {
        path: origin.to_string(),
        message: e.to_string(),
    })
}

/// Read and leniently parse a JSON file
pub fn read_json_file(path: &Path) -> Result<Value, SegmentError> {
    let origin = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| SegmentError::Read {
        path: origin.clone(),
        source,
    })?;
    parse_json_text(&raw, &origin)
}

/// Read rule rows from a JSON array of `{field, op, value}` objects
pub fn parse_rows(value: Value, origin: &str) -> Result<Vec<RuleRow>, SegmentError> {
    serde_json::from_value(value).map_err(|e| SegmentError::Syntax {
        path: origin.to_string(),
        message: e.to_string(),
    })
}

pub fn read_rows_file(path: &Path) -> Result<Vec<RuleRow>, SegmentError> {
    let value = read_json_file(path)?;
    parse_rows(value, &path.display().to_string())
}

/// Read a segment document, either bare or wrapped as `{"rules": {...}}` the
/// way the rule parsing endpoint returns it.
///
/// `rules` is not a customer field, so an object under that key is always the
/// document; other keys next to it (explanations, metadata) are ignored.
pub fn parse_document(value: &Value) -> Result<SegmentQueryDocument, SegmentError> {
    let wrapped = value
        .as_object()
        .and_then(|object| object.get("rules"))
        .filter(|rules| rules.is_object());

    SegmentQueryDocument::from_json(wrapped.unwrap_or(value))
}

pub fn read_document_file(path: &Path) -> Result<SegmentQueryDocument, SegmentError> {
    let value = read_json_file(path)?;
    parse_document(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::field::Field;
    use serde_json::json;

    #[test]
    fn test_parse_lenient_rows() {
        let text = r#"[
            // spend filter
            { field: "totalSpend", op: "$gte", value: "500" },
        ]"#;
        let rows = parse_rows(parse_json_text(text, "inline").unwrap(), "inline").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].field, Field::TotalSpend);
    }

    #[test]
    fn test_wrapped_rules_are_unwrapped() {
        let doc = parse_document(&json!({"rules": {"visits": {"$gt": 2}}})).unwrap();
        assert_eq!(doc.to_json(), json!({"visits": {"$gt": 2}}));
    }

    #[test]
    fn test_wrapped_rules_ignore_sibling_keys() {
        let doc = parse_document(&json!({
            "rules": {"visits": {"$gt": 2}},
            "explanation": "customers with more than two visits"
        }))
        .unwrap();
        let fields: Vec<_> = doc.iter().map(|(field, _)| field.clone()).collect();
        assert_eq!(fields, vec![Field::Visits]);
    }

    #[test]
    fn test_non_object_rules_key_is_a_field() {
        let doc = parse_document(&json!({"rules": "vip", "visits": 3})).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(
            doc.get(&Field::Other("rules".to_string())),
            Some(&crate::segment::FieldRule::Scalar(json!("vip")))
        );
    }

    #[test]
    fn test_bare_document() {
        let doc = parse_document(&json!({"name": "Aman", "visits": 3})).unwrap();
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_invalid_rows_report_origin() {
        let err = parse_rows(json!({"field": "name"}), "rows.json").unwrap_err();
        assert!(err.to_string().contains("rows.json"));
    }
}
