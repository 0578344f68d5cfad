//! JSON array body -> raw rows

use luft_core::{FieldValue, RawRow};
use serde_json::Value;

use crate::{RowSet, SourceError, SourceResult};

/// Parse a JSON array of row objects. The key set of the first object
/// defines the header order; non-object entries are skipped.
pub fn parse_json(text: &str) -> SourceResult<RowSet> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(SourceError::NotAnArray);
    };

    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(fields) = item else {
            tracing::warn!("skipping non-object entry in row array");
            continue;
        };
        let mut row = RawRow::new();
        for (key, value) in fields {
            row.insert(key, field_value(value));
        }
        rows.push(row);
    }

    let headers = rows
        .first()
        .map(|row: &RawRow| row.keys().map(str::to_string).collect())
        .unwrap_or_default();

    Ok(RowSet { headers, rows })
}

fn field_value(value: Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::String(s) => FieldValue::Text(s),
        Value::Number(n) => match n.as_i64() {
            Some(i) => FieldValue::Int(i),
            None => n
                .as_f64()
                .map(FieldValue::Float)
                .unwrap_or(FieldValue::Null),
        },
        // Bools and nested structures have no tabular meaning; keep their
        // JSON text so the detail table can still show them.
        other => FieldValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_variants() {
        let set = parse_json(
            r#"[{"sensor_id":"s1","pm25":12.5,"count":3,"city":null,"active":true}]"#,
        )
        .unwrap();
        let row = &set.rows[0];
        assert_eq!(row.get("sensor_id"), Some(&FieldValue::Text("s1".into())));
        assert_eq!(row.get("pm25"), Some(&FieldValue::Float(12.5)));
        assert_eq!(row.get("count"), Some(&FieldValue::Int(3)));
        assert_eq!(row.get("city"), Some(&FieldValue::Null));
        assert_eq!(row.get("active"), Some(&FieldValue::Text("true".into())));
    }

    #[test]
    fn test_headers_follow_first_object_order() {
        let set = parse_json(r#"[{"zeta":1,"alpha":2},{"alpha":3,"zeta":4}]"#).unwrap();
        assert_eq!(set.headers, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_non_array_is_an_error() {
        assert!(matches!(
            parse_json(r#"{"sensor_id":"s1"}"#),
            Err(SourceError::NotAnArray)
        ));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(parse_json("[{"), Err(SourceError::Json(_))));
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let set = parse_json(r#"[{"sensor_id":"s1"},42,"noise",{"sensor_id":"s2"}]"#).unwrap();
        assert_eq!(set.rows.len(), 2);
    }

    #[test]
    fn test_empty_array() {
        let set = parse_json("[]").unwrap();
        assert!(set.headers.is_empty());
        assert!(set.rows.is_empty());
    }
}
