//! Raw row and cell value types shared by every source

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One cell of a raw row. CSV sources produce only `Text`; JSON sources
/// produce any variant. `Int` precedes `Float` so untagged
/// deserialization keeps whole numbers integral.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl FieldValue {
    /// Numeric reading of the cell. Text goes through a standard trimmed
    /// float parse; blank or unparseable text has no number. The result
    /// is not finiteness-checked here.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Text(s) => s.trim().parse().ok(),
            FieldValue::Null => None,
        }
    }

    /// Trimmed text reading, `None` when blank, numeric, or null.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => {
                let t = s.trim();
                (!t.is_empty()).then_some(t)
            }
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

/// A raw tabular row: column name -> cell, insertion order preserved.
///
/// Order matters: the key set of the first row of a batch defines the
/// column order of the detail table downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RawRow(IndexMap<String, FieldValue>);

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_readings() {
        assert_eq!(FieldValue::Float(12.5).as_number(), Some(12.5));
        assert_eq!(FieldValue::Int(7).as_number(), Some(7.0));
        assert_eq!(FieldValue::Text(" 3.25 ".into()).as_number(), Some(3.25));
        assert_eq!(FieldValue::Text("".into()).as_number(), None);
        assert_eq!(FieldValue::Text("12.3abc".into()).as_number(), None);
        assert_eq!(FieldValue::Null.as_number(), None);
    }

    #[test]
    fn test_text_readings() {
        assert_eq!(FieldValue::Text("  Haga  ".into()).as_text(), Some("Haga"));
        assert_eq!(FieldValue::Text("   ".into()).as_text(), None);
        assert_eq!(FieldValue::Int(3).as_text(), None);
        assert_eq!(FieldValue::Null.as_text(), None);
    }

    #[test]
    fn test_untagged_deserialization() {
        let row: RawRow =
            serde_json::from_str(r#"{"sensor_id":"a1","pm25":12.5,"count":3,"city":null}"#)
                .unwrap();
        assert_eq!(row.get("sensor_id"), Some(&FieldValue::Text("a1".into())));
        assert_eq!(row.get("pm25"), Some(&FieldValue::Float(12.5)));
        assert_eq!(row.get("count"), Some(&FieldValue::Int(3)));
        assert_eq!(row.get("city"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_key_order_preserved() {
        let mut row = RawRow::new();
        row.insert("zeta", "1");
        row.insert("alpha", "2");
        row.insert("mid", "3");
        let keys: Vec<_> = row.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }
}
