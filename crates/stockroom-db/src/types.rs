//! Database value types and conversions.

use crate::DbError;
use base64::Engine;
use serde::de::DeserializeOwned;

/// A JSON document as stored in a table.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// A database value that can be used as a parameter or result.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Integer value.
    Integer(i64),
    /// Real/float value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl Value {
    /// Try to get the value as a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(if v { 1 } else { 0 })
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Booleans become integers, nested arrays/objects are stored as JSON text.
impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::from(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Real(n.as_f64().unwrap_or(0.0)),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            nested => Value::Text(nested.to_string()),
        }
    }
}

/// A row from a query result.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a new row from columns and values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Get a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Convert the row to a JSON document.
    pub fn to_document(&self) -> Document {
        self.columns
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect()
    }
}

/// Query result containing rows.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// The column names.
    pub columns: Vec<String>,
    /// The rows.
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Create a new query result.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Get the first row.
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}

/// Convert a Value to a serde_json::Value.
fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Real(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Blob(b) => String::from_utf8(b.clone())
            .map(serde_json::Value::String)
            .unwrap_or_else(|_| {
                serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(b))
            }),
    }
}

/// Serialize a record into a document.
pub fn to_document<T: serde::Serialize>(record: &T) -> Result<Document, DbError> {
    match serde_json::to_value(record)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(DbError::InvalidDocument(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Deserialize a document into a record.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, DbError> {
    serde_json::from_value(serde_json::Value::Object(doc))
        .map_err(|e| DbError::DeserializeError(e.to_string()))
}

/// Serde helpers for fields whose stored shape differs between backends.
///
/// SQLite hands booleans back as integers and JSON blobs back as text.
pub mod de {
    use serde::{Deserialize, Deserializer};

    /// Accept `true`/`false`, `0`/`1`, or a missing/null value (false).
    pub fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(serde_json::Value::Bool(b)) => b,
            Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
            Some(serde_json::Value::String(s)) => s == "true" || s == "1",
            _ => false,
        })
    }

    /// Accept a JSON value or a string containing JSON.
    ///
    /// Unparseable text becomes an empty object.
    pub fn json_blob<'de, D>(deserializer: D) -> Result<serde_json::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(serde_json::Value::String(s)) => serde_json::from_str(&s)
                .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new())),
            Some(v) => v,
            None => serde_json::Value::Object(serde_json::Map::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Flagged {
        #[serde(default, deserialize_with = "de::flexible_bool")]
        flag: bool,
        #[serde(default, deserialize_with = "de::json_blob")]
        blob: serde_json::Value,
    }

    #[test]
    fn test_json_to_value() {
        assert_eq!(Value::from(&serde_json::json!(true)), Value::Integer(1));
        assert_eq!(Value::from(&serde_json::json!(42)), Value::Integer(42));
        assert_eq!(Value::from(&serde_json::json!(1.5)), Value::Real(1.5));
        assert_eq!(Value::from(&serde_json::json!(null)), Value::Null);
        assert_eq!(
            Value::from(&serde_json::json!({"a": 1})),
            Value::Text(r#"{"a":1}"#.to_string())
        );
    }

    #[test]
    fn test_row_document_with_sqlite_shapes() {
        let row = Row::new(
            vec!["flag".to_string(), "blob".to_string()],
            vec![Value::Integer(1), Value::Text(r#"{"name":"x"}"#.to_string())],
        );
        let parsed: Flagged = from_document(row.to_document()).unwrap();
        assert!(parsed.flag);
        assert_eq!(parsed.blob["name"], "x");
    }

    #[test]
    fn test_flexible_bool_missing_is_false() {
        let parsed: Flagged = serde_json::from_str(r#"{"blob": null}"#).unwrap();
        assert!(!parsed.flag);
        assert!(parsed.blob.is_object());
    }

    #[test]
    fn test_row_get_by_column() {
        let row = Row::new(vec!["id".to_string()], vec![Value::from("p-1")]);
        assert_eq!(row.get("id").and_then(|v| v.as_text()), Some("p-1"));
        assert!(row.get("missing").is_none());
    }
}
