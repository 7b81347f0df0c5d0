//! Attribute filters applied during table scans.
//!
//! A [`Filter`] is a conjunction of conditions. The memory backend evaluates
//! it against each document; the SQLite backend renders it as a `WHERE`
//! clause. Both must agree on every condition.

use crate::types::{Document, Value};

/// A single attribute condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value.
    Eq {
        field: &'static str,
        value: serde_json::Value,
    },
    /// Field is missing, null, or false.
    NotTrue(&'static str),
    /// Field is true.
    IsTrue(&'static str),
    /// Text field contains the needle (case-sensitive).
    Contains {
        field: &'static str,
        needle: String,
    },
    /// Numeric field is at least the bound.
    Gte { field: &'static str, bound: f64 },
    /// Numeric field is at most the bound.
    Lte { field: &'static str, bound: f64 },
}

impl Condition {
    /// The field this condition reads.
    pub fn field(&self) -> &'static str {
        match self {
            Condition::Eq { field, .. }
            | Condition::Contains { field, .. }
            | Condition::Gte { field, .. }
            | Condition::Lte { field, .. } => *field,
            Condition::NotTrue(field) | Condition::IsTrue(field) => *field,
        }
    }

    /// Evaluate the condition against a document.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Condition::Eq { field, value } => doc
                .get(*field)
                .map(|actual| json_eq(actual, value))
                .unwrap_or(false),
            Condition::NotTrue(field) => !truthy(doc.get(*field)),
            Condition::IsTrue(field) => truthy(doc.get(*field)),
            Condition::Contains { field, needle } => doc
                .get(*field)
                .and_then(|v| v.as_str())
                .map(|s| s.contains(needle.as_str()))
                .unwrap_or(false),
            Condition::Gte { field, bound } => doc
                .get(*field)
                .and_then(|v| v.as_f64())
                .map(|n| n >= *bound)
                .unwrap_or(false),
            Condition::Lte { field, bound } => doc
                .get(*field)
                .and_then(|v| v.as_f64())
                .map(|n| n <= *bound)
                .unwrap_or(false),
        }
    }

    fn to_sql(&self, params: &mut Vec<Value>) -> String {
        match self {
            Condition::Eq { field, value } => {
                params.push(Value::from(value));
                format!("{} = ?", field)
            }
            Condition::NotTrue(field) => format!("({field} IS NULL OR {field} = 0)"),
            Condition::IsTrue(field) => format!("{} = 1", field),
            Condition::Contains { field, needle } => {
                params.push(Value::Text(needle.clone()));
                format!("instr({}, ?) > 0", field)
            }
            Condition::Gte { field, bound } => {
                params.push(Value::Real(*bound));
                format!("{} >= ?", field)
            }
            Condition::Lte { field, bound } => {
                params.push(Value::Real(*bound));
                format!("{} <= ?", field)
            }
        }
    }
}

/// A conjunction of conditions. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// A filter that matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Require `field == value`.
    pub fn eq(mut self, field: &'static str, value: impl Into<serde_json::Value>) -> Self {
        self.conditions.push(Condition::Eq {
            field,
            value: value.into(),
        });
        self
    }

    /// Require the flag to be unset or false.
    pub fn not_true(mut self, field: &'static str) -> Self {
        self.conditions.push(Condition::NotTrue(field));
        self
    }

    /// Require the flag to be true.
    pub fn is_true(mut self, field: &'static str) -> Self {
        self.conditions.push(Condition::IsTrue(field));
        self
    }

    /// Require the text field to contain `needle`.
    pub fn contains(mut self, field: &'static str, needle: impl Into<String>) -> Self {
        self.conditions.push(Condition::Contains {
            field,
            needle: needle.into(),
        });
        self
    }

    /// Require `field >= bound`.
    pub fn gte(mut self, field: &'static str, bound: f64) -> Self {
        self.conditions.push(Condition::Gte { field, bound });
        self
    }

    /// Require `field <= bound`.
    pub fn lte(mut self, field: &'static str, bound: f64) -> Self {
        self.conditions.push(Condition::Lte { field, bound });
        self
    }

    /// Require `min <= field <= max`.
    pub fn between(self, field: &'static str, min: f64, max: f64) -> Self {
        self.gte(field, min).lte(field, max)
    }

    /// The conditions in this filter.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Check if the filter has no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate the filter against a document.
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }

    /// Render as a SQL `WHERE` body with positional parameters.
    ///
    /// Returns `None` for the empty filter.
    pub fn to_sql(&self) -> Option<(String, Vec<Value>)> {
        if self.conditions.is_empty() {
            return None;
        }
        let mut params = Vec::new();
        let clauses: Vec<String> = self
            .conditions
            .iter()
            .map(|c| c.to_sql(&mut params))
            .collect();
        Some((clauses.join(" AND "), params))
    }
}

fn truthy(value: Option<&serde_json::Value>) -> bool {
    match value {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

fn json_eq(actual: &serde_json::Value, expected: &serde_json::Value) -> bool {
    match (actual, expected) {
        (serde_json::Value::Number(a), serde_json::Value::Number(b)) => a.as_f64() == b.as_f64(),
        (serde_json::Value::Bool(_), serde_json::Value::Number(_))
        | (serde_json::Value::Number(_), serde_json::Value::Bool(_)) => {
            truthy(Some(actual)) == truthy(Some(expected))
        }
        _ => actual == expected,
    }
}
