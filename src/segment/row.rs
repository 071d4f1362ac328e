use super::coerce::coerce_raw;
use super::field::{Field, Operator};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Opaque row identity, stable for the lifetime of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(Uuid);

impl RowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value of a row before coercion
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Text exactly as entered
    Text(String),
    /// An already-typed value, as produced by decompiling a document
    Typed(Value),
}

impl RawValue {
    /// Text shown in an input box for this value
    pub fn display_text(&self) -> String {
        match self {
            RawValue::Text(text) => text.clone(),
            RawValue::Typed(Value::String(text)) => text.clone(),
            RawValue::Typed(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            RawValue::Typed(other) => other.to_string(),
        }
    }
}

impl Default for RawValue {
    fn default() -> Self {
        RawValue::Text(String::new())
    }
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        RawValue::Text(text.to_string())
    }
}

impl From<String> for RawValue {
    fn from(text: String) -> Self {
        RawValue::Text(text)
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => RawValue::Text(text),
            other => RawValue::Typed(other),
        }
    }
}

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawValue::Text(text) => serializer.serialize_str(text),
            RawValue::Typed(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(RawValue::from)
    }
}

/// One user-edited predicate: `field op value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRow {
    #[serde(default)]
    pub id: RowId,
    #[serde(default)]
    pub field: Field,
    #[serde(default)]
    pub op: Operator,
    #[serde(default)]
    pub value: RawValue,
}

impl RuleRow {
    pub fn new(field: Field, op: Operator, value: impl Into<RawValue>) -> Self {
        Self {
            id: RowId::new(),
            field,
            op,
            value: value.into(),
        }
    }

    /// A fresh row as added by the user: `totalSpend $gte ""`
    pub fn empty() -> Self {
        Self::new(Field::default(), Operator::default(), RawValue::default())
    }

    /// The row's value coerced for its operator
    pub fn coerced_value(&self) -> Value {
        coerce_raw(&self.op, &self.value)
    }
}

impl Default for RuleRow {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for RuleRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.coerced_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_row_defaults() {
        let row = RuleRow::empty();
        assert_eq!(row.field, Field::TotalSpend);
        assert_eq!(row.op, Operator::Gte);
        assert_eq!(row.value, RawValue::Text(String::new()));
    }

    #[test]
    fn test_row_ids_are_unique() {
        assert_ne!(RuleRow::empty().id, RuleRow::empty().id);
    }

    #[test]
    fn test_deserialize_row_without_id() {
        let row: RuleRow =
            serde_json::from_value(json!({"field": "visits", "op": "$lt", "value": 10})).unwrap();
        assert_eq!(row.field, Field::Visits);
        assert_eq!(row.op, Operator::Lt);
        assert_eq!(row.value, RawValue::Typed(json!(10)));
    }

    #[test]
    fn test_display_uses_coerced_value() {
        let row = RuleRow::new(Field::Visits, Operator::In, "1, 2");
        assert_eq!(row.to_string(), "visits $in [1,2]");
    }

    #[test]
    fn test_display_text_of_typed_list() {
        let value = RawValue::Typed(json!(["a", 2]));
        assert_eq!(value.display_text(), "a, 2");
    }
}
