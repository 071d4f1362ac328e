use super::error::SegmentError;
use super::field::{Field, Operator};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Predicates on a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Implicit equality: `{"field": value}`
    Scalar(Value),
    /// One or more operator predicates, ANDed: `{"field": {"$gt": 1, "$lt": 9}}`
    Operators(Vec<(Operator, Value)>),
}

impl FieldRule {
    /// Add an operator predicate, promoting a scalar into an explicit `$eq`.
    ///
    /// Setting an operator that is already present overwrites its value in place.
    pub fn with_operator(self, op: Operator, value: Value) -> FieldRule {
        let mut ops = match self {
            FieldRule::Scalar(previous) => vec![(Operator::Eq, previous)],
            FieldRule::Operators(ops) => ops,
        };

        match ops.iter_mut().find(|(existing, _)| *existing == op) {
            Some(slot) => slot.1 = value,
            None => ops.push((op, value)),
        }

        FieldRule::Operators(ops)
    }

    /// Operator/value pairs this rule expands to, in order
    pub fn predicates(&self) -> Vec<(Operator, &Value)> {
        match self {
            FieldRule::Scalar(value) => vec![(Operator::Eq, value)],
            FieldRule::Operators(ops) => ops.iter().map(|(op, value)| (op.clone(), value)).collect(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FieldRule::Scalar(value) => value.clone(),
            FieldRule::Operators(ops) => Value::Object(
                ops.iter()
                    .map(|(op, value)| (op.wire_token().to_string(), value.clone()))
                    .collect(),
            ),
        }
    }

    /// Read a field's rule. Tokens that alias the same operator (`gte` and
    /// `$gte`) collapse into one entry at the first position, last value wins.
    fn from_json(value: &Value) -> FieldRule {
        match value {
            Value::Object(ops) => ops.iter().fold(
                FieldRule::Operators(Vec::new()),
                |rule, (token, value)| rule.with_operator(Operator::from_token(token), value.clone()),
            ),
            scalar => FieldRule::Scalar(scalar.clone()),
        }
    }
}

/// Compiled audience definition handed to the backend.
///
/// Fields are ANDed, and so are the operators within one field. Key order is
/// the order in which fields were first written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentQueryDocument {
    entries: Vec<(Field, FieldRule)>,
}

impl SegmentQueryDocument {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, field: &Field) -> Option<&FieldRule> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == field)
            .map(|(_, rule)| rule)
    }

    /// Iterate fields and their rules in document order
    pub fn iter(&self) -> impl Iterator<Item = (&Field, &FieldRule)> {
        self.entries.iter().map(|(field, rule)| (field, rule))
    }

    /// Replace whatever is stored for `field`, keeping its position
    pub fn set(&mut self, field: Field, rule: FieldRule) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == field) {
            Some(slot) => slot.1 = rule,
            None => self.entries.push((field, rule)),
        }
    }

    /// Rewrite the rule for `field` in place, appending the field if absent
    pub fn update(&mut self, field: Field, f: impl FnOnce(Option<FieldRule>) -> FieldRule) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == field) {
            Some(slot) => {
                let current = std::mem::replace(&mut slot.1, FieldRule::Operators(Vec::new()));
                slot.1 = f(Some(current));
            }
            None => {
                let rule = f(None);
                self.entries.push((field, rule));
            }
        }
    }

    /// JSON object form, as sent in `segmentRules`
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(field, rule)| (field.wire_name().to_string(), rule.to_json()))
                .collect::<Map<String, Value>>(),
        )
    }

    /// Read a document from its JSON object form.
    ///
    /// Unknown fields and operators are kept verbatim; only a non-object top
    /// level is rejected.
    pub fn from_json(value: &Value) -> Result<Self, SegmentError> {
        let object = value
            .as_object()
            .ok_or_else(|| SegmentError::NotAnObject(json_kind(value).to_string()))?;

        let mut doc = Self::new();
        for (name, rule) in object {
            doc.set(Field::from_name(name), FieldRule::from_json(rule));
        }
        Ok(doc)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// Serialized through the JSON object form: a repeated operator is written as
// one key holding the last value.
impl Serialize for FieldRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Serialize for SegmentQueryDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SegmentQueryDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SegmentQueryDocument::from_json(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_promotes_to_eq_operator() {
        let rule = FieldRule::Scalar(json!(5)).with_operator(Operator::Gt, json!(1));
        assert_eq!(
            rule,
            FieldRule::Operators(vec![(Operator::Eq, json!(5)), (Operator::Gt, json!(1))])
        );
    }

    #[test]
    fn test_repeated_operator_overwrites_in_place() {
        let rule = FieldRule::Operators(vec![(Operator::Gt, json!(1)), (Operator::Lt, json!(9))])
            .with_operator(Operator::Gt, json!(3));
        assert_eq!(
            rule,
            FieldRule::Operators(vec![(Operator::Gt, json!(3)), (Operator::Lt, json!(9))])
        );
    }

    #[test]
    fn test_set_keeps_field_position() {
        let mut doc = SegmentQueryDocument::new();
        doc.set(Field::Visits, FieldRule::Scalar(json!(1)));
        doc.set(Field::Name, FieldRule::Scalar(json!("a")));
        doc.set(Field::Visits, FieldRule::Scalar(json!(2)));

        let fields: Vec<_> = doc.iter().map(|(field, _)| field.clone()).collect();
        assert_eq!(fields, vec![Field::Visits, Field::Name]);
        assert_eq!(doc.get(&Field::Visits), Some(&FieldRule::Scalar(json!(2))));
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let value = json!({"visits": {"$lt": 10, "$gte": 3}, "name": "Aman"});
        let doc = SegmentQueryDocument::from_json(&value).unwrap();
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            r#"{"visits":{"$lt":10,"$gte":3},"name":"Aman"}"#
        );
        assert_eq!(doc.to_json(), value);
    }

    #[test]
    fn test_operator_aliases_merge_last_wins() {
        let doc = SegmentQueryDocument::from_json(&json!({"visits": {"gte": 1, "$lt": 9, "$gte": 2}}))
            .unwrap();
        assert_eq!(
            doc.get(&Field::Visits),
            Some(&FieldRule::Operators(vec![
                (Operator::Gte, json!(2)),
                (Operator::Lt, json!(9))
            ]))
        );
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            r#"{"visits":{"$gte":2,"$lt":9}}"#
        );
        assert_eq!(serde_json::to_value(&doc).unwrap(), doc.to_json());
    }

    #[test]
    fn test_hand_built_duplicates_serialize_once() {
        let rule = FieldRule::Operators(vec![(Operator::Gt, json!(1)), (Operator::Gt, json!(4))]);
        assert_eq!(serde_json::to_string(&rule).unwrap(), r#"{"$gt":4}"#);
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = SegmentQueryDocument::from_json(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }
}
