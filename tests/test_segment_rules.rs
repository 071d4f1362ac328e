use segment_rules::segment::{
    Field, FieldRule, Operator, RawValue, RuleRow, SegmentQueryDocument, coerce, compile,
    decompile,
};
use serde_json::json;

fn row(field: &str, op: &str, value: &str) -> RuleRow {
    RuleRow::new(Field::from_name(field), Operator::from_token(op), value)
}

fn doc(value: serde_json::Value) -> SegmentQueryDocument {
    SegmentQueryDocument::from_json(&value).expect("document should be an object")
}

#[test]
fn test_compile_empty_rows_is_empty_document() {
    let document = compile(&[]);
    assert!(document.is_empty());
    assert_eq!(serde_json::to_string(&document).unwrap(), "{}");
}

#[test]
fn test_eq_followed_by_operator_keeps_eq_explicitly() {
    let document = compile(&[row("totalSpend", "eq", "5"), row("totalSpend", "gt", "1")]);
    assert_eq!(
        document.to_json(),
        json!({"totalSpend": {"$eq": 5, "$gt": 1}})
    );
}

#[test]
fn test_later_eq_overwrites_earlier_operators() {
    let document = compile(&[row("totalSpend", "gt", "1"), row("totalSpend", "eq", "5")]);
    assert_eq!(document.to_json(), json!({"totalSpend": 5}));
}

#[test]
fn test_same_operator_last_write_wins() {
    let document = compile(&[row("visits", "$gte", "2"), row("visits", "$gte", "4")]);
    assert_eq!(document.to_json(), json!({"visits": {"$gte": 4}}));
}

#[test]
fn test_operators_accumulate_across_rows() {
    let document = compile(&[
        row("totalSpend", "$gte", "1000"),
        row("lastActive", "$lt", "2025-01-01T00:00:00.000Z"),
        row("totalSpend", "$lte", "5000"),
    ]);
    assert_eq!(
        document.to_json(),
        json!({
            "totalSpend": {"$gte": 1000, "$lte": 5000},
            "lastActive": {"$lt": "2025-01-01T00:00:00.000Z"}
        })
    );
}

#[test]
fn test_list_coercion_keeps_order_and_types() {
    assert_eq!(
        coerce(&Operator::In, "1, 2, true, hello"),
        json!([1, 2, true, "hello"])
    );
    assert_eq!(coerce(&Operator::NotIn, "b, a, b"), json!(["b", "a", "b"]));
}

#[test]
fn test_date_shape_is_not_a_number() {
    let ts = "2025-01-01T00:00:00.000Z";
    assert_eq!(coerce(&Operator::Eq, ts), json!(ts));
}

#[test]
fn test_regex_value_is_passed_as_text() {
    let document = compile(&[row("email", "matchesRegex", "@gmail\\.com$")]);
    assert_eq!(document.to_json(), json!({"email": {"$regex": "@gmail\\.com$"}}));
}

#[test]
fn test_decompile_bare_value_is_one_eq_row() {
    let rows = decompile(&doc(json!({"name": "Aman"})));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].field, Field::Name);
    assert_eq!(rows[0].op, Operator::Eq);
    assert_eq!(rows[0].value, RawValue::Text("Aman".to_string()));
}

#[test]
fn test_decompile_operator_mapping_in_key_order() {
    let rows = decompile(&doc(json!({"visits": {"gte": 3, "lt": 10}})));
    assert_eq!(rows.len(), 2);
    assert_eq!(
        (rows[0].field.clone(), rows[0].op.clone()),
        (Field::Visits, Operator::Gte)
    );
    assert_eq!(rows[0].value, RawValue::Typed(json!(3)));
    assert_eq!(
        (rows[1].field.clone(), rows[1].op.clone()),
        (Field::Visits, Operator::Lt)
    );
    assert_eq!(rows[1].value, RawValue::Typed(json!(10)));
}

#[test]
fn test_decompile_keeps_unknown_fields_alongside_known_ones() {
    let rows = decompile(&doc(json!({
        "city": "Pune",
        "totalSpend": {"$gt": 100, "$between": [1, 2]}
    })));
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].field, Field::Other("city".to_string()));
    assert_eq!(rows[2].op, Operator::Other("$between".to_string()));
}

#[test]
fn test_round_trip_normalises_values() {
    let original = vec![
        row("totalSpend", "$gte", "42"),
        row("visits", "$in", "1, 2"),
        row("email", "$ne", "x@y.io"),
        row("name", "$eq", "Aman"),
    ];

    let rows = decompile(&compile(&original));
    assert_eq!(rows.len(), original.len());
    for (back, before) in rows.iter().zip(&original) {
        assert_eq!(back.field, before.field);
        assert_eq!(back.op, before.op);
        assert_eq!(back.coerced_value(), before.coerced_value());
    }
    assert_eq!(rows[0].value, RawValue::Typed(json!(42)));
}

#[test]
fn test_recompiling_decompiled_document_is_stable() {
    let input = doc(json!({
        "totalSpend": {"$eq": 5, "$gt": 1},
        "visits": 3,
        "email": {"$in": ["a@x.io", "b@x.io"]}
    }));
    assert_eq!(compile(&decompile(&input)), input);
}

#[test]
fn test_field_rule_predicates_expand_scalar() {
    let rule = FieldRule::Scalar(json!("Aman"));
    assert_eq!(rule.predicates(), vec![(Operator::Eq, &json!("Aman"))]);
}

#[test]
fn test_document_with_alias_and_wire_token_serializes_once() {
    let document = doc(json!({"visits": {"gte": 1, "$gte": 2}}));
    assert_eq!(
        serde_json::to_string(&document).unwrap(),
        r#"{"visits":{"$gte":2}}"#
    );
    assert_eq!(serde_json::to_value(&document).unwrap(), document.to_json());
    assert_eq!(decompile(&document).len(), 1);
}
