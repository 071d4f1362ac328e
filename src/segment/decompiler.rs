use super::document::{FieldRule, SegmentQueryDocument};
use super::field::Operator;
use super::row::{RawValue, RuleRow};

/// Expand a segment document into editable rows.
///
/// A bare value becomes one `$eq` row; an operator mapping becomes one row
/// per operator, in the mapping's order. Nothing is validated: unknown
/// fields and operators come through as-is.
pub fn decompile(doc: &SegmentQueryDocument) -> Vec<RuleRow> {
    let mut rows = Vec::new();

    for (field, rule) in doc.iter() {
        match rule {
            FieldRule::Scalar(value) => {
                rows.push(RuleRow::new(
                    field.clone(),
                    Operator::Eq,
                    RawValue::from(value.clone()),
                ));
            }
            FieldRule::Operators(ops) => {
                rows.extend(ops.iter().map(|(op, value)| {
                    RuleRow::new(field.clone(), op.clone(), RawValue::from(value.clone()))
                }));
            }
        }
    }

    rows
}

/// Append the rows of `doc` to `rows`, keeping what is already there
pub fn decompile_onto(rows: &mut Vec<RuleRow>, doc: &SegmentQueryDocument) {
    rows.extend(decompile(doc));
}
