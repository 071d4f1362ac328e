use super::document::{FieldRule, SegmentQueryDocument};
use super::field::{Field, Operator};
use super::row::RuleRow;

/// Fold ordered rule rows into a segment document.
///
/// Rows are applied in order. An `$eq` row replaces everything stored for its
/// field; any other operator is added to the field's operator mapping, and a
/// bare equality already stored there is kept as an explicit `$eq`.
pub fn compile(rows: &[RuleRow]) -> SegmentQueryDocument {
    let mut out = SegmentQueryDocument::new();

    for row in rows {
        let value = row.coerced_value();

        if row.op == Operator::Eq {
            out.set(row.field.clone(), FieldRule::Scalar(value));
            continue;
        }

        out.update(row.field.clone(), |existing| match existing {
            Some(rule) => rule.with_operator(row.op.clone(), value),
            None => FieldRule::Operators(vec![(row.op.clone(), value)]),
        });
    }

    out
}

/// How an earlier row was affected by a later row on the same field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollisionKind {
    /// A later `$eq` row discarded earlier operators
    EqDiscarded { discarded: Vec<Operator> },
    /// A bare equality was kept as `$eq` next to a later operator
    EqPromoted { alongside: Operator },
    /// The same operator appeared more than once; the last value won
    Overwritten { op: Operator },
}

/// A field targeted by more than one row in a way that silently merges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub field: Field,
    pub kind: CollisionKind,
}

/// Replay compilation and report every silent merge it performs.
///
/// The compiled document is unaffected; this only explains it.
pub fn collisions(rows: &[RuleRow]) -> Vec<Collision> {
    let mut seen: Vec<(Field, Vec<Operator>, bool)> = Vec::new();
    let mut found = Vec::new();

    for row in rows {
        let index = match seen.iter().position(|(field, _, _)| *field == row.field) {
            Some(index) => index,
            None => {
                seen.push((row.field.clone(), Vec::new(), false));
                seen.len() - 1
            }
        };
        let (field, ops, scalar) = &mut seen[index];

        if row.op == Operator::Eq {
            if *scalar {
                found.push(Collision {
                    field: field.clone(),
                    kind: CollisionKind::Overwritten { op: Operator::Eq },
                });
            } else if !ops.is_empty() {
                found.push(Collision {
                    field: field.clone(),
                    kind: CollisionKind::EqDiscarded {
                        discarded: std::mem::take(ops),
                    },
                });
            }
            ops.clear();
            *scalar = true;
            continue;
        }

        if *scalar {
            found.push(Collision {
                field: field.clone(),
                kind: CollisionKind::EqPromoted {
                    alongside: row.op.clone(),
                },
            });
            *scalar = false;
            ops.push(Operator::Eq);
        }

        if ops.contains(&row.op) {
            found.push(Collision {
                field: field.clone(),
                kind: CollisionKind::Overwritten { op: row.op.clone() },
            });
        } else {
            ops.push(row.op.clone());
        }
    }

    found
}
