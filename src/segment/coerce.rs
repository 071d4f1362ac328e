//! Best-effort conversion of free-text rule values into typed query values.
//!
//! Coercion is total: text that doesn't look like a number, boolean or
//! date-time is kept as a string, so a half-typed value never blocks
//! compilation.

use super::field::Operator;
use super::row::RawValue;
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::LazyLock;

/// Time-of-day fragment of an ISO-8601 timestamp, e.g. `T09:30:00`
static DATE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"T[0-9]{2}:[0-9]{2}:[0-9]{2}").expect("valid date-time regex"));

/// Largest integer an f64 represents exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Coerce raw text for the given operator.
///
/// List operators (`$in`, `$nin`) split on commas and coerce each non-empty
/// trimmed segment; every other operator coerces the whole text as a scalar.
pub fn coerce(op: &Operator, raw: &str) -> Value {
    if op.takes_list() {
        Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(coerce_scalar)
                .collect(),
        )
    } else {
        coerce_scalar(raw)
    }
}

/// Coerce a row value that may already be typed (e.g. from an imported document)
pub fn coerce_raw(op: &Operator, raw: &RawValue) -> Value {
    match raw {
        RawValue::Text(text) => coerce(op, text),
        RawValue::Typed(value) => coerce_typed(op, value),
    }
}

fn coerce_typed(op: &Operator, value: &Value) -> Value {
    if !op.takes_list() {
        return match value {
            Value::String(text) => coerce_scalar(text),
            other => other.clone(),
        };
    }

    match value {
        Value::String(text) => coerce(op, text),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => {
                        let trimmed = text.trim();
                        (!trimmed.is_empty()).then(|| coerce_scalar(trimmed))
                    }
                    other => Some(other.clone()),
                })
                .collect(),
        ),
        Value::Null => Value::Array(Vec::new()),
        other => Value::Array(vec![other.clone()]),
    }
}

/// Coerce a single value: date-time shape, then boolean, then number, else text
pub fn coerce_scalar(raw: &str) -> Value {
    let s = raw.trim();

    if DATE_TIME_RE.is_match(s) {
        return Value::String(raw.to_string());
    }

    match s {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Some(number) = parse_finite_number(s) {
        return Value::Number(number);
    }

    Value::String(raw.to_string())
}

/// Parse a complete numeric literal, rejecting infinities and NaN.
///
/// Accepts decimal and exponent notation plus `0x`, `0o` and `0b` integer
/// literals. Integral values within the exactly-representable range become
/// JSON integers.
fn parse_finite_number(s: &str) -> Option<Number> {
    if s.is_empty() {
        return None;
    }

    let value = match radix_literal(s) {
        Some((digits, radix)) => {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            u64::from_str_radix(digits, radix).ok()? as f64
        }
        None => s.parse::<f64>().ok()?,
    };

    if !value.is_finite() {
        return None;
    }

    if value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

fn radix_literal(s: &str) -> Option<(&str, u32)> {
    let prefix = s.get(..2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((&s[2..], radix))
}
