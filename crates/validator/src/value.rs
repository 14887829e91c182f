//! Attribute value semantics
//!
//! Records store attributes as [`serde_json::Value`]. Rules reason about
//! them the way a dynamically typed model layer does: an absent key is
//! `undefined`, `Value::Null` is `null`, and presence is decided by
//! truthiness rather than by `Option::is_some`.
//!
//! Every helper takes `Option<&Value>` so callers can pass the result of
//! [`Attributes::get`](crate::record::Attributes::get) straight through.

use std::borrow::Cow;

use serde_json::{Number, Value};

/// Returns `true` if the value is truthy.
///
/// Falsy values are: absent, `null`, `false`, `0` (either sign), `NaN`
/// and the empty string. Arrays and objects are always truthy, even when
/// empty.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Returns `true` if the value is falsy. See [`is_truthy`].
#[inline]
pub fn is_falsy(value: Option<&Value>) -> bool {
    !is_truthy(value)
}

/// Measures the length of a value.
///
/// Strings count Unicode scalar values, arrays count elements. Every other
/// value has no length and yields `None`.
pub fn length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Strict equality between two attribute values.
///
/// Absent equals absent, but absent never equals `null`. Numbers compare by
/// numeric value, so `1` equals `1.0`.
pub fn strict_eq(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            a == b || matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y)
        }
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Coerces a value to the string a pattern is tested against.
///
/// Strings are borrowed as-is and integral floats drop their fractional
/// part. Arrays join their elements with commas (with `null` elements
/// rendered empty) and objects render as `[object Object]`.
pub fn coerce_string(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed("null"),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Number(n) => Cow::Owned(number_string(n)),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| match item {
                    Value::Null => Cow::Borrowed(""),
                    other => coerce_string(other),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Borrowed("[object Object]"),
    }
}

/// Renders a number the way a dynamically typed model layer would: an
/// integral float loses its fractional part (`1.0` is `"1"`, `-0.0` is
/// `"0"`).
fn number_string(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 { "0".to_string() } else { format!("{f:.0}") }
        }
        _ => n.to_string(),
    }
}
