//! Normalizes textual field values into typed [`Value`]s.
//!
//! The same literal text always maps to the same [`crate::types::TypeTag`], so schema inference
//! and later validation agree for the whole read.

use crate::types::Value;

/// Coerce raw field text.
///
/// - text that parses as a number (surrounding whitespace ignored) becomes a float
/// - a float with no fractional part is narrowed to an integer
/// - anything else stays a string, unmodified
///
/// The empty string is not special here: it fails the numeric parse and stays a string. Use
/// [`coerce_field`] where empty fields mean null.
pub fn coerce(raw: &str) -> Value {
    match raw.trim().parse::<f64>() {
        Ok(v) => narrow_float(v),
        Err(_) => Value::String(raw.to_owned()),
    }
}

/// Coerce a field of a data row: empty text is [`Value::Null`], everything else goes through
/// [`coerce`].
pub fn coerce_field(raw: &str) -> Value {
    if raw.is_empty() {
        Value::Null
    } else {
        coerce(raw)
    }
}

/// Narrow `v` to [`Value::Integer`] when it is finite, whole and inside the `i64` range.
pub fn narrow_float(v: f64) -> Value {
    // `i64::MAX as f64` rounds up to 2^63, hence the strict upper bound.
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Value::Integer(v as i64)
    } else {
        Value::Float(v)
    }
}
