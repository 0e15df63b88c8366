//! Conversions from YAML values to the primitive types the accessors return.

use serde_yaml::{Mapping, Value};

/// Any scalar as text.
pub fn to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A number as `i64`, truncating floats.
pub fn to_i64(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64()
        .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
        .or_else(|| n.as_f64().map(|f| f as i64))
}

pub fn to_i32(value: &Value) -> Option<i32> {
    to_i64(value).and_then(|n| i32::try_from(n).ok())
}

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

pub fn is_i32(value: &Value) -> bool {
    matches!(value, Value::Number(n) if n.as_i64().is_some_and(|i| i32::try_from(i).is_ok()))
}

pub fn is_i64(value: &Value) -> bool {
    matches!(value, Value::Number(n) if n.is_i64())
}

pub fn is_f64(value: &Value) -> bool {
    matches!(value, Value::Number(n) if n.is_f64())
}

/// Converts every element of a sequence with `convert`, skipping elements
/// that do not convert. `None` when `value` is not a sequence.
pub fn list_of<T>(value: &Value, convert: impl Fn(&Value) -> Option<T>) -> Option<Vec<T>> {
    let items = value.as_sequence()?;
    Some(items.iter().filter_map(convert).collect())
}

/// Element conversion for string lists: any scalar.
pub fn element_string(value: &Value) -> Option<String> {
    to_string(value)
}

/// Element conversion for integral lists: numbers or numeric strings.
pub fn element_integral<T: TryFrom<i64> + std::str::FromStr>(value: &Value) -> Option<T> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => to_i64(other).and_then(|n| T::try_from(n).ok()),
    }
}

/// Element conversion for floating lists: numbers or numeric strings.
pub fn element_f64(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => to_f64(other),
    }
}

pub fn element_f32(value: &Value) -> Option<f32> {
    element_f64(value).map(|f| f as f32)
}

/// Element conversion for boolean lists: booleans or exactly `"true"`/`"false"`.
pub fn element_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

/// Element conversion for character lists: one-character strings or code points.
pub fn element_char(value: &Value) -> Option<char> {
    match value {
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        }
        other => to_i64(other)
            .and_then(|n| u32::try_from(n).ok())
            .and_then(char::from_u32),
    }
}

pub fn element_mapping(value: &Value) -> Option<Mapping> {
    value.as_mapping().cloned()
}
