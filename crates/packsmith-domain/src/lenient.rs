//! Forgiving field deserializers for model-authored card data.
//!
//! Models routinely emit `"3"` where a number is expected or `2` where text
//! is expected. These helpers accept both spellings and only fail on shapes
//! that cannot be coerced without losing information.

use serde::de::{Deserializer, Error};
use serde::Deserialize;
use serde_json::Value;

/// Text field: strings, numbers and booleans are accepted; arrays of scalars
/// are joined with `", "`.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(Value::Array(items)) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => parts.push(s),
                    Value::Number(n) => parts.push(n.to_string()),
                    Value::Bool(b) => parts.push(b.to_string()),
                    Value::Null => {}
                    _ => return Err(D::Error::custom("expected text, found nested structure")),
                }
            }
            Ok(Some(parts.join(", ")))
        }
        Some(Value::Object(_)) => Err(D::Error::custom("expected text, found object")),
    }
}

/// Non-negative integer field: numbers, integral floats and numeric strings
/// are accepted; blank strings read as absent.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v)
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("number {} out of range", v)));
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(Some(f as u32)),
                _ => Err(D::Error::custom(format!("expected non-negative integer, found {}", n))),
            }
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<u32>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected non-negative integer, found '{}'", s)))
        }
        Some(other) => Err(D::Error::custom(format!("expected non-negative integer, found {}", other))),
    }
}
