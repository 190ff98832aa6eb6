//! Parse model output into a chunk response

use crate::error::ModelCallError;
use crate::types::{ChunkMetadata, ChunkResponse, Confidence, PackageMetadata};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Parse the content of a model reply.
///
/// `cards` must be an array and `metadata.processedUpTo` must be present;
/// everything else is optional and malformed optional parts are ignored.
pub fn parse_chunk_response(content: &str) -> Result<ChunkResponse, ModelCallError> {
    // Models sometimes wrap JSON in markdown code blocks
    let json_str = extract_json(content);

    let json: Value = serde_json::from_str(json_str)
        .map_err(|e| ModelCallError::InvalidJson(e.to_string()))?;

    let obj = json
        .as_object()
        .ok_or_else(|| ModelCallError::InvalidShape("Expected a JSON object".to_string()))?;

    let cards = match obj.get("cards") {
        Some(Value::Array(cards)) => cards.clone(),
        Some(_) => return Err(ModelCallError::InvalidShape("'cards' must be an array".to_string())),
        None => return Err(ModelCallError::MissingField("cards")),
    };

    let metadata = parse_metadata(obj.get("metadata"))?;

    let warnings = match obj.get("warnings") {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            warn!("Ignoring non-array warnings: {}", other);
            Vec::new()
        }
    };

    Ok(ChunkResponse {
        cards,
        custom_field_definitions: parse_definitions(obj.get("customFieldDefinitions")),
        metadata,
        warnings,
        package: PackageMetadata {
            name: text_field(obj, "name"),
            version: text_field(obj, "version"),
            author: text_field(obj, "author"),
            description: text_field(obj, "description"),
        },
    })
}

/// Extract JSON from a reply, handling markdown code blocks
pub(crate) fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Skip the fence line (```json or ```) and the closing fence
        let body = rest.split_once('\n').map_or("", |(_, body)| body);
        let body = body.trim_end();
        body.strip_suffix("```").unwrap_or(body).trim()
    } else {
        trimmed
    }
}

fn parse_metadata(value: Option<&Value>) -> Result<ChunkMetadata, ModelCallError> {
    let obj = match value {
        Some(Value::Object(obj)) => obj,
        Some(_) => return Err(ModelCallError::InvalidShape("'metadata' must be an object".to_string())),
        None => return Err(ModelCallError::MissingField("metadata.processedUpTo")),
    };

    let processed_up_to = match obj.get("processedUpTo") {
        None | Some(Value::Null) => return Err(ModelCallError::MissingField("metadata.processedUpTo")),
        Some(v) => offset(v).ok_or_else(|| {
            ModelCallError::InvalidShape(format!("'metadata.processedUpTo' is not an offset: {}", v))
        })?,
    };

    let next_should_start_from = match obj.get("nextShouldStartFrom") {
        None | Some(Value::Null) => None,
        Some(v) => {
            let parsed = offset(v);
            if parsed.is_none() {
                warn!("Ignoring invalid nextShouldStartFrom: {}", v);
            }
            parsed
        }
    };

    let confidence = match obj.get("confidence").and_then(Value::as_str) {
        Some(label) if label.trim().eq_ignore_ascii_case("partial") => Confidence::Partial,
        _ => Confidence::Complete,
    };

    Ok(ChunkMetadata {
        processed_up_to,
        next_should_start_from,
        confidence,
    })
}

/// Non-negative integer offset; negative numbers clamp to zero
fn offset(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                usize::try_from(u).ok()
            } else if n.as_i64().is_some() {
                Some(0)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.max(0.0).floor() as usize)
            }
        }
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
}

fn parse_definitions(value: Option<&Value>) -> BTreeMap<String, Vec<String>> {
    let mut definitions = BTreeMap::new();
    let Some(Value::Object(categories)) = value else {
        return definitions;
    };

    for (category, values) in categories {
        let Value::Array(values) = values else {
            warn!("Ignoring non-array definitions for '{}'", category);
            continue;
        };
        let mut seen: Vec<String> = Vec::new();
        for value in values {
            if let Some(s) = value.as_str().map(str::trim).filter(|s| !s.is_empty()) {
                if !seen.iter().any(|v| v == s) {
                    seen.push(s.to_string());
                }
            }
        }
        definitions.insert(category.clone(), seen);
    }
    definitions
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
