//! JSON body decoding with nesting limits, comment skipping and
//! case-insensitive field matching.

use serde_json::{Map, Value};

use crate::error::BindError;
use crate::types::{ArgValue, ObjectType, ParamType};

/// Decodes a JSON body into an argument of type `ty`.
///
/// `//` and `/* */` comments are skipped. Documents nested deeper than
/// `max_depth` are rejected before parsing. A JSON `null` document binds as
/// [`ArgValue::Null`].
///
/// # Errors
///
/// Returns [`BindError::InvalidBody`] for malformed or excessively nested
/// documents, and for documents whose top-level shape does not match `ty`.
pub fn decode_body(bytes: &[u8], ty: &ParamType, max_depth: usize) -> Result<ArgValue, BindError> {
    let cleaned = strip_comments_checked(bytes, max_depth)?;
    let value: Value = serde_json::from_slice(&cleaned).map_err(|e| BindError::InvalidBody {
        reason: e.to_string(),
    })?;

    if value.is_null() {
        return Ok(ArgValue::Null);
    }

    shape(value, ty.underlying()).map(ArgValue::Body)
}

fn shape(value: Value, ty: &ParamType) -> Result<Value, BindError> {
    match (ty, value) {
        (ParamType::Object(object), Value::Object(map)) => {
            Ok(Value::Object(canonicalize_keys(map, object)))
        }
        (ParamType::Array(element), Value::Array(items)) => match element.underlying() {
            ParamType::Object(object) => Ok(Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(map) => Value::Object(canonicalize_keys(map, object)),
                        other => other,
                    })
                    .collect(),
            )),
            _ => Ok(Value::Array(items)),
        },
        (ty, value) => Err(BindError::InvalidBody {
            reason: format!("expected {} for {ty}, found {}", expected_shape(ty), json_kind(&value)),
        }),
    }
}

/// Renames keys that match a declared field ignoring ASCII case.
/// Unknown keys are kept as sent.
fn canonicalize_keys(map: Map<String, Value>, object: &ObjectType) -> Map<String, Value> {
    if object.fields.is_empty() {
        return map;
    }
    map.into_iter()
        .map(|(key, value)| {
            let canonical = object
                .fields
                .iter()
                .find(|field| field.eq_ignore_ascii_case(&key))
                .map_or(key, |field| (*field).to_string());
            (canonical, value)
        })
        .collect()
}

fn expected_shape(ty: &ParamType) -> &'static str {
    match ty {
        ParamType::Array(_) => "an array",
        _ => "an object",
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

/// Replaces comments with whitespace and enforces the nesting limit in a
/// single pass. String contents are copied verbatim.
fn strip_comments_checked(input: &[u8], max_depth: usize) -> Result<Vec<u8>, BindError> {
    let mut out = Vec::with_capacity(input.len());
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < input.len() {
        let byte = input[i];

        if in_string {
            out.push(byte);
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        match byte {
            b'"' => {
                in_string = true;
                out.push(byte);
            }
            b'{' | b'[' => {
                depth += 1;
                if depth > max_depth {
                    return Err(BindError::InvalidBody {
                        reason: format!("document exceeds the maximum depth of {max_depth}"),
                    });
                }
                out.push(byte);
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                out.push(byte);
            }
            b'/' if input.get(i + 1) == Some(&b'/') => {
                let end = input[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(input.len(), |offset| i + offset);
                out.push(b' ');
                i = end;
                continue;
            }
            b'/' if input.get(i + 1) == Some(&b'*') => {
                let end = input[i + 2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .ok_or_else(|| BindError::InvalidBody {
                        reason: "unterminated comment".to_string(),
                    })?;
                out.push(b' ');
                i += 2 + end + 2;
                continue;
            }
            _ => out.push(byte),
        }
        i += 1;
    }

    Ok(out)
}
