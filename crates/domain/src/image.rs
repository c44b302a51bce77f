//! Record image representation and conversion to plain JSON documents.
//!
//! Change feeds deliver the new state of a stored record either as a plain JSON
//! document or as a map of typed attribute values, where every value is wrapped
//! in a single-key type descriptor:
//!
//! | Descriptor | Meaning |
//! |------------|---------|
//! | `{"S": "text"}` | string |
//! | `{"N": "42"}` | number, carried as a string |
//! | `{"BOOL": true}` | boolean |
//! | `{"NULL": true}` | null |
//! | `{"M": {..}}` | nested map of attribute values |
//! | `{"L": [..]}` | list of attribute values |
//! | `{"SS"/"NS"/"BS": [..]}` | string / number / binary sets |
//! | `{"B": "base64"}` | binary, kept as its base64 text |
//!
//! [`RecordImage::to_document`] normalises both forms to a plain
//! [`serde_json::Value`] so event decoding only ever sees one shape.

use std::borrow::Cow;

use serde_json::{Map, Number, Value};

use crate::DecodeError;

/// Snapshot of a stored record as delivered by the change feed.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordImage {
    /// Already a plain JSON document.
    Document(Value),
    /// A map of typed attribute values, kept as received until converted.
    Attributes(Value),
}

impl RecordImage {
    /// Returns the image as a plain JSON document.
    ///
    /// Plain documents are borrowed; attribute maps are converted.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::NotAnObject`] if the image is not a JSON object,
    /// and [`DecodeError::MalformedAttribute`] if any attribute value does not
    /// carry exactly one recognised type descriptor of the right JSON kind.
    pub fn to_document(&self) -> Result<Cow<'_, Value>, DecodeError> {
        match self {
            Self::Document(value @ Value::Object(_)) => Ok(Cow::Borrowed(value)),
            Self::Attributes(Value::Object(map)) => {
                Ok(Cow::Owned(Value::Object(convert_map("", map)?)))
            }
            Self::Document(other) | Self::Attributes(other) => {
                Err(DecodeError::NotAnObject {
                    found: json_kind(other),
                })
            }
        }
    }
}

fn convert_map(
    prefix: &str,
    map: &Map<String, Value>,
) -> Result<Map<String, Value>, DecodeError> {
    map.iter()
        .map(|(key, attribute)| {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            convert_attribute(&path, attribute).map(|value| (key.clone(), value))
        })
        .collect()
}

fn convert_attribute(path: &str, attribute: &Value) -> Result<Value, DecodeError> {
    let descriptor = match attribute.as_object() {
        Some(object) if object.len() == 1 => object,
        _ => return Err(malformed(path, "expected a single-key type descriptor")),
    };
    let Some((tag, inner)) = descriptor.iter().next() else {
        return Err(malformed(path, "expected a single-key type descriptor"));
    };

    match (tag.as_str(), inner) {
        ("S" | "B", Value::String(text)) => Ok(Value::String(text.clone())),
        ("N", Value::String(text)) => Ok(parse_number(text)),
        ("BOOL", Value::Bool(flag)) => Ok(Value::Bool(*flag)),
        ("NULL", _) => Ok(Value::Null),
        ("M", Value::Object(map)) => convert_map(path, map).map(Value::Object),
        ("L", Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| convert_attribute(&format!("{path}[{index}]"), item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        ("SS" | "BS", Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => Ok(Value::String(text.clone())),
                _ => Err(malformed(path, "set members must be strings")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        ("NS", Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => Ok(parse_number(text)),
                _ => Err(malformed(path, "number set members must be strings")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (tag, _) => Err(malformed(
            path,
            &format!("unsupported or mistyped descriptor '{tag}'"),
        )),
    }
}

/// Integral numbers become JSON integers, everything else a float; text that is
/// not a number at all stays a string.
fn parse_number(text: &str) -> Value {
    if let Ok(n) = text.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = text.parse::<u64>() {
        return Value::Number(n.into());
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_owned()))
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

fn malformed(path: &str, reason: &str) -> DecodeError {
    DecodeError::MalformedAttribute {
        path: path.to_owned(),
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
