//! Conversions between plain JSON and Firestore's typed value encoding.
//!
//! The REST API wraps every value in a single-key object naming its type:
//! `{"stringValue": "Espresso"}`, `{"integerValue": "1754000000000"}`
//! (integers are transported as strings), `{"mapValue": {"fields": ...}}`.
//! The rest of the crate works in plain JSON; only this module knows the
//! wire shape.

use serde_json::{Map, Number, Value, json};

use super::{FirestoreError, JsonMap};

/// Encode a plain JSON document body into Firestore typed fields.
#[must_use]
pub fn encode_fields(fields: &JsonMap) -> JsonMap {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect()
}

/// Encode a single plain JSON value into a Firestore typed value.
#[must_use]
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => n.as_i64().map_or_else(
            // Anything that does not fit an i64 goes over as a double
            || json!({ "doubleValue": n }),
            |i| json!({ "integerValue": i.to_string() }),
        ),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let fields: Map<String, Value> = map
                .iter()
                .map(|(name, value)| (name.clone(), encode_value(value)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Decode Firestore typed fields into a plain JSON document body.
///
/// # Errors
///
/// Returns [`FirestoreError::Decode`] on value types this client does not
/// understand or malformed integer transport strings.
pub fn decode_fields(fields: &JsonMap) -> Result<JsonMap, FirestoreError> {
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), decode_value(value)?)))
        .collect()
}

/// Decode a single Firestore typed value into plain JSON.
///
/// # Errors
///
/// Returns [`FirestoreError::Decode`] if the value is not a recognized
/// single-key type wrapper.
pub fn decode_value(value: &Value) -> Result<Value, FirestoreError> {
    let object = value
        .as_object()
        .ok_or_else(|| FirestoreError::Decode(format!("expected a typed value, got {value}")))?;
    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| FirestoreError::Decode("empty typed value".to_string()))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(inner.clone()),
        "integerValue" => {
            let raw = inner
                .as_str()
                .map(str::to_owned)
                .or_else(|| inner.as_i64().map(|i| i.to_string()))
                .ok_or_else(|| {
                    FirestoreError::Decode(format!("integerValue is not a string: {inner}"))
                })?;
            let parsed: i64 = raw
                .parse()
                .map_err(|_| FirestoreError::Decode(format!("bad integerValue '{raw}'")))?;
            Ok(Value::Number(parsed.into()))
        }
        "doubleValue" => {
            let n = inner
                .as_f64()
                .and_then(Number::from_f64)
                .ok_or_else(|| FirestoreError::Decode(format!("bad doubleValue {inner}")))?;
            Ok(Value::Number(n))
        }
        "stringValue" | "timestampValue" | "referenceValue" => Ok(inner.clone()),
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect::<Result<_, _>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(items))
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Object(fields))
        }
        other => Err(FirestoreError::Decode(format!(
            "unsupported value type '{other}'"
        ))),
    }
}

/// Quote a field name for use in an `updateMask.fieldPaths` parameter.
///
/// Simple identifiers pass through bare; anything else - including the
/// all-digit millisecond keys this application writes - must be wrapped
/// in backticks per the Firestore field path grammar.
#[must_use]
pub fn quote_field_path(name: &str) -> String {
    let simple = !name.is_empty()
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if simple {
        name.to_owned()
    } else {
        let escaped = name.replace('\\', "\\\\").replace('`', "\\`");
        format!("`{escaped}`")
    }
}
