//! Decoder for Firestore's self-describing value envelopes.
//!
//! Every field in the export is wrapped as `{"<kind>Value": payload}`. This
//! module unwraps those envelopes into [`Value`] exactly once, at the
//! boundary; nothing past the normalizer ever sees the envelope shape.
//!
//! Normalisation rules:
//! - an absent envelope or `nullValue` decodes to [`Value::Null`]
//! - blank (empty or whitespace-only) strings decode to [`Value::Null`]
//! - an array or map without entries decodes to [`Value::Null`], never to an
//!   empty collection

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{json, Number};

use crate::error::DecodeError;

const TAG_SUFFIX: &str = "Value";

static NULL: Value = Value::Null;

/// A decoded, envelope-free value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// Unwrap a single envelope. `None` and JSON `null` are treated as absent.
pub fn decode(envelope: Option<&serde_json::Value>) -> Result<Value, DecodeError> {
    let object = match envelope {
        None | Some(serde_json::Value::Null) => return Ok(Value::Null),
        Some(serde_json::Value::Object(object)) => object,
        Some(_) => return Err(DecodeError::MissingTag),
    };

    let (tag, payload) = object
        .iter()
        .find(|(key, _)| key.ends_with(TAG_SUFFIX))
        .ok_or(DecodeError::MissingTag)?;

    match tag.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => payload
            .as_bool()
            .map(Value::Bool)
            .ok_or(DecodeError::MalformedPayload { tag: "booleanValue" }),
        "integerValue" => decode_integer(payload),
        "doubleValue" => decode_double(payload),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => {
            let text = payload
                .as_str()
                .ok_or(DecodeError::MalformedPayload { tag: "stringValue" })?;
            Ok(text_or_null(text))
        }
        "arrayValue" => {
            let values = match payload.get("values").and_then(|v| v.as_array()) {
                Some(values) if !values.is_empty() => values,
                _ => return Ok(Value::Null),
            };
            values
                .iter()
                .map(|element| decode(Some(element)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        }
        "mapValue" => {
            let fields = match payload.get("fields").and_then(|f| f.as_object()) {
                Some(fields) if !fields.is_empty() => fields,
                _ => return Ok(Value::Null),
            };
            let mut map = BTreeMap::new();
            for (key, envelope) in fields {
                map.insert(key.clone(), decode(Some(envelope))?);
            }
            Ok(Value::Map(map))
        }
        other => Err(DecodeError::UnsupportedTag(other.to_string())),
    }
}

fn decode_integer(payload: &serde_json::Value) -> Result<Value, DecodeError> {
    if let Some(n) = payload.as_i64() {
        return Ok(Value::Int(n));
    }
    payload
        .as_str()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .map(Value::Int)
        .ok_or_else(|| DecodeError::InvalidInteger(payload_text(payload)))
}

fn decode_double(payload: &serde_json::Value) -> Result<Value, DecodeError> {
    if let Some(n) = payload.as_f64() {
        return Ok(Value::Double(n));
    }
    payload
        .as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .map(Value::Double)
        .ok_or_else(|| DecodeError::InvalidDouble(payload_text(payload)))
}

fn payload_text(payload: &serde_json::Value) -> String {
    match payload {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn text_or_null(text: &str) -> Value {
    if text.trim().is_empty() {
        Value::Null
    } else {
        Value::Text(text.to_string())
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, `false`, zero, the text `"0"` and empty collections. Nutrition
    /// entries with such values are not reported.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null | Value::Bool(false) | Value::Int(0) => true,
            Value::Double(n) => *n == 0.0,
            Value::Text(s) => matches!(s.trim(), "" | "0"),
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            Value::Bool(true) | Value::Int(_) => false,
        }
    }

    /// Look up a key in a map value. Missing keys and non-maps yield `Null`.
    pub fn get(&self, key: &str) -> &Value {
        match self {
            Value::Map(map) => map.get(key).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Scalar rendered as text; collections and `Null` have no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Int(n) => Some(n.to_string()),
            Value::Double(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::List(_) | Value::Map(_) => None,
        }
    }

    /// Numeric view used for amounts and serving counts. Numeric text is
    /// accepted since older exports stored some quantities as strings.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(n) => Some(Number::from(*n)),
            Value::Double(n) => Number::from_f64(*n),
            Value::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .map(Number::from)
                    .or_else(|| s.parse::<f64>().ok().and_then(Number::from_f64))
            }
            _ => None,
        }
    }

    /// Elements of a list value. `Null` (an absent or empty array) yields
    /// an empty slice.
    pub fn as_list(&self) -> &[Value] {
        match self {
            Value::List(items) => items,
            _ => &[],
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Wrap the value back into its envelope. Test fixtures build exports
    /// from plain values with this.
    pub fn encode(&self) -> serde_json::Value {
        match self {
            Value::Null => json!({ "nullValue": null }),
            Value::Bool(b) => json!({ "booleanValue": b }),
            Value::Int(n) => json!({ "integerValue": n.to_string() }),
            Value::Double(n) => json!({ "doubleValue": n }),
            Value::Text(s) => json!({ "stringValue": s }),
            Value::List(items) => {
                let values: Vec<_> = items.iter().map(Value::encode).collect();
                json!({ "arrayValue": { "values": values } })
            }
            Value::Map(map) => {
                let fields: serde_json::Map<_, _> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), v.encode()))
                    .collect();
                json!({ "mapValue": { "fields": fields } })
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::List(_) | Value::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            scalar => f.write_str(&scalar.to_text().unwrap_or_default()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}
