use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::TernError;
use crate::list::ListValue;
use crate::map::MapValue;
use crate::value::Value;

/// Convert a value to the host-native tree-of-primitives form. Total except
/// for `Fn`/`Atom`/`Recur`, which have no defined mapping and fail fast.
/// `add_colon` keeps the `:` prefix on keywords so they survive a round trip.
pub fn to_json(value: &Value, add_colon: bool) -> Result<JsonValue, TernError> {
    match value {
        Value::Nil => Ok(JsonValue::Null),
        Value::Bool(b) => Ok(JsonValue::Bool(*b)),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(JsonValue::Number)
            .ok_or_else(|| TernError::conversion(format!("non-finite number {} to JSON", n))),
        Value::Str(s) => Ok(JsonValue::String(s.to_string())),
        Value::Keyword(kw) => {
            if add_colon {
                Ok(JsonValue::String(format!(":{}", kw.text())))
            } else {
                Ok(JsonValue::String(kw.text().to_string()))
            }
        }
        Value::Symbol(sym) => Ok(JsonValue::String(sym.text().to_string())),
        Value::List(list) => Ok(JsonValue::Array(
            list.iter()
                .map(|item| to_json(item, add_colon))
                .collect::<Result<_, _>>()?,
        )),
        Value::Map(map) => {
            let mut object = JsonMap::new();
            for (k, v) in map.pairs() {
                object.insert(json_key(k, add_colon)?, to_json(v, add_colon)?);
            }
            Ok(JsonValue::Object(object))
        }
        // JSON has no set form; members become an array
        Value::Set(set) => Ok(JsonValue::Array(
            set.iter()
                .map(|item| to_json(item, add_colon))
                .collect::<Result<_, _>>()?,
        )),
        Value::Atom(_) | Value::Fn(_) | Value::Recur(_) => Err(TernError::conversion(format!(
            "{} value to JSON",
            value.type_name()
        ))),
    }
}

fn json_key(key: &Value, add_colon: bool) -> Result<String, TernError> {
    match to_json(key, add_colon)? {
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        JsonValue::Null => Ok("null".to_string()),
        other => Err(TernError::conversion(format!(
            "composite map key {} to a JSON object key",
            other
        ))),
    }
}

/// Convert host-native JSON data back into a value. Strings shaped like
/// `:keyword` become interned keywords.
pub fn from_json(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Nil,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        JsonValue::String(s) => string_to_value(s),
        JsonValue::Array(items) => Value::List(ListValue::from_vec(
            items.iter().map(from_json).collect(),
        )),
        JsonValue::Object(object) => Value::Map(MapValue::from_pairs(
            object
                .iter()
                .map(|(k, v)| (string_to_value(k), from_json(v))),
        )),
    }
}

fn string_to_value(s: &str) -> Value {
    if let Some(rest) = s.strip_prefix(':') {
        if !rest.is_empty() && rest.chars().all(is_keyword_char) {
            return Value::keyword(rest);
        }
    }
    Value::str(s)
}

fn is_keyword_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '?' | '!' | '-')
}

pub fn parse_json(text: &str) -> Result<Value, TernError> {
    let json: JsonValue = serde_json::from_str(text)
        .map_err(|err| TernError::conversion(format!("malformed JSON: {}", err)))?;
    Ok(from_json(&json))
}

pub fn stringify_json(value: &Value, add_colon: bool) -> Result<String, TernError> {
    let json = to_json(value, add_colon)?;
    serde_json::to_string(&json)
        .map_err(|err| TernError::conversion(format!("JSON encoding failed: {}", err)))
}
