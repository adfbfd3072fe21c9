//! Loose decoding of untyped request values.
//!
//! Query strings and form bodies carry everything as text. These helpers
//! recover numbers, booleans, null and JSON structures from such text without
//! ever failing.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a string into the JSON value it spells, falling back to the string.
///
/// `"true"`, `"12"`, `"null"` and `"{\"a\":1}"` become typed values; anything
/// that is not valid JSON is returned unchanged as a string.
pub fn decode_loose(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::String(raw.to_string());
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Decode an optional value into an object, using an empty object on failure.
///
/// Strings are decoded with [`decode_loose`] first; any non-object result
/// yields an empty map.
pub fn decode_object(raw: Option<&Value>) -> serde_json::Map<String, Value> {
    let value = match raw {
        Some(Value::String(s)) => decode_loose(s),
        Some(other) => other.clone(),
        None => return serde_json::Map::new(),
    };
    match value {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

/// Deserialize an optional status code given either as a number or as text.
///
/// Unparseable text is treated as absent.
pub fn deserialize_loose_u16<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_loose_detects_primitives() {
        assert_eq!(decode_loose("42"), json!(42));
        assert_eq!(decode_loose("1.5"), json!(1.5));
        assert_eq!(decode_loose("true"), json!(true));
        assert_eq!(decode_loose("false"), json!(false));
        assert_eq!(decode_loose("null"), Value::Null);
    }

    #[test]
    fn test_decode_loose_parses_structures() {
        assert_eq!(decode_loose(r#"{"a":[1,2]}"#), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_decode_loose_falls_back_to_string() {
        assert_eq!(decode_loose("hello"), json!("hello"));
        assert_eq!(decode_loose("{broken"), json!("{broken"));
        assert_eq!(decode_loose(""), json!(""));
    }

    #[test]
    fn test_decode_object_from_string() {
        let raw = json!(r#"{"count":3,"label":"x"}"#);
        let map = decode_object(Some(&raw));
        assert_eq!(map.get("count"), Some(&json!(3)));
        assert_eq!(map.get("label"), Some(&json!("x")));
    }

    #[test]
    fn test_decode_object_passes_objects_through() {
        let raw = json!({"nested": {"ok": true}});
        let map = decode_object(Some(&raw));
        assert_eq!(map.get("nested"), Some(&json!({"ok": true})));
    }

    #[test]
    fn test_decode_object_defaults_to_empty() {
        assert!(decode_object(None).is_empty());
        assert!(decode_object(Some(&json!("not json"))).is_empty());
        assert!(decode_object(Some(&json!("[1,2]"))).is_empty());
        assert!(decode_object(Some(&json!(7))).is_empty());
    }
}
