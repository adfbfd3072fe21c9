//! Hydration state serialization.

use crate::error::{CoreError, Result};
use crate::payload::Payload;

/// Global the client runtime reads the payload from.
pub const STATE_GLOBAL: &str = "window.__STRATA__";

/// Turns the payload into a JavaScript expression safe to inline in a script.
///
/// The output is embedded verbatim; implementations are responsible for
/// escaping anything that could close the surrounding `<script>` element.
pub trait StateSerializer: Send + Sync {
    fn serialize(&self, payload: Option<&Payload>) -> Result<String>;
}

/// JSON serializer with script-safe escaping.
///
/// An absent payload serializes as `undefined`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStateSerializer;

impl StateSerializer for JsonStateSerializer {
    fn serialize(&self, payload: Option<&Payload>) -> Result<String> {
        let Some(payload) = payload else {
            return Ok("undefined".to_string());
        };
        let json =
            serde_json::to_string(payload).map_err(|e| CoreError::Serialization(e.to_string()))?;
        Ok(escape_for_script(&json))
    }
}

fn escape_for_script(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003C"),
            '>' => escaped.push_str("\\u003E"),
            '/' => escaped.push_str("\\u002F"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render the script tag that hands the payload to the client runtime.
pub fn render_state_script(
    serializer: &dyn StateSerializer,
    payload: Option<&Payload>,
) -> Result<String> {
    let serialized = serializer.serialize(payload)?;
    Ok(format!("<script>{STATE_GLOBAL}={serialized}</script>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_script_embeds_payload() {
        let mut payload = Payload::default();
        payload.state.insert("count".to_string(), json!(1));

        let script = render_state_script(&JsonStateSerializer, Some(&payload)).unwrap();
        assert_eq!(
            script,
            r#"<script>window.__STRATA__={"data":{},"state":{"count":1}}</script>"#
        );
    }

    #[test]
    fn test_state_script_without_payload() {
        let script = render_state_script(&JsonStateSerializer, None).unwrap();
        assert_eq!(script, "<script>window.__STRATA__=undefined</script>");
    }

    #[test]
    fn test_serializer_escapes_script_terminators() {
        let mut payload = Payload::default();
        payload
            .data
            .insert("html".to_string(), json!("</script><script>alert(1)</script>"));

        let serialized = JsonStateSerializer.serialize(Some(&payload)).unwrap();
        assert!(!serialized.contains("</script>"));
        assert!(serialized.contains("\\u003C\\u002Fscript\\u003E"));

        // Still valid JSON once the escapes are decoded.
        let back: serde_json::Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(back["data"]["html"], "</script><script>alert(1)</script>");
    }

    #[test]
    fn test_serializer_escapes_line_separators() {
        let mut payload = Payload::default();
        payload.state.insert("text".to_string(), json!("a\u{2028}b"));
        let serialized = JsonStateSerializer.serialize(Some(&payload)).unwrap();
        assert!(serialized.contains("a\\u2028b"));
    }
}
