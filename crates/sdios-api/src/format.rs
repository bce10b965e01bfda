//! JSON output formatting.
//!
//! Callers that print API output hold a [`JsonFormatter`] and pass it
//! where rendering happens; nothing is installed globally.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::types::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonFormatter {
    pub enabled: bool,
    pub indent: usize,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self { enabled: true, indent: 4 }
    }
}

impl JsonFormatter {
    pub fn new(enabled: bool, indent: usize) -> Self {
        Self { enabled, indent }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.json_formatting, config.json_indent)
    }

    /// Pretty-print when enabled, compact otherwise.
    pub fn format_value<T: Serialize + ?Sized>(&self, value: &T) -> String {
        if !self.enabled {
            return serde_json::to_string(value).unwrap_or_default();
        }
        let indent = " ".repeat(self.indent);
        let mut out = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
        if value.serialize(&mut ser).is_err() {
            return String::new();
        }
        String::from_utf8(out).unwrap_or_default()
    }

    /// Re-indent `text` if it is JSON; anything else passes through untouched.
    pub fn format_str(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => self.format_value(&value),
            Err(_) => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pretty_prints_with_indent() {
        let f = JsonFormatter::new(true, 2);
        assert_eq!(f.format_value(&json!({"a": 1})), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn disabled_is_compact_and_passthrough() {
        let f = JsonFormatter::new(false, 4);
        assert_eq!(f.format_value(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
        assert_eq!(f.format_str("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn non_json_text_passes_through() {
        let f = JsonFormatter::default();
        assert_eq!(f.format_str("plain text"), "plain text");
        assert_eq!(f.format_str("[1,2]"), "[\n    1,\n    2\n]");
    }

    #[test]
    fn follows_config() {
        let mut cfg = ClientConfig::new("h");
        cfg.json_formatting = false;
        cfg.json_indent = 8;
        assert_eq!(JsonFormatter::from_config(&cfg), JsonFormatter::new(false, 8));
    }
}
