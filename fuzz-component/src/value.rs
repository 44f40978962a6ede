//! Dual raw/structured representation of a component.
//!
//! A [`Value`] starts out holding only the raw text it was cut from. Once a
//! codec has decoded it, the structured form is authoritative: mutations act
//! on it alone and the raw text is only regenerated, wholesale, by
//! [`Value::encode`].
use fuzz_dataformat::{Registry, KV};
use serde_json::Value as Node;

/// The raw and parsed form of one request component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Value {
    raw: String,
    parsed: KV,
    format: Option<String>,
}

impl Value {
    /// Create an unparsed value from raw text.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            parsed: KV::new(),
            format: None,
        }
    }

    /// Install a decoded form and remember the codec that produced it.
    pub fn set_parsed(&mut self, parsed: KV, format: &str) {
        self.parsed = parsed;
        self.format = Some(format.to_string());
    }

    /// The structured form; empty if nothing was decoded yet.
    pub fn parsed(&self) -> &KV {
        &self.parsed
    }

    /// Whether a decoded form has been installed.
    pub fn is_parsed(&self) -> bool {
        self.format.is_some()
    }

    /// Name of the codec the structured form came from.
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Replace the value of an existing key with `value`.
    ///
    /// Returns `false` without inserting anything if the key is absent.
    ///
    /// The node keeps its kind where the new text allows it: numbers stay
    /// numbers if `value` parses as one, bools stay bools for `true`/`false`,
    /// arrays get their last element replaced. Anything else becomes a
    /// string.
    pub fn set_parsed_value(&mut self, key: &str, value: &str) -> bool {
        match self.parsed.get_mut(key) {
            Some(node) => {
                retype(node, value);
                true
            }
            None => false,
        }
    }

    /// Remove a key. Returns `false` if it was absent.
    pub fn delete(&mut self, key: &str) -> bool {
        self.parsed.remove(key)
    }

    /// Encode the structured form with its codec from the process-wide
    /// registry.
    pub fn encode(&self) -> Result<String, fuzz_dataformat::Error> {
        self.encode_with(fuzz_dataformat::registry())
    }

    /// Encode the structured form with its codec from `registry`.
    pub fn encode_with(&self, registry: &Registry) -> Result<String, fuzz_dataformat::Error> {
        let name = self.format.as_deref().unwrap_or_default();
        let format = registry
            .get(name)
            .ok_or_else(|| fuzz_dataformat::Error::UnknownFormat(name.to_string()))?;
        format.encode(&self.parsed)
    }

    /// The raw text, verbatim.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn retype(node: &mut Node, text: &str) {
    match node {
        Node::Array(items) => match items.last_mut() {
            Some(last) => retype(last, text),
            None => items.push(Node::String(text.to_string())),
        },
        Node::Number(_) => {
            *node = text
                .parse::<serde_json::Number>()
                .map(Node::Number)
                .unwrap_or_else(|_| Node::String(text.to_string()));
        }
        Node::Bool(_) => {
            *node = match text {
                "true" => Node::Bool(true),
                "false" => Node::Bool(false),
                _ => Node::String(text.to_string()),
            };
        }
        _ => *node = Node::String(text.to_string()),
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzz_dataformat::{DataFormat, Form, Json, FORM, JSON, RAW};
    use serde_json::json;

    fn json_value(raw: &str) -> Value {
        let mut value = Value::new(raw);
        value.set_parsed(Json.decode(raw).unwrap(), JSON);
        value
    }

    #[test]
    fn test_unparsed() {
        let value = Value::new("/a/b");
        assert!(!value.is_parsed());
        assert!(value.parsed().is_empty());
        assert_eq!(value.format(), None);
        assert_eq!(value.as_str(), "/a/b");
        assert_eq!(value.to_string(), "/a/b");
        assert!(matches!(
            value.encode(),
            Err(fuzz_dataformat::Error::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_set_parsed_value_existing_only() {
        let mut value = json_value(r#"{"name":"x"}"#);
        assert!(value.set_parsed_value("name", "y"));
        assert!(!value.set_parsed_value("missing", "z"));
        assert_eq!(value.parsed().keys().collect::<Vec<_>>(), vec!["name"]);
        assert_eq!(value.encode().unwrap(), r#"{"name":"y"}"#);
    }

    #[test]
    fn test_set_parsed_value_keeps_kind() {
        let mut value = json_value(r#"{"id":1,"ok":true,"tags":["a","b"],"o":{"k":1}}"#);
        assert!(value.set_parsed_value("id", "2.5"));
        assert!(value.set_parsed_value("ok", "false"));
        assert!(value.set_parsed_value("tags", "c"));
        assert!(value.set_parsed_value("o", "flat"));
        assert_eq!(
            value.encode().unwrap(),
            r#"{"id":2.5,"ok":false,"tags":["a","c"],"o":"flat"}"#
        );

        assert!(value.set_parsed_value("id", "' OR 1=1"));
        assert!(value.set_parsed_value("ok", "yes"));
        assert_eq!(value.parsed().get("id"), Some(&json!("' OR 1=1")));
        assert_eq!(value.parsed().get("ok"), Some(&json!("yes")));
    }

    #[test]
    fn test_set_parsed_value_empty_array() {
        let mut value = json_value(r#"{"list":[]}"#);
        assert!(value.set_parsed_value("list", "x"));
        assert_eq!(value.parsed().get("list"), Some(&json!(["x"])));
    }

    #[test]
    fn test_delete() {
        let mut value = json_value(r#"{"a":1,"b":2}"#);
        assert!(value.delete("a"));
        let before = value.parsed().clone();
        assert!(!value.delete("a"));
        assert_eq!(value.parsed(), &before);
        assert_eq!(value.encode().unwrap(), r#"{"b":2}"#);
    }

    #[test]
    fn test_encode_does_not_mutate() {
        let mut value = Value::new("a=1&a=2");
        value.set_parsed(Form.decode("a=1&a=2").unwrap(), FORM);
        let before = value.clone();
        assert_eq!(value.encode().unwrap(), "a=1&a=2");
        assert_eq!(value, before);
    }

    #[test]
    fn test_raw_keeps_raw_text_authoritative_until_parsed() {
        let mut value = Value::new("/a/b");
        value.set_parsed(KV::opaque("/a/b"), RAW);
        assert!(value.parsed().is_empty());
        assert!(!value.set_parsed_value("value", "x"));
        assert_eq!(value.encode().unwrap(), "/a/b");
    }

    #[test]
    fn test_encode_with_unknown_format() {
        let mut value = Value::new("");
        value.set_parsed(KV::new(), "xml");
        let err = value.encode().unwrap_err();
        assert_eq!(err.to_string(), "Unknown data format: \"xml\"");

        let registry = Registry::new();
        value.set_parsed(KV::new(), RAW);
        assert!(value.encode_with(&registry).is_err());
        assert_eq!(value.encode().unwrap(), "");
    }
}
