use crate::{DataFormat, Error, JSON, KV};
use serde_json::Value;

/// JSON object codec.
///
/// Only objects are accepted at the top level, since their members are what
/// gets addressed by key. Encoding is compact and keeps member order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Json;

impl DataFormat for Json {
    fn name(&self) -> &str {
        JSON
    }

    fn is_type(&self, data: &str) -> bool {
        let data = data.trim();
        data.starts_with('{') && data.ends_with('}')
    }

    fn decode(&self, data: &str) -> Result<KV, Error> {
        match serde_json::from_str::<Value>(data)? {
            Value::Object(map) => Ok(KV::from(map)),
            other => Err(Error::Malformed {
                format: JSON,
                reason: format!("top-level value is not an object: {}", kind_name(&other)),
            }),
        }
    }

    fn encode(&self, data: &KV) -> Result<String, Error> {
        Ok(serde_json::to_string(data.as_map())?)
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
