use crate::{scalar_to_string, DataFormat, Error, FORM, KV};
use percent_encoding::percent_decode;
use serde_json::Value;
use std::collections::HashMap;
use url::form_urlencoded;

/// `application/x-www-form-urlencoded` codec, used for query strings and form
/// bodies.
///
/// A name that appears more than once decodes to an array of strings, in the
/// order the values appeared.
///
/// The input is kept as the document's opaque text and serves as a template
/// on encode: every pair is written back where it was, byte for byte while
/// its value is unchanged. Pairs that do not unescape to UTF-8 are never
/// exposed as keys but still go out verbatim. New values are appended.
#[derive(Debug, Default, Clone, Copy)]
pub struct Form;

fn unescape(text: &str) -> Option<String> {
    let text = text.replace('+', " ");
    percent_decode(text.as_bytes())
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

/// Unescape one `name=value` segment, or `None` if either half is not UTF-8.
fn decode_pair(segment: &str) -> Option<(String, String)> {
    let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
    Some((unescape(name)?, unescape(value)?))
}

fn encode_pair(name: &str, value: &str) -> String {
    format!(
        "{}={}",
        form_urlencoded::byte_serialize(name.as_bytes()).collect::<String>(),
        form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>()
    )
}

fn field_values(key: &str, node: &Value) -> Result<Vec<String>, Error> {
    let unsupported = |reason| Error::Unsupported {
        format: FORM,
        key: key.to_string(),
        reason,
    };
    match node {
        Value::Array(items) => items
            .iter()
            .map(|item| scalar_to_string(item).ok_or_else(|| unsupported("nested array or object")))
            .collect(),
        Value::Object(_) => Err(unsupported("nested object")),
        scalar => Ok(vec![scalar_to_string(scalar).unwrap_or_default()]),
    }
}

fn segments(data: &str) -> impl Iterator<Item = &str> {
    data.split('&').filter(|s| !s.is_empty())
}

impl DataFormat for Form {
    fn name(&self) -> &str {
        FORM
    }

    fn is_type(&self, data: &str) -> bool {
        !data.is_empty()
            && !data.contains(char::is_whitespace)
            && data.split('&').all(|pair| match pair.split_once('=') {
                Some((name, _)) => !name.is_empty(),
                None => false,
            })
    }

    fn decode(&self, data: &str) -> Result<KV, Error> {
        let mut kv = KV::new();
        for segment in segments(data) {
            let Some((name, value)) = decode_pair(segment) else {
                tracing::trace!(segment, "form pair is not UTF-8, kept verbatim");
                continue;
            };
            let value = Value::String(value);
            match kv.get_mut(&name) {
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    kv.insert(name, value);
                }
            }
        }
        kv.set_opaque(Some(data.to_string()));
        Ok(kv)
    }

    fn encode(&self, data: &KV) -> Result<String, Error> {
        let fields = data
            .iter()
            .map(|(key, node)| field_values(key, node).map(|values| (key, values)))
            .collect::<Result<Vec<_>, Error>>()?;
        let index: HashMap<&str, usize> = fields
            .iter()
            .enumerate()
            .map(|(i, (key, _))| (*key, i))
            .collect();
        // Values of each field already written.
        let mut written = vec![0; fields.len()];
        let mut out = Vec::new();

        for segment in segments(data.opaque_text().unwrap_or_default()) {
            let Some((name, original)) = decode_pair(segment) else {
                out.push(segment.to_string());
                continue;
            };
            let Some(&i) = index.get(name.as_str()) else {
                continue;
            };
            let (key, values) = &fields[i];
            let Some(value) = values.get(written[i]) else {
                continue;
            };
            written[i] += 1;
            if *value == original {
                out.push(segment.to_string());
            } else {
                out.push(encode_pair(key, value));
            }
        }
        for (i, (key, values)) in fields.iter().enumerate() {
            for value in &values[written[i]..] {
                out.push(encode_pair(key, value));
            }
        }
        Ok(out.join("&"))
    }
}
