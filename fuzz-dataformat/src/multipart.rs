use crate::{scalar_to_string, DataFormat, Error, KV, MULTIPART};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static FORM_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^content-disposition:\s*form-data").expect("valid form-data pattern")
});

static DISPOSITION_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#";\s*(name|filename)="([^"]*)""#).expect("valid disposition pattern")
});

/// `multipart/form-data` codec.
///
/// The boundary is read from the first line of the payload and kept as the
/// document's opaque text. Plain fields decode to strings; file parts decode
/// to an object with `filename`, optional `content_type` and `content`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Multipart;

fn malformed(reason: impl Into<String>) -> Error {
    Error::Malformed {
        format: MULTIPART,
        reason: reason.into(),
    }
}

fn strip_line_break(s: &str) -> &str {
    s.strip_suffix("\r\n")
        .or_else(|| s.strip_suffix('\n'))
        .unwrap_or(s)
}

fn strip_leading_line_break(s: &str) -> &str {
    s.strip_prefix("\r\n")
        .or_else(|| s.strip_prefix('\n'))
        .unwrap_or(s)
}

/// Split a part into its header block and body.
fn split_part(part: &str) -> Option<(&str, &str)> {
    let crlf = part.find("\r\n\r\n").map(|i| (i, 4));
    let lf = part.find("\n\n").map(|i| (i, 2));
    let (at, len) = match (crlf, lf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some((&part[..at], &part[at + len..]))
}

fn decode_part(headers: &str, body: &str) -> Result<(String, Value), Error> {
    let mut name = None;
    let mut filename = None;
    let mut content_type = None;
    for line in headers.lines() {
        let Some((header, value)) = line.split_once(':') else {
            return Err(malformed(format!("invalid part header line: {:?}", line)));
        };
        if header.trim().eq_ignore_ascii_case("content-disposition") {
            for cap in DISPOSITION_PARAM.captures_iter(value) {
                match &cap[1] {
                    "name" => name = Some(cap[2].to_string()),
                    _ => filename = Some(cap[2].to_string()),
                }
            }
        } else if header.trim().eq_ignore_ascii_case("content-type") {
            content_type = Some(value.trim().to_string());
        }
    }
    let name = name.ok_or_else(|| malformed("part without a name"))?;
    let value = match filename {
        Some(filename) => {
            let mut file = Map::new();
            file.insert("filename".to_string(), Value::String(filename));
            if let Some(content_type) = content_type {
                file.insert("content_type".to_string(), Value::String(content_type));
            }
            file.insert("content".to_string(), Value::String(body.to_string()));
            Value::Object(file)
        }
        None => Value::String(body.to_string()),
    };
    Ok((name, value))
}

fn encode_part(out: &mut String, boundary: &str, key: &str, value: &Value) -> Result<(), Error> {
    let unsupported = |reason| Error::Unsupported {
        format: MULTIPART,
        key: key.to_string(),
        reason,
    };
    out.push_str("--");
    out.push_str(boundary);
    out.push_str("\r\n");
    match value {
        Value::Object(file) => {
            let content = file
                .get("content")
                .and_then(Value::as_str)
                .ok_or_else(|| unsupported("file part without string content"))?;
            out.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"",
                key
            ));
            if let Some(filename) = file.get("filename").and_then(Value::as_str) {
                out.push_str(&format!("; filename=\"{}\"", filename));
            }
            out.push_str("\r\n");
            if let Some(content_type) = file.get("content_type").and_then(Value::as_str) {
                out.push_str(&format!("Content-Type: {}\r\n", content_type));
            }
            out.push_str("\r\n");
            out.push_str(content);
        }
        Value::Array(_) => return Err(unsupported("nested array")),
        scalar => {
            let text = scalar_to_string(scalar).unwrap_or_default();
            out.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                key
            ));
            out.push_str(&text);
        }
    }
    out.push_str("\r\n");
    Ok(())
}

impl DataFormat for Multipart {
    fn name(&self) -> &str {
        MULTIPART
    }

    fn is_type(&self, data: &str) -> bool {
        data.starts_with("--") && FORM_DATA.is_match(data)
    }

    fn decode(&self, data: &str) -> Result<KV, Error> {
        let first_line = data.lines().next().unwrap_or_default();
        let boundary = first_line
            .strip_prefix("--")
            .map(str::trim_end)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| malformed("missing boundary line"))?;
        let delimiter = format!("--{}", boundary);

        let mut kv = KV::new();
        let mut closed = false;
        // The first segment is the (empty) preamble before the first delimiter.
        for segment in data.split(delimiter.as_str()).skip(1) {
            if segment.starts_with("--") {
                closed = true;
                break;
            }
            let part = strip_line_break(strip_leading_line_break(segment));
            let (headers, body) =
                split_part(part).ok_or_else(|| malformed("part without header terminator"))?;
            let (name, value) = decode_part(headers, body)?;
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
        if !closed {
            return Err(malformed("missing closing boundary"));
        }
        kv.set_opaque(Some(boundary.to_string()));
        Ok(kv)
    }

    fn encode(&self, data: &KV) -> Result<String, Error> {
        let boundary = data
            .opaque_text()
            .ok_or_else(|| malformed("document has no boundary"))?;
        let mut out = String::new();
        for (key, value) in data.iter() {
            match value {
                Value::Array(values) => {
                    for item in values {
                        encode_part(&mut out, boundary, key, item)?;
                    }
                }
                value => encode_part(&mut out, boundary, key, value)?,
            }
        }
        out.push_str("--");
        out.push_str(boundary);
        out.push_str("--\r\n");
        Ok(out)
    }
}
