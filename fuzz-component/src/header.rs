use crate::{Component, ComponentKind, Error, Node, Request, Value};
use fuzz_dataformat::KV;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;

/// Format name recorded for header values.
///
/// Headers are not text-encoded: the parsed form is written straight back
/// into a header map on rebuild.
const HEADER_FORMAT: &str = "header";

/// The headers of a request, one key per header name.
///
/// A header that appears once maps to a string, one that repeats to an array
/// of strings in the order they were sent. Names are lower-case.
#[derive(Debug, Default)]
pub struct Header<'a> {
    value: Value,
    request: Option<&'a Request>,
}

impl<'a> Header<'a> {
    /// Create an unparsed header component.
    pub fn new() -> Self {
        Self::default()
    }
}

fn header_text(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}

fn render(headers: &HeaderMap) -> String {
    let mut out = String::new();
    for (name, value) in headers {
        out.push_str(&format!("{}: {}\r\n", name, header_text(value)));
    }
    out
}

/// The node a header name parses to, or `None` if it is absent.
fn header_node(headers: &HeaderMap, name: &HeaderName) -> Option<Node> {
    let mut values = headers.get_all(name).iter().map(header_text);
    match (values.next(), values.next()) {
        (Some(only), None) => Some(Node::String(only)),
        (Some(first), Some(second)) => Some(Node::Array(
            [first, second]
                .into_iter()
                .chain(values)
                .map(Node::String)
                .collect(),
        )),
        (None, _) => None,
    }
}

/// Build the header map for `parsed`.
///
/// Keys whose node still matches `original` get the original bytes back,
/// including values that are not UTF-8.
fn to_header_map(
    component: &'static str,
    parsed: &KV,
    original: &HeaderMap,
) -> Result<HeaderMap, Error> {
    let rebuild_error = |reason: String| Error::Rebuild { component, reason };
    let mut headers = HeaderMap::new();
    for (key, node) in parsed.iter() {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| rebuild_error(format!("header name {:?}: {}", key, e)))?;
        if header_node(original, &name).as_ref() == Some(node) {
            for value in original.get_all(&name) {
                headers.append(name.clone(), value.clone());
            }
            continue;
        }
        let values = match node {
            Node::Array(items) => items.iter().collect::<Vec<_>>(),
            single => vec![single],
        };
        for item in values {
            let text = match item {
                Node::String(s) => s.clone(),
                Node::Number(n) => n.to_string(),
                Node::Bool(b) => b.to_string(),
                Node::Null => String::new(),
                Node::Array(_) | Node::Object(_) => {
                    return Err(rebuild_error(format!(
                        "header {:?} holds a nested value",
                        key
                    )));
                }
            };
            let value = HeaderValue::from_str(&text)
                .map_err(|e| rebuild_error(format!("header {:?} value {:?}: {}", key, text, e)))?;
            headers.append(name.clone(), value);
        }
    }
    Ok(headers)
}

impl<'a> Component<'a> for Header<'a> {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Header
    }

    fn parse(&mut self, request: &'a Request) -> Result<bool, Error> {
        self.request = None;
        self.value = Value::default();
        let headers = request.headers();
        if headers.is_empty() {
            return Ok(false);
        }

        let mut parsed = KV::new();
        for name in headers.keys() {
            if let Some(node) = header_node(headers, name) {
                parsed.insert(name.as_str(), node);
            }
        }
        self.value = Value::new(render(headers));
        tracing::debug!(component = self.name(), keys = parsed.len(), "parsed component");
        self.value.set_parsed(parsed, HEADER_FORMAT);
        self.request = Some(request);
        Ok(true)
    }

    fn value(&self) -> &Value {
        &self.value
    }

    fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    fn rebuild(&self) -> Result<Request, Error> {
        let request = self.request.ok_or(Error::NotParsed(self.name()))?;
        let headers = to_header_map(self.name(), self.value.parsed(), request.headers())?;
        let mut cloned = request.clone();
        *cloned.headers_mut() = headers;
        Ok(cloned)
    }
}
