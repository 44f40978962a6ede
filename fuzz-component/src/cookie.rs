use crate::{Component, ComponentKind, Error, Node, Request, Value};
use fuzz_dataformat::KV;
use http::header::{HeaderValue, COOKIE};

/// Format name recorded for cookie values.
const COOKIE_FORMAT: &str = "cookie";

/// The cookies a request sends, one key per cookie name.
///
/// All `Cookie` headers are read; a name sent more than once maps to an array
/// of values. Rebuilding writes a single `Cookie` header.
#[derive(Debug, Default)]
pub struct Cookie<'a> {
    value: Value,
    request: Option<&'a Request>,
}

impl<'a> Cookie<'a> {
    /// Create an unparsed cookie component.
    pub fn new() -> Self {
        Self::default()
    }
}

fn decode_cookies(raw: &str) -> KV {
    let mut kv = KV::new();
    for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = Node::String(value.to_string());
        match kv.get_mut(name) {
            Some(Node::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Node::Array(vec![first, value]);
            }
            None => {
                kv.insert(name, value);
            }
        }
    }
    kv
}

fn encode_cookies(component: &'static str, parsed: &KV) -> Result<String, Error> {
    let mut pairs = Vec::new();
    for (name, node) in parsed.iter() {
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
                    return Err(Error::Rebuild {
                        component,
                        reason: format!("cookie {:?} holds a nested value", name),
                    });
                }
            };
            pairs.push(format!("{}={}", name, text));
        }
    }
    Ok(pairs.join("; "))
}

impl<'a> Component<'a> for Cookie<'a> {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Cookie
    }

    fn parse(&mut self, request: &'a Request) -> Result<bool, Error> {
        self.request = None;
        self.value = Value::default();
        let raw = request
            .headers()
            .get_all(COOKIE)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join("; ");
        let parsed = decode_cookies(&raw);
        if parsed.is_empty() {
            return Ok(false);
        }
        self.value = Value::new(raw);
        tracing::debug!(component = self.name(), keys = parsed.len(), "parsed component");
        self.value.set_parsed(parsed, COOKIE_FORMAT);
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
        let encoded = encode_cookies(self.name(), self.value.parsed())?;
        let mut cloned = request.clone();
        let headers = cloned.headers_mut();
        if encoded.is_empty() {
            headers.remove(COOKIE);
        } else {
            let value = HeaderValue::from_str(&encoded).map_err(|e| Error::Rebuild {
                component: self.name(),
                reason: format!("cookie header {:?}: {}", encoded, e),
            })?;
            // Replaces every Cookie value, keeping the header's position.
            headers.insert(COOKIE, value);
        }
        Ok(cloned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(cookies: &[&str]) -> Request {
        let mut request = Request::get("http://example.com/")
            .unwrap()
            .with_header("Accept", "*/*")
            .unwrap();
        for cookie in cookies {
            request = request.with_header("Cookie", cookie).unwrap();
        }
        request
    }

    #[test]
    fn test_decode_cookies() {
        let kv = decode_cookies("a=1; b=x=y;flag; a=2");
        assert_eq!(kv.keys().collect::<Vec<_>>(), vec!["a", "b", "flag"]);
        assert_eq!(kv.get("a"), Some(&json!(["1", "2"])));
        assert_eq!(kv.get("b"), Some(&json!("x=y")));
        assert_eq!(kv.get("flag"), Some(&json!("")));
    }

    #[test]
    fn test_no_cookies() {
        let request = request(&[]);
        let mut cookie = Cookie::new();
        assert!(!cookie.parse(&request).unwrap());
        assert!(matches!(cookie.rebuild(), Err(Error::NotParsed("cookie"))));
    }

    #[test]
    fn test_roundtrip() {
        let request = request(&["session=abc; theme=dark"]);
        let mut cookie = Cookie::new();
        assert!(cookie.parse(&request).unwrap());
        assert_eq!(cookie.value().as_str(), "session=abc; theme=dark");
        let rebuilt = cookie.rebuild().unwrap();
        assert_eq!(rebuilt.header("cookie"), Some("session=abc; theme=dark"));
        assert_eq!(rebuilt.header("accept"), Some("*/*"));
    }

    #[test]
    fn test_multiple_headers_merge() {
        let request = request(&["a=1", "b=2"]);
        let mut cookie = Cookie::new();
        cookie.parse(&request).unwrap();
        cookie.set_value("b", "' or '1'='1").unwrap();
        let rebuilt = cookie.rebuild().unwrap();
        assert_eq!(rebuilt.headers().get_all("cookie").iter().count(), 1);
        assert_eq!(rebuilt.header("cookie"), Some("a=1; b=' or '1'='1"));
    }

    #[test]
    fn test_rebuild_keeps_header_order() {
        let request = Request::get("http://example.com/")
            .unwrap()
            .with_header("Cookie", "a=1")
            .unwrap()
            .with_header("Accept", "*/*")
            .unwrap()
            .with_header("Cookie", "b=2")
            .unwrap();
        let mut cookie = Cookie::new();
        cookie.parse(&request).unwrap();
        cookie.set_value("a", "2").unwrap();
        let rebuilt = cookie.rebuild().unwrap();
        assert_eq!(
            rebuilt.to_string(),
            "GET / HTTP/1.1\r\nHost: example.com\r\ncookie: a=2; b=2\r\naccept: */*\r\n\r\n"
        );
    }

    #[test]
    fn test_delete_all() {
        let request = request(&["a=1"]);
        let mut cookie = Cookie::new();
        cookie.parse(&request).unwrap();
        cookie.delete("a").unwrap();
        let rebuilt = cookie.rebuild().unwrap();
        assert!(rebuilt.headers().get("cookie").is_none());
        assert_eq!(request.header("cookie"), Some("a=1"));
    }

    #[test]
    fn test_invalid_value_fails_rebuild() {
        let request = request(&["a=1"]);
        let mut cookie = Cookie::new();
        cookie.parse(&request).unwrap();
        cookie.set_value("a", "x\ny").unwrap();
        assert!(matches!(
            cookie.rebuild(),
            Err(Error::Rebuild { component: "cookie", .. })
        ));
    }
}
