//! Owned HTTP request that components read from and rebuild into.
use crate::error::RequestError;
use http::header::{HeaderName, HeaderValue, HOST};
use http::{HeaderMap, Method};
use url::Url;

/// An HTTP request as far as components are concerned.
///
/// Besides the URL the request can hold a raw path. When set, it is sent as
/// the request-target path instead of the URL's own path, without any
/// normalisation or escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: Url,
    raw_path: Option<String>,
    headers: HeaderMap,
    body: String,
}

impl Request {
    /// Create a request with no headers and an empty body.
    pub fn new(method: Method, url: &str) -> Result<Self, RequestError> {
        let url = Url::parse(url)?;
        if url.cannot_be_a_base() || url.host().is_none() {
            return Err(RequestError::CannotBeABase(url.to_string()));
        }
        Ok(Self {
            method,
            url,
            raw_path: None,
            headers: HeaderMap::new(),
            body: String::new(),
        })
    }

    /// Create a `GET` request.
    pub fn get(url: &str) -> Result<Self, RequestError> {
        Self::new(Method::GET, url)
    }

    /// Append a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, RequestError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| RequestError::InvalidHeader(format!("{name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| RequestError::InvalidHeader(format!("{value:?}: {e}")))?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Replace the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The path sent on the wire: the raw path if set, else the URL path.
    pub fn path(&self) -> &str {
        self.raw_path.as_deref().unwrap_or(self.url.path())
    }

    /// The unvalidated path override, if any.
    pub fn raw_path(&self) -> Option<&str> {
        self.raw_path.as_deref()
    }

    /// Set or clear the unvalidated path override.
    pub fn set_raw_path(&mut self, path: Option<String>) {
        self.raw_path = path;
    }

    /// The raw query string, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }

    /// Set or clear the raw query string.
    pub fn set_query(&mut self, query: Option<&str>) {
        self.url.set_query(query);
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The request headers, mutably.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// First value of a header, if it is valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The request body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Replace the body.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Replace the URL path with `path`.
    ///
    /// Fails, leaving the request untouched, if `path` is not absolute, holds
    /// a query or fragment delimiter, or would not be stored exactly as given
    /// (dot segments get resolved, some characters get escaped). On success
    /// any raw path override is cleared.
    pub fn update_rel_path(&mut self, path: &str) -> Result<(), RequestError> {
        if !path.starts_with('/') {
            return Err(RequestError::NotAbsolutePath(path.to_string()));
        }
        if path.contains(['?', '#']) {
            return Err(RequestError::PathDelimiter(path.to_string()));
        }
        let mut url = self.url.clone();
        url.set_path(path);
        if url.path() != path {
            return Err(RequestError::PathRewritten {
                requested: path.to_string(),
                stored: url.path().to_string(),
            });
        }
        self.url = url;
        self.raw_path = None;
        Ok(())
    }

    /// The request-target as sent on the request line.
    pub fn target(&self) -> String {
        match self.query() {
            Some(query) => format!("{}?{}", self.path(), query),
            None => self.path().to_string(),
        }
    }

    fn authority(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {} HTTP/1.1\r\n", self.method, self.target())?;
        if !self.headers.contains_key(HOST) {
            write!(f, "Host: {}\r\n", self.authority())?;
        }
        for (name, value) in &self.headers {
            write!(
                f,
                "{}: {}\r\n",
                name,
                String::from_utf8_lossy(value.as_bytes())
            )?;
        }
        f.write_str("\r\n")?;
        f.write_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let req = Request::get("http://example.com:8080/a/b?x=1").unwrap();
        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.path(), "/a/b");
        assert_eq!(req.query(), Some("x=1"));
        assert_eq!(req.target(), "/a/b?x=1");
        assert_eq!(req.raw_path(), None);

        assert!(matches!(
            Request::get("not a url"),
            Err(RequestError::Url(_))
        ));
        assert!(matches!(
            Request::get("mailto:a@example.com"),
            Err(RequestError::CannotBeABase(_))
        ));
    }

    #[test]
    fn test_update_rel_path() {
        let mut req = Request::get("http://example.com/a?x=1").unwrap();
        req.update_rel_path("/b/c").unwrap();
        assert_eq!(req.path(), "/b/c");
        assert_eq!(req.target(), "/b/c?x=1");
    }

    #[test]
    fn test_update_rel_path_rejects() {
        let mut req = Request::get("http://example.com/a").unwrap();
        let before = req.clone();
        assert_eq!(
            req.update_rel_path("b"),
            Err(RequestError::NotAbsolutePath("b".to_string()))
        );
        assert_eq!(
            req.update_rel_path("/b?c"),
            Err(RequestError::PathDelimiter("/b?c".to_string()))
        );
        assert_eq!(
            req.update_rel_path("/a/../etc/passwd"),
            Err(RequestError::PathRewritten {
                requested: "/a/../etc/passwd".to_string(),
                stored: "/etc/passwd".to_string(),
            })
        );
        assert!(matches!(
            req.update_rel_path("/a b"),
            Err(RequestError::PathRewritten { .. })
        ));
        assert_eq!(req, before);
    }

    #[test]
    fn test_update_rel_path_clears_raw_path() {
        let mut req = Request::get("http://example.com/a").unwrap();
        req.set_raw_path(Some("/x/../y".to_string()));
        assert_eq!(req.path(), "/x/../y");
        req.update_rel_path("/z").unwrap();
        assert_eq!(req.raw_path(), None);
        assert_eq!(req.path(), "/z");
    }

    #[test]
    fn test_headers() {
        let req = Request::get("http://example.com/")
            .unwrap()
            .with_header("Accept", "*/*")
            .unwrap()
            .with_header("X-Tag", "a")
            .unwrap()
            .with_header("X-Tag", "b")
            .unwrap();
        assert_eq!(req.header("accept"), Some("*/*"));
        assert_eq!(req.headers().get_all("x-tag").iter().count(), 2);
        assert!(matches!(
            Request::get("http://example.com/")
                .unwrap()
                .with_header("Bad Name", "x"),
            Err(RequestError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_clone_is_independent() {
        let req = Request::get("http://example.com/a").unwrap();
        let mut cloned = req.clone();
        cloned.set_body("changed");
        cloned.set_query(Some("q=1"));
        assert_eq!(req.body(), "");
        assert_eq!(req.query(), None);
    }

    #[test]
    fn test_display() {
        let req = Request::new(Method::POST, "http://example.com:8080/login")
            .unwrap()
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .unwrap()
            .with_body("user=admin");
        assert_eq!(
            req.to_string(),
            "POST /login HTTP/1.1\r\nHost: example.com:8080\r\ncontent-type: application/x-www-form-urlencoded\r\n\r\nuser=admin"
        );
    }
}
