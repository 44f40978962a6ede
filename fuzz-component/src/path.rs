use crate::{decode_with, Component, ComponentKind, Error, Request, Value};
use fuzz_dataformat::RAW;

/// The URL path of a request.
///
/// Paths are not key-structured, so the path is carried through the `raw`
/// codec whole and exposes no keys. Rebuilding writes it back as the URL
/// path, or as the request's raw path if the URL would normalise or escape
/// it.
#[derive(Debug, Default)]
pub struct Path<'a> {
    value: Value,
    request: Option<&'a Request>,
}

impl<'a> Path<'a> {
    /// Create an unparsed path component.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> Component<'a> for Path<'a> {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Path
    }

    fn parse(&mut self, request: &'a Request) -> Result<bool, Error> {
        self.request = None;
        self.value = Value::new(request.path());

        let parsed = decode_with(self.name(), RAW, self.value.as_str())?;
        self.value.set_parsed(parsed, RAW);
        self.request = Some(request);
        tracing::debug!(component = self.name(), path = request.path(), "parsed component");
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
        let encoded = self.value.encode().map_err(|source| Error::Encode {
            component: self.name(),
            source,
        })?;
        let mut cloned = request.clone();
        // A path the URL rejects still goes out, unvalidated, as the raw path.
        if let Err(e) = cloned.update_rel_path(&encoded) {
            tracing::debug!(
                component = self.name(),
                error = %e,
                "path rejected by URL, writing raw path"
            );
            cloned.set_raw_path(Some(encoded));
        }
        Ok(cloned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzz_dataformat::KV;

    #[test]
    fn test_parse_exposes_no_keys() {
        let request = Request::get("http://example.com/a/b").unwrap();
        let mut path = Path::new();
        assert!(path.parse(&request).unwrap());
        assert_eq!(path.name(), "path");
        assert_eq!(path.value().format(), Some(RAW));
        assert_eq!(path.value().as_str(), "/a/b");

        let mut seen = 0;
        path.iterate(&mut |_, _| {
            seen += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, 0);

        let rebuilt = path.rebuild().unwrap();
        assert_eq!(rebuilt.path(), "/a/b");
        assert_eq!(rebuilt.raw_path(), None);
        assert_eq!(rebuilt, request);
    }

    #[test]
    fn test_set_missing_key() {
        let request = Request::get("http://example.com/a/b").unwrap();
        let mut path = Path::new();
        path.parse(&request).unwrap();
        let before = path.value().encode().unwrap();
        assert!(matches!(
            path.set_value("missing", "x"),
            Err(Error::KeyNotFound(ref k)) if k == "missing"
        ));
        assert!(matches!(path.delete("missing"), Err(Error::KeyNotFound(_))));
        assert_eq!(path.value().encode().unwrap(), before);
    }

    #[test]
    fn test_rebuild_falls_back_to_raw_path() {
        let request = Request::get("http://example.com/a/b?x=1").unwrap();
        let mut path = Path::new();
        path.parse(&request).unwrap();
        path.value_mut()
            .set_parsed(KV::opaque("/a/../../etc/passwd"), RAW);

        let rebuilt = path.rebuild().unwrap();
        assert_eq!(rebuilt.raw_path(), Some("/a/../../etc/passwd"));
        assert_eq!(rebuilt.target(), "/a/../../etc/passwd?x=1");
        assert_eq!(request.path(), "/a/b");
    }

    #[test]
    fn test_rebuild_valid_path() {
        let request = Request::get("http://example.com/a/b").unwrap();
        let mut path = Path::new();
        path.parse(&request).unwrap();
        path.value_mut().set_parsed(KV::opaque("/c/d"), RAW);

        let rebuilt = path.rebuild().unwrap();
        assert_eq!(rebuilt.url().path(), "/c/d");
        assert_eq!(rebuilt.raw_path(), None);
    }

    #[test]
    fn test_roundtrip_raw_path_source() {
        let mut request = Request::get("http://example.com/a").unwrap();
        request.set_raw_path(Some("/x/./y".to_string()));
        let mut path = Path::new();
        path.parse(&request).unwrap();
        assert_eq!(path.value().as_str(), "/x/./y");
        let rebuilt = path.rebuild().unwrap();
        assert_eq!(rebuilt.path(), "/x/./y");
    }

    #[test]
    fn test_parse_twice_discards_previous() {
        let first = Request::get("http://example.com/first").unwrap();
        let second = Request::get("http://example.com/second/path").unwrap();
        let mut path = Path::new();
        path.parse(&first).unwrap();
        path.parse(&second).unwrap();
        assert_eq!(path.value().as_str(), "/second/path");
        assert_eq!(path.rebuild().unwrap().path(), "/second/path");
    }

    #[test]
    fn test_rebuild_encode_error() {
        let request = Request::get("http://example.com/a").unwrap();
        let mut path = Path::new();
        path.parse(&request).unwrap();
        path.value_mut().set_parsed(KV::new(), "unregistered");
        let err = path.rebuild().unwrap_err();
        assert!(matches!(err, Error::Encode { component: "path", .. }));
        assert!(err.to_string().starts_with("could not encode path: "));
    }
}
