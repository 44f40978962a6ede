#![deny(missing_docs)]
//! Addressable, mutable views over the parts of an HTTP request.
//!
//! Each [`Component`] cuts one part out of a [`Request`] (its path, query
//! string, headers, cookies or body), decodes it into a key/value document
//! with a codec from [`fuzz_dataformat`], lets a fuzzing driver rewrite or
//! drop individual keys, and finally splices the re-encoded part into a
//! clone of the request. The request that was parsed is never modified.
//!
//! # Example
//!
//! ```rust
//! use fuzz_component::{Component, Query, Request};
//!
//! let request = Request::get("http://example.com/search?q=shoes&page=1").unwrap();
//! let mut query = Query::new();
//! assert!(query.parse(&request).unwrap());
//!
//! query.set_value("q", "' OR 1=1 --").unwrap();
//! let rebuilt = query.rebuild().unwrap();
//! assert_eq!(rebuilt.query(), Some("q=%27+OR+1%3D1+--&page=1"));
//! assert_eq!(request.query(), Some("q=shoes&page=1"));
//! ```

mod body;
mod cookie;
pub mod error;
mod header;
mod path;
mod query;
mod request;
mod value;

pub use body::Body;
pub use cookie::Cookie;
pub use error::{Error, RequestError};
pub use header::Header;
pub use path::Path;
pub use query::Query;
pub use request::Request;
pub use value::Value;

/// Node type held under each key of a parsed component.
pub use fuzz_dataformat::Value as Node;

use fuzz_dataformat::KV;
use std::str::FromStr;

/// The structural part of a request a component covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ComponentKind {
    /// The URL path.
    Path,
    /// The URL query string.
    Query,
    /// The request headers.
    Header,
    /// The cookies in the `Cookie` header.
    Cookie,
    /// The request body.
    Body,
}

impl ComponentKind {
    /// Every kind, in the order drivers usually walk them.
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Path,
        ComponentKind::Query,
        ComponentKind::Header,
        ComponentKind::Cookie,
        ComponentKind::Body,
    ];

    /// The stable name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Path => "path",
            ComponentKind::Query => "query",
            ComponentKind::Header => "header",
            ComponentKind::Cookie => "cookie",
            ComponentKind::Body => "body",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownComponent(s.to_string()))
    }
}

/// A mutable, re-encodable view over one part of a request.
///
/// The life of a component is `parse`, then any number of `set_value` and
/// `delete` calls, then `rebuild`. Parsing again starts over and discards
/// everything from the previous request.
pub trait Component<'a> {
    /// Which part of the request this component covers.
    fn kind(&self) -> ComponentKind;

    /// The stable name of this component.
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Cut this component's part out of `request` and decode it.
    ///
    /// Returns `Ok(false)` if the request does not have this part. The
    /// request is kept by reference for [`Component::rebuild`].
    fn parse(&mut self, request: &'a Request) -> Result<bool, Error>;

    /// The current value.
    fn value(&self) -> &Value;

    /// The current value, mutably.
    fn value_mut(&mut self) -> &mut Value;

    /// Build a clone of the parsed request with this component's current
    /// value spliced in.
    fn rebuild(&self) -> Result<Request, Error>;

    /// Call `callback` for every key, in order.
    ///
    /// Stops at, and returns, the first error the callback gives back.
    fn iterate(
        &self,
        callback: &mut dyn FnMut(&str, &Node) -> Result<(), Error>,
    ) -> Result<(), Error> {
        for (key, node) in self.value().parsed().iter() {
            callback(key, node)?;
        }
        Ok(())
    }

    /// Replace the value of an existing key.
    fn set_value(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let name = self.name();
        if !self.value_mut().set_parsed_value(key, value) {
            return Err(Error::KeyNotFound(key.to_string()));
        }
        tracing::trace!(component = name, key, "value replaced");
        Ok(())
    }

    /// Remove a key.
    fn delete(&mut self, key: &str) -> Result<(), Error> {
        let name = self.name();
        if !self.value_mut().delete(key) {
            return Err(Error::KeyNotFound(key.to_string()));
        }
        tracing::trace!(component = name, key, "key deleted");
        Ok(())
    }
}

/// Create an unparsed component of the given kind.
pub fn new_component<'a>(kind: ComponentKind) -> Box<dyn Component<'a> + 'a> {
    match kind {
        ComponentKind::Path => Box::new(Path::new()),
        ComponentKind::Query => Box::new(Query::new()),
        ComponentKind::Header => Box::new(Header::new()),
        ComponentKind::Cookie => Box::new(Cookie::new()),
        ComponentKind::Body => Box::new(Body::new()),
    }
}

/// One unparsed component of every kind.
pub fn components<'a>() -> Vec<Box<dyn Component<'a> + 'a>> {
    ComponentKind::ALL.into_iter().map(new_component).collect()
}

/// Decode `raw` with the codec registered as `format`.
pub(crate) fn decode_with(component: &'static str, format: &str, raw: &str) -> Result<KV, Error> {
    let codec = fuzz_dataformat::get(format).ok_or_else(|| Error::Decode {
        component,
        source: fuzz_dataformat::Error::UnknownFormat(format.to_string()),
    })?;
    codec
        .decode(raw)
        .map_err(|source| Error::Decode { component, source })
}
