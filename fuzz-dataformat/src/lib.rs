#![deny(missing_docs)]
//! Codecs between raw request payloads and ordered key/value documents.
//!
//! A [`DataFormat`] turns a raw piece of a request (a query string, a body,
//! ...) into a [`KV`] document whose keys can be rewritten one at a time, and
//! turns the document back into text afterwards. Codecs are looked up by
//! name through a [`Registry`]; the process-wide one returned by
//! [`registry()`] knows the built-in formats.
//!
//! # Example
//!
//! ```rust
//! use fuzz_dataformat::{get, FORM};
//!
//! let form = get(FORM).unwrap();
//! let mut kv = form.decode("user=admin&id=7").unwrap();
//! assert!(kv.replace("id", "8".into()));
//! assert_eq!(form.encode(&kv).unwrap(), "user=admin&id=8");
//! ```

mod form;
mod json;
mod kv;
#[cfg(feature = "multipart")]
mod multipart;
mod raw;
mod registry;

pub use form::Form;
pub use json::Json;
pub use kv::KV;
#[cfg(feature = "multipart")]
pub use multipart::Multipart;
pub use raw::Raw;
pub use registry::{detect, get, register, registry, Registry};

/// Re-exported node type held by [`KV`] fields.
pub use serde_json::{Map, Value};

/// Name of the pass-through codec.
pub const RAW: &str = "raw";

/// Name of the JSON object codec.
pub const JSON: &str = "json";

/// Name of the `application/x-www-form-urlencoded` codec.
pub const FORM: &str = "form";

/// Name of the `multipart/form-data` codec.
#[cfg(feature = "multipart")]
pub const MULTIPART: &str = "multipart";

/// A named decode/encode pair.
///
/// Encoding the unmodified output of a successful [`DataFormat::decode`] must
/// give back text that is semantically equal to the input.
pub trait DataFormat: Send + Sync {
    /// Name the codec is registered under.
    fn name(&self) -> &str;

    /// Whether `data` looks like this format.
    ///
    /// Used by [`Registry::detect`]; a codec that should never be picked by
    /// sniffing returns `false`.
    fn is_type(&self, data: &str) -> bool;

    /// Decode raw text into a document.
    fn decode(&self, data: &str) -> Result<KV, Error>;

    /// Encode a document back into raw text.
    fn encode(&self, data: &KV) -> Result<String, Error>;
}

/// Error type for codecs and codec lookup.
#[derive(Debug)]
pub enum Error {
    /// No codec is registered under this name.
    UnknownFormat(String),

    /// The input is not valid for the codec.
    Malformed {
        /// Codec that rejected the input.
        format: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// A field holds a value the codec cannot represent.
    Unsupported {
        /// Codec that rejected the value.
        format: &'static str,
        /// Key of the offending field.
        key: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// JSON (de)serialization error.
    Json(serde_json::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Self::UnknownFormat(name) => write!(f, "Unknown data format: {:?}", name),
            Self::Malformed { format, reason } => write!(f, "Malformed {} data: {}", format, reason),
            Self::Unsupported {
                format,
                key,
                reason,
            } => write!(f, "Cannot encode {} field {:?}: {}", format, key, reason),
            Self::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

/// Render a scalar node the way text-based codecs write it.
///
/// Returns `None` for arrays and objects.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
