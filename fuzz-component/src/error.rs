//! Errors raised while parsing, mutating and rebuilding request components.
//!
//! Callers driving many keys need to tell "nothing to mutate" apart from a
//! real fault, so a missing key has its own variant.

/// Errors for component operations.
#[derive(Debug)]
pub enum Error {
    /// The component's part could not be decoded with its codec.
    Decode {
        /// Name of the component.
        component: &'static str,
        /// Codec error.
        source: fuzz_dataformat::Error,
    },
    /// The key is not present in the parsed value.
    KeyNotFound(String),
    /// The component was used before a successful parse.
    NotParsed(&'static str),
    /// The parsed value could not be encoded back to text.
    Encode {
        /// Name of the component.
        component: &'static str,
        /// Codec error.
        source: fuzz_dataformat::Error,
    },
    /// The encoded value could not be written into the rebuilt request.
    Rebuild {
        /// Name of the component.
        component: &'static str,
        /// Why the request rejected it.
        reason: String,
    },
    /// Error returned by an iteration callback.
    Callback(Box<dyn std::error::Error + Send + Sync>),
    /// No component kind has this name.
    UnknownComponent(String),
}

/// Errors raised by [`crate::Request`] itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The URL could not be parsed.
    Url(url::ParseError),
    /// The URL has no host and cannot carry an HTTP request.
    CannotBeABase(String),
    /// A relative path must start with `/`.
    NotAbsolutePath(String),
    /// The path carries a query or fragment delimiter.
    PathDelimiter(String),
    /// The URL model would store the path differently than given.
    PathRewritten {
        /// Path that was requested.
        requested: String,
        /// Path the URL would have held.
        stored: String,
    },
    /// A header name or value is not valid.
    InvalidHeader(String),
}

impl From<url::ParseError> for RequestError {
    fn from(e: url::ParseError) -> Self {
        Self::Url(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Self::Decode { component, source } => {
                write!(f, "could not decode {}: {}", component, source)
            }
            Self::KeyNotFound(key) => write!(f, "key not found: {}", key),
            Self::NotParsed(component) => write!(f, "{} component has not been parsed", component),
            Self::Encode { component, source } => {
                write!(f, "could not encode {}: {}", component, source)
            }
            Self::Rebuild { component, reason } => {
                write!(f, "could not rebuild {}: {}", component, reason)
            }
            Self::Callback(e) => write!(f, "{}", e),
            Self::UnknownComponent(name) => write!(f, "unknown component: {}", name),
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Self::Url(e) => write!(f, "URL parse error: {e}"),
            Self::CannotBeABase(url) => write!(f, "URL cannot carry an HTTP request: {url}"),
            Self::NotAbsolutePath(path) => write!(f, "path must start with '/': {path:?}"),
            Self::PathDelimiter(path) => {
                write!(f, "path contains a query or fragment delimiter: {path:?}")
            }
            Self::PathRewritten { requested, stored } => {
                write!(f, "path {requested:?} would be stored as {stored:?}")
            }
            Self::InvalidHeader(msg) => write!(f, "invalid header: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { source, .. } | Self::Encode { source, .. } => Some(source),
            Self::Callback(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Url(e) => Some(e),
            _ => None,
        }
    }
}
