use crate::{decode_with, Component, ComponentKind, Error, Request, Value};
use fuzz_dataformat::{FORM, JSON, RAW};
use http::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};

/// The body of a request.
///
/// The codec is picked from the `Content-Type` header where it names one,
/// then by sniffing the body, and falls back to `raw`.
#[derive(Debug, Default)]
pub struct Body<'a> {
    value: Value,
    request: Option<&'a Request>,
}

impl<'a> Body<'a> {
    /// Create an unparsed body component.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Codec named outright by a content type.
fn declared_format(content_type: &str) -> Option<&'static str> {
    if content_type.contains("application/json") {
        return Some(JSON);
    }
    #[cfg(feature = "multipart")]
    {
        if content_type.contains("multipart/form-data") {
            return Some(fuzz_dataformat::MULTIPART);
        }
    }
    None
}

impl<'a> Component<'a> for Body<'a> {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Body
    }

    fn parse(&mut self, request: &'a Request) -> Result<bool, Error> {
        self.request = None;
        self.value = Value::default();
        let body = request.body();
        if body.is_empty() {
            return Ok(false);
        }
        self.value = Value::new(body);

        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let (parsed, format) = if let Some(format) = declared_format(&content_type) {
            (decode_with(self.name(), format, body)?, format.to_string())
        } else if let Some((format, parsed)) = fuzz_dataformat::detect(body) {
            (parsed, format.name().to_string())
        } else if content_type.contains("application/x-www-form-urlencoded") {
            (decode_with(self.name(), FORM, body)?, FORM.to_string())
        } else {
            (decode_with(self.name(), RAW, body)?, RAW.to_string())
        };
        tracing::debug!(
            component = self.name(),
            format = %format,
            keys = parsed.len(),
            "parsed component"
        );
        self.value.set_parsed(parsed, &format);
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
        let encoded = self.value.encode().map_err(|source| Error::Encode {
            component: self.name(),
            source,
        })?;
        let mut cloned = request.clone();
        if cloned.headers().contains_key(CONTENT_LENGTH) {
            cloned
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from(encoded.len()));
        }
        cloned.set_body(encoded);
        Ok(cloned)
    }
}
