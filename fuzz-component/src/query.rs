use crate::{decode_with, Component, ComponentKind, Error, Request, Value};
use fuzz_dataformat::FORM;

/// The query string of a request, decoded as a urlencoded form.
#[derive(Debug, Default)]
pub struct Query<'a> {
    value: Value,
    request: Option<&'a Request>,
}

impl<'a> Query<'a> {
    /// Create an unparsed query component.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> Component<'a> for Query<'a> {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Query
    }

    fn parse(&mut self, request: &'a Request) -> Result<bool, Error> {
        self.request = None;
        self.value = Value::default();
        let raw = match request.query() {
            Some(query) if !query.is_empty() => query,
            _ => return Ok(false),
        };
        self.value = Value::new(raw);

        let parsed = decode_with(self.name(), FORM, raw)?;
        tracing::debug!(component = self.name(), keys = parsed.len(), "parsed component");
        self.value.set_parsed(parsed, FORM);
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
        if encoded.is_empty() {
            cloned.set_query(None);
        } else {
            cloned.set_query(Some(&encoded));
        }
        Ok(cloned)
    }
}
