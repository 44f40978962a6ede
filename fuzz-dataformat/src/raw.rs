use crate::{DataFormat, Error, KV, RAW};

/// Pass-through codec.
///
/// The payload is kept whole as opaque text, so the document has no keys and
/// encodes back byte for byte. Never picked by detection.
#[derive(Debug, Default, Clone, Copy)]
pub struct Raw;

impl DataFormat for Raw {
    fn name(&self) -> &str {
        RAW
    }

    fn is_type(&self, _data: &str) -> bool {
        false
    }

    fn decode(&self, data: &str) -> Result<KV, Error> {
        Ok(KV::opaque(data))
    }

    fn encode(&self, data: &KV) -> Result<String, Error> {
        if let Some(key) = data.keys().next() {
            return Err(Error::Unsupported {
                format: RAW,
                key: key.to_string(),
                reason: "raw data has no keyed fields",
            });
        }
        Ok(data.opaque_text().unwrap_or_default().to_string())
    }
}
