//! Ordered key/value document produced by codecs.
use serde_json::{Map, Value};

/// A decoded request fragment.
///
/// Fields keep the order they were decoded in; replacing a value keeps its
/// position and removing one shifts the rest up.
///
/// Besides the keyed fields a document can carry opaque text that belongs to
/// the codec and is never exposed as a key. The `raw` codec keeps the whole
/// payload there, `form` its input as an encoding template, and `multipart`
/// its boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KV {
    fields: Map<String, Value>,
    opaque: Option<String>,
}

impl KV {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document with no keys that carries `text` verbatim.
    pub fn opaque(text: impl Into<String>) -> Self {
        Self {
            fields: Map::new(),
            opaque: Some(text.into()),
        }
    }

    /// Get the value of a field by key.
    ///
    /// Returns `None` if the field does not exist.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Check whether a field exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Insert a field, appending it if the key is new.
    ///
    /// If the key already exists its value is replaced in place and the old
    /// value returned.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    /// Replace the value of an existing field.
    ///
    /// Returns `false`, leaving the document untouched, if there is no such
    /// field.
    pub fn replace(&mut self, key: &str, value: Value) -> bool {
        match self.fields.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Get a mutable reference to the value of a field.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    /// Remove a field, keeping the order of the remaining ones.
    ///
    /// Returns `false` if there was no such field.
    pub fn remove(&mut self, key: &str) -> bool {
        self.fields.shift_remove(key).is_some()
    }

    /// Iterate over the fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document has no fields.
    ///
    /// Opaque text does not count.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The codec-private text, if any.
    pub fn opaque_text(&self) -> Option<&str> {
        self.opaque.as_deref()
    }

    /// Set or clear the codec-private text.
    pub fn set_opaque(&mut self, text: Option<String>) {
        self.opaque = text;
    }

    /// Borrow the fields as a JSON object map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for KV {
    fn from(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            opaque: None,
        }
    }
}

impl FromIterator<(String, Value)> for KV {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
            opaque: None,
        }
    }
}

impl IntoIterator for KV {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
