//! Lookup of codecs by name.
use crate::{DataFormat, Form, Json, Raw, KV};
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Codecs known by name, in registration order.
///
/// Uses interior mutability so custom codecs can be added while components
/// already hold a reference to the registry.
#[derive(Default)]
pub struct Registry {
    formats: RwLock<Vec<Arc<dyn DataFormat>>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("formats", &self.names())
            .finish()
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in codecs.
    ///
    /// Detection order is `json`, `multipart`, `form`; `raw` is registered
    /// last and never detected.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(Json));
        #[cfg(feature = "multipart")]
        registry.register(Arc::new(crate::Multipart));
        registry.register(Arc::new(Form));
        registry.register(Arc::new(Raw));
        registry
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<dyn DataFormat>>> {
        match self.formats.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("data format registry read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<dyn DataFormat>>> {
        match self.formats.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("data format registry write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Register a codec.
    ///
    /// A codec already registered under the same name is replaced in place,
    /// keeping its detection position.
    pub fn register(&self, format: Arc<dyn DataFormat>) {
        let mut guard = self.write();
        match guard.iter_mut().find(|f| f.name() == format.name()) {
            Some(slot) => {
                tracing::debug!(format = format.name(), "replacing registered data format");
                *slot = format;
            }
            None => guard.push(format),
        }
    }

    /// Look up a codec by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn DataFormat>> {
        self.read().iter().find(|f| f.name() == name).cloned()
    }

    /// Check whether a codec is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.read().iter().any(|f| f.name() == name)
    }

    /// Names of the registered codecs, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.read().iter().map(|f| f.name().to_string()).collect()
    }

    /// Sniff the format of `data` and decode it.
    ///
    /// Codecs are tried in registration order; the first one that claims the
    /// data and decodes it without error wins. Returns `None` when no codec
    /// fits.
    pub fn detect(&self, data: &str) -> Option<(Arc<dyn DataFormat>, KV)> {
        let formats = self.read().clone();
        for format in formats {
            if !format.is_type(data) {
                continue;
            }
            match format.decode(data) {
                Ok(kv) => return Some((format, kv)),
                Err(e) => {
                    tracing::trace!(format = format.name(), error = %e, "detected format failed to decode");
                }
            }
        }
        None
    }
}

/// The process-wide registry, holding the built-in codecs.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::with_defaults)
}

/// Look up a codec by name in the process-wide registry.
pub fn get(name: &str) -> Option<Arc<dyn DataFormat>> {
    registry().get(name)
}

/// Register a codec in the process-wide registry.
pub fn register(format: Arc<dyn DataFormat>) {
    registry().register(format)
}

/// Sniff and decode `data` using the process-wide registry.
pub fn detect(data: &str) -> Option<(Arc<dyn DataFormat>, KV)> {
    registry().detect(data)
}
