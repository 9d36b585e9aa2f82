//! SourceReader: dispatches a [`SourceSpec`] to the engine loader for its kind.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::engine::Engine;
use crate::error::DispatchError;
use crate::kind::SourceKind;
use crate::options::{self, keys_for_log};
use crate::spec::{SourceSpec, forbid_locator, require_locator};
use crate::storage::{ObjectStoreConfig, is_object_store_locator};

/// Reads datasets through an [`Engine`].
pub struct SourceReader<E: Engine> {
    engine: Arc<E>,
    object_store: Option<ObjectStoreConfig>,
}

impl<E: Engine> SourceReader<E> {
    pub fn new(engine: Arc<E>) -> Self {
        SourceReader {
            engine,
            object_store: None,
        }
    }

    /// Bind object-store credentials, passed to the engine for `s3://` locators.
    pub fn with_object_store(mut self, config: ObjectStoreConfig) -> Self {
        self.object_store = Some(config);
        self
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Load the dataset described by `spec`.
    ///
    /// Options reach the engine unmodified. Unknown kinds, a missing or
    /// unexpected locator, and conflicting JDBC options fail before any
    /// engine call; engine failures are returned unchanged.
    pub fn read(&self, spec: &SourceSpec) -> Result<E::Dataset, DispatchError> {
        let result = match &spec.kind {
            SourceKind::Json => self.read_json(spec),
            SourceKind::Sql => self.read_sql(spec),
            SourceKind::Other(name) => Err(DispatchError::UnsupportedSourceKind(name.clone())),
        };
        if let Err(e) = &result {
            if e.is_dispatch_rejection() {
                warn!(kind = %spec.kind, error = %e, "read rejected");
            }
        }
        result
    }

    fn read_json(&self, spec: &SourceSpec) -> Result<E::Dataset, DispatchError> {
        let path = require_locator(spec.kind.as_str(), spec.locator.as_deref())?;
        let store = self.store_for(path);
        debug!(
            kind = "json",
            locator = path,
            object_store = store.is_some(),
            options = ?keys_for_log(&spec.options),
            "dispatching read"
        );
        Ok(self.engine.load_json(path, &spec.options, store)?)
    }

    fn read_sql(&self, spec: &SourceSpec) -> Result<E::Dataset, DispatchError> {
        forbid_locator(spec.kind.as_str(), spec.locator.as_deref())?;
        options::ensure_exclusive(&spec.options, &options::jdbc::EXCLUSIVE)?;
        debug!(
            kind = "sql",
            options = ?keys_for_log(&spec.options),
            "dispatching read"
        );
        Ok(self.engine.load_jdbc(&spec.options)?)
    }

    fn store_for(&self, path: &str) -> Option<&ObjectStoreConfig> {
        if is_object_store_locator(path) {
            self.object_store.as_ref()
        } else {
            None
        }
    }
}

impl<E: Engine> Clone for SourceReader<E> {
    fn clone(&self) -> Self {
        SourceReader {
            engine: Arc::clone(&self.engine),
            object_store: self.object_store.clone(),
        }
    }
}
