//! DatasetWriter: persists one bound dataset through the engine saver for a
//! [`SinkSpec`]'s kind.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::engine::{Engine, WriteMode};
use crate::error::DispatchError;
use crate::kind::SinkKind;
use crate::options::{self, keys_for_log};
use crate::spec::{SinkSpec, forbid_locator, require_locator};
use crate::storage::{ObjectStoreConfig, is_object_store_locator};

/// Every write replaces the destination.
const WRITE_MODE: WriteMode = WriteMode::Overwrite;

/// Writes one dataset, any number of times, through an [`Engine`].
pub struct DatasetWriter<E: Engine> {
    engine: Arc<E>,
    dataset: E::Dataset,
    object_store: Option<ObjectStoreConfig>,
}

impl<E: Engine> DatasetWriter<E> {
    pub fn new(engine: Arc<E>, dataset: E::Dataset) -> Self {
        DatasetWriter {
            engine,
            dataset,
            object_store: None,
        }
    }

    /// Bind object-store credentials, passed to the engine for `s3://` locators.
    pub fn with_object_store(mut self, config: ObjectStoreConfig) -> Self {
        self.object_store = Some(config);
        self
    }

    pub fn dataset(&self) -> &E::Dataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> E::Dataset {
        self.dataset
    }

    /// Persist the bound dataset as described by `spec`, overwriting the
    /// destination.
    ///
    /// A `mode` entry in the options is passed through as an ordinary option
    /// and does not change the write mode.
    pub fn write(&self, spec: &SinkSpec) -> Result<(), DispatchError> {
        let result = match &spec.kind {
            SinkKind::Json => self.write_json(spec),
            SinkKind::Sql => self.write_sql(spec),
            SinkKind::Other(name) => Err(DispatchError::UnsupportedSinkKind(name.clone())),
        };
        if let Err(e) = &result {
            if e.is_dispatch_rejection() {
                warn!(kind = %spec.kind, error = %e, "write rejected");
            }
        }
        result
    }

    fn write_json(&self, spec: &SinkSpec) -> Result<(), DispatchError> {
        let path = require_locator(spec.kind.as_str(), spec.locator.as_deref())?;
        let store = if is_object_store_locator(path) {
            self.object_store.as_ref()
        } else {
            None
        };
        debug!(
            kind = "json",
            locator = path,
            object_store = store.is_some(),
            options = ?keys_for_log(&spec.options),
            "dispatching write"
        );
        self.engine
            .save_json(&self.dataset, path, &spec.options, WRITE_MODE, store)?;
        Ok(())
    }

    fn write_sql(&self, spec: &SinkSpec) -> Result<(), DispatchError> {
        forbid_locator(spec.kind.as_str(), spec.locator.as_deref())?;
        options::ensure_exclusive(&spec.options, &options::jdbc::EXCLUSIVE)?;
        debug!(
            kind = "sql",
            options = ?keys_for_log(&spec.options),
            "dispatching write"
        );
        self.engine
            .save_jdbc(&self.dataset, &spec.options, WRITE_MODE)?;
        Ok(())
    }
}
