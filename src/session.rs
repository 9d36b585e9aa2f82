//! IoSession: wires configuration, the Polars engine, and the reader/writer
//! dispatchers together.

use std::sync::Arc;

use sparkless_io_core::{
    DatasetWriter, DispatchError, IoConfig, ObjectStoreConfig, SinkSpec, SourceReader, SourceSpec,
};
use sparkless_io_polars::{Dataset, PolarsEngine, TableCatalog};
use tracing::info;

/// Builder for creating an IoSession with configuration options.
#[derive(Clone, Default)]
pub struct IoSessionBuilder {
    app_name: Option<String>,
    config: IoConfig,
    catalog: Option<Arc<TableCatalog>>,
}

impl IoSessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn object_store(mut self, config: ObjectStoreConfig) -> Self {
        self.config.object_store = Some(config);
        self
    }

    pub fn infer_schema_length(mut self, n: usize) -> Self {
        self.config.infer_schema_length = n;
        self
    }

    /// Share an existing table catalog (e.g. between sessions in a test).
    pub fn catalog(mut self, catalog: Arc<TableCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Apply an [`IoConfig`], replacing object-store and inference settings.
    pub fn with_config(mut self, config: &IoConfig) -> Self {
        self.config = config.clone();
        self
    }

    pub fn get_or_create(self) -> IoSession {
        let mut engine =
            PolarsEngine::new().with_infer_schema_length(self.config.infer_schema_length);
        if let Some(catalog) = self.catalog {
            engine = engine.with_catalog(catalog);
        }
        info!(
            app_name = self.app_name.as_deref().unwrap_or("sparkless-io"),
            object_store = self.config.object_store.is_some(),
            infer_schema_length = self.config.infer_schema_length,
            "session created"
        );
        IoSession {
            app_name: self.app_name,
            engine: Arc::new(engine),
            object_store: self.config.object_store,
        }
    }
}

/// Entry point for reading and writing datasets.
#[derive(Clone)]
pub struct IoSession {
    app_name: Option<String>,
    engine: Arc<PolarsEngine>,
    object_store: Option<ObjectStoreConfig>,
}

impl IoSession {
    pub fn builder() -> IoSessionBuilder {
        IoSessionBuilder::new()
    }

    /// Create a session from an [`IoConfig`] (e.g. from [`IoConfig::from_env`]).
    pub fn from_config(config: &IoConfig) -> Self {
        Self::builder().with_config(config).get_or_create()
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    pub fn engine(&self) -> &Arc<PolarsEngine> {
        &self.engine
    }

    /// A reader bound to this session's engine and object-store config.
    pub fn reader(&self) -> SourceReader<PolarsEngine> {
        let reader = SourceReader::new(Arc::clone(&self.engine));
        match &self.object_store {
            Some(cfg) => reader.with_object_store(cfg.clone()),
            None => reader,
        }
    }

    /// A writer bound to `dataset`, this session's engine and object-store config.
    pub fn writer(&self, dataset: Dataset) -> DatasetWriter<PolarsEngine> {
        let writer = DatasetWriter::new(Arc::clone(&self.engine), dataset);
        match &self.object_store {
            Some(cfg) => writer.with_object_store(cfg.clone()),
            None => writer,
        }
    }

    /// Shorthand for `self.reader().read(spec)`.
    pub fn read(&self, spec: &SourceSpec) -> Result<Dataset, DispatchError> {
        self.reader().read(spec)
    }

    /// Shorthand for `self.writer(dataset.clone()).write(spec)`.
    pub fn write(&self, dataset: &Dataset, spec: &SinkSpec) -> Result<(), DispatchError> {
        self.writer(dataset.clone()).write(spec)
    }

    /// Seed a table for `sql` reads through `url` + `dbtable`.
    pub fn register_table(
        &self,
        url: &str,
        table: &str,
        dataset: &Dataset,
    ) -> Result<(), DispatchError> {
        Ok(self.engine.register_table(url, table, dataset)?)
    }
}

impl Default for IoSession {
    fn default() -> Self {
        Self::builder().get_or_create()
    }
}
