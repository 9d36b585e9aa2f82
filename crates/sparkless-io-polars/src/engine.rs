//! [`Engine`] implementation backed by Polars.
//!
//! JSON comes from the local filesystem or S3-compatible object storage;
//! JDBC-style reads and writes go to an in-process [`TableCatalog`].

use std::sync::{Arc, OnceLock};

use tokio::runtime::Runtime;
use tracing::debug;

use sparkless_io_core::options::{get_ignore_case, jdbc};
use sparkless_io_core::{Engine, EngineError, ObjectStoreConfig, Options, WriteMode};

use crate::catalog::TableCatalog;
use crate::compression::Codec;
use crate::dataset::Dataset;
use crate::json::{self, JsonReadOptions, JsonWriteOptions};
use crate::storage::{self, Location, PART_FILE_STEM};

pub use sparkless_io_core::config::DEFAULT_INFER_SCHEMA_LENGTH;

/// Polars-backed loader and saver.
pub struct PolarsEngine {
    infer_schema_length: usize,
    catalog: Arc<TableCatalog>,
    runtime: OnceLock<Runtime>,
}

impl Default for PolarsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarsEngine {
    pub fn new() -> Self {
        PolarsEngine {
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
            catalog: Arc::new(TableCatalog::new()),
            runtime: OnceLock::new(),
        }
    }

    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = n.max(1);
        self
    }

    /// Share a catalog between engines.
    pub fn with_catalog(mut self, catalog: Arc<TableCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &Arc<TableCatalog> {
        &self.catalog
    }

    /// Seed a table reachable through `url` + `dbtable` options.
    pub fn register_table(
        &self,
        url: &str,
        table: &str,
        dataset: &Dataset,
    ) -> Result<(), EngineError> {
        self.catalog.register(url, table, dataset.to_polars())
    }

    /// Runtime for object-store I/O, created on first use.
    fn runtime(&self) -> Result<&Runtime, EngineError> {
        if let Some(rt) = self.runtime.get() {
            return Ok(rt);
        }
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        // Another thread may have won the race; either runtime is fine.
        let _ = self.runtime.set(rt);
        self.runtime
            .get()
            .ok_or_else(|| EngineError::Internal("object store runtime unavailable".into()))
    }
}

fn required<'a>(options: &'a Options, key: &str) -> Result<&'a str, EngineError> {
    get_ignore_case(options, key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| EngineError::User(format!("jdbc: option '{key}' is required")))
}

fn parse_number<T: std::str::FromStr>(
    options: &Options,
    key: &str,
) -> Result<Option<T>, EngineError> {
    get_ignore_case(options, key)
        .map(|v| {
            v.trim().parse::<T>().map_err(|_| {
                EngineError::User(format!("jdbc: option '{key}' must be an integer, got '{v}'"))
            })
        })
        .transpose()
}

/// Checks a JDBC read's partitioning and fetch options the way a JDBC
/// source would before opening a connection.
fn check_jdbc_read(options: &Options) -> Result<(), EngineError> {
    let present: Vec<&str> = jdbc::PARTITIONING
        .iter()
        .copied()
        .filter(|k| get_ignore_case(options, k).is_some())
        .collect();
    if !present.is_empty() {
        if present.len() != jdbc::PARTITIONING.len() {
            return Err(EngineError::User(format!(
                "jdbc: options {} must all be specified together",
                jdbc::PARTITIONING.join(", ")
            )));
        }
        if get_ignore_case(options, jdbc::QUERY).is_some() {
            return Err(EngineError::User(
                "jdbc: partitionColumn cannot be used together with query; use dbtable".into(),
            ));
        }
        let lower: Option<i64> = parse_number(options, jdbc::LOWER_BOUND)?;
        let upper: Option<i64> = parse_number(options, jdbc::UPPER_BOUND)?;
        let partitions: Option<u32> = parse_number(options, jdbc::NUM_PARTITIONS)?;
        if partitions == Some(0) {
            return Err(EngineError::User("jdbc: numPartitions must be positive".into()));
        }
        if let (Some(lower), Some(upper)) = (lower, upper) {
            if lower > upper {
                return Err(EngineError::User(format!(
                    "jdbc: lowerBound ({lower}) must not exceed upperBound ({upper})"
                )));
            }
        }
        debug!(?partitions, "jdbc partitioning options accepted; catalog reads are not split");
    }
    parse_number::<u32>(options, jdbc::FETCHSIZE)?;
    Ok(())
}

impl Engine for PolarsEngine {
    type Dataset = Dataset;

    fn load_json(
        &self,
        path: &str,
        options: &Options,
        store: Option<&ObjectStoreConfig>,
    ) -> Result<Dataset, EngineError> {
        let opts = JsonReadOptions::from_options(options, self.infer_schema_length)?;
        let blobs = match Location::parse(path)? {
            Location::Local(p) => storage::read_local(&p)?,
            Location::Object { bucket, key } => {
                let client = storage::s3_client(&bucket, store)?;
                self.runtime()?
                    .block_on(storage::read_object(&client, &bucket, &key))?
            }
        };
        let df = json::decode(&blobs, &opts)?;
        debug!(path, files = blobs.len(), rows = df.height(), "loaded json");
        Ok(Dataset::from_polars(df))
    }

    fn load_jdbc(&self, options: &Options) -> Result<Dataset, EngineError> {
        let url = required(options, jdbc::URL)?;
        check_jdbc_read(options)?;
        let df = match (
            get_ignore_case(options, jdbc::DBTABLE),
            get_ignore_case(options, jdbc::QUERY),
        ) {
            (Some(_), Some(_)) => {
                return Err(EngineError::User(
                    "jdbc: dbtable and query cannot be specified at the same time".into(),
                ));
            }
            (Some(table), None) => self.catalog.get(url, table)?,
            (None, Some(query)) => self.catalog.query(url, query)?,
            (None, None) => {
                return Err(EngineError::User(
                    "jdbc: one of 'dbtable' or 'query' is required".into(),
                ));
            }
        };
        debug!(url, rows = df.height(), "loaded jdbc");
        Ok(Dataset::from_polars(df))
    }

    fn save_json(
        &self,
        dataset: &Dataset,
        path: &str,
        options: &Options,
        mode: WriteMode,
        store: Option<&ObjectStoreConfig>,
    ) -> Result<(), EngineError> {
        if mode != WriteMode::Overwrite {
            return Err(EngineError::User(format!("unsupported write mode {mode:?}")));
        }
        let opts = JsonWriteOptions::from_options(options)?;
        let location = Location::parse(path)?;
        let dir_style = location.is_dir_style();
        let codec = match opts.codec {
            Some(codec) => codec,
            None if dir_style => Codec::None,
            None => Codec::from_file_name(path)?,
        };
        let payload = codec.encode(&json::encode(dataset.as_polars(), &opts)?)?;
        let part_name = format!("{PART_FILE_STEM}{}", codec.extension());

        let written = match location {
            Location::Local(p) => storage::write_local(&p, dir_style, &part_name, &payload)?
                .display()
                .to_string(),
            Location::Object { bucket, key } => {
                let client = storage::s3_client(&bucket, store)?;
                let key = self.runtime()?.block_on(storage::write_object(
                    &client, &key, &part_name, payload,
                ))?;
                format!("s3://{bucket}/{key}")
            }
        };
        debug!(written = %written, codec = codec.name(), rows = dataset.count(), "saved json");
        Ok(())
    }

    fn save_jdbc(
        &self,
        dataset: &Dataset,
        options: &Options,
        mode: WriteMode,
    ) -> Result<(), EngineError> {
        if mode != WriteMode::Overwrite {
            return Err(EngineError::User(format!("unsupported write mode {mode:?}")));
        }
        let url = required(options, jdbc::URL)?;
        if get_ignore_case(options, jdbc::QUERY).is_some() {
            return Err(EngineError::User(
                "jdbc: option 'query' is not applicable when writing; use 'dbtable'".into(),
            ));
        }
        let table = required(options, jdbc::DBTABLE)?;
        parse_number::<u32>(options, jdbc::BATCHSIZE)?;
        self.catalog.register(url, table, dataset.to_polars())?;
        debug!(url, table, rows = dataset.count(), "saved jdbc");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn opts(pairs: &[(&str, &str)]) -> Options {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn partitioning_options_must_come_together() {
        let partial = opts(&[("partitionColumn", "id"), ("numPartitions", "4")]);
        assert!(check_jdbc_read(&partial).is_err());

        let full = opts(&[
            ("partitionColumn", "id"),
            ("lowerBound", "0"),
            ("upperBound", "100"),
            ("numPartitions", "4"),
        ]);
        assert!(check_jdbc_read(&full).is_ok());

        let mut inverted = full.clone();
        inverted.insert("lowerBound".into(), "500".into());
        assert!(check_jdbc_read(&inverted).is_err());
    }

    #[test]
    fn fetchsize_must_be_integer() {
        assert!(check_jdbc_read(&opts(&[("fetchsize", "many")])).is_err());
        assert!(check_jdbc_read(&opts(&[("fetchsize", "1000")])).is_ok());
    }

    #[test]
    fn jdbc_requires_url_and_target() {
        let engine = PolarsEngine::new();
        assert!(matches!(
            engine.load_jdbc(&opts(&[("dbtable", "t")])),
            Err(EngineError::User(m)) if m.contains("url")
        ));
        assert!(matches!(
            engine.load_jdbc(&opts(&[("url", "jdbc:x")])),
            Err(EngineError::User(m)) if m.contains("dbtable")
        ));
        assert!(matches!(
            engine.load_jdbc(&opts(&[("url", "jdbc:x"), ("dbtable", "missing")])),
            Err(EngineError::NotFound(_))
        ));
    }

    #[test]
    fn jdbc_write_rejects_query() {
        let engine = PolarsEngine::new();
        let ds = Dataset::from_polars(df!["id" => &[1i64]].unwrap());
        let err = engine
            .save_jdbc(
                &ds,
                &opts(&[("url", "jdbc:x"), ("query", "select 1")]),
                WriteMode::Overwrite,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::User(m) if m.contains("query")));
    }

    #[test]
    fn json_file_with_gz_name_is_compressed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json.gz");
        let path = path.to_str().unwrap();
        let engine = PolarsEngine::new();
        let ds = Dataset::from_polars(df!["id" => &[1i64, 2]].unwrap());
        engine
            .save_json(&ds, path, &Options::new(), WriteMode::Overwrite, None)
            .unwrap();
        let raw = std::fs::read(path).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);

        let back = engine.load_json(path, &Options::new(), None).unwrap();
        assert!(back.frame_equal(&ds));
    }
}
