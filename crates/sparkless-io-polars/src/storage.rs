//! Local filesystem and S3-compatible object storage for JSON files.
//!
//! A locator addresses either a single file/object or, when it ends in `/`
//! (or names an existing local directory), a directory of part files. Reads
//! of a directory concatenate every data file in it; names starting with `_`
//! or `.` are markers and skipped. Overwriting a directory clears it first.

use std::path::{Path, PathBuf};

use futures::TryStreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore, PutPayload};
use tracing::debug;
use url::Url;

use sparkless_io_core::storage::is_object_store_locator;
use sparkless_io_core::{EngineError, ObjectStoreConfig};

use crate::error::object_store_to_engine_error;

/// Name of the single part file written into a directory-style locator.
pub const PART_FILE_STEM: &str = "part-00000.json";

/// One file's name (for codec inference) and raw bytes.
#[derive(Debug, Clone)]
pub struct Blob {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Where a locator points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Object { bucket: String, key: String },
}

impl Location {
    pub fn parse(locator: &str) -> Result<Self, EngineError> {
        if is_object_store_locator(locator) {
            let url = Url::parse(locator.trim()).map_err(|e| {
                EngineError::User(format!("invalid object-store locator '{locator}': {e}"))
            })?;
            let bucket = url
                .host_str()
                .filter(|b| !b.is_empty())
                .ok_or_else(|| EngineError::User(format!("locator '{locator}' has no bucket")))?
                .to_string();
            let key = url.path().trim_start_matches('/').to_string();
            return Ok(Location::Object { bucket, key });
        }
        if locator.starts_with("file://") {
            let url = Url::parse(locator)
                .map_err(|e| EngineError::User(format!("invalid file locator '{locator}': {e}")))?;
            let path = url
                .to_file_path()
                .map_err(|_| EngineError::User(format!("invalid file locator '{locator}'")))?;
            let path = if locator.ends_with('/') {
                dir_style(path)
            } else {
                path
            };
            return Ok(Location::Local(path));
        }
        Ok(Location::Local(PathBuf::from(locator)))
    }

    /// True when the locator names a directory of part files.
    pub fn is_dir_style(&self) -> bool {
        match self {
            Location::Local(path) => {
                path.as_os_str().to_string_lossy().ends_with('/') || path.is_dir()
            }
            Location::Object { key, .. } => key.is_empty() || key.ends_with('/'),
        }
    }
}

/// Keep a trailing separator on a path built from a URL.
fn dir_style(path: PathBuf) -> PathBuf {
    let mut s = path.into_os_string();
    if !s.to_string_lossy().ends_with('/') {
        s.push("/");
    }
    PathBuf::from(s)
}

fn is_marker(name: &str) -> bool {
    name.starts_with('_') || name.starts_with('.')
}

/// Read a local file, or every data file in a local directory.
pub fn read_local(path: &Path) -> Result<Vec<Blob>, EngineError> {
    if path.is_dir() {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| !is_marker(n))
            })
            .collect();
        entries.sort();
        debug!(dir = %path.display(), files = entries.len(), "reading json directory");
        return entries
            .into_iter()
            .map(|p| -> Result<Blob, EngineError> {
                Ok(Blob {
                    name: p.display().to_string(),
                    bytes: std::fs::read(&p)?,
                })
            })
            .collect();
    }
    let bytes = std::fs::read(path).map_err(|e| with_path(e, path))?;
    Ok(vec![Blob {
        name: path.display().to_string(),
        bytes,
    }])
}

fn with_path(e: std::io::Error, path: &Path) -> EngineError {
    match EngineError::from(e) {
        EngineError::NotFound(m) => EngineError::NotFound(format!("{}: {m}", path.display())),
        EngineError::Io(m) => EngineError::Io(format!("{}: {m}", path.display())),
        other => other,
    }
}

/// Write `bytes` to a local file, replacing it; for a directory-style path
/// the directory is cleared and `file_name` is written inside it.
pub fn write_local(
    path: &Path,
    dir_style: bool,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, EngineError> {
    let target = if dir_style {
        if path.exists() {
            std::fs::remove_dir_all(path).map_err(|e| with_path(e, path))?;
        }
        std::fs::create_dir_all(path).map_err(|e| with_path(e, path))?;
        path.join(file_name)
    } else {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| with_path(e, parent))?;
        }
        path.to_path_buf()
    };
    std::fs::write(&target, bytes).map_err(|e| with_path(e, &target))?;
    Ok(target)
}

/// Build an S3 client for `bucket`.
///
/// With a config, its credentials, endpoint and region are used; without
/// one, the standard AWS environment variables are.
pub fn s3_client(
    bucket: &str,
    config: Option<&ObjectStoreConfig>,
) -> Result<AmazonS3, EngineError> {
    let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
    if let Some(cfg) = config {
        let endpoint = cfg.endpoint_url();
        builder = builder
            .with_access_key_id(&cfg.access_key)
            .with_secret_access_key(&cfg.secret_key)
            .with_allow_http(endpoint.starts_with("http://"))
            .with_endpoint(endpoint);
        if let Some(region) = &cfg.region {
            builder = builder.with_region(region);
        }
    }
    builder.build().map_err(object_store_to_engine_error)
}

fn is_dir_key(key: &str) -> bool {
    key.is_empty() || key.ends_with('/')
}

/// Every object under `prefix`, markers included, sorted by path.
async fn list_objects(
    store: &dyn ObjectStore,
    prefix: &str,
) -> Result<Vec<ObjectMeta>, EngineError> {
    let prefix = (!prefix.is_empty()).then(|| ObjectPath::from(prefix));
    let mut objects: Vec<ObjectMeta> = store
        .list(prefix.as_ref())
        .try_collect()
        .await
        .map_err(object_store_to_engine_error)?;
    objects.sort_by(|a, b| a.location.as_ref().cmp(b.location.as_ref()));
    Ok(objects)
}

async fn list_data_objects(
    store: &dyn ObjectStore,
    prefix: &str,
) -> Result<Vec<ObjectMeta>, EngineError> {
    let mut objects = list_objects(store, prefix).await?;
    objects.retain(|meta| meta.location.filename().is_some_and(|n| !is_marker(n)));
    Ok(objects)
}

/// Read an object, or every data object under a directory-style prefix.
pub async fn read_object(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<Vec<Blob>, EngineError> {
    let paths: Vec<ObjectPath> = if is_dir_key(key) {
        list_data_objects(store, key)
            .await?
            .into_iter()
            .map(|meta| meta.location)
            .collect()
    } else {
        vec![ObjectPath::from(key)]
    };
    debug!(bucket, key, objects = paths.len(), "reading json objects");
    let mut blobs = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = store
            .get(&path)
            .await
            .map_err(object_store_to_engine_error)?
            .bytes()
            .await
            .map_err(object_store_to_engine_error)?;
        blobs.push(Blob {
            name: format!("s3://{bucket}/{path}"),
            bytes: bytes.to_vec(),
        });
    }
    Ok(blobs)
}

/// Put an object, replacing it; a directory-style key is cleared first
/// (markers included) and `file_name` is written under it.
pub async fn write_object(
    store: &dyn ObjectStore,
    key: &str,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<String, EngineError> {
    let target = if is_dir_key(key) {
        for meta in list_objects(store, key).await? {
            store
                .delete(&meta.location)
                .await
                .map_err(object_store_to_engine_error)?;
        }
        format!("{key}{file_name}")
    } else {
        key.to_string()
    };
    let path = ObjectPath::from(target.as_str());
    store
        .put(&path, PutPayload::from(bytes))
        .await
        .map_err(object_store_to_engine_error)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_s3_locators() {
        assert_eq!(
            Location::parse("s3://suji-9-1/data-json/sample_json.json").unwrap(),
            Location::Object {
                bucket: "suji-9-1".into(),
                key: "data-json/sample_json.json".into()
            }
        );
        let dir = Location::parse("s3a://bucket/data-json-write/").unwrap();
        assert!(dir.is_dir_style());
        assert!(Location::parse("s3://").is_err());
    }

    #[test]
    fn parse_local_locators() {
        assert_eq!(
            Location::parse("/data/a.json").unwrap(),
            Location::Local(PathBuf::from("/data/a.json"))
        );
        assert_eq!(
            Location::parse("file:///data/a.json").unwrap(),
            Location::Local(PathBuf::from("/data/a.json"))
        );
        assert!(Location::parse("/data/out/").unwrap().is_dir_style());
        assert!(Location::parse("file:///data/out/").unwrap().is_dir_style());
    }

    #[test]
    fn local_directory_round_trip_skips_markers() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let target = write_local(&out, true, PART_FILE_STEM, b"{\"a\":1}\n").unwrap();
        assert_eq!(target, out.join(PART_FILE_STEM));
        std::fs::write(out.join("_SUCCESS"), b"").unwrap();

        let blobs = read_local(&out).unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].bytes, b"{\"a\":1}\n");
    }

    #[test]
    fn overwriting_directory_replaces_old_parts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("part-00007.json"), b"{\"old\":true}\n").unwrap();

        write_local(&out, true, PART_FILE_STEM, b"{\"new\":true}\n").unwrap();
        let blobs = read_local(&out).unwrap();
        assert_eq!(blobs.len(), 1);
        assert!(blobs[0].name.ends_with(PART_FILE_STEM));
    }

    #[test]
    fn write_file_creates_parents_and_missing_read_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested/deeper/a.json");
        write_local(&file, false, PART_FILE_STEM, b"{}\n").unwrap();
        assert!(file.is_file());

        let err = read_local(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    mod object {
        use super::super::*;
        use object_store::memory::InMemory;

        fn block_on<F: std::future::Future>(f: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(f)
        }

        fn put(store: &InMemory, key: &str, body: &str) {
            let payload = PutPayload::from(body.as_bytes().to_vec());
            block_on(store.put(&ObjectPath::from(key), payload)).unwrap();
        }

        fn keys(store: &InMemory) -> Vec<String> {
            block_on(list_objects(store, ""))
                .unwrap()
                .into_iter()
                .map(|m| m.location.to_string())
                .collect()
        }

        #[test]
        fn single_object_read() {
            let store = InMemory::new();
            put(&store, "data-json/sample_json.json", "{\"id\":1}\n");

            let blobs =
                block_on(read_object(&store, "bucket", "data-json/sample_json.json")).unwrap();
            assert_eq!(blobs.len(), 1);
            assert_eq!(blobs[0].name, "s3://bucket/data-json/sample_json.json");
            assert_eq!(blobs[0].bytes, b"{\"id\":1}\n");
        }

        #[test]
        fn missing_object_is_not_found() {
            let store = InMemory::new();
            let err = block_on(read_object(&store, "bucket", "nope.json")).unwrap_err();
            assert!(matches!(err, EngineError::NotFound(_)));
        }

        #[test]
        fn prefix_read_skips_markers() {
            let store = InMemory::new();
            put(&store, "out/part-00000.json", "{\"id\":1}\n");
            put(&store, "out/part-00001.json", "{\"id\":2}\n");
            put(&store, "out/_SUCCESS", "");
            put(&store, "out/.part-00000.json.crc", "crc");
            put(&store, "other/part-00000.json", "{\"id\":9}\n");

            let blobs = block_on(read_object(&store, "bucket", "out/")).unwrap();
            let names: Vec<&str> = blobs.iter().map(|b| b.name.as_str()).collect();
            assert_eq!(
                names,
                vec!["s3://bucket/out/part-00000.json", "s3://bucket/out/part-00001.json"]
            );
        }

        #[test]
        fn directory_overwrite_clears_prefix() {
            let store = InMemory::new();
            put(&store, "out/part-00000.json", "{\"old\":1}\n");
            put(&store, "out/part-00003.json", "{\"old\":2}\n");
            put(&store, "out/_SUCCESS", "");
            put(&store, "keep/a.json", "{}\n");

            let written = block_on(write_object(
                &store,
                "out/",
                "part-00000.json.gz",
                b"gz".to_vec(),
            ))
            .unwrap();
            assert_eq!(written, "out/part-00000.json.gz");
            assert_eq!(keys(&store), vec!["keep/a.json", "out/part-00000.json.gz"]);
        }

        #[test]
        fn single_object_overwrite_replaces_body() {
            let store = InMemory::new();
            put(&store, "a.json", "{\"old\":1}\n");
            let written = block_on(write_object(
                &store,
                "a.json",
                PART_FILE_STEM,
                b"{}\n".to_vec(),
            ))
            .unwrap();
            assert_eq!(written, "a.json");

            let blobs = block_on(read_object(&store, "bucket", "a.json")).unwrap();
            assert_eq!(blobs[0].bytes, b"{}\n");
        }
    }
}
