//! sparkless-io core: source/sink kinds, specs, the engine trait, and the
//! reader/writer dispatchers (no Polars dependency).

pub mod config;
pub mod engine;
pub mod error;
pub mod kind;
pub mod options;
pub mod reader;
pub mod spec;
pub mod storage;
pub mod writer;

pub use config::IoConfig;
pub use engine::{Engine, WriteMode};
pub use error::{DispatchError, EngineError};
pub use kind::{SinkKind, SourceKind};
pub use options::Options;
pub use reader::SourceReader;
pub use spec::{SinkSpec, SourceSpec};
pub use storage::ObjectStoreConfig;
pub use writer::DatasetWriter;
