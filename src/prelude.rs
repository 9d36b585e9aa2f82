//! One-stop prelude for application code.
//!
//! Use `use sparkless_io::prelude::*` to get the session, specs, kinds and errors.

pub use crate::config::{IoConfig, ObjectStoreConfig};
pub use crate::session::{IoSession, IoSessionBuilder};
pub use sparkless_io_core::{
    DatasetWriter, DispatchError, Engine, EngineError, Options, SinkKind, SinkSpec, SourceKind,
    SourceReader, SourceSpec, WriteMode,
};
pub use sparkless_io_polars::{Dataset, PlDataFrame, PolarsEngine};
