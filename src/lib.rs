//! sparkless-io - read and write tabular datasets through one dispatch facade.
//!
//! A [`SourceReader`] maps a [`SourceSpec`] (kind, locator, options) onto the
//! matching engine loader; a [`DatasetWriter`] does the same for a
//! [`SinkSpec`]. Supported kinds are `json` (local files and `s3://` objects)
//! and `sql` (JDBC-style options). [`IoSession`] wires both to the Polars
//! engine.
//!
//! ```no_run
//! use sparkless_io::prelude::*;
//!
//! # fn main() -> Result<(), DispatchError> {
//! let session = IoSession::from_config(&IoConfig::from_env());
//! let people = session.read(&SourceSpec::json("/data/people.json").option("multiline", "true"))?;
//! session.write(&people, &SinkSpec::json("/out/people/"))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod prelude;
pub mod session;

pub use config::{IoConfig, ObjectStoreConfig};
pub use session::{IoSession, IoSessionBuilder};
pub use sparkless_io_core::{
    DatasetWriter, DispatchError, Engine, EngineError, Options, SinkKind, SinkSpec, SourceKind,
    SourceReader, SourceSpec, WriteMode, options,
};
pub use sparkless_io_polars::{Dataset, PlDataFrame, PolarsEngine, TableCatalog};
