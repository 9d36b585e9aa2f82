//! sparkless-io Polars: the [`PolarsEngine`] loader/saver and its [`Dataset`]
//! handle (the only crate in the workspace that depends on Polars).

pub mod catalog;
pub mod compression;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod json;
pub mod storage;
pub mod temporal;

/// Re-export for callers building or transforming frames.
pub use polars::prelude::DataFrame as PlDataFrame;

pub use catalog::TableCatalog;
pub use compression::Codec;
pub use dataset::Dataset;
pub use engine::PolarsEngine;
pub use error::polars_to_engine_error;
