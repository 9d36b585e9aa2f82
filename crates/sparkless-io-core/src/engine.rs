//! Engine-agnostic loader/saver trait.
//!
//! The engine owns the datasets and does all I/O. The dispatchers call
//! exactly one of these methods per read or write and never retry.

use crate::error::EngineError;
use crate::options::Options;
use crate::storage::ObjectStoreConfig;

/// How a saver treats data already at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum WriteMode {
    /// Replace whatever is at the destination.
    Overwrite,
}

/// Backend that loads and saves datasets.
///
/// `store` is the object-store config bound to the reader or writer; it is
/// `Some` only when the path is object-store addressed.
pub trait Engine: Send + Sync {
    /// Opaque handle to tabular data owned by the engine.
    type Dataset;

    fn load_json(
        &self,
        path: &str,
        options: &Options,
        store: Option<&ObjectStoreConfig>,
    ) -> Result<Self::Dataset, EngineError>;

    fn load_jdbc(&self, options: &Options) -> Result<Self::Dataset, EngineError>;

    fn save_json(
        &self,
        dataset: &Self::Dataset,
        path: &str,
        options: &Options,
        mode: WriteMode,
        store: Option<&ObjectStoreConfig>,
    ) -> Result<(), EngineError>;

    fn save_jdbc(
        &self,
        dataset: &Self::Dataset,
        options: &Options,
        mode: WriteMode,
    ) -> Result<(), EngineError>;
}
