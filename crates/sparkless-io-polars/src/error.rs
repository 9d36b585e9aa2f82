//! Mapping of Polars and object-store failures onto the core [`EngineError`].

use polars::error::PolarsError;

pub use sparkless_io_core::EngineError;

/// Map PolarsError to core EngineError for trait boundaries.
pub fn polars_to_engine_error(e: PolarsError) -> EngineError {
    let msg = e.to_string();
    match &e {
        PolarsError::ColumnNotFound(_) => EngineError::NotFound(msg),
        PolarsError::InvalidOperation(_) => EngineError::User(msg),
        PolarsError::ComputeError(_) => {
            let lower = msg.to_lowercase();
            if lower.contains("json") || lower.contains("parse") {
                return EngineError::User(format!("json decode failed: {msg}"));
            }
            EngineError::Internal(msg)
        }
        PolarsError::IO { .. } => EngineError::Io(msg),
        _ => EngineError::Other(msg),
    }
}

/// Map object_store::Error to core EngineError.
pub fn object_store_to_engine_error(e: object_store::Error) -> EngineError {
    match e {
        object_store::Error::NotFound { path, .. } => {
            EngineError::NotFound(format!("object '{path}'"))
        }
        object_store::Error::InvalidPath { source } => {
            EngineError::User(format!("invalid object path: {source}"))
        }
        other => EngineError::Io(other.to_string()),
    }
}
