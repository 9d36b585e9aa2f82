//! Error types for the dispatch layer and for engine implementations.
//!
//! [`EngineError`] is what an [`Engine`](crate::Engine) returns; the core never
//! inspects it and hands it back to the caller inside [`DispatchError::Engine`].
//! [`DispatchError`] adds the failures the dispatcher raises itself, before
//! any engine call is made.

use std::fmt;

use thiserror::Error;

/// Unified error type for engine operations.
///
/// Engines (Polars, test doubles, bindings) map their native failures onto
/// these variants so callers need not depend on engine error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// User-facing error (invalid option value, unsupported codec, bad locator).
    User(String),
    /// Internal / compute error.
    Internal(String),
    /// I/O error (file not found, permission, object store failure).
    Io(String),
    /// SQL execution error on a JDBC-style source.
    Sql(String),
    /// Resource not found (table, object, file).
    NotFound(String),
    /// Other / unclassified.
    Other(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::User(s) => write!(f, "user error: {s}"),
            EngineError::Internal(s) => write!(f, "internal error: {s}"),
            EngineError::Io(s) => write!(f, "io error: {s}"),
            EngineError::Sql(s) => write!(f, "sql error: {s}"),
            EngineError::NotFound(s) => write!(f, "not found: {s}"),
            EngineError::Other(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::User(format!("malformed json: {e}"))
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            EngineError::NotFound(e.to_string())
        } else {
            EngineError::Io(e.to_string())
        }
    }
}

/// Errors returned by [`SourceReader`](crate::SourceReader) and
/// [`DatasetWriter`](crate::DatasetWriter).
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The source kind has no loader.
    #[error("unsupported source kind '{0}' (supported: json, sql)")]
    UnsupportedSourceKind(String),

    /// The sink kind has no saver.
    #[error("unsupported sink kind '{0}' (supported: json, sql)")]
    UnsupportedSinkKind(String),

    /// Mutually exclusive options were supplied together.
    #[error("conflicting options: {} cannot be specified at the same time", keys.join(" and "))]
    ConflictingOptions { keys: Vec<String> },

    /// A path-addressed kind was given no locator.
    #[error("{kind} requires a locator (file or object-store path)")]
    MissingLocator { kind: String },

    /// A kind addressed purely through options was given a locator.
    #[error("{kind} does not take a locator; pass connection details as options")]
    UnexpectedLocator { kind: String },

    /// Failure raised by the engine, unchanged.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl DispatchError {
    /// The engine error, when the failure came from the engine.
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            DispatchError::Engine(e) => Some(e),
            _ => None,
        }
    }

    /// True when the dispatcher rejected the call before reaching the engine.
    pub fn is_dispatch_rejection(&self) -> bool {
        !matches!(self, DispatchError::Engine(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let e: EngineError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(e, EngineError::NotFound(_)));
        let e: EngineError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(e, EngineError::Io(_)));
    }

    #[test]
    fn engine_error_is_transparent() {
        let err = DispatchError::from(EngineError::NotFound("table t".into()));
        assert_eq!(err.to_string(), "not found: table t");
        assert_eq!(
            err.engine_error(),
            Some(&EngineError::NotFound("table t".into()))
        );
        assert!(!err.is_dispatch_rejection());
    }

    #[test]
    fn conflicting_options_message_names_keys() {
        let err = DispatchError::ConflictingOptions {
            keys: vec!["dbtable".into(), "query".into()],
        };
        assert_eq!(
            err.to_string(),
            "conflicting options: dbtable and query cannot be specified at the same time"
        );
        assert!(err.is_dispatch_rejection());
    }
}
