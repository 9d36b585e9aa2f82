//! Per-call source and sink specifications.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::kind::{SinkKind, SourceKind};
use crate::options::Options;

/// What to read: a kind, an optional locator, and options for the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    #[serde(default)]
    pub options: Options,
}

/// Where to write: a kind, an optional locator, and options for the saver.
///
/// The write mode is not part of the spec; every write overwrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkSpec {
    pub kind: SinkKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    #[serde(default)]
    pub options: Options,
}

macro_rules! spec_builders {
    ($spec:ident, $kind:ident, $what:literal, $example:literal) => {
        impl $spec {
            pub fn new(kind: impl Into<$kind>) -> Self {
                $spec {
                    kind: kind.into(),
                    locator: None,
                    options: Options::new(),
                }
            }

            #[doc = concat!("JSON ", $what, " at `locator` (local path or `s3://bucket/key`).")]
            pub fn json(locator: impl Into<String>) -> Self {
                Self::new($kind::Json).locator(locator)
            }

            #[doc = concat!("JDBC-style ", $what, "; connection details go in options.")]
            pub fn sql() -> Self {
                Self::new($kind::Sql)
            }

            pub fn locator(mut self, locator: impl Into<String>) -> Self {
                self.locator = Some(locator.into());
                self
            }

            /// Add a single option. Returns self for chaining.
            pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
                self.options.insert(key.into(), value.into());
                self
            }

            /// Add multiple options. Returns self for chaining.
            pub fn options<K, V>(mut self, opts: impl IntoIterator<Item = (K, V)>) -> Self
            where
                K: Into<String>,
                V: Into<String>,
            {
                for (k, v) in opts {
                    self.options.insert(k.into(), v.into());
                }
                self
            }

            #[doc = concat!("Parse from JSON, e.g. `", $example, "`.")]
            pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
                serde_json::from_str(s)
            }
        }
    };
}

spec_builders!(
    SourceSpec,
    SourceKind,
    "source",
    r#"{"kind":"json","locator":"/a.json","options":{}}"#
);
spec_builders!(
    SinkSpec,
    SinkKind,
    "destination",
    r#"{"kind":"sql","options":{"url":"jdbc:x"}}"#
);

/// Locator for a path-addressed kind: must be present and non-blank.
pub(crate) fn require_locator<'a>(
    kind: &str,
    locator: Option<&'a str>,
) -> Result<&'a str, DispatchError> {
    match locator {
        Some(l) if !l.trim().is_empty() => Ok(l),
        _ => Err(DispatchError::MissingLocator {
            kind: kind.to_string(),
        }),
    }
}

/// Option-addressed kinds must not carry a locator.
pub(crate) fn forbid_locator(kind: &str, locator: Option<&str>) -> Result<(), DispatchError> {
    match locator {
        Some(_) => Err(DispatchError::UnexpectedLocator {
            kind: kind.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_kind_locator_and_options() {
        let spec = SourceSpec::json("/data/a.json").option("multiline", "true");
        assert_eq!(spec.kind, SourceKind::Json);
        assert_eq!(spec.locator.as_deref(), Some("/data/a.json"));
        assert_eq!(spec.options.get("multiline").map(String::as_str), Some("true"));

        let sink = SinkSpec::sql().options([("url", "jdbc:x"), ("dbtable", "t")]);
        assert_eq!(sink.kind, SinkKind::Sql);
        assert!(sink.locator.is_none());
        assert_eq!(sink.options.len(), 2);
    }

    #[test]
    fn spec_from_json_defaults_options() {
        let spec = SourceSpec::from_json(r#"{"kind":"json","locator":"/a.json"}"#).unwrap();
        assert_eq!(spec, SourceSpec::json("/a.json"));

        let sink = SinkSpec::from_json(r#"{"kind":"csv","options":{"header":"true"}}"#).unwrap();
        assert_eq!(sink.kind, SinkKind::Other("csv".into()));
        assert_eq!(sink.options.get("header").map(String::as_str), Some("true"));
    }

    #[test]
    fn blank_locator_is_missing() {
        assert!(matches!(
            require_locator("json", Some("  ")),
            Err(DispatchError::MissingLocator { .. })
        ));
        assert_eq!(require_locator("json", Some("/a")).unwrap(), "/a");
        assert!(forbid_locator("sql", None).is_ok());
        assert!(matches!(
            forbid_locator("sql", Some("/a")),
            Err(DispatchError::UnexpectedLocator { .. })
        ));
    }
}
