//! Source and sink kinds.
//!
//! Both are open enums: any name parses, and names without a backend land in
//! `Other` so that dispatch can reject them explicitly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! open_kind {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(#[$json_doc:meta])* Json,
            $(#[$sql_doc:meta])* Sql,
            $(#[$other_doc:meta])* Other,
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $(#[$json_doc])*
            Json,
            $(#[$sql_doc])*
            Sql,
            $(#[$other_doc])*
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $name::Json => "json",
                    $name::Sql => "sql",
                    $name::Other(name) => name,
                }
            }

            /// True for kinds whose backend is reached through a path.
            pub fn is_path_addressed(&self) -> bool {
                matches!(self, $name::Json)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                match normalize(name).as_str() {
                    "json" => $name::Json,
                    "sql" | "jdbc" => $name::Sql,
                    _ => $name::Other(name.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                $name::from(name.as_str())
            }
        }

        impl From<$name> for String {
            fn from(kind: $name) -> Self {
                kind.as_str().to_string()
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok($name::from(s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

open_kind! {
    /// Which loader handles a read.
    SourceKind {
        /// Line-delimited or multiline JSON, addressed by a locator.
        Json,
        /// JDBC-style relational source, addressed entirely by options.
        Sql,
        /// Any other name. Reading from it fails with `UnsupportedSourceKind`.
        Other,
    }
}

open_kind! {
    /// Which saver handles a write.
    SinkKind {
        /// JSON lines, addressed by a locator.
        Json,
        /// JDBC-style relational destination, addressed entirely by options.
        Sql,
        /// Any other name. Writing to it fails with `UnsupportedSinkKind`.
        Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_parse_case_insensitively() {
        assert_eq!(SourceKind::from("JSON"), SourceKind::Json);
        assert_eq!(SourceKind::from(" sql "), SourceKind::Sql);
        assert_eq!(SinkKind::from("Jdbc"), SinkKind::Sql);
    }

    #[test]
    fn unknown_kind_keeps_given_name() {
        assert_eq!(SourceKind::from("CSV"), SourceKind::Other("CSV".into()));
        assert_eq!(SinkKind::from("parquet").to_string(), "parquet");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let kind: SourceKind = serde_json::from_str("\"Json\"").unwrap();
        assert_eq!(kind, SourceKind::Json);
        assert_eq!(serde_json::to_string(&SinkKind::Sql).unwrap(), "\"sql\"");
        let other: SinkKind = serde_json::from_str("\"delta\"").unwrap();
        assert_eq!(other, SinkKind::Other("delta".into()));
    }

    #[test]
    fn only_json_is_path_addressed() {
        assert!(SourceKind::Json.is_path_addressed());
        assert!(!SourceKind::Sql.is_path_addressed());
        assert!(!SinkKind::Other("csv".into()).is_path_addressed());
    }
}
