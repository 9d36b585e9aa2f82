//! Option bags and the checks the dispatcher runs on them.
//!
//! Options are passed to the engine verbatim; the only thing the core looks
//! at is whether mutually exclusive JDBC keys were supplied together.

use std::collections::HashMap;

use crate::error::DispatchError;

/// Backend-specific string options, passed through without interpretation.
pub type Options = HashMap<String, String>;

/// JDBC option keys.
pub mod jdbc {
    pub const URL: &str = "url";
    pub const DRIVER: &str = "driver";
    pub const DBTABLE: &str = "dbtable";
    pub const QUERY: &str = "query";
    pub const USER: &str = "user";
    pub const PASSWORD: &str = "password";
    pub const PARTITION_COLUMN: &str = "partitionColumn";
    pub const NUM_PARTITIONS: &str = "numPartitions";
    pub const LOWER_BOUND: &str = "lowerBound";
    pub const UPPER_BOUND: &str = "upperBound";
    pub const FETCHSIZE: &str = "fetchsize";
    pub const BATCHSIZE: &str = "batchsize";

    /// Keys of which at most one may be present.
    pub const EXCLUSIVE: [&str; 2] = [DBTABLE, QUERY];

    /// Keys that must be given all together or not at all.
    pub const PARTITIONING: [&str; 4] = [PARTITION_COLUMN, LOWER_BOUND, UPPER_BOUND, NUM_PARTITIONS];
}

/// JSON parse and write option keys.
pub mod json {
    pub const MULTILINE: &str = "multiline";
    pub const PREFERS_DECIMAL: &str = "prefersDecimal";
    pub const PRIMITIVES_AS_STRING: &str = "primitivesAsString";
    pub const ALLOW_COMMENTS: &str = "allowComments";
    pub const ALLOW_UNQUOTED_FIELD_NAMES: &str = "allowUnquotedFieldNames";
    pub const ALLOW_SINGLE_QUOTES: &str = "allowSingleQuotes";
    pub const ALLOW_NUMERIC_LEADING_ZERO: &str = "allowNumericLeadingZero";
    pub const DATE_FORMAT: &str = "dateFormat";
    pub const TIMESTAMP_FORMAT: &str = "timestampFormat";
    pub const INFER_TIMESTAMP: &str = "inferTimestamp";
    pub const ALLOW_UNQUOTED_CONTROL_CHARS: &str = "allowUnquotedControlChars";
    pub const LINE_SEP: &str = "lineSep";
    pub const SAMPLING_RATIO: &str = "samplingRatio";
    pub const DROP_FIELD_IF_ALL_NULL: &str = "dropFieldIfAllNull";
    pub const LOCALE: &str = "locale";
    pub const ALLOW_NON_NUMERIC_NUMBERS: &str = "allowNonNumericNumbers";
    pub const MODE: &str = "mode";
    pub const ALLOW_BACKSLASH_ESCAPING_ANY_CHARACTER: &str = "allowBackslashEscapingAnyCharacter";
    pub const ENCODING: &str = "encoding";
    pub const IGNORE_NULL_FIELDS: &str = "ignoreNullFields";
    pub const COMPRESSION: &str = "compression";
    pub const INFER_SCHEMA_LENGTH: &str = "inferSchemaLength";

    /// Values accepted for [`MODE`].
    pub const MODES: [&str; 3] = ["PERMISSIVE", "DROPMALFORMED", "FAILFAST"];

    /// Values accepted for [`COMPRESSION`].
    pub const COMPRESSION_CODECS: [&str; 6] = ["none", "bzip2", "gzip", "lz4", "snappy", "deflate"];
}

/// Look up an option by key, ignoring ASCII case (JDBC and JSON option
/// keys are case-insensitive).
pub fn get_ignore_case<'a>(options: &'a Options, key: &str) -> Option<&'a str> {
    options
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}

/// Interpret an option as a boolean flag (`true`/`1`, case-insensitive).
pub fn flag(options: &Options, key: &str) -> Option<bool> {
    get_ignore_case(options, key).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

/// Fail when more than one of `keys` is present in `options`.
///
/// Keys are compared case-insensitively; the error reports them as the
/// caller spelled them, in the order of `keys`.
pub fn ensure_exclusive(options: &Options, keys: &[&str]) -> Result<(), DispatchError> {
    let present: Vec<String> = keys
        .iter()
        .filter_map(|key| {
            options
                .keys()
                .find(|k| k.eq_ignore_ascii_case(key))
                .cloned()
        })
        .collect();
    if present.len() > 1 {
        return Err(DispatchError::ConflictingOptions { keys: present });
    }
    Ok(())
}

/// Sorted option keys, for log lines. Values are never logged.
pub fn keys_for_log(options: &Options) -> Vec<&str> {
    let mut keys: Vec<&str> = options.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}
