//! JSON decode/encode for the Polars engine.
//!
//! Reads accept JSON lines (default) or one multiline document per file and
//! apply the malformed-record policy per record. Writes produce JSON lines.
//! Date and Datetime columns are written with `dateFormat`/`timestampFormat`
//! and string columns matching those formats are read back as dates.

use std::io::Cursor;
use std::num::NonZeroUsize;

use polars::prelude::DataFrame as PlDataFrame;
use polars::prelude::*;
use serde_json::Value;
use tracing::debug;

use sparkless_io_core::EngineError;
use sparkless_io_core::Options;
use sparkless_io_core::options::{flag, get_ignore_case, json as keys};

use crate::compression::Codec;
use crate::error::polars_to_engine_error;
use crate::storage::Blob;
use crate::temporal::{self, TemporalFormats};

/// Options this engine interprets on read; everything else is ignored.
const READ_KEYS: [&str; 12] = [
    keys::MULTILINE,
    keys::MODE,
    keys::LINE_SEP,
    keys::ENCODING,
    keys::COMPRESSION,
    keys::SAMPLING_RATIO,
    keys::INFER_SCHEMA_LENGTH,
    keys::DROP_FIELD_IF_ALL_NULL,
    keys::PRIMITIVES_AS_STRING,
    keys::DATE_FORMAT,
    keys::TIMESTAMP_FORMAT,
    keys::INFER_TIMESTAMP,
];

/// Options this engine interprets on write; everything else is ignored.
const WRITE_KEYS: [&str; 6] = [
    keys::IGNORE_NULL_FIELDS,
    keys::LINE_SEP,
    keys::ENCODING,
    keys::COMPRESSION,
    keys::DATE_FORMAT,
    keys::TIMESTAMP_FORMAT,
];

/// What to do with a record that does not parse as a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Keep the record as a row of nulls (an all-malformed input keeps its
    /// row count with no columns).
    #[default]
    Permissive,
    /// Skip the record.
    DropMalformed,
    /// Fail the whole read.
    FailFast,
}

impl ParseMode {
    fn parse(value: &str) -> Result<Self, EngineError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PERMISSIVE" => Ok(ParseMode::Permissive),
            "DROPMALFORMED" => Ok(ParseMode::DropMalformed),
            "FAILFAST" => Ok(ParseMode::FailFast),
            _ => Err(EngineError::User(format!(
                "invalid json mode '{value}' (expected one of {})",
                keys::MODES.join(", ")
            ))),
        }
    }
}

/// Read-side options, parsed from the option bag.
#[derive(Debug, Clone)]
pub struct JsonReadOptions {
    pub multiline: bool,
    pub mode: ParseMode,
    pub line_sep: Option<String>,
    /// Explicit codec; `None` means infer per file from its name.
    pub codec: Option<Codec>,
    /// Records sampled for schema inference; `None` scans every record.
    pub infer_schema_length: Option<usize>,
    pub drop_field_if_all_null: bool,
    pub primitives_as_string: bool,
    /// Formats tried on string columns; `None` leaves strings alone.
    pub temporal: Option<TemporalFormats>,
}

impl JsonReadOptions {
    pub fn from_options(options: &Options, default_infer: usize) -> Result<Self, EngineError> {
        log_ignored("read", options, &READ_KEYS);
        check_encoding(options)?;

        let mode = match get_ignore_case(options, keys::MODE) {
            Some(v) => ParseMode::parse(v)?,
            None => ParseMode::default(),
        };
        let codec = get_ignore_case(options, keys::COMPRESSION)
            .map(Codec::from_option)
            .transpose()?;

        let mut infer_schema_length = Some(default_infer);
        if let Some(v) = get_ignore_case(options, keys::SAMPLING_RATIO) {
            let ratio: f64 = v.trim().parse().map_err(|_| {
                EngineError::User(format!("samplingRatio must be a number, got '{v}'"))
            })?;
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(EngineError::User(format!(
                    "samplingRatio must be in (0, 1], got {ratio}"
                )));
            }
            if ratio >= 1.0 {
                infer_schema_length = None;
            }
        }
        if let Some(v) = get_ignore_case(options, keys::INFER_SCHEMA_LENGTH) {
            let n: usize = v.trim().parse().map_err(|_| {
                EngineError::User(format!("inferSchemaLength must be an integer, got '{v}'"))
            })?;
            infer_schema_length = if n == 0 { None } else { Some(n) };
        }

        Ok(JsonReadOptions {
            multiline: flag(options, keys::MULTILINE).unwrap_or(false),
            mode,
            line_sep: line_sep(options),
            codec,
            infer_schema_length,
            drop_field_if_all_null: flag(options, keys::DROP_FIELD_IF_ALL_NULL).unwrap_or(false),
            primitives_as_string: flag(options, keys::PRIMITIVES_AS_STRING).unwrap_or(false),
            temporal: temporal::infer_enabled(options)
                .then(|| TemporalFormats::from_options(options)),
        })
    }
}

/// Write-side options, parsed from the option bag.
#[derive(Debug, Clone)]
pub struct JsonWriteOptions {
    pub ignore_null_fields: bool,
    pub line_sep: String,
    /// Explicit codec; `None` means infer from the target name.
    pub codec: Option<Codec>,
    pub temporal: TemporalFormats,
}

impl JsonWriteOptions {
    pub fn from_options(options: &Options) -> Result<Self, EngineError> {
        log_ignored("write", options, &WRITE_KEYS);
        check_encoding(options)?;
        Ok(JsonWriteOptions {
            ignore_null_fields: flag(options, keys::IGNORE_NULL_FIELDS).unwrap_or(true),
            line_sep: line_sep(options).unwrap_or_else(|| "\n".to_string()),
            codec: get_ignore_case(options, keys::COMPRESSION)
                .map(Codec::from_option)
                .transpose()?,
            temporal: TemporalFormats::from_options(options),
        })
    }
}

fn log_ignored(side: &str, options: &Options, handled: &[&str]) {
    let ignored: Vec<&str> = options
        .keys()
        .filter(|k| !handled.iter().any(|h| h.eq_ignore_ascii_case(k)))
        .map(String::as_str)
        .collect();
    if !ignored.is_empty() {
        debug!(side, ?ignored, "json options not interpreted by the polars engine");
    }
}

fn check_encoding(options: &Options) -> Result<(), EngineError> {
    match get_ignore_case(options, keys::ENCODING) {
        None => Ok(()),
        Some(v) if matches!(v.trim().to_ascii_lowercase().as_str(), "utf-8" | "utf8") => Ok(()),
        Some(v) => Err(EngineError::User(format!(
            "encoding '{v}' is not supported by the polars engine (only UTF-8)"
        ))),
    }
}

fn line_sep(options: &Options) -> Option<String> {
    get_ignore_case(options, keys::LINE_SEP)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Decode every blob into one frame.
pub fn decode(blobs: &[Blob], opts: &JsonReadOptions) -> Result<PlDataFrame, EngineError> {
    let mut records = Vec::new();
    for blob in blobs {
        let codec = match opts.codec {
            Some(codec) => codec,
            None => Codec::from_file_name(&blob.name)?,
        };
        let raw = codec.decode(&blob.bytes)?;
        let text = String::from_utf8(raw)
            .map_err(|e| EngineError::User(format!("{}: not valid UTF-8: {e}", blob.name)))?;
        parse_records(&blob.name, &text, opts, &mut records)?;
    }
    records_to_frame(&records, opts)
}

/// Parse one file's text into JSON objects, applying the malformed-record policy.
fn parse_records(
    name: &str,
    text: &str,
    opts: &JsonReadOptions,
    out: &mut Vec<Value>,
) -> Result<(), EngineError> {
    if opts.multiline {
        if text.trim().is_empty() {
            return Ok(());
        }
        let doc: Value = serde_json::from_str(text)
            .map_err(|e| EngineError::User(format!("{name}: malformed json document: {e}")))?;
        let items = match doc {
            Value::Array(items) => items,
            other => vec![other],
        };
        for (i, item) in items.into_iter().enumerate() {
            if item.is_object() {
                out.push(item);
            } else {
                malformed(opts.mode, name, i + 1, "record is not a JSON object", out)?;
            }
        }
        return Ok(());
    }

    let lines: Vec<&str> = match &opts.line_sep {
        Some(sep) => text.split(sep.as_str()).collect(),
        None => text.lines().collect(),
    };
    for (i, line) in lines.into_iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(v) if v.is_object() => out.push(v),
            Ok(_) => malformed(opts.mode, name, i + 1, "record is not a JSON object", out)?,
            Err(e) => malformed(opts.mode, name, i + 1, &e.to_string(), out)?,
        }
    }
    Ok(())
}

fn malformed(
    mode: ParseMode,
    name: &str,
    line: usize,
    reason: &str,
    out: &mut Vec<Value>,
) -> Result<(), EngineError> {
    match mode {
        ParseMode::Permissive => {
            out.push(Value::Object(serde_json::Map::new()));
            Ok(())
        }
        ParseMode::DropMalformed => {
            debug!(file = name, line, reason, "dropping malformed json record");
            Ok(())
        }
        ParseMode::FailFast => Err(EngineError::User(format!(
            "{name}: malformed record at record {line} (mode FAILFAST): {reason}"
        ))),
    }
}

fn records_to_frame(records: &[Value], opts: &JsonReadOptions) -> Result<PlDataFrame, EngineError> {
    if records.is_empty() {
        return Ok(PlDataFrame::empty());
    }
    if records.iter().all(|r| r.as_object().is_some_and(|o| o.is_empty())) {
        return null_rows(records.len());
    }
    let mut ndjson = Vec::new();
    for record in records {
        let record = if opts.primitives_as_string {
            stringify_primitives(record)
        } else {
            record.clone()
        };
        serde_json::to_writer(&mut ndjson, &record)?;
        ndjson.push(b'\n');
    }
    let mut df = JsonReader::new(Cursor::new(ndjson))
        .with_json_format(JsonFormat::JsonLines)
        .infer_schema_len(opts.infer_schema_length.and_then(NonZeroUsize::new))
        .finish()
        .map_err(polars_to_engine_error)?;

    if let Some(formats) = &opts.temporal {
        df = temporal::infer_columns(df, formats)?;
    }

    if opts.drop_field_if_all_null {
        let height = df.height();
        let all_null: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|c| c.null_count() == height)
            .map(|c| c.name().to_string())
            .collect();
        for name in all_null {
            df = df.drop(&name).map_err(polars_to_engine_error)?;
        }
    }
    Ok(df)
}

/// A frame with `height` rows and no columns.
fn null_rows(height: usize) -> Result<PlDataFrame, EngineError> {
    let placeholder = Column::full_null("_".into(), height, &DataType::Null);
    PlDataFrame::new(vec![placeholder])
        .and_then(|df| df.drop("_"))
        .map_err(polars_to_engine_error)
}

/// Top-level numbers and booleans become strings; nulls and nested values stay.
fn stringify_primitives(record: &Value) -> Value {
    match record {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = match v {
                        Value::Number(n) => Value::String(n.to_string()),
                        Value::Bool(b) => Value::String(b.to_string()),
                        other => other.clone(),
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Encode a frame as JSON lines, then apply null stripping and the separator.
pub fn encode(df: &PlDataFrame, opts: &JsonWriteOptions) -> Result<Vec<u8>, EngineError> {
    let mut raw = Vec::new();
    let mut df = temporal::format_columns(df, &opts.temporal)?;
    JsonWriter::new(&mut raw)
        .with_json_format(JsonFormat::JsonLines)
        .finish(&mut df)
        .map_err(polars_to_engine_error)?;
    let text = String::from_utf8(raw)
        .map_err(|e| EngineError::Internal(format!("json writer produced invalid UTF-8: {e}")))?;

    let mut out = String::with_capacity(text.len());
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        if opts.ignore_null_fields {
            let mut record: Value = serde_json::from_str(line)?;
            if let Value::Object(map) = &mut record {
                map.retain(|_, v| !v.is_null());
            }
            out.push_str(&serde_json::to_string(&record)?);
        } else {
            out.push_str(line);
        }
        out.push_str(&opts.line_sep);
    }
    Ok(out.into_bytes())
}
