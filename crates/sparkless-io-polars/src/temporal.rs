//! Date and timestamp columns in JSON: formatting on write, inference on read.
//!
//! `dateFormat` and `timestampFormat` take Spark-style datetime patterns
//! (`yyyy-MM-dd`, `HH:mm:ss.SSS`, `'T'` literals, `[...]` optional sections)
//! and are translated to chrono format strings.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use polars::prelude::DataFrame as PlDataFrame;
use polars::prelude::*;
use tracing::debug;

use sparkless_io_core::options::{flag, get_ignore_case, json as keys};
use sparkless_io_core::{EngineError, Options};

use crate::error::polars_to_engine_error;

pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd";
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "yyyy-MM-dd'T'HH:mm:ss[.SSS]";

/// Translate a Spark datetime pattern to a chrono format string.
pub fn spark_to_chrono(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' => {
                // Quoted literal; '' is an escaped quote.
                let mut j = i + 1;
                if chars.get(j) == Some(&'\'') {
                    out.push('\'');
                    i = j + 1;
                    continue;
                }
                while j < chars.len() && chars[j] != '\'' {
                    push_literal(&mut out, chars[j]);
                    j += 1;
                }
                i = j + 1;
            }
            '[' => {
                let end = chars[i..]
                    .iter()
                    .position(|&ch| ch == ']')
                    .map_or(chars.len(), |p| i + p);
                let inner: String = chars[i + 1..end].iter().collect();
                if inner.starts_with('.') && inner[1..].chars().all(|ch| ch == 'S') {
                    out.push_str("%.f");
                } else {
                    out.push_str(&spark_to_chrono(&inner));
                }
                i = end + 1;
            }
            ']' => i += 1,
            c if c.is_ascii_alphabetic() => {
                let mut n = 1;
                while chars.get(i + n) == Some(&c) {
                    n += 1;
                }
                push_field(&mut out, c, n);
                i += n;
            }
            c => {
                push_literal(&mut out, c);
                i += 1;
            }
        }
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

fn push_field(out: &mut String, letter: char, n: usize) {
    let spec = match (letter, n) {
        ('y' | 'u', 2) => "%y",
        ('y' | 'u', _) => "%Y",
        ('M' | 'L', 1 | 2) => "%m",
        ('M' | 'L', 3) => "%b",
        ('M' | 'L', _) => "%B",
        ('d', _) => "%d",
        ('D', _) => "%j",
        ('H', _) => "%H",
        ('h', _) => "%I",
        ('m', _) => "%M",
        ('s', _) => "%S",
        ('a', _) => "%p",
        ('E', 1..=3) => "%a",
        ('E', _) => "%A",
        ('S', 3) => "%3f",
        ('S', 6) => "%6f",
        ('S', 9) => "%9f",
        ('S', _) => "%f",
        ('X' | 'x', 3) => "%:z",
        ('X' | 'x' | 'Z', _) => "%z",
        _ => {
            for _ in 0..n {
                push_literal(out, letter);
            }
            return;
        }
    };
    out.push_str(spec);
}

/// Date and timestamp formats in effect for one read or write.
#[derive(Debug, Clone)]
pub struct TemporalFormats {
    date: String,
    timestamp: String,
    timestamp_has_offset: bool,
}

impl Default for TemporalFormats {
    fn default() -> Self {
        Self::from_patterns(DEFAULT_DATE_FORMAT, DEFAULT_TIMESTAMP_FORMAT)
    }
}

impl TemporalFormats {
    pub fn from_patterns(date: &str, timestamp: &str) -> Self {
        let timestamp = spark_to_chrono(timestamp);
        TemporalFormats {
            date: spark_to_chrono(date),
            timestamp_has_offset: timestamp.contains("%z") || timestamp.contains("%:z"),
            timestamp,
        }
    }

    pub fn from_options(options: &Options) -> Self {
        Self::from_patterns(
            get_ignore_case(options, keys::DATE_FORMAT).unwrap_or(DEFAULT_DATE_FORMAT),
            get_ignore_case(options, keys::TIMESTAMP_FORMAT).unwrap_or(DEFAULT_TIMESTAMP_FORMAT),
        )
    }

    fn parse_date(&self, s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, &self.date).ok()
    }

    fn parse_timestamp(&self, s: &str) -> Option<NaiveDateTime> {
        if self.timestamp_has_offset {
            DateTime::parse_from_str(s, &self.timestamp)
                .ok()
                .map(|dt| dt.naive_utc())
        } else {
            NaiveDateTime::parse_from_str(s, &self.timestamp).ok()
        }
    }
}

/// Whether string columns should be checked for dates and timestamps.
pub fn infer_enabled(options: &Options) -> bool {
    flag(options, keys::INFER_TIMESTAMP).unwrap_or(true)
}

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn days_to_date(days: i32) -> Option<NaiveDate> {
    epoch().checked_add_signed(TimeDelta::days(days as i64))
}

fn date_to_days(d: NaiveDate) -> i32 {
    d.signed_duration_since(epoch()).num_days() as i32
}

fn micros_to_datetime(us: i64) -> Option<NaiveDateTime> {
    let secs = us.div_euclid(1_000_000);
    let nanos = (us.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
}

fn to_micros(value: i64, unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => value.div_euclid(1_000),
        TimeUnit::Microseconds => value,
        TimeUnit::Milliseconds => value.saturating_mul(1_000),
    }
}

fn render(
    value: impl std::fmt::Display,
    column: &str,
    format: &str,
) -> Result<String, EngineError> {
    let mut s = String::new();
    write!(s, "{value}").map_err(|_| {
        EngineError::User(format!(
            "column '{column}': value cannot be written with format '{format}'"
        ))
    })?;
    Ok(s)
}

/// Replace Date and Datetime columns with strings in the configured formats.
pub fn format_columns(
    df: &PlDataFrame,
    formats: &TemporalFormats,
) -> Result<PlDataFrame, EngineError> {
    let mut out = df.clone();
    for column in df.get_columns() {
        let name = column.name().clone();
        let series = column.as_materialized_series();
        let rendered = match series.dtype() {
            DataType::Date => {
                let days = series.cast(&DataType::Int32).map_err(polars_to_engine_error)?;
                let days = days.i32().map_err(polars_to_engine_error)?;
                days.into_iter()
                    .map(|d| {
                        d.and_then(days_to_date)
                            .map(|d| render(d.format(&formats.date), &name, &formats.date))
                            .transpose()
                    })
                    .collect::<Result<Vec<Option<String>>, EngineError>>()?
            }
            DataType::Datetime(unit, _) => {
                let unit = *unit;
                let raw = series.cast(&DataType::Int64).map_err(polars_to_engine_error)?;
                let raw = raw.i64().map_err(polars_to_engine_error)?;
                raw.into_iter()
                    .map(|v| {
                        v.and_then(|v| micros_to_datetime(to_micros(v, unit)))
                            .map(|ts| {
                                render(
                                    ts.and_utc().format(&formats.timestamp),
                                    &name,
                                    &formats.timestamp,
                                )
                            })
                            .transpose()
                    })
                    .collect::<Result<Vec<Option<String>>, EngineError>>()?
            }
            _ => continue,
        };
        let strings = StringChunked::from_iter_options(name, rendered.into_iter());
        out.with_column(strings.into_series())
            .map_err(polars_to_engine_error)?;
    }
    Ok(out)
}

/// Convert string columns whose every non-null value parses as a date (or
/// failing that, a timestamp) into Date (or microsecond Datetime) columns.
pub fn infer_columns(
    mut df: PlDataFrame,
    formats: &TemporalFormats,
) -> Result<PlDataFrame, EngineError> {
    let candidates: Vec<Column> = df
        .get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String && c.null_count() < c.len())
        .cloned()
        .collect();
    for column in candidates {
        let name = column.name().clone();
        let strings = column.str().map_err(polars_to_engine_error)?;

        let dates: Option<Vec<Option<i32>>> = strings
            .into_iter()
            .map(|v| match v {
                None => Some(None),
                Some(s) => formats.parse_date(s.trim()).map(|d| Some(date_to_days(d))),
            })
            .collect();
        if let Some(dates) = dates {
            let series = Int32Chunked::from_iter_options(name.clone(), dates.into_iter())
                .into_series()
                .cast(&DataType::Date)
                .map_err(polars_to_engine_error)?;
            debug!(column = %name, "inferred date column");
            df.with_column(series).map_err(polars_to_engine_error)?;
            continue;
        }

        let stamps: Option<Vec<Option<i64>>> = strings
            .into_iter()
            .map(|v| match v {
                None => Some(None),
                Some(s) => formats
                    .parse_timestamp(s.trim())
                    .map(|ts| Some(ts.and_utc().timestamp_micros())),
            })
            .collect();
        if let Some(stamps) = stamps {
            let series = Int64Chunked::from_iter_options(name.clone(), stamps.into_iter())
                .into_series()
                .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
                .map_err(polars_to_engine_error)?;
            debug!(column = %name, "inferred timestamp column");
            df.with_column(series).map_err(polars_to_engine_error)?;
        }
    }
    Ok(df)
}
