// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key/value section parsing: General Statistics and File Metadata.

use super::sections::RawSection;
use super::ParseError;
use chrono::{DateTime, NaiveDateTime, Utc};
use loupe_core::{FileMetadata, GeneralStatistics, LogType};

/// Timestamp formats the analyzer emits, fractional seconds optional.
const TS_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

pub(crate) fn parse_timestamp(
    section: &str,
    line: usize,
    value: &str,
) -> Result<DateTime<Utc>, ParseError> {
    for format in TS_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ts.and_utc());
        }
    }
    Err(ParseError::new(section, line, format!("invalid timestamp {value:?}")))
}

fn parse_u64(section: &str, line: usize, key: &str, value: &str) -> Result<u64, ParseError> {
    value
        .parse()
        .map_err(|_| ParseError::new(section, line, format!("invalid number for {key}: {value:?}")))
}

fn parse_f64(section: &str, line: usize, key: &str, value: &str) -> Result<f64, ParseError> {
    value
        .parse()
        .map_err(|_| ParseError::new(section, line, format!("invalid number for {key}: {value:?}")))
}

fn split_kv<'a>(
    section: &str,
    line: usize,
    text: &'a str,
) -> Result<(&'a str, &'a str), ParseError> {
    text.split_once(':')
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| ParseError::new(section, line, format!("expected key: value, got {text:?}")))
}

/// Parse `=== General Statistics ===`. Returns the statistics plus the
/// optional health score.
pub(crate) fn parse_general(
    section: &RawSection,
) -> Result<(GeneralStatistics, Option<f64>), ParseError> {
    let name = &section.name;
    let mut stats = GeneralStatistics::default();
    let mut health_score = None;

    for (line, text) in &section.lines {
        let (key, value) = split_kv(name, *line, text)?;
        match key {
            "log_start" => stats.log_start = Some(parse_timestamp(name, *line, value)?),
            "log_end" => stats.log_end = Some(parse_timestamp(name, *line, value)?),
            "total_lines" => stats.total_lines = parse_u64(name, *line, key, value)?,
            "api_count" => stats.api_count = parse_u64(name, *line, key, value)?,
            "sql_count" => stats.sql_count = parse_u64(name, *line, key, value)?,
            "filter_count" => stats.filter_count = parse_u64(name, *line, key, value)?,
            "escalation_count" => stats.escalation_count = parse_u64(name, *line, key, value)?,
            "error_count" => stats.error_count = parse_u64(name, *line, key, value)?,
            "health_score" => health_score = Some(parse_f64(name, *line, key, value)?),
            // Analyzer versions add keys; unknown ones pass through.
            _ => {}
        }
    }

    Ok((stats, health_score))
}

/// Parse `=== File Metadata ===`.
pub(crate) fn parse_file_metadata(section: &RawSection) -> Result<FileMetadata, ParseError> {
    let name = &section.name;
    let mut meta = FileMetadata::default();

    for (line, text) in &section.lines {
        let (key, value) = split_kv(name, *line, text)?;
        match key {
            "name" => meta.name = Some(value.to_string()),
            "size_bytes" => meta.size_bytes = parse_u64(name, *line, key, value)?,
            "line_count" => meta.line_count = parse_u64(name, *line, key, value)?,
            "log_start" => meta.log_start = Some(parse_timestamp(name, *line, value)?),
            "log_end" => meta.log_end = Some(parse_timestamp(name, *line, value)?),
            "log_types" => {
                meta.log_types = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        LogType::parse(s).ok_or_else(|| {
                            ParseError::new(name, *line, format!("unknown log type {s:?}"))
                        })
                    })
                    .collect::<Result<_, _>>()?;
            }
            _ => {}
        }
    }

    Ok(meta)
}
