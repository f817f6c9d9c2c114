// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw AR-Server log parsing.
//!
//! Streams the downloaded file, classifies each line into a [`LogEntry`] by
//! its leading tag, and flushes batches through an async callback. Lines
//! look like:
//!
//! ```text
//! <API > <TID: 0000000336> <RPC ID: 0000021396> <TRID: a1> <Queue: Fast> <USER: Demo> /* Tue Jun 10 2025 11:20:16.2207 */ +GLEWF ARGetListEntryWithFields -- schema HPD:Help Desk (98 ms)
//! ```
//!
//! Unparseable lines are counted and skipped; raw ingestion is best-effort
//! end to end.

use chrono::{DateTime, NaiveDateTime, Utc};
use loupe_core::entry::{EntryDetail, LogEntry, LogType};
use loupe_core::job::JobId;
use loupe_core::{EntryId, TenantId};
use std::collections::HashMap;
use std::future::Future;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Default rows per flush.
pub const DEFAULT_BATCH_SIZE: usize = 5_000;

/// AR-Server timestamp format inside `/* … */` markers.
const TS_FORMAT: &str = "%a %b %d %Y %H:%M:%S%.f";

/// Error type flush callbacks report with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from one raw-log pass.
#[derive(Debug, Error)]
pub enum RawLogError {
    #[error("read failed at line {line}: {source}")]
    Io {
        line: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("flush failed after {parsed} entries: {source}")]
    Flush {
        parsed: u64,
        #[source]
        source: BoxError,
    },
}

/// Totals from one raw-log pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParseSummary {
    pub parsed: u64,
    pub skipped: u64,
    pub by_type: HashMap<LogType, u64>,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
}

/// Streaming classifier for raw AR-Server logs.
#[derive(Debug, Clone)]
pub struct RawLogParser {
    batch_size: usize,
}

impl Default for RawLogParser {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl RawLogParser {
    /// `batch_size` of zero collapses to 1.
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size: batch_size.max(1) }
    }

    /// Stream `reader`, emitting batches of parsed entries through `flush`.
    ///
    /// A flush failure aborts the pass and reports the partial count; parse
    /// failures only increment `skipped`.
    pub async fn parse_stream<R, F, Fut>(
        &self,
        reader: R,
        tenant: &TenantId,
        job: &JobId,
        mut flush: F,
    ) -> Result<RawParseSummary, RawLogError>
    where
        R: AsyncBufRead + Unpin,
        F: FnMut(Vec<LogEntry>) -> Fut,
        Fut: Future<Output = Result<(), BoxError>>,
    {
        let mut lines = reader.lines();
        let mut summary = RawParseSummary::default();
        let mut line_number: u64 = 0;
        let mut batch: Vec<LogEntry> = Vec::with_capacity(self.batch_size);

        loop {
            let line = lines
                .next_line()
                .await
                .map_err(|source| RawLogError::Io { line: line_number + 1, source })?;
            let Some(line) = line else { break };
            line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            match parse_line(&line, line_number, tenant, job) {
                Some(entry) => {
                    summary.parsed += 1;
                    *summary.by_type.entry(entry.log_type()).or_insert(0) += 1;
                    if summary.first_timestamp.is_none() {
                        summary.first_timestamp = Some(entry.timestamp);
                    }
                    summary.last_timestamp = Some(entry.timestamp);

                    batch.push(entry);
                    if batch.len() >= self.batch_size {
                        let full = std::mem::replace(
                            &mut batch,
                            Vec::with_capacity(self.batch_size),
                        );
                        flush(full).await.map_err(|source| RawLogError::Flush {
                            parsed: summary.parsed,
                            source,
                        })?;
                    }
                }
                None => summary.skipped += 1,
            }
        }

        if !batch.is_empty() {
            flush(batch)
                .await
                .map_err(|source| RawLogError::Flush { parsed: summary.parsed, source })?;
        }

        tracing::debug!(
            %tenant,
            %job,
            parsed = summary.parsed,
            skipped = summary.skipped,
            "raw log pass finished"
        );

        Ok(summary)
    }
}

/// Classify one line. `None` means the line is not an AR-Server log line.
fn parse_line(line: &str, line_number: u64, tenant: &TenantId, job: &JobId) -> Option<LogEntry> {
    let rest = line.strip_prefix('<')?;
    let (tag, rest) = rest.split_once('>')?;
    let log_type = LogType::parse(tag.trim())?;

    let timestamp = between(line, "/*", "*/")
        .and_then(|s| NaiveDateTime::parse_from_str(s.trim(), TS_FORMAT).ok())
        .map(|ts| ts.and_utc())?;

    let thread_id = bracket_field(rest, "TID");
    let rpc_id = bracket_field(rest, "RPC ID");
    let trace_id = bracket_field(rest, "TRID");
    let queue = bracket_field(rest, "Queue");
    let user = bracket_field(rest, "USER");

    // Body text follows the closing `*/` marker.
    let body = line.split("*/").nth(1).unwrap_or("").trim();

    let duration_ms = trailing_duration(body);
    let error_message = body.find("ARERR").map(|at| strip_duration(&body[at..]));
    let success = error_message.is_none();

    let detail = match log_type {
        LogType::Api => EntryDetail::Api {
            form: after_marker(body, "-- schema ").map(|f| match f.find(" ARERR") {
                Some(at) => f[..at].trim().to_string(),
                None => f,
            }),
        },
        LogType::Sql => EntryDetail::Sql { table: sql_table(body) },
        LogType::Fltr => EntryDetail::Filter {
            name: quoted(body),
            operation: after_marker(body, "-- "),
        },
        LogType::Escl => EntryDetail::Escalation {
            name: quoted(body),
            pool: after_marker(body, "on pool "),
        },
    };

    Some(LogEntry {
        id: EntryId::new(),
        tenant_id: tenant.clone(),
        job_id: job.clone(),
        line_number,
        timestamp,
        trace_id,
        rpc_id,
        thread_id,
        queue,
        user,
        duration_ms,
        success,
        detail,
        raw_text: line.to_string(),
        error_message,
    })
}

/// Extract the text between `open` and `close` markers.
fn between<'a>(line: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = line.find(open)? + open.len();
    let end = line[start..].find(close)? + start;
    Some(&line[start..end])
}

/// Extract `<KEY: value>` from the field area.
fn bracket_field(fields: &str, key: &str) -> Option<String> {
    let marker = format!("<{key}: ");
    let start = fields.find(&marker)? + marker.len();
    let end = fields[start..].find('>')? + start;
    let value = fields[start..end].trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Trailing `(N ms)` duration.
fn trailing_duration(body: &str) -> Option<u64> {
    let open = body.rfind('(')?;
    let inner = body[open + 1..].strip_suffix(')')?;
    inner.strip_suffix(" ms")?.trim().parse().ok()
}

/// Cut a trailing `(N ms)` off an error tail.
fn strip_duration(text: &str) -> String {
    match text.rfind(" (") {
        Some(at) if trailing_duration(text).is_some() => text[..at].trim().to_string(),
        _ => text.trim().to_string(),
    }
}

/// Text after `marker`, up to a trailing duration or the line end.
fn after_marker(body: &str, marker: &str) -> Option<String> {
    let start = body.find(marker)? + marker.len();
    let tail = &body[start..];
    let end = match tail.rfind(" (") {
        Some(at) if trailing_duration(tail).is_some() => at,
        _ => tail.len(),
    };
    let value = tail[..end].trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// First double-quoted token.
fn quoted(body: &str) -> Option<String> {
    let start = body.find('"')? + 1;
    let end = body[start..].find('"')? + start;
    let value = &body[start..end];
    (!value.is_empty()).then(|| value.to_string())
}

/// Table named by the first `FROM`/`INTO`/`UPDATE` keyword in the statement.
fn sql_table(body: &str) -> Option<String> {
    let upper = body.to_uppercase();
    let hit = ["FROM ", "INTO ", "UPDATE "]
        .iter()
        .filter_map(|k| upper.find(k).map(|at| (at, k.len())))
        .min_by_key(|(at, _)| *at)?;
    body[hit.0 + hit.1..]
        .split_whitespace()
        .next()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '_').to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
#[path = "rawlog_tests.rs"]
mod tests;
