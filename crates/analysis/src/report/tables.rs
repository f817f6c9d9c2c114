// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipe-delimited table parsing for tabular report sections.

use super::sections::RawSection;
use super::stats::parse_timestamp;
use super::ParseError;
use indexmap::IndexMap;
use loupe_core::{
    Aggregate, ExceptionRecord, FilterStat, LoggingActivity, QueueHealth, QueuedCall, ThreadStat,
    TopEntry,
};

/// A parsed table: named columns plus data rows.
struct Table<'a> {
    section: &'a str,
    columns: Vec<String>,
    rows: Vec<Row>,
}

struct Row {
    line: usize,
    cells: Vec<String>,
}

impl<'a> Table<'a> {
    /// First body line is the header; everything after it is data.
    fn parse(section: &'a RawSection) -> Result<Self, ParseError> {
        let mut lines = section.lines.iter();
        let (header_line, header) = lines
            .next()
            .ok_or_else(|| ParseError::new(&section.name, 0, "missing table header"))?;

        let columns: Vec<String> = split_cells(header);
        if columns.is_empty() {
            return Err(ParseError::new(&section.name, *header_line, "empty table header"));
        }

        let mut rows = Vec::new();
        for (line, text) in lines {
            let cells = split_cells(text);
            if cells.len() != columns.len() {
                return Err(ParseError::new(
                    &section.name,
                    *line,
                    format!("expected {} cells, got {}", columns.len(), cells.len()),
                ));
            }
            rows.push(Row { line: *line, cells });
        }

        Ok(Self { section: &section.name, columns, rows })
    }

    fn col(&self, name: &str) -> Result<usize, ParseError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ParseError::new(self.section, 0, format!("missing column {name:?}")))
    }

    fn str<'b>(&self, row: &'b Row, col: usize) -> &'b str {
        &row.cells[col]
    }

    fn opt_str(&self, row: &Row, col: usize) -> Option<String> {
        let value = self.str(row, col);
        (!value.is_empty() && value != "-").then(|| value.to_string())
    }

    fn u64(&self, row: &Row, col: usize) -> Result<u64, ParseError> {
        let value = self.str(row, col);
        value.parse().map_err(|_| {
            ParseError::new(
                self.section,
                row.line,
                format!("invalid number in column {:?}: {value:?}", self.columns[col]),
            )
        })
    }

    fn u32(&self, row: &Row, col: usize) -> Result<u32, ParseError> {
        let value = self.str(row, col);
        value.parse().map_err(|_| {
            ParseError::new(
                self.section,
                row.line,
                format!("invalid number in column {:?}: {value:?}", self.columns[col]),
            )
        })
    }

    fn f64(&self, row: &Row, col: usize) -> Result<f64, ParseError> {
        let value = self.str(row, col);
        value.parse().map_err(|_| {
            ParseError::new(
                self.section,
                row.line,
                format!("invalid number in column {:?}: {value:?}", self.columns[col]),
            )
        })
    }
}

fn split_cells(line: &str) -> Vec<String> {
    line.split('|').map(|c| c.trim().to_string()).collect()
}

/// Parse a top-N leaderboard (slow APIs, slow SQL, top filters/escalations).
pub(crate) fn parse_top_entries(section: &RawSection) -> Result<Vec<TopEntry>, ParseError> {
    let table = Table::parse(section)?;
    let rank = table.col("rank")?;
    let identifier = table.col("identifier")?;
    let count = table.col("count")?;
    let total_ms = table.col("total_ms")?;
    let min_ms = table.col("min_ms")?;
    let max_ms = table.col("max_ms")?;
    let avg_ms = table.col("avg_ms")?;
    let errors = table.col("errors")?;
    let trace_id = table.col("trace_id")?;
    let thread_id = table.col("thread_id")?;
    let queue = table.col("queue")?;
    let user = table.col("user")?;

    table
        .rows
        .iter()
        .map(|row| {
            Ok(TopEntry {
                rank: table.u32(row, rank)?,
                identifier: table.str(row, identifier).to_string(),
                count: table.u64(row, count)?,
                total_ms: table.u64(row, total_ms)?,
                min_ms: table.u64(row, min_ms)?,
                max_ms: table.u64(row, max_ms)?,
                avg_ms: table.f64(row, avg_ms)?,
                error_count: table.u64(row, errors)?,
                trace_id: table.opt_str(row, trace_id),
                thread_id: table.opt_str(row, thread_id),
                queue: table.opt_str(row, queue),
                user: table.opt_str(row, user),
            })
        })
        .collect()
}

/// Parse `=== Errors ===` into the error distribution map.
pub(crate) fn parse_error_counts(
    section: &RawSection,
) -> Result<IndexMap<String, u64>, ParseError> {
    let table = Table::parse(section)?;
    let message = table.col("message")?;
    let count = table.col("count")?;

    let mut map = IndexMap::new();
    for row in &table.rows {
        map.insert(table.str(row, message).to_string(), table.u64(row, count)?);
    }
    Ok(map)
}

pub(crate) fn parse_aggregates(section: &RawSection) -> Result<Vec<Aggregate>, ParseError> {
    let table = Table::parse(section)?;
    let log_type = table.col("log_type")?;
    let identifier = table.col("identifier")?;
    let count = table.col("count")?;
    let total_ms = table.col("total_ms")?;
    let min_ms = table.col("min_ms")?;
    let max_ms = table.col("max_ms")?;
    let avg_ms = table.col("avg_ms")?;
    let errors = table.col("errors")?;
    let error_rate = table.col("error_rate_pct")?;
    let traces = table.col("unique_traces")?;

    table
        .rows
        .iter()
        .map(|row| {
            Ok(Aggregate {
                log_type: table
                    .opt_str(row, log_type)
                    .and_then(|s| loupe_core::LogType::parse(&s)),
                identifier: table.str(row, identifier).to_string(),
                count: table.u64(row, count)?,
                total_ms: table.u64(row, total_ms)?,
                min_ms: table.u64(row, min_ms)?,
                max_ms: table.u64(row, max_ms)?,
                avg_ms: table.f64(row, avg_ms)?,
                error_count: table.u64(row, errors)?,
                error_rate_pct: table.f64(row, error_rate)?,
                unique_traces: table.u64(row, traces)?,
            })
        })
        .collect()
}

pub(crate) fn parse_exceptions(section: &RawSection) -> Result<Vec<ExceptionRecord>, ParseError> {
    let table = Table::parse(section)?;
    let message = table.col("message")?;
    let count = table.col("count")?;
    let rate = table.col("rate_pct")?;

    table
        .rows
        .iter()
        .map(|row| {
            Ok(ExceptionRecord {
                message: table.str(row, message).to_string(),
                count: table.u64(row, count)?,
                rate_pct: table.f64(row, rate)?,
            })
        })
        .collect()
}

pub(crate) fn parse_thread_stats(section: &RawSection) -> Result<Vec<ThreadStat>, ParseError> {
    let table = Table::parse(section)?;
    let thread_id = table.col("thread_id")?;
    let api_count = table.col("api_count")?;
    let sql_count = table.col("sql_count")?;
    let total_ms = table.col("total_ms")?;
    let trace_count = table.col("trace_count")?;

    table
        .rows
        .iter()
        .map(|row| {
            Ok(ThreadStat {
                thread_id: table.str(row, thread_id).to_string(),
                api_count: table.u64(row, api_count)?,
                sql_count: table.u64(row, sql_count)?,
                total_ms: table.u64(row, total_ms)?,
                trace_count: table.u64(row, trace_count)?,
            })
        })
        .collect()
}

pub(crate) fn parse_filter_stats(section: &RawSection) -> Result<Vec<FilterStat>, ParseError> {
    let table = Table::parse(section)?;
    let name = table.col("name")?;
    let count = table.col("count")?;
    let total_ms = table.col("total_ms")?;
    let avg_ms = table.col("avg_ms")?;

    table
        .rows
        .iter()
        .map(|row| {
            Ok(FilterStat {
                name: table.str(row, name).to_string(),
                count: table.u64(row, count)?,
                total_ms: table.u64(row, total_ms)?,
                avg_ms: table.f64(row, avg_ms)?,
            })
        })
        .collect()
}

pub(crate) fn parse_queue_health(section: &RawSection) -> Result<Vec<QueueHealth>, ParseError> {
    let table = Table::parse(section)?;
    let queue = table.col("queue")?;
    let call_count = table.col("call_count")?;
    let avg = table.col("avg_duration_ms")?;
    let p95 = table.col("p95_duration_ms")?;
    let errors = table.col("errors")?;

    table
        .rows
        .iter()
        .map(|row| {
            Ok(QueueHealth {
                queue: table.str(row, queue).to_string(),
                call_count: table.u64(row, call_count)?,
                avg_duration_ms: table.f64(row, avg)?,
                p95_duration_ms: table.u64(row, p95)?,
                error_count: table.u64(row, errors)?,
            })
        })
        .collect()
}

pub(crate) fn parse_queued_calls(section: &RawSection) -> Result<Vec<QueuedCall>, ParseError> {
    let table = Table::parse(section)?;
    let queue = table.col("queue")?;
    let rpc_id = table.col("rpc_id")?;
    let wait_ms = table.col("wait_ms")?;
    let timestamp = table.col("timestamp")?;

    table
        .rows
        .iter()
        .map(|row| {
            Ok(QueuedCall {
                queue: table.str(row, queue).to_string(),
                rpc_id: table.opt_str(row, rpc_id),
                wait_ms: table.u64(row, wait_ms)?,
                timestamp: parse_timestamp(table.section, row.line, table.str(row, timestamp))?,
            })
        })
        .collect()
}

pub(crate) fn parse_logging_activity(
    section: &RawSection,
) -> Result<Vec<LoggingActivity>, ParseError> {
    let table = Table::parse(section)?;
    let label = table.col("label")?;
    let line_count = table.col("line_count")?;

    table
        .rows
        .iter()
        .map(|row| {
            Ok(LoggingActivity {
                label: table.str(row, label).to_string(),
                line_count: table.u64(row, line_count)?,
            })
        })
        .collect()
}
