// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for tests across the workspace.
//!
//! Gated behind the `test-support` feature so production builds never
//! carry them.

/// A small raw AR-Server log: two API calls, one SQL statement, one filter,
/// one escalation, one failed API call, and one unparseable line.
pub const SAMPLE_RAW_LOG: &str = "\
<API > <TID: 0000000336> <RPC ID: 0000021396> <TRID: a1> <Queue: Fast> <USER: Demo> /* Tue Jun 10 2025 11:20:16.2207 */ +GLEWF ARGetListEntryWithFields -- schema HPD:Help Desk (98 ms)
<SQL > <TID: 0000000336> <RPC ID: 0000021396> <TRID: a1> <Queue: Fast> <USER: Demo> /* Tue Jun 10 2025 11:20:16.3101 */ SELECT C1 FROM T100 WHERE C1 = 42 (12 ms)
<FLTR> <TID: 0000000337> <RPC ID: 0000021397> <TRID: a2> <Queue: List> <USER: Demo> /* Tue Jun 10 2025 11:20:17.0040 */ Checking \"HPD:INC:SetDefaults\" -- Perform Actions (3 ms)
<ESCL> <TID: 0000000338> <RPC ID: 0000021398> <TRID: a3> <Queue: Admin> <USER: AR_ESCALATOR> /* Tue Jun 10 2025 11:21:02.1150 */ Escalation \"Esc:Cleanup\" on pool 2 (40 ms)
<API > <TID: 0000000339> <RPC ID: 0000021399> <TRID: a4> <Queue: Fast> <USER: Demo> /* Tue Jun 10 2025 11:21:30.5000 */ +GLE ARGetEntry -- schema HPD:Help Desk ARERR [302] Entry does not exist (200 ms)
this line is not an AR server log line
";

/// An analyzer report covering every native section.
pub fn sample_report() -> String {
    "\
=== General Statistics ===
log_start: 2025-06-10 11:20:16.220
log_end: 2025-06-10 12:20:19.585
total_lines: 3000
api_count: 50
sql_count: 120
filter_count: 300
escalation_count: 4
error_count: 3
health_score: 87.5

=== Slow API Calls ===
rank | identifier | count | total_ms | min_ms | max_ms | avg_ms | errors | trace_id | thread_id | queue | user
1 | HPD:Help Desk | 12 | 5400 | 100 | 2100 | 450.0 | 1 | a1 | 0000000336 | Fast | Demo
2 | CHG:Change | 8 | 1200 | 90 | 260 | 150.0 | 0 | a2 | 0000000337 | Fast | Demo
3 | PBM:Problem | 6 | 780 | 80 | 200 | 130.0 | 0 | a3 | 0000000338 | List | Demo

=== Slow SQL Statements ===
rank | identifier | count | total_ms | min_ms | max_ms | avg_ms | errors | trace_id | thread_id | queue | user
1 | T100 | 40 | 2000 | 10 | 300 | 50.0 | 0 | a1 | 0000000336 | Fast | Demo
2 | T250 | 30 | 900 | 8 | 120 | 30.0 | 1 | a2 | 0000000337 | Fast | Demo

=== Errors ===
message | count
ARERR [302] Entry does not exist | 2
ARERR [92] Timeout during database update | 1
"
    .to_string()
}

/// A report with only the statistics section, leaving every derived section
/// for the enhancer to fill.
pub fn minimal_report() -> String {
    "\
=== General Statistics ===
log_start: 2025-06-10 11:20:16.220
log_end: 2025-06-10 11:20:45.000
total_lines: 120
api_count: 6
sql_count: 3
filter_count: 0
escalation_count: 1
error_count: 1
"
    .to_string()
}
