// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{DateTime, Utc};
use loupe_core::entry::EntryDetail;
use loupe_core::id::EntryId;

fn entry(line: u64) -> LogEntry {
    LogEntry {
        id: EntryId::new(),
        tenant_id: "acme".into(),
        job_id: "job-1".into(),
        line_number: line,
        timestamp: DateTime::<Utc>::default(),
        trace_id: None,
        rpc_id: None,
        thread_id: None,
        queue: None,
        user: None,
        duration_ms: Some(10),
        success: true,
        detail: EntryDetail::Api { form: Some("HPD:Help Desk".to_string()) },
        raw_text: String::new(),
        error_message: None,
    }
}

#[tokio::test]
async fn inserts_batch() {
    let store = MemoryLogStore::new();
    store.batch_insert_entries(&[entry(1), entry(2), entry(3)]).await.unwrap();
    assert_eq!(store.rows().len(), 3);
}

#[tokio::test]
async fn rejects_oversized_batch() {
    let store = MemoryLogStore::new();
    let batch: Vec<_> = (0..=MAX_BATCH_ROWS as u64).map(entry).collect();
    let err = store.batch_insert_entries(&batch).await.unwrap_err();
    assert!(matches!(err, StoreError::BatchTooLarge { .. }));
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn duplicate_line_rejects_whole_batch() {
    let store = MemoryLogStore::new();
    store.batch_insert_entries(&[entry(1)]).await.unwrap();

    let err = store.batch_insert_entries(&[entry(2), entry(1)]).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    // Nothing from the failed batch landed.
    assert_eq!(store.rows().len(), 1);
}

#[tokio::test]
async fn duplicate_within_one_batch_rejects() {
    let store = MemoryLogStore::new();
    let err = store.batch_insert_entries(&[entry(5), entry(5)]).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn same_line_number_across_jobs_is_fine() {
    let store = MemoryLogStore::new();
    let mut other = entry(1);
    other.job_id = "job-2".into();

    store.batch_insert_entries(&[entry(1)]).await.unwrap();
    store.batch_insert_entries(&[other]).await.unwrap();
    assert_eq!(store.rows().len(), 2);
}

#[tokio::test]
async fn rows_for_job_filters_by_identity() {
    let store = MemoryLogStore::new();
    let mut other_tenant = entry(9);
    other_tenant.tenant_id = "umbrella".into();

    store.batch_insert_entries(&[entry(1), other_tenant]).await.unwrap();
    let rows = store.rows_for_job(&"acme".into(), &"job-1".into());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].line_number, 1);
}
