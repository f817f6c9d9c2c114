// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory object store.

use crate::error::StoreError;
use crate::object::{BlobStream, ObjectStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Cursor;

/// Blobs held in a map; downloads hand out an owned cursor, so re-download
/// is the only way to rewind, same as a remote store.
#[derive(Default)]
pub struct MemoryObjectStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, blob_key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.blobs.lock().insert(blob_key.into(), bytes.into());
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn download(&self, blob_key: &str) -> Result<BlobStream, StoreError> {
        let bytes = self
            .blobs
            .lock()
            .get(blob_key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("blob {blob_key}")))?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod tests;
