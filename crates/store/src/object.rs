// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object-storage contract for uploaded log blobs.

use crate::error::StoreError;
use async_trait::async_trait;
use tokio::io::AsyncRead;

/// Byte stream of one downloaded blob.
pub type BlobStream = Box<dyn AsyncRead + Send + Unpin>;

/// Read-only blob access. Blobs are immutable after upload and the stream
/// is forward-only: seeking means downloading again.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn download(&self, blob_key: &str) -> Result<BlobStream, StoreError>;
}
