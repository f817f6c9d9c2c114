// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Uploaded log file record.

use crate::tenant::TenantId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier for an uploaded log file, assigned at upload time.
    pub struct FileId;
}

/// An uploaded AR-Server log file. Immutable after upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFile {
    pub id: FileId,
    pub tenant_id: TenantId,
    /// Key of the blob in the object store.
    pub blob_key: String,
    pub size_bytes: u64,
    /// Hex-encoded SHA-256 of the blob, recorded at upload.
    pub checksum: String,
}
