// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup errors and shutdown plumbing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("no state directory: set LOUPE_STATE_DIR or HOME")]
    NoStateDir,

    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
