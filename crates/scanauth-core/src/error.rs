// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for scanauth.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all scanauth operations.
#[derive(Debug, Error)]
pub enum ScanAuthError {
    // -- Scan folder errors --
    #[error("file read error: {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scan folder not found: {0}")]
    FolderNotFound(PathBuf),

    // -- Authentication service errors --
    #[error("authentication host error: {0}")]
    Host(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("document processing failed: {0}")]
    Processing(String),

    #[error("authentication service is not initialized")]
    NotInitialized,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanAuthError>;
