// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Labelsheet.

use thiserror::Error;

/// Top-level error type for all Labelsheet operations.
///
/// Per-entry render failures are deliberately absent: a code the renderer
/// rejects is skipped, not propagated (see `labelsheet_document::render`).
#[derive(Debug, Error)]
pub enum LabelsheetError {
    // -- Input errors --
    #[error("No valid codes")]
    NoValidEntries,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Transport --
    #[error("sheet server error: {0}")]
    Server(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LabelsheetError>;
