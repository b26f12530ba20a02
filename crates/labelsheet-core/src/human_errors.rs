// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the people pasting code lists.
//
// Every technical error is mapped to a short sentence plus the HTTP status the
// transport layer should answer with.

use crate::error::LabelsheetError;

/// Who has to act on an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The input must be fixed (no codes, malformed JSON, oversized body).
    ClientInput,
    /// Something inside the service failed; the input may be fine.
    Internal,
}

/// A human-readable error ready to be sent back to a client.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary, used as the `error` field of the JSON body.
    pub message: String,
    /// HTTP status code to answer with.
    pub status: u16,
    /// Drives logging level and status class.
    pub severity: Severity,
}

/// Convert a `LabelsheetError` into a `HumanError`.
pub fn humanize_error(err: &LabelsheetError) -> HumanError {
    match err {
        LabelsheetError::NoValidEntries => HumanError {
            message: "No valid codes".into(),
            status: 400,
            severity: Severity::ClientInput,
        },

        LabelsheetError::InvalidRequest(detail) => HumanError {
            message: format!("Invalid request: {detail}"),
            status: 400,
            severity: Severity::ClientInput,
        },

        LabelsheetError::PayloadTooLarge { limit } => HumanError {
            message: format!("Request is too large (limit {limit} bytes)"),
            status: 413,
            severity: Severity::ClientInput,
        },

        // Everything else is our fault; surface the underlying message.
        other => HumanError {
            message: other.to_string(),
            status: 500,
            severity: Severity::Internal,
        },
    }
}
