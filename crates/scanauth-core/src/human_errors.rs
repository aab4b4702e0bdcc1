// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operator-facing error messages.
//
// Every technical error is mapped to a short message with a next step. The
// severity tells the console whether running again could help.

use std::io::ErrorKind;

use crate::error::ScanAuthError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Host hiccup or lost connection; running again may succeed.
    Transient,
    /// Operator must fix something (missing folder, permissions, config).
    ActionRequired,
    /// The input itself is unusable.
    Permanent,
}

/// A readable error with a message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n  {}", self.message, self.suggestion)
    }
}

/// Convert a `ScanAuthError` into a `HumanError` for the console.
pub fn humanize_error(err: &ScanAuthError) -> HumanError {
    match err {
        ScanAuthError::FileRead { path, source } => humanize_read_error(path, source),

        ScanAuthError::FolderNotFound(path) => HumanError {
            message: format!("The scan folder \"{}\" does not exist.", path.display()),
            suggestion: "Check the folder path, or pass a folder on the command line.".into(),
            severity: Severity::ActionRequired,
        },

        ScanAuthError::Host(detail) => HumanError {
            message: "The authentication host could not be started.".into(),
            suggestion: format!(
                "Check that the host is installed and the host directory setting points at it. \
                 ({detail})"
            ),
            severity: Severity::ActionRequired,
        },

        ScanAuthError::Transport(detail) => HumanError {
            message: "Lost contact with the authentication host.".into(),
            suggestion: format!("Run the request again. ({detail})"),
            severity: Severity::Transient,
        },

        ScanAuthError::Processing(detail) => HumanError {
            message: "The document could not be processed.".into(),
            suggestion: format!(
                "Rescan the document and make sure the images are complete. ({detail})"
            ),
            severity: Severity::Permanent,
        },

        ScanAuthError::NotInitialized => HumanError {
            message: "The authentication service was used before it was started.".into(),
            suggestion: "This is a bug in the caller; initialize the service first.".into(),
            severity: Severity::Permanent,
        },

        ScanAuthError::Io(io_err) => match io_err.kind() {
            ErrorKind::PermissionDenied => HumanError {
                message: "Permission denied.".into(),
                suggestion: "Check that the log directory is writable.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "A file operation failed.".into(),
                suggestion: format!("Run again; if it keeps failing check the disk. ({io_err})"),
                severity: Severity::Transient,
            },
        },

        ScanAuthError::Serialization(e) => HumanError {
            message: "Could not format the result.".into(),
            suggestion: format!("Detail: {e}"),
            severity: Severity::Permanent,
        },
    }
}

fn humanize_read_error(path: &std::path::Path, source: &std::io::Error) -> HumanError {
    match source.kind() {
        ErrorKind::InvalidData => HumanError {
            message: format!("\"{}\" is not readable text.", path.display()),
            suggestion: "Raw-data files must hold the decoded barcode text as UTF-8, or as \
                         UTF-16 with a byte order mark."
                .into(),
            severity: Severity::Permanent,
        },
        ErrorKind::PermissionDenied => HumanError {
            message: format!("Not allowed to read \"{}\".", path.display()),
            suggestion: "Check the file permissions, then run again.".into(),
            severity: Severity::ActionRequired,
        },
        _ => HumanError {
            message: format!("Could not read \"{}\".", path.display()),
            suggestion: format!("The file may have been moved while scanning. ({source})"),
            severity: Severity::Transient,
        },
    }
}
