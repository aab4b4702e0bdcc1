// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How filenames in a scan folder are classified into slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationStrategy {
    /// Fixed case-sensitive substring per slot (e.g. `ScanNormalFront`).
    #[default]
    PatternSubstring,
    /// Lower-cased name before the first `.` looked up in a token table.
    PrefixToken,
}

impl std::str::FromStr for ClassificationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pattern-substring" | "pattern" => Ok(Self::PatternSubstring),
            "prefix-token" | "prefix" => Ok(Self::PrefixToken),
            other => Err(format!("unknown classification strategy: {other}")),
        }
    }
}

/// What to do when the scan folder does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingFolderPolicy {
    /// Produce an empty request; the service tolerates partial scans.
    #[default]
    Empty,
    /// Fail with `ScanAuthError::FolderNotFound`.
    Error,
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Folder scanned when none is given on the command line.
    pub default_folder: PathBuf,
    pub strategy: ClassificationStrategy,
    pub missing_folder: MissingFolderPolicy,
    /// Where service logs and the report log go (default: `<data dir>/Logs`).
    pub log_directory: Option<PathBuf>,
    /// Location of the authentication host binaries, if not the default.
    pub host_directory: Option<PathBuf>,
    /// File name of the report log inside the log directory.
    pub report_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_folder: PathBuf::from("scanSets").join("Failed"),
            strategy: ClassificationStrategy::default(),
            missing_folder: MissingFolderPolicy::default(),
            log_directory: None,
            host_directory: None,
            report_file: "AuthenticationLog.txt".into(),
        }
    }
}
