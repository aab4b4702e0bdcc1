// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Response model returned by the authentication service.
//
// The shape mirrors what the service hands back; beyond rendering it, nothing
// in scanauth interprets these values.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier the service assigns to one processed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Overall verdict for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticationStatus {
    Authentic,
    Failed,
    Attention,
    /// No verdict could be reached (e.g. not enough input).
    Unknown,
}

/// Outcome of a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    Passed,
    Failed,
    Warning,
    Skipped,
}

/// Stage reported while a request is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStatus {
    Started,
    LoadingImages,
    Analyzing,
    Matching,
    Completed,
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Started => "Started",
            Self::LoadingImages => "LoadingImages",
            Self::Analyzing => "Analyzing",
            Self::Matching => "Matching",
            Self::Completed => "Completed",
        };
        f.write_str(s)
    }
}

/// One side of a cross-field comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchItem {
    /// Where the value came from (e.g. "PDF417", "Front OCR").
    pub data_source: String,
    pub value: String,
}

/// Comparison of the same field read from two sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossMatch {
    pub field_name: String,
    pub item1: MatchItem,
    pub item2: MatchItem,
    pub confidence: u8,
}

/// A node in the (possibly nested) test tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationTestResult {
    pub name: String,
    pub code: String,
    pub test_status: TestStatus,
    /// 0-100.
    pub confidence: u8,
    #[serde(default)]
    pub cross_matches: Vec<CrossMatch>,
    #[serde(default)]
    pub child_tests: Vec<AuthenticationTestResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationResult {
    pub authentication_status: AuthenticationStatus,
    #[serde(default)]
    pub grouped_results: Vec<AuthenticationTestResult>,
}

/// Everything the service returns for one request.
///
/// `document` and `plain_document` are opaque JSON blobs and are only
/// pretty-printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationResponse {
    pub transaction_id: TransactionId,
    pub result: Option<AuthenticationResult>,
    pub document: Option<serde_json::Value>,
    pub plain_document: Option<serde_json::Value>,
}

/// Information about the authentication host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub host_version: String,
}
