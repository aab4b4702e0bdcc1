// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-text rendering of an authentication response.

use std::fmt::{self, Write as _};
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use scanauth_core::error::{Result, ScanAuthError};
use scanauth_core::{AuthenticationResponse, AuthenticationTestResult};

/// Context printed above the result.
#[derive(Debug, Clone)]
pub struct ReportHeader {
    pub timestamp: DateTime<FixedOffset>,
    pub folder: String,
    pub elapsed: Duration,
    pub host_version: String,
}

/// Render the full report: header, status, test tree and document JSON.
pub fn render_report(header: &ReportHeader, response: &AuthenticationResponse) -> Result<String> {
    let documents = match &response.result {
        Some(_) => Some((
            serde_json::to_string_pretty(&response.document)?,
            serde_json::to_string_pretty(&response.plain_document)?,
        )),
        None => None,
    };

    let mut out = String::new();
    write_report(&mut out, header, response, documents.as_ref())
        .map_err(|e| ScanAuthError::Io(std::io::Error::other(e)))?;
    Ok(out)
}

fn write_report(
    out: &mut String,
    header: &ReportHeader,
    response: &AuthenticationResponse,
    documents: Option<&(String, String)>,
) -> fmt::Result {
    writeln!(out, "{}", header.timestamp.to_rfc3339())?;
    writeln!(
        out,
        "Authentication Result for \"{}\" in : {} ms",
        header.folder,
        header.elapsed.as_millis()
    )?;
    writeln!(out, "HostVersion: {}", header.host_version)?;

    let (Some(result), Some((document, plain_document))) = (&response.result, documents) else {
        return writeln!(out, "Result unassigned!");
    };

    writeln!(out, "Authentication status: {:?}", result.authentication_status)?;
    writeln!(out, "Tests:")?;
    write_tests(out, &result.grouped_results, "  ")?;

    writeln!(out)?;
    writeln!(out, "Document property value:")?;
    writeln!(out, "{document}")?;

    writeln!(out)?;
    writeln!(out, "PlainDocument property value:")?;
    writeln!(out, "{plain_document}")
}

fn write_tests(out: &mut String, tests: &[AuthenticationTestResult], indent: &str) -> fmt::Result {
    for test in tests {
        writeln!(
            out,
            "{indent}{}: {} {:?} {}",
            test.name, test.code, test.test_status, test.confidence
        )?;

        for m in &test.cross_matches {
            writeln!(
                out,
                "  {indent}Match \"{}\": {} = {}; {} = {}; Confidence = {}",
                m.field_name,
                m.item1.data_source,
                m.item1.value,
                m.item2.data_source,
                m.item2.value,
                m.confidence
            )?;
        }

        write_tests(out, &test.child_tests, &format!("{indent}  "))?;
    }
    Ok(())
}
