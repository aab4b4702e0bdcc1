// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Loopback host for machines without the authentication host installed.
//
// It answers every request in-process with a completeness report (which slots
// were supplied, what the images look like) and never reaches a verdict: the
// status is always `Unknown`.

use async_trait::async_trait;
use scanauth_core::error::{Result, ScanAuthError};
use scanauth_core::types::{ImageType, RawDataSource, ScanResult};
use scanauth_core::{
    AuthenticationResponse, AuthenticationResult, AuthenticationStatus, AuthenticationTestResult,
    HostInfo, ProcessingStatus, ScanRequest, TestStatus, TransactionId,
};
use serde_json::{Map, Value, json};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::traits::{AuthenticationService, ServiceEvent, ServiceSettings};

/// Capacity of the notification channel. Slow subscribers lose the oldest
/// events rather than blocking processing.
const EVENT_CAPACITY: usize = 64;

/// In-process stand-in for the authentication host.
pub struct LoopbackService {
    settings: ServiceSettings,
    events: broadcast::Sender<ServiceEvent>,
    initialized: bool,
}

impl LoopbackService {
    pub fn new(settings: ServiceSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            settings,
            events,
            initialized: false,
        }
    }

    fn emit(&self, event: ServiceEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn stage(&self, status: ProcessingStatus) {
        debug!(%status, "processing stage");
        self.emit(ServiceEvent::StageChanged(status));
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(ScanAuthError::NotInitialized)
        }
    }
}

#[async_trait]
impl AuthenticationService for LoopbackService {
    #[instrument(skip_all)]
    async fn initialize(&mut self) -> Result<()> {
        if let Some(host_dir) = &self.settings.host_directory {
            if !host_dir.is_dir() {
                return Err(ScanAuthError::Host(format!(
                    "host directory not found: {}",
                    host_dir.display()
                )));
            }
        }

        tokio::fs::create_dir_all(&self.settings.logging_directory).await?;

        self.initialized = true;
        info!(
            logs = %self.settings.logging_directory.display(),
            "loopback authentication host ready"
        );
        Ok(())
    }

    async fn check_host(&self) -> Result<HostInfo> {
        self.ensure_initialized()?;
        Ok(HostInfo {
            host_version: format!("loopback-{}", env!("CARGO_PKG_VERSION")),
        })
    }

    #[instrument(skip_all, fields(slots = request.scan.len()))]
    async fn process(&self, request: ScanRequest) -> Result<AuthenticationResponse> {
        self.ensure_initialized()?;
        let transaction_id = TransactionId::new();

        self.stage(ProcessingStatus::Started);

        if request.scan.is_empty() {
            warn!(%transaction_id, "request holds no images or raw data");
            self.emit(ServiceEvent::Error("No images or raw data in request".into()));
            self.stage(ProcessingStatus::Completed);
            return Ok(AuthenticationResponse {
                transaction_id,
                result: None,
                document: None,
                plain_document: None,
            });
        }

        self.stage(ProcessingStatus::LoadingImages);
        if !request.scan.scanned_images.contains_key(&ImageType::ColorFront) {
            self.emit(ServiceEvent::Error("Color front image is missing".into()));
        }

        self.stage(ProcessingStatus::Analyzing);
        let grouped_results = completeness_tests(&request.scan);

        self.stage(ProcessingStatus::Matching);
        let document = describe_document(&request.scan);
        let plain_document = flatten(&document);

        self.stage(ProcessingStatus::Completed);
        info!(%transaction_id, "request processed by loopback host");

        Ok(AuthenticationResponse {
            transaction_id,
            result: Some(AuthenticationResult {
                authentication_status: AuthenticationStatus::Unknown,
                grouped_results,
            }),
            document: Some(document),
            plain_document: Some(plain_document),
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<ServiceEvent> {
        self.events.subscribe()
    }
}

/// One test per slot family, with one child test per slot.
fn completeness_tests(scan: &ScanResult) -> Vec<AuthenticationTestResult> {
    let image_children: Vec<_> = ImageType::ALL
        .iter()
        .map(|kind| {
            let present = scan.scanned_images.contains_key(kind);
            presence_test(kind.label(), &format!("IMG.{kind:?}"), present)
        })
        .collect();
    let raw_children: Vec<_> = RawDataSource::ALL
        .iter()
        .map(|source| {
            let present = scan.raw_items.contains_key(source);
            presence_test(source.label(), &format!("RAW.{source:?}"), present)
        })
        .collect();

    let front_supplied = scan.scanned_images.contains_key(&ImageType::ColorFront);
    vec![
        AuthenticationTestResult {
            name: "Images supplied".into(),
            code: "IMG".into(),
            test_status: if front_supplied {
                TestStatus::Passed
            } else {
                TestStatus::Warning
            },
            confidence: supplied_percent(scan.scanned_images.len(), ImageType::ALL.len()),
            cross_matches: Vec::new(),
            child_tests: image_children,
        },
        AuthenticationTestResult {
            name: "Raw data supplied".into(),
            code: "RAW".into(),
            test_status: if scan.raw_items.is_empty() {
                TestStatus::Skipped
            } else {
                TestStatus::Passed
            },
            confidence: supplied_percent(scan.raw_items.len(), RawDataSource::ALL.len()),
            cross_matches: Vec::new(),
            child_tests: raw_children,
        },
    ]
}

fn presence_test(name: &str, code: &str, present: bool) -> AuthenticationTestResult {
    AuthenticationTestResult {
        name: name.into(),
        code: code.into(),
        test_status: if present { TestStatus::Passed } else { TestStatus::Skipped },
        confidence: if present { 100 } else { 0 },
        cross_matches: Vec::new(),
        child_tests: Vec::new(),
    }
}

fn supplied_percent(supplied: usize, total: usize) -> u8 {
    // Both are tiny, the product cannot overflow.
    ((supplied * 100) / total.max(1)) as u8
}

fn describe_document(scan: &ScanResult) -> Value {
    let images: Map<String, Value> = scan
        .scanned_images
        .iter()
        .map(|(kind, bytes)| {
            (
                format!("{kind:?}"),
                json!({ "format": sniff_image_format(bytes), "bytes": bytes.len() }),
            )
        })
        .collect();
    let raw_items: Map<String, Value> = scan
        .raw_items
        .iter()
        .map(|(source, raw)| {
            (
                format!("{source:?}"),
                json!({
                    "characters": raw.raw_string.chars().count(),
                    "lines": raw.raw_string.lines().count(),
                }),
            )
        })
        .collect();

    json!({ "images": images, "rawItems": raw_items })
}

/// Collapse nested objects into `parent.child` keys with string values.
fn flatten(document: &Value) -> Value {
    fn walk(prefix: &str, value: &Value, out: &mut Map<String, Value>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    walk(&path, child, out);
                }
            }
            Value::String(s) => {
                out.insert(prefix.to_owned(), Value::String(s.clone()));
            }
            other => {
                out.insert(prefix.to_owned(), Value::String(other.to_string()));
            }
        }
    }

    let mut out = Map::new();
    walk("", document, &mut out);
    Value::Object(out)
}

/// Best-effort container detection from magic bytes.
fn sniff_image_format(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "jpeg",
        [0x89, b'P', b'N', b'G', ..] => "png",
        [b'B', b'M', ..] => "bmp",
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => "tiff",
        _ => "unknown",
    }
}
