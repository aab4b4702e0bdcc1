// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Authentication session — owns the service and runs one folder at a time.
//
// Mapping a folder is blocking file I/O, so it runs on the blocking pool.
// Service notifications are printed while `process` is in flight.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use scanauth_core::error::{Result, ScanAuthError};
use scanauth_core::{AppConfig, AuthenticationResponse, ScanRequest};
use scanauth_scan::FolderMapper;
use scanauth_service::{AuthenticationService, ServiceEvent, ServiceSettings};
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{info, instrument, warn};

use crate::report::{ReportHeader, render_report};

/// A ready-to-use authentication service plus the settings around it.
pub struct AuthSession {
    service: Box<dyn AuthenticationService>,
    mapper: FolderMapper,
    report_path: PathBuf,
}

impl AuthSession {
    /// Create and initialize the service described by `config`.
    ///
    /// `log_dir` receives both the host logs and the report log.
    #[instrument(skip_all, fields(log_dir = %log_dir.display()))]
    pub async fn create(config: &AppConfig, log_dir: &Path) -> Result<Self> {
        let settings = ServiceSettings {
            logging_directory: log_dir.to_path_buf(),
            host_directory: config.host_directory.clone(),
        };
        let service = scanauth_service::create_service(settings).await?;
        Ok(Self::with_service(service, config, log_dir))
    }

    /// Wrap an already initialized service.
    pub fn with_service(
        service: Box<dyn AuthenticationService>,
        config: &AppConfig,
        log_dir: &Path,
    ) -> Self {
        Self {
            service,
            mapper: FolderMapper::from_config(config),
            report_path: log_dir.join(&config.report_file),
        }
    }

    pub async fn host_version(&self) -> Result<String> {
        Ok(self.service.check_host().await?.host_version)
    }

    /// Map `folder`, submit it, print and log the report.
    ///
    /// Returns the rendered report.
    #[instrument(skip_all, fields(folder = %folder.display()))]
    pub async fn authenticate(&self, folder: &Path) -> Result<String> {
        println!("Authenticate \"{}\":", folder.display());

        let request = self.build_request(folder).await?;
        info!(
            fingerprint = %request.fingerprint(),
            slots = request.scan.len(),
            "request assembled"
        );

        let started = Instant::now();
        let response = self.process_with_events(request).await?;
        let elapsed = started.elapsed();

        let header = ReportHeader {
            timestamp: Local::now().fixed_offset(),
            folder: folder.display().to_string(),
            elapsed,
            host_version: self.host_version().await?,
        };
        let report = render_report(&header, &response)?;
        println!("{report}");

        self.append_report(&report).await?;
        Ok(report)
    }

    async fn build_request(&self, folder: &Path) -> Result<ScanRequest> {
        let mapper = self.mapper;
        let folder = folder.to_path_buf();
        tokio::task::spawn_blocking(move || mapper.map(&folder))
            .await
            .map_err(mapping_task_failed)?
    }

    /// Run `process` while printing notifications as they arrive.
    async fn process_with_events(&self, request: ScanRequest) -> Result<AuthenticationResponse> {
        let mut events = self.service.subscribe();
        let process = self.service.process(request);
        tokio::pin!(process);

        let mut closed = false;
        let response = loop {
            tokio::select! {
                biased;
                event = events.recv(), if !closed => match event {
                    Ok(event) => print_event(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "missed service notifications")
                    }
                    Err(RecvError::Closed) => closed = true,
                },
                result = &mut process => break result?,
            }
        };

        // Notifications sent right before the response resolved.
        loop {
            match events.try_recv() {
                Ok(event) => print_event(&event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "missed service notifications")
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        Ok(response)
    }

    async fn append_report(&self, report: &str) -> Result<()> {
        if let Some(parent) = self.report_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_path)
            .await?;
        file.write_all(report.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// A panicked or cancelled mapping task is a local failure, not a bad scan.
fn mapping_task_failed(err: tokio::task::JoinError) -> ScanAuthError {
    ScanAuthError::Io(std::io::Error::other(format!("mapping task failed: {err}")))
}

fn print_event(event: &ServiceEvent) {
    match event {
        ServiceEvent::StageChanged(status) => println!("Processing: {status}"),
        ServiceEvent::Error(text) => println!("Error: {text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanauth_core::config::{ClassificationStrategy, MissingFolderPolicy};
    use scanauth_core::human_errors::{Severity, humanize_error};

    #[tokio::test]
    async fn authenticate_appends_report_to_log() {
        let root = tempfile::tempdir().expect("temp dir");
        let scans = root.path().join("scans");
        std::fs::create_dir(&scans).expect("mkdir");
        std::fs::write(scans.join("ScanNormalFront.jpg"), [0xFFu8, 0xD8, 0xFF, 0xE0])
            .expect("write");
        std::fs::write(scans.join("Pdf417RawData.txt"), "@ANSI").expect("write");

        let log_dir = root.path().join("Logs");
        let config = AppConfig::default();
        let session = AuthSession::create(&config, &log_dir).await.expect("create");

        let first = session.authenticate(&scans).await.expect("authenticate");
        assert!(first.contains("Authentication status: Unknown"));
        assert!(first.contains("color front: IMG.ColorFront Passed 100"));

        let second = session.authenticate(&scans).await.expect("authenticate again");
        let log = std::fs::read_to_string(log_dir.join(&config.report_file)).expect("read log");
        assert_eq!(log, format!("{first}{second}"));
    }

    #[tokio::test]
    async fn missing_folder_submits_empty_request() {
        let root = tempfile::tempdir().expect("temp dir");
        let session = AuthSession::create(&AppConfig::default(), root.path())
            .await
            .expect("create");
        let report = session
            .authenticate(&root.path().join("nowhere"))
            .await
            .expect("authenticate");
        assert!(report.ends_with("Result unassigned!\n"));
    }

    #[tokio::test]
    async fn strict_missing_folder_fails() {
        let root = tempfile::tempdir().expect("temp dir");
        let config = AppConfig {
            strategy: ClassificationStrategy::PrefixToken,
            missing_folder: MissingFolderPolicy::Error,
            ..AppConfig::default()
        };
        let session = AuthSession::create(&config, root.path()).await.expect("create");
        let result = session.authenticate(&root.path().join("nowhere")).await;
        assert!(matches!(result, Err(ScanAuthError::FolderNotFound(_))));
        assert!(!root.path().join(&config.report_file).exists());
    }

    #[tokio::test]
    async fn panicked_mapping_task_is_not_blamed_on_the_scan() {
        let join_err = tokio::task::spawn_blocking(|| -> u8 { panic!("mapper crashed") })
            .await
            .expect_err("task panicked");
        let err = mapping_task_failed(join_err);
        assert!(matches!(err, ScanAuthError::Io(_)), "got {err:?}");

        let human = humanize_error(&err);
        assert_ne!(human.severity, Severity::Permanent);
        assert!(!human.suggestion.contains("Rescan"));
    }
}
