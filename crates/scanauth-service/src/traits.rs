// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contract between the console and an authentication host.

use std::path::PathBuf;

use async_trait::async_trait;
use scanauth_core::error::Result;
use scanauth_core::types::ScanRequest;
use scanauth_core::{AuthenticationResponse, HostInfo, ProcessingStatus};
use tokio::sync::broadcast;

/// Settings handed to the service on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Where the host writes its own logs.
    pub logging_directory: PathBuf,
    /// Location of the host binaries. `None` uses the installed default.
    pub host_directory: Option<PathBuf>,
}

/// Notification emitted while a request is being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    /// The processing stage changed.
    StageChanged(ProcessingStatus),
    /// The host reported an error. Processing may still produce a response.
    Error(String),
}

/// A document authentication host.
///
/// Implementations must be usable from any tokio task; `process` takes
/// `&self` so notifications can be observed concurrently through
/// [`AuthenticationService::subscribe`].
#[async_trait]
pub trait AuthenticationService: Send + Sync {
    /// Start (or connect to) the host. Must be called once before anything
    /// else. Fails with `ScanAuthError::Host` if the host is unavailable.
    async fn initialize(&mut self) -> Result<()>;

    /// Query the running host.
    async fn check_host(&self) -> Result<HostInfo>;

    /// Authenticate one document.
    ///
    /// Fails with `ScanAuthError::Transport` when the host cannot be reached
    /// and `ScanAuthError::Processing` when it rejects the request.
    async fn process(&self, request: ScanRequest) -> Result<AuthenticationResponse>;

    /// Receive progress and error notifications for future requests.
    fn subscribe(&self) -> broadcast::Receiver<ServiceEvent>;
}
