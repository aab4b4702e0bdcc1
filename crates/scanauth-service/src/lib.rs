// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanauth-service — boundary to the document authentication host.
//
// The forensics, OCR and cross-field scoring all happen inside the host. This
// crate only defines the narrow async contract the console talks to, plus a
// loopback implementation for machines without the host installed.

pub mod loopback;
pub mod traits;

pub use loopback::LoopbackService;
pub use traits::{AuthenticationService, ServiceEvent, ServiceSettings};

use scanauth_core::error::Result;

/// Create and initialize the authentication service for this machine.
///
/// RETURNS: a boxed trait object so callers never depend on which host
/// implementation is in use.
pub async fn create_service(settings: ServiceSettings) -> Result<Box<dyn AuthenticationService>> {
    let mut service: Box<dyn AuthenticationService> = Box::new(LoopbackService::new(settings));
    service.initialize().await?;
    Ok(service)
}
