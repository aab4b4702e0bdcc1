// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON-backed configuration loading and saving.

use std::path::Path;

use scanauth_core::AppConfig;
use scanauth_core::error::Result;
use tracing::{debug, warn};

/// Load the configuration at `path`.
///
/// A missing file yields the defaults silently; an unreadable or invalid one
/// yields the defaults with a warning.
pub fn load_config(path: &Path) -> AppConfig {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            return AppConfig::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config unreadable, using defaults");
            return AppConfig::default();
        }
    };

    match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config invalid, using defaults");
            AppConfig::default()
        }
    }
}

/// Write `config` to `path` as pretty JSON, creating parent directories.
pub fn persist_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}
