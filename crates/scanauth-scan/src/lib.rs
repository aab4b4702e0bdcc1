// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanauth-scan — turns a folder of scan artifacts into a `ScanRequest`.
//
// Files are classified by name into raw-data or image slots using one of two
// explicit strategies (see `classify`). Each slot keeps the first matching
// file in name order; later matches are ignored.

pub mod classify;
pub mod mapper;

pub use classify::{PATTERN_TABLE, TOKEN_TABLE, classify};
pub use mapper::{CandidateFile, FolderMapper, map_folder};
