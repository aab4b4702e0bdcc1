// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filename classification rules.

use scanauth_core::config::ClassificationStrategy;
use scanauth_core::types::{ImageType, RawDataSource, ScanSlot};

/// Substrings used by `ClassificationStrategy::PatternSubstring`.
///
/// Matching is case-sensitive. One file may match several entries and then
/// fills each of those slots.
pub const PATTERN_TABLE: [(&str, ScanSlot); 8] = [
    ("Pdf417RawData", ScanSlot::Raw(RawDataSource::Pdf417)),
    ("ScanNormalFront", ScanSlot::Image(ImageType::ColorFront)),
    ("ScanNormalBack", ScanSlot::Image(ImageType::ColorBack)),
    ("ScanUvFront", ScanSlot::Image(ImageType::UvFront)),
    ("ScanUvBack", ScanSlot::Image(ImageType::UvBack)),
    ("ScanIrFront", ScanSlot::Image(ImageType::IrFront)),
    ("ScanIrBack", ScanSlot::Image(ImageType::IrBack)),
    ("Face", ScanSlot::Image(ImageType::Face)),
];

/// Lower-case name tokens used by `ClassificationStrategy::PrefixToken`.
pub const TOKEN_TABLE: [(&str, ImageType); 7] = [
    ("normal", ImageType::ColorFront),
    ("normalback", ImageType::ColorBack),
    ("uv", ImageType::UvFront),
    ("uvback", ImageType::UvBack),
    ("ir", ImageType::IrFront),
    ("irback", ImageType::IrBack),
    ("face", ImageType::Face),
];

/// Exact (case-insensitive) file name of the barcode payload under
/// `ClassificationStrategy::PrefixToken`.
pub const PDF417_FILE_NAME: &str = "Pdf417RawData.txt";

/// Slots a file name maps to under `strategy`, in table order.
///
/// An empty result means the file is ignored.
pub fn classify(strategy: ClassificationStrategy, file_name: &str) -> Vec<ScanSlot> {
    match strategy {
        ClassificationStrategy::PatternSubstring => PATTERN_TABLE
            .iter()
            .filter(|(pattern, _)| file_name.contains(pattern))
            .map(|(_, slot)| *slot)
            .collect(),
        ClassificationStrategy::PrefixToken => prefix_token_slot(file_name).into_iter().collect(),
    }
}

fn prefix_token_slot(file_name: &str) -> Option<ScanSlot> {
    if file_name.eq_ignore_ascii_case(PDF417_FILE_NAME) {
        return Some(ScanSlot::Raw(RawDataSource::Pdf417));
    }

    let token = file_name
        .split_once('.')
        .map_or(file_name, |(stem, _)| stem)
        .to_lowercase();

    TOKEN_TABLE
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, kind)| ScanSlot::Image(*kind))
}
