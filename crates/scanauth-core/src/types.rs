// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for scan requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Non-image payload sources extracted from a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RawDataSource {
    /// Text payload decoded from the PDF417 barcode on the back of a card.
    Pdf417,
}

impl RawDataSource {
    pub const ALL: [RawDataSource; 1] = [RawDataSource::Pdf417];

    /// Label used in logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf417 => "PDF417",
        }
    }
}

/// Captured image kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ImageType {
    ColorFront,
    ColorBack,
    /// Ultraviolet illumination, front side.
    UvFront,
    UvBack,
    /// Infrared illumination, front side.
    IrFront,
    IrBack,
    /// Portrait crop of the holder's face.
    Face,
}

impl ImageType {
    pub const ALL: [ImageType; 7] = [
        ImageType::ColorFront,
        ImageType::ColorBack,
        ImageType::UvFront,
        ImageType::UvBack,
        ImageType::IrFront,
        ImageType::IrBack,
        ImageType::Face,
    ];

    /// Label used in logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ColorFront => "color front",
            Self::ColorBack => "color back",
            Self::UvFront => "UV front",
            Self::UvBack => "UV back",
            Self::IrFront => "IR front",
            Self::IrBack => "IR back",
            Self::Face => "face",
        }
    }
}

/// A named destination in the request for one category of scan artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanSlot {
    Raw(RawDataSource),
    Image(ImageType),
}

impl std::fmt::Display for ScanSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw(source) => write!(f, "raw:{}", source.label()),
            Self::Image(kind) => write!(f, "image:{}", kind.label()),
        }
    }
}

/// Raw (non-image) payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawData {
    pub raw_string: String,
}

/// Raw-data and image payloads captured from one document.
///
/// Both maps start empty and are only ever filled once per key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub raw_items: BTreeMap<RawDataSource, RawData>,
    pub scanned_images: BTreeMap<ImageType, Vec<u8>>,
}

impl ScanResult {
    /// Insert a raw payload unless the slot is already filled.
    ///
    /// Returns `true` when the payload was stored.
    pub fn try_add_raw(&mut self, source: RawDataSource, raw_string: String) -> bool {
        match self.raw_items.entry(source) {
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(RawData { raw_string });
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Insert an image unless the slot is already filled.
    ///
    /// Returns `true` when the image was stored.
    pub fn try_add_image(&mut self, kind: ImageType, bytes: Vec<u8>) -> bool {
        match self.scanned_images.entry(kind) {
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(bytes);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn contains(&self, slot: ScanSlot) -> bool {
        match slot {
            ScanSlot::Raw(source) => self.raw_items.contains_key(&source),
            ScanSlot::Image(kind) => self.scanned_images.contains_key(&kind),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw_items.is_empty() && self.scanned_images.is_empty()
    }

    /// Number of filled slots across both maps.
    pub fn len(&self) -> usize {
        self.raw_items.len() + self.scanned_images.len()
    }
}

/// The aggregate submitted to the authentication service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub scan: ScanResult,
}

impl ScanRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// SHA-256 over the request content, as a lowercase hex string.
    ///
    /// Slots are hashed in key order with length prefixes, so equal content
    /// always yields the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (source, raw) in &self.scan.raw_items {
            hasher.update(source.label().as_bytes());
            hasher.update((raw.raw_string.len() as u64).to_le_bytes());
            hasher.update(raw.raw_string.as_bytes());
        }
        for (kind, bytes) in &self.scan.scanned_images {
            hasher.update(kind.label().as_bytes());
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        hex::encode(hasher.finalize())
    }
}
