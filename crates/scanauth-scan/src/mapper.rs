// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan folder mapper.
//
// Candidates are the regular files directly inside the folder, sorted by file
// name so "first match" does not depend on the filesystem's listing order.
// A file is only read when it fills an empty slot.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use scanauth_core::AppConfig;
use scanauth_core::config::{ClassificationStrategy, MissingFolderPolicy};
use scanauth_core::error::{Result, ScanAuthError};
use scanauth_core::types::{ScanRequest, ScanSlot};
use tracing::{debug, info, instrument, warn};

use crate::classify::classify;

/// A file in the scan folder considered for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub path: PathBuf,
}

/// Builds `ScanRequest`s from scan folders.
///
/// Holds no state between calls, so one mapper can serve several threads
/// mapping different folders.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderMapper {
    strategy: ClassificationStrategy,
    missing_folder: MissingFolderPolicy,
}

impl FolderMapper {
    pub fn new(strategy: ClassificationStrategy) -> Self {
        Self {
            strategy,
            missing_folder: MissingFolderPolicy::default(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            strategy: config.strategy,
            missing_folder: config.missing_folder,
        }
    }

    pub fn with_missing_folder(mut self, policy: MissingFolderPolicy) -> Self {
        self.missing_folder = policy;
        self
    }

    pub fn strategy(&self) -> ClassificationStrategy {
        self.strategy
    }

    /// Classify the files in `dir` and read the winners into a new request.
    ///
    /// Fails with `ScanAuthError::FileRead` if the folder listing or any
    /// selected file cannot be read; a half-filled request is never returned.
    #[instrument(skip(self, dir), fields(dir = %dir.display(), strategy = ?self.strategy))]
    pub fn map(&self, dir: &Path) -> Result<ScanRequest> {
        let mut request = ScanRequest::new();

        let Some(candidates) = self.candidate_files(dir)? else {
            return Ok(request);
        };

        for candidate in &candidates {
            for slot in classify(self.strategy, &candidate.name) {
                if request.scan.contains(slot) {
                    debug!(file = %candidate.name, %slot, "slot already filled, skipping");
                    continue;
                }
                fill_slot(&mut request, slot, candidate)?;
                debug!(file = %candidate.name, %slot, "slot filled");
            }
        }

        info!(
            candidates = candidates.len(),
            raw_items = request.scan.raw_items.len(),
            images = request.scan.scanned_images.len(),
            "scan folder mapped"
        );
        Ok(request)
    }

    /// Regular files in `dir`, sorted by name.
    ///
    /// Returns `Ok(None)` for a missing folder under `MissingFolderPolicy::Empty`.
    fn candidate_files(&self, dir: &Path) -> Result<Option<Vec<CandidateFile>>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return match self.missing_folder {
                    MissingFolderPolicy::Empty => {
                        warn!(
                            dir = %dir.display(),
                            "scan folder not found, submitting empty request"
                        );
                        Ok(None)
                    }
                    MissingFolderPolicy::Error => {
                        Err(ScanAuthError::FolderNotFound(dir.to_path_buf()))
                    }
                };
            }
            Err(source) => {
                return Err(ScanAuthError::FileRead {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        };

        let mut candidates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ScanAuthError::FileRead {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !is_regular_file(&entry, &path)? {
                continue;
            }
            // Non UTF-8 names cannot match any rule.
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                debug!(path = %path.display(), "skipping non UTF-8 file name");
                continue;
            };
            candidates.push(CandidateFile { name, path });
        }

        candidates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Some(candidates))
    }
}

/// Whether a listed entry is a regular file, following symlinks.
///
/// An entry whose type cannot be determined is a read failure, not a skip.
fn is_regular_file(entry: &fs::DirEntry, path: &Path) -> Result<bool> {
    let stat_err = |source| ScanAuthError::FileRead {
        path: path.to_path_buf(),
        source,
    };
    let file_type = entry.file_type().map_err(stat_err)?;
    if file_type.is_symlink() {
        return Ok(fs::metadata(path).map_err(stat_err)?.is_file());
    }
    Ok(file_type.is_file())
}

/// Map `dir` with `strategy` and the default missing-folder policy.
pub fn map_folder(dir: impl AsRef<Path>, strategy: ClassificationStrategy) -> Result<ScanRequest> {
    FolderMapper::new(strategy).map(dir.as_ref())
}

fn fill_slot(request: &mut ScanRequest, slot: ScanSlot, candidate: &CandidateFile) -> Result<()> {
    let read_err = |source| ScanAuthError::FileRead {
        path: candidate.path.clone(),
        source,
    };

    match slot {
        ScanSlot::Raw(source) => {
            let bytes = fs::read(&candidate.path).map_err(read_err)?;
            let text = decode_text(bytes).map_err(read_err)?;
            request.scan.try_add_raw(source, text);
        }
        ScanSlot::Image(kind) => {
            let bytes = fs::read(&candidate.path).map_err(read_err)?;
            request.scan.try_add_image(kind, bytes);
        }
    }
    Ok(())
}

/// Decode raw-data text.
///
/// A UTF-8 or UTF-16 (LE/BE) byte order mark selects the encoding and is
/// dropped; without one the bytes must be valid UTF-8.
fn decode_text(bytes: Vec<u8>) -> std::io::Result<String> {
    let invalid = |detail: &str| std::io::Error::new(ErrorKind::InvalidData, detail.to_owned());

    match Encoding::for_bom(&bytes) {
        Some((encoding, bom_len)) => {
            let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
            if had_errors {
                return Err(invalid(&format!("malformed {} text", encoding.name())));
            }
            Ok(text.into_owned())
        }
        None => String::from_utf8(bytes).map_err(|e| invalid(&e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanauth_core::types::{ImageType, RawDataSource};
    use tempfile::TempDir;

    const PATTERN: ClassificationStrategy = ClassificationStrategy::PatternSubstring;
    const PREFIX: ClassificationStrategy = ClassificationStrategy::PrefixToken;

    /// Helper: create a scratch folder with the given files.
    fn folder(files: &[(&str, &[u8])]) -> TempDir {
        let dir = tempfile::tempdir().expect("create temp dir");
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).expect("write fixture");
        }
        dir
    }

    #[test]
    fn empty_folder_gives_empty_request() {
        let dir = folder(&[]);
        let request = map_folder(dir.path(), PATTERN).expect("map");
        assert!(request.scan.raw_items.is_empty());
        assert!(request.scan.scanned_images.is_empty());
    }

    #[test]
    fn unrecognized_files_are_ignored() {
        let dir = folder(&[("readme.txt", b"notes"), ("thumbs.db", b"\0\0")]);
        for strategy in [PATTERN, PREFIX] {
            let request = map_folder(dir.path(), strategy).expect("map");
            assert!(request.scan.is_empty());
        }
    }

    #[test]
    fn missing_folder_gives_empty_request() {
        let dir = folder(&[]);
        let missing = dir.path().join("does-not-exist");
        let request = map_folder(&missing, PATTERN).expect("map");
        assert!(request.scan.is_empty());
    }

    #[test]
    fn missing_folder_can_be_an_error() {
        let dir = folder(&[]);
        let missing = dir.path().join("does-not-exist");
        let result = FolderMapper::new(PATTERN)
            .with_missing_folder(MissingFolderPolicy::Error)
            .map(&missing);
        match result {
            Err(ScanAuthError::FolderNotFound(path)) => assert_eq!(path, missing),
            other => panic!("expected FolderNotFound, got {other:?}"),
        }
    }

    #[test]
    fn pattern_strategy_example() {
        let jpeg: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        let dir = folder(&[
            ("ScanNormalFront.jpg", jpeg),
            ("Pdf417RawData.txt", b"@\n\x1e\rANSI 636014080102DL00410288"),
        ]);
        let request = map_folder(dir.path(), PATTERN).expect("map");

        assert_eq!(request.scan.scanned_images.len(), 1);
        assert_eq!(request.scan.scanned_images[&ImageType::ColorFront], jpeg);
        assert_eq!(request.scan.raw_items.len(), 1);
        assert_eq!(
            request.scan.raw_items[&RawDataSource::Pdf417].raw_string,
            "@\n\x1e\rANSI 636014080102DL00410288"
        );
    }

    #[test]
    fn prefix_strategy_example() {
        let dir = folder(&[
            ("normal.jpg", b"front"),
            ("normalback.jpg", b"back"),
            ("face.png", b"portrait"),
            ("readme.txt", b"ignore me"),
        ]);
        let request = map_folder(dir.path(), PREFIX).expect("map");

        assert_eq!(request.scan.scanned_images.len(), 3);
        assert_eq!(request.scan.scanned_images[&ImageType::ColorFront], b"front");
        assert_eq!(request.scan.scanned_images[&ImageType::ColorBack], b"back");
        assert_eq!(request.scan.scanned_images[&ImageType::Face], b"portrait");
        assert!(request.scan.raw_items.is_empty());
    }

    #[test]
    fn duplicates_keep_first_in_name_order() {
        let dir = folder(&[
            ("b_ScanUvFront.jpg", b"second"),
            ("a_ScanUvFront.jpg", b"first"),
            ("c_ScanUvFront.jpg", b"third"),
        ]);
        let request = map_folder(dir.path(), PATTERN).expect("map");
        assert_eq!(request.scan.scanned_images.len(), 1);
        assert_eq!(request.scan.scanned_images[&ImageType::UvFront], b"first");
    }

    #[test]
    fn prefix_duplicates_keep_first_in_name_order() {
        let dir = folder(&[("IR.png", b"upper"), ("ir.jpg", b"lower")]);
        let request = map_folder(dir.path(), PREFIX).expect("map");
        // "IR.png" sorts before "ir.jpg" byte-wise.
        assert_eq!(request.scan.scanned_images[&ImageType::IrFront], b"upper");
    }

    #[test]
    fn subdirectories_are_not_candidates() {
        let dir = folder(&[]);
        fs::create_dir(dir.path().join("ScanNormalFront.d")).expect("mkdir");
        let request = map_folder(dir.path(), PATTERN).expect("map");
        assert!(request.scan.is_empty());
    }

    #[test]
    fn unreadable_raw_data_fails_the_mapping() {
        // Invalid UTF-8 cannot be read as text.
        let dir = folder(&[
            ("Pdf417RawData.txt", &[0xC3, 0x28]),
            ("ScanNormalFront.jpg", b"img"),
        ]);
        match map_folder(dir.path(), PATTERN) {
            Err(ScanAuthError::FileRead { path, .. }) => {
                assert_eq!(path, dir.path().join("Pdf417RawData.txt"));
            }
            other => panic!("expected FileRead, got {other:?}"),
        }
    }

    #[test]
    fn utf8_bom_is_stripped_from_raw_data() {
        let dir = folder(&[("Pdf417RawData.txt", b"\xEF\xBB\xBF@ANSI")]);
        let request = map_folder(dir.path(), PATTERN).expect("map");
        assert_eq!(request.scan.raw_items[&RawDataSource::Pdf417].raw_string, "@ANSI");
    }

    #[test]
    fn utf16_raw_data_with_bom_is_decoded() {
        let mut le = vec![0xFF, 0xFE];
        le.extend("@ANSI\n".encode_utf16().flat_map(u16::to_le_bytes));
        let mut be = vec![0xFE, 0xFF];
        be.extend("@ANSI\n".encode_utf16().flat_map(u16::to_be_bytes));

        for bytes in [le, be] {
            let dir = folder(&[("Pdf417RawData.txt", bytes.as_slice())]);
            let request = map_folder(dir.path(), PATTERN).expect("map");
            assert_eq!(request.scan.raw_items[&RawDataSource::Pdf417].raw_string, "@ANSI\n");
        }
    }

    #[test]
    fn truncated_utf16_raw_data_fails_the_mapping() {
        // BOM plus a dangling half code unit.
        let dir = folder(&[("Pdf417RawData.txt", &[0xFF, 0xFE, 0x40, 0x00, 0x41])]);
        match map_folder(dir.path(), PATTERN) {
            Err(ScanAuthError::FileRead { path, source }) => {
                assert_eq!(path, dir.path().join("Pdf417RawData.txt"));
                assert_eq!(source.kind(), ErrorKind::InvalidData);
            }
            other => panic!("expected FileRead, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn dangling_candidate_fails_the_mapping() {
        // A listed name whose target is gone cannot be classified as a file.
        let dir = folder(&[]);
        let link = dir.path().join("ScanNormalFront.jpg");
        std::os::unix::fs::symlink(dir.path().join("gone.jpg"), &link).expect("symlink");
        match map_folder(dir.path(), PATTERN) {
            Err(ScanAuthError::FileRead { path, source }) => {
                assert_eq!(path, link);
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("expected FileRead, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_image_is_a_candidate() {
        let dir = folder(&[("capture.bin", b"front")]);
        std::os::unix::fs::symlink(
            dir.path().join("capture.bin"),
            dir.path().join("ScanNormalFront.jpg"),
        )
        .expect("symlink");
        let request = map_folder(dir.path(), PATTERN).expect("map");
        assert_eq!(request.scan.scanned_images[&ImageType::ColorFront], b"front");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_image_fails_the_mapping() {
        use std::os::unix::fs::PermissionsExt;

        let dir = folder(&[("ScanNormalFront.jpg", b"img")]);
        let image = dir.path().join("ScanNormalFront.jpg");
        fs::set_permissions(&image, fs::Permissions::from_mode(0o000)).expect("chmod");
        // Permission bits do not apply to root.
        if fs::read(&image).is_ok() {
            return;
        }

        match map_folder(dir.path(), PATTERN) {
            Err(ScanAuthError::FileRead { path, source }) => {
                assert_eq!(path, image);
                assert_eq!(source.kind(), ErrorKind::PermissionDenied);
            }
            other => panic!("expected FileRead, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn unsearchable_folder_fails_instead_of_dropping_files() {
        use std::os::unix::fs::PermissionsExt;

        let dir = folder(&[("ScanNormalFront.jpg", b"img")]);
        let image = dir.path().join("ScanNormalFront.jpg");
        // Listable but not searchable: names are visible, files are not.
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o400)).expect("chmod");
        let root_bypass = fs::read(&image).is_ok();

        let result = map_folder(dir.path(), PATTERN);
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o700)).expect("restore");
        if root_bypass {
            return;
        }

        match result {
            Err(ScanAuthError::FileRead { path, .. }) => assert_eq!(path, image),
            other => panic!("expected FileRead, got {other:?}"),
        }
    }

    #[test]
    fn ignored_duplicates_are_never_read() {
        // The second barcode file cannot be decoded, but the slot is
        // already filled by the time it is reached.
        let dir = folder(&[
            ("a_Pdf417RawData.txt", b"valid"),
            ("b_Pdf417RawData.txt", &[0xFF, 0xFE, 0xFD]),
        ]);
        let request = map_folder(dir.path(), PATTERN).expect("map");
        assert_eq!(request.scan.raw_items[&RawDataSource::Pdf417].raw_string, "valid");
    }

    #[test]
    fn remapping_is_deterministic() {
        let dir = folder(&[
            ("ScanNormalFront.jpg", b"front"),
            ("ScanNormalBack.jpg", b"back"),
            ("x_Face.png", b"face-1"),
            ("y_Face.png", b"face-2"),
            ("Pdf417RawData.txt", b"barcode"),
        ]);
        let first = map_folder(dir.path(), PATTERN).expect("first map");
        let second = map_folder(dir.path(), PATTERN).expect("second map");
        assert_eq!(first, second);
        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn mapper_from_config_uses_its_strategy() {
        let config = AppConfig {
            strategy: PREFIX,
            ..AppConfig::default()
        };
        let mapper = FolderMapper::from_config(&config);
        assert_eq!(mapper.strategy(), PREFIX);

        let dir = folder(&[("uvback.jpg", b"uv")]);
        let request = mapper.map(dir.path()).expect("map");
        assert!(request.scan.contains(ScanSlot::Image(ImageType::UvBack)));
    }
}
