//! Content header corruption detection tests
//!
//! Tests to verify that reopening an archive rejects damaged headers
//! instead of returning wrong payloads.

use blobpack::{Archive, ArchiveBuilder, ArchiveError, BuildOptions, LogConfig, MemorySourceLoader};
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::TempDir;

fn quiet() -> BuildOptions {
    BuildOptions::new().with_log(LogConfig::silent())
}

/// Helper: write a small valid archive to `path`
fn write_archive(path: &Path) -> Archive {
    let mut builder = ArchiveBuilder::new(MemorySourceLoader::new());
    builder.add_entry("alpha", b"first payload".to_vec()).unwrap();
    builder.add_entry("beta", b"second".to_vec()).unwrap();
    let archive = builder.build(&quiet()).unwrap();
    archive.write_to(path).unwrap();
    archive
}

/// Helper: overwrite bytes at an absolute offset
fn patch_file(path: &Path, offset: u64, bytes: &[u8]) {
    let mut file = OpenOptions::new().write(true).open(path).unwrap();
    file.seek(SeekFrom::Start(offset)).unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
}

/// Helper: Truncate file to specific size
fn truncate_file(path: &Path, size: u64) {
    let file = OpenOptions::new().write(true).open(path).unwrap();
    file.set_len(size).unwrap();
}

#[test]
fn test_bad_magic() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("magic.pack");
    write_archive(&path);

    patch_file(&path, 0, b"XX");
    assert!(matches!(
        Archive::open(&path, &quiet()),
        Err(ArchiveError::InvalidMagic)
    ));
}

#[test]
fn test_header_size_off_by_one() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("size.pack");
    let archive = write_archive(&path);

    for delta in [-1i64, 1] {
        let recorded = archive.content_header().len() as i64 + delta;
        patch_file(&path, 16, &(recorded as u64).to_le_bytes());
        assert!(
            matches!(
                Archive::open(&path, &quiet()),
                Err(ArchiveError::CorruptHeader(_))
            ),
            "size delta {} was accepted",
            delta
        );
    }
}

#[test]
fn test_header_size_beyond_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("huge.pack");
    write_archive(&path);

    patch_file(&path, 16, &u64::MAX.to_le_bytes());
    assert!(matches!(
        Archive::open(&path, &quiet()),
        Err(ArchiveError::CorruptHeader(_))
    ));
}

#[test]
fn test_truncated_payload_region() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.pack");
    let archive = write_archive(&path);

    truncate_file(&path, archive.size().unwrap() - 3);
    assert!(matches!(
        Archive::open(&path, &quiet()),
        Err(ArchiveError::CorruptHeader(_))
    ));
}

#[test]
fn test_truncated_preamble() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stub.pack");
    write_archive(&path);

    truncate_file(&path, 20);
    assert!(matches!(
        Archive::open(&path, &quiet()),
        Err(ArchiveError::CorruptHeader(_))
    ));
}

#[test]
fn test_range_pointing_past_end() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("range.pack");
    write_archive(&path);

    // "alpha\0" starts at 32; its end offset follows the start offset
    let end_field = 32 + 6 + 8;
    patch_file(&path, end_field, &10_000u64.to_le_bytes());
    assert!(matches!(
        Archive::open(&path, &quiet()),
        Err(ArchiveError::CorruptHeader(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Archive::open(dir.path().join("nothing.pack"), &quiet()),
        Err(ArchiveError::Io(_))
    ));
}

#[test]
fn test_from_bytes_rejects_garbage() {
    assert!(Archive::from_bytes(Vec::new(), &quiet()).is_err());
    assert!(Archive::from_bytes(vec![0u8; 64], &quiet()).is_err());
}
