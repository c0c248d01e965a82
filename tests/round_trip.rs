//! Build-then-query integration tests
//!
//! Archives are built from manifests on disk and from in-memory sources,
//! then read back through every query path.

use blobpack::{
    build_from_manifest, build_from_manifest_file, list_tags, Archive, ArchiveBuilder,
    ArchiveError, BuildOptions, LogConfig, Manifest, MemorySourceLoader,
};
use tempfile::TempDir;

fn quiet() -> BuildOptions {
    BuildOptions::new().with_log(LogConfig::silent())
}

/// Helper: write source files and a manifest naming them
fn write_sources(dir: &TempDir, files: &[(&str, &str, &[u8])]) -> std::path::PathBuf {
    let mut manifest = Manifest::new();
    for (tag, name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        manifest.push(*tag, *name);
    }

    let manifest_path = dir.path().join("manifest.json");
    std::fs::write(&manifest_path, manifest.to_json().unwrap()).unwrap();
    manifest_path
}

#[test]
fn test_hello_and_empty_entry() {
    let loader = MemorySourceLoader::new().with("hello.txt", "hello").with("empty.txt", "");
    let manifest = Manifest::from_json(r#"{"a": "hello.txt", "b": "empty.txt"}"#).unwrap();

    let archive = build_from_manifest(&manifest, loader, &quiet()).unwrap();

    assert_eq!(archive.get("a").unwrap(), b"hello");
    assert_eq!(archive.get("b").unwrap(), Vec::<u8>::new());
    assert_eq!(list_tags(&archive).unwrap(), vec!["a", "b"]);
}

#[test]
fn test_manifest_on_disk() {
    let dir = TempDir::new().unwrap();
    let manifest_path = write_sources(
        &dir,
        &[
            ("ui/logo", "img/logo.bin", &[0x89, b'P', b'N', b'G', 0, 0, 1][..]),
            ("strings", "text/strings.txt", &b"greeting=hi\n"[..]),
            ("placeholder", "empty.dat", &b""[..]),
        ],
    );

    let archive = build_from_manifest_file(&manifest_path, &quiet()).unwrap();

    assert_eq!(archive.len(), 3);
    assert_eq!(archive.get("ui/logo").unwrap(), vec![0x89, b'P', b'N', b'G', 0, 0, 1]);
    assert_eq!(archive.get("strings").unwrap(), b"greeting=hi\n");
    assert!(archive.get("placeholder").unwrap().is_empty());
    assert_eq!(
        list_tags(&archive).unwrap(),
        vec!["ui/logo", "strings", "placeholder"]
    );
}

#[test]
fn test_write_and_reopen() {
    let dir = TempDir::new().unwrap();
    let manifest_path = write_sources(
        &dir,
        &[
            ("one", "1.bin", &b"first"[..]),
            ("two", "2.bin", &b"second payload"[..]),
        ],
    );
    let archive = build_from_manifest_file(&manifest_path, &quiet()).unwrap();

    let pack_path = dir.path().join("out.pack");
    archive.write_to(&pack_path).unwrap();

    let on_disk = std::fs::read(&pack_path).unwrap();
    assert_eq!(on_disk.as_slice(), archive.as_bytes().unwrap());
    assert_eq!(&on_disk[0..10], b"BinUgrPack");

    let reopened = Archive::open(&pack_path, &quiet()).unwrap();
    assert!(reopened.is_file_backed());
    assert_eq!(reopened.get("one").unwrap(), b"first");
    assert_eq!(reopened.get("two").unwrap(), b"second payload");
    assert_eq!(reopened.entries(), archive.entries());
}

#[test]
fn test_missing_tag_is_local_failure() {
    let mut builder = ArchiveBuilder::new(MemorySourceLoader::new());
    builder.add_entry("present", b"ok".to_vec()).unwrap();
    let archive = builder.build(&quiet()).unwrap();

    assert!(matches!(
        archive.get("absent"),
        Err(ArchiveError::TagNotFound(tag)) if tag == "absent"
    ));
    // The archive is still usable after a miss
    assert_eq!(archive.get("present").unwrap(), b"ok");
}

#[test]
fn test_get_slice_on_file_backed_archive() {
    let dir = TempDir::new().unwrap();
    let mut builder = ArchiveBuilder::new(MemorySourceLoader::new());
    builder.add_entry("a", b"abc".to_vec()).unwrap();
    let archive = builder.build(&quiet()).unwrap();

    let pack_path = dir.path().join("a.pack");
    archive.write_to(&pack_path).unwrap();
    let reopened = Archive::open(&pack_path, &quiet()).unwrap();

    assert!(matches!(
        reopened.get_slice("a"),
        Err(ArchiveError::UnsupportedOperation(_))
    ));
    assert!(matches!(
        reopened.get_slice("missing"),
        Err(ArchiveError::UnsupportedOperation(_))
    ));
    assert!(reopened.as_bytes().is_none());
}

#[test]
fn test_empty_manifest() {
    let archive = build_from_manifest(&Manifest::new(), MemorySourceLoader::new(), &quiet()).unwrap();

    assert_eq!(archive.content_header().len(), 32);
    assert!(archive.is_empty());
    assert!(list_tags(&archive).unwrap().is_empty());
    assert!(matches!(
        archive.get("a"),
        Err(ArchiveError::TagNotFound(_))
    ));
}

#[test]
fn test_source_failure_aborts_build() {
    let loader = MemorySourceLoader::new().with("ok", "fine");
    let manifest = Manifest::new()
        .with_entry("good", "ok")
        .with_entry("bad", "gone");

    match build_from_manifest(&manifest, loader, &quiet()) {
        Err(ArchiveError::SourceUnavailable { locator, .. }) => assert_eq!(locator, "gone"),
        other => panic!("expected SourceUnavailable, got {:?}", other),
    }
}

#[test]
fn test_inline_manifest_with_absolute_paths() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("data.bin");
    std::fs::write(&source, [7u8; 300]).unwrap();

    let json = serde_json::json!({ "blob": source.to_str().unwrap() }).to_string();
    let manifest = Manifest::resolve(&json).unwrap();
    let archive = build_from_manifest(&manifest, blobpack::FileSourceLoader::new(), &quiet()).unwrap();

    assert_eq!(archive.get("blob").unwrap(), vec![7u8; 300]);
}
