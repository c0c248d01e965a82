//! # Blobpack - Single-Blob Resource Archives
//!
//! `blobpack-rs` packs a named set of byte blobs into one contiguous archive
//! and retrieves any of them by tag without re-parsing the archive:
//!
//! - **One blob**: a content header (index) followed by every payload
//! - **O(1) lookup** through a tag → entry map built from the header
//! - **Two media**: query an archive held in memory or straight from disk
//! - **Manifest driven**: a JSON object maps tags to source locators
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blobpack::{build_from_manifest, BuildOptions, FileSourceLoader, Manifest, Result};
//!
//! # fn main() -> Result<()> {
//! let manifest = Manifest::from_json(r#"{"logo": "assets/logo.png"}"#)?;
//! let archive = build_from_manifest(&manifest, FileSourceLoader::new(), &BuildOptions::default())?;
//!
//! let logo = archive.get("logo")?;
//! archive.write_to("assets.pack")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Reading from Disk
//!
//! ```rust,no_run
//! use blobpack::{Archive, BuildOptions, Result};
//!
//! # fn main() -> Result<()> {
//! // Only the content header is read up front
//! let archive = Archive::open("assets.pack", &BuildOptions::default())?;
//! for tag in archive.tags() {
//!     println!("{}", tag);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;

// Re-export core modules internally so crate:: paths in core still work
#[allow(unused_imports)]
pub(crate) use crate::core::{
    archive, builder, config, error, header, index, loader, manifest, stream,
};

pub use crate::core::{
    archive::{Archive, Entry},
    builder::ArchiveBuilder,
    config::{BuildOptions, LogConfig, PackConfig},
    error::{ArchiveError, Result},
    header::{PackVersion, MAGIC, PREAMBLE_SIZE},
    index::{read_records, IndexRecord},
    loader::{FileSourceLoader, MemorySourceLoader, SourceLoader},
    manifest::Manifest,
    stream::{FileStream, MemoryStream, RandomAccessStream},
};

use std::path::Path;
use tracing::info;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build an archive from a manifest
///
/// Loads every locator through `loader` in manifest order, then lays out
/// the archive. Any failure aborts the whole build.
///
/// # Examples
///
/// ```
/// use blobpack::{build_from_manifest, BuildOptions, Manifest, MemorySourceLoader};
///
/// let loader = MemorySourceLoader::new()
///     .with("greeting.txt", "hello")
///     .with("empty.txt", "");
/// let manifest = Manifest::new()
///     .with_entry("a", "greeting.txt")
///     .with_entry("b", "empty.txt");
///
/// let archive = build_from_manifest(&manifest, loader, &BuildOptions::default()).unwrap();
/// assert_eq!(archive.get("a").unwrap(), b"hello");
/// assert!(archive.get("b").unwrap().is_empty());
/// ```
pub fn build_from_manifest<L: SourceLoader>(
    manifest: &Manifest,
    loader: L,
    options: &BuildOptions,
) -> Result<Archive> {
    ArchiveBuilder::new(loader).convert(manifest)?.build(options)
}

/// Build an archive from a manifest file on disk
///
/// Relative locators resolve against the manifest's own directory.
pub fn build_from_manifest_file<P: AsRef<Path>>(path: P, options: &BuildOptions) -> Result<Archive> {
    let path = path.as_ref();
    if options.log.console {
        info!("Building archive from manifest {:?}", path);
    }

    let manifest = Manifest::from_path(path)?;
    let loader = match manifest.base_dir() {
        Some(dir) => FileSourceLoader::with_base_dir(dir),
        None => FileSourceLoader::new(),
    };
    build_from_manifest(&manifest, loader, options)
}

/// Tags recorded in an archive's content header, in layout order
pub fn list_tags(archive: &Archive) -> Result<Vec<String>> {
    index::list_tags(archive.content_header())
}
