//! Archive format implementation
//!
//! - [`error`] - Error types for archive operations
//! - [`header`] - Content header preamble and pack version
//! - [`stream`] - Random-access streams over memory and files
//! - [`loader`] - Source loaders that resolve manifest locators
//! - [`manifest`] - Tag → locator manifests
//! - [`builder`] - Entry accumulation before finalization
//! - [`archive`] - Layout, reopening and lookup
//! - [`index`] - Content header index reader
//! - [`config`] - Build options and TOML configuration

pub mod archive;
pub mod builder;
pub mod config;
pub mod error;
pub mod header;
pub mod index;
pub mod loader;
pub mod manifest;
pub mod stream;

pub use archive::{Archive, Entry};
pub use builder::{ArchiveBuilder, PendingEntry};
pub use config::{BuildOptions, LogConfig, PackConfig};
pub use error::{ArchiveError, Result};
pub use header::{PackVersion, Preamble, MAGIC, PREAMBLE_SIZE};
pub use index::IndexRecord;
pub use loader::{FileSourceLoader, MemorySourceLoader, SourceLoader};
pub use manifest::Manifest;
pub use stream::{FileStream, MemoryStream, RandomAccessStream};
