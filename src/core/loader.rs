//! Resolving manifest locators into raw bytes

use crate::error::{ArchiveError, Result};
use crate::stream::FileStream;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Turns a locator from a manifest into the bytes it names
pub trait SourceLoader {
    fn load(&self, locator: &str) -> Result<Vec<u8>>;
}

impl<L: SourceLoader + ?Sized> SourceLoader for &L {
    fn load(&self, locator: &str) -> Result<Vec<u8>> {
        (**self).load(locator)
    }
}

/// Loads locators as file paths
///
/// Relative paths are resolved against `base_dir` when one is set, and
/// against the working directory otherwise.
#[derive(Debug, Clone, Default)]
pub struct FileSourceLoader {
    base_dir: Option<PathBuf>,
}

impl FileSourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir<P: Into<PathBuf>>(base_dir: P) -> Self {
        FileSourceLoader {
            base_dir: Some(base_dir.into()),
        }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    fn resolve(&self, locator: &str) -> PathBuf {
        let path = Path::new(locator);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl SourceLoader for FileSourceLoader {
    fn load(&self, locator: &str) -> Result<Vec<u8>> {
        let path = self.resolve(locator);
        let unavailable = |source| ArchiveError::SourceUnavailable {
            locator: locator.to_string(),
            source,
        };

        let mut stream = FileStream::open(&path).map_err(|e| match e {
            ArchiveError::Io(io) => unavailable(io),
            other => other,
        })?;
        stream.read_to_end().map_err(|e| match e {
            ArchiveError::Io(io) => unavailable(io),
            other => other,
        })
    }
}

/// Serves locators from an in-memory table
#[derive(Debug, Clone, Default)]
pub struct MemorySourceLoader {
    sources: HashMap<String, Vec<u8>>,
}

impl MemorySourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<L: Into<String>, D: Into<Vec<u8>>>(&mut self, locator: L, data: D) {
        self.sources.insert(locator.into(), data.into());
    }

    pub fn with<L: Into<String>, D: Into<Vec<u8>>>(mut self, locator: L, data: D) -> Self {
        self.insert(locator, data);
        self
    }
}

impl SourceLoader for MemorySourceLoader {
    fn load(&self, locator: &str) -> Result<Vec<u8>> {
        self.sources
            .get(locator)
            .cloned()
            .ok_or_else(|| ArchiveError::SourceUnavailable {
                locator: locator.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "locator not registered",
                ),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_loader_reads_whole_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hello.txt");
        std::fs::write(&path, b"hello").unwrap();

        let loader = FileSourceLoader::new();
        assert_eq!(loader.load(path.to_str().unwrap()).unwrap(), b"hello");
    }

    #[test]
    fn test_file_loader_relative_to_base() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("assets")).unwrap();
        std::fs::write(temp_dir.path().join("assets/icon.bin"), [1u8, 2, 3]).unwrap();

        let loader = FileSourceLoader::with_base_dir(temp_dir.path());
        assert_eq!(loader.load("assets/icon.bin").unwrap(), vec![1, 2, 3]);
        assert_eq!(loader.base_dir(), Some(temp_dir.path()));
    }

    #[test]
    fn test_file_loader_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("empty"), b"").unwrap();

        let loader = FileSourceLoader::with_base_dir(temp_dir.path());
        assert!(loader.load("empty").unwrap().is_empty());
    }

    #[test]
    fn test_file_loader_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let loader = FileSourceLoader::with_base_dir(temp_dir.path());

        match loader.load("nope.txt") {
            Err(ArchiveError::SourceUnavailable { locator, .. }) => assert_eq!(locator, "nope.txt"),
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_memory_loader() {
        let loader = MemorySourceLoader::new().with("a", "hello").with("b", Vec::<u8>::new());

        assert_eq!(loader.load("a").unwrap(), b"hello");
        assert!(loader.load("b").unwrap().is_empty());
        assert!(matches!(
            loader.load("c"),
            Err(ArchiveError::SourceUnavailable { .. })
        ));
    }
}
