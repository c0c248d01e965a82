//! Pack manifest
//!
//! A manifest names the entries of an archive: an ordered list of
//! tag → locator pairs, read from a single-level JSON object.
//!
//! ```json
//! {
//!     "ui/logo": "assets/logo.png",
//!     "strings": "data/strings.txt"
//! }
//! ```
//!
//! Document order is layout order. Repeated keys are kept as written so the
//! build can reject them instead of silently keeping the last one.

use crate::error::{ArchiveError, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<(String, String)>,

    /// Directory the manifest was read from, if it came from disk
    base_dir: Option<PathBuf>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a manifest from JSON text
    ///
    /// # Errors
    ///
    /// Returns `Manifest` for malformed JSON and for documents that are not
    /// a single-level object of strings.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a manifest file
    ///
    /// Relative locators in the manifest are later resolved against the
    /// file's directory.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut manifest = Self::from_json(&json)?;
        manifest.base_dir = Some(
            path.parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        );
        Ok(manifest)
    }

    /// Load from a path if `input` names an existing file, else parse it as JSON
    pub fn resolve(input: &str) -> Result<Self> {
        let path = Path::new(input);
        if path.is_file() {
            Self::from_path(path)
        } else {
            Self::from_json(input)
        }
    }

    /// Append an entry
    pub fn push<T: Into<String>, L: Into<String>>(&mut self, tag: T, locator: L) {
        self.entries.push((tag.into(), locator.into()));
    }

    /// Append an entry (builder style)
    pub fn with_entry<T: Into<String>, L: Into<String>>(mut self, tag: T, locator: L) -> Self {
        self.push(tag, locator);
        self
    }

    /// Set the directory relative locators resolve against
    pub fn with_base_dir<P: Into<PathBuf>>(mut self, base_dir: P) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Entries in manifest order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(tag, locator)| (tag.as_str(), locator.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (tag, locator) in &self.entries {
            map.serialize_entry(tag, locator)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ManifestVisitor;

        impl<'de> Visitor<'de> for ManifestVisitor {
            type Value = Manifest;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object mapping tags to locator strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Manifest, A::Error> {
                let mut manifest = Manifest::new();
                while let Some((tag, locator)) = access.next_entry::<String, String>()? {
                    manifest.push(tag, locator);
                }
                Ok(manifest)
            }
        }

        deserializer.deserialize_map(ManifestVisitor)
    }
}

impl<T: Into<String>, L: Into<String>> FromIterator<(T, L)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (T, L)>>(iter: I) -> Self {
        let mut manifest = Manifest::new();
        for (tag, locator) in iter {
            manifest.push(tag, locator);
        }
        manifest
    }
}

impl std::str::FromStr for Manifest {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json(s)
    }
}
