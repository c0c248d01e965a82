//! Accumulating entries before an archive is finalized

use crate::archive::Archive;
use crate::config::BuildOptions;
use crate::error::{ArchiveError, Result};
use crate::header::{record_size, PREAMBLE_SIZE};
use crate::loader::SourceLoader;
use crate::manifest::Manifest;
use std::collections::HashSet;

/// An entry whose payload has not been placed yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub tag: String,
    pub payload: Vec<u8>,
}

/// Collects entries for one archive
///
/// Tracks the content header size as entries arrive so the layout pass can
/// place payloads without a second sizing walk. A rejected `add_entry`
/// leaves the builder unchanged; a failed `convert` consumes it.
pub struct ArchiveBuilder<L> {
    loader: L,
    entries: Vec<PendingEntry>,
    tags: HashSet<String>,
    header_size: usize,
}

impl<L: SourceLoader> ArchiveBuilder<L> {
    pub fn new(loader: L) -> Self {
        ArchiveBuilder {
            loader,
            entries: Vec::new(),
            tags: HashSet::new(),
            header_size: PREAMBLE_SIZE,
        }
    }

    /// Load every manifest entry, in manifest order
    ///
    /// Stops at the first locator that cannot be loaded or tag that is
    /// rejected. The builder is dropped with the error, so no archive can be
    /// built from the entries loaded before it.
    pub fn convert(mut self, manifest: &Manifest) -> Result<Self> {
        for (tag, locator) in manifest.iter() {
            let payload = self.loader.load(locator)?;
            self.add_entry(tag, payload)?;
        }
        Ok(self)
    }

    /// Append an entry and grow the header size counter by its record
    pub fn add_entry<T: Into<String>, D: Into<Vec<u8>>>(&mut self, tag: T, payload: D) -> Result<()> {
        let tag = tag.into();
        if tag.is_empty() || tag.as_bytes().contains(&0) {
            return Err(ArchiveError::InvalidTag(tag));
        }
        if !self.tags.insert(tag.clone()) {
            return Err(ArchiveError::DuplicateTag(tag));
        }

        self.header_size += record_size(&tag);
        self.entries.push(PendingEntry {
            tag,
            payload: payload.into(),
        });
        Ok(())
    }

    /// Content header size the current entries will need
    pub fn header_size(&self) -> usize {
        self.header_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Finalize into an immutable archive
    pub fn build(self, options: &BuildOptions) -> Result<Archive> {
        Archive::build(self, options)
    }

    /// Hand the accumulated entries and header size to the layout pass
    pub(crate) fn into_parts(self) -> (Vec<PendingEntry>, usize) {
        (self.entries, self.header_size)
    }
}
