//! Finalized archives: layout, reopening and lookup
//!
//! ## Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Content header                              │
//! │  - Preamble (32 bytes): magic, version,     │
//! │    header size, reserved                    │
//! │  - Records: tag, NUL, start, end            │
//! ├─────────────────────────────────────────────┤
//! │ Payload region                              │
//! │  - One contiguous run per entry, in record  │
//! │    order, no gaps                           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Byte ranges are inclusive on both ends. An empty entry records
//! `start == end` and occupies no bytes, so it shares its start with the
//! entry that follows (or with the end of the archive when it is last).

use crate::builder::ArchiveBuilder;
use crate::config::{BuildOptions, LogConfig};
use crate::error::{ArchiveError, Result};
use crate::header::{PackVersion, Preamble, PREAMBLE_SIZE};
use crate::index::{self, IndexRecord};
use crate::loader::SourceLoader;
use crate::stream::{buffer_len, read_range, FileStream, MemoryStream, RandomAccessStream};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// One entry of a finalized archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    tag: String,
    start: u64,
    end: u64,
    len: u64,
}

impl Entry {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// First payload byte, absolute offset into the archive
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last payload byte, inclusive (equal to `start` for an empty entry)
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Payload length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Where the archive bytes live
enum Backing {
    /// Whole archive held in memory
    Memory(Vec<u8>),

    /// Archive file on disk; the lock serializes seek+read pairs
    File(Mutex<FileStream>),
}

/// Immutable, queryable archive
///
/// Built once from an [`ArchiveBuilder`], or reopened from bytes or a file.
/// Lookups by tag are O(1) through a tag → position map over the entry list,
/// which stays in layout order.
pub struct Archive {
    header: Vec<u8>,
    version: PackVersion,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    backing: Backing,
    log: LogConfig,
}

impl Archive {
    /// Lay out the builder's entries and produce the finalized blob
    ///
    /// Consumes the builder: payload buffers move into the blob and are
    /// released one by one as they are copied.
    pub fn build<L: SourceLoader>(builder: ArchiveBuilder<L>, options: &BuildOptions) -> Result<Self> {
        let (pending, header_size) = builder.into_parts();

        let mut header = Vec::with_capacity(header_size);
        header.extend_from_slice(&Preamble::new(options.version, header_size as u64).to_bytes());

        // Payloads start right after the full header, records included
        let mut cursor = header_size as u64;
        let mut entries = Vec::with_capacity(pending.len());

        for item in &pending {
            let len = item.payload.len() as u64;
            let start = cursor;
            let end = if len == 0 { start } else { start + len - 1 };

            header.extend_from_slice(item.tag.as_bytes());
            header.push(0);
            header.extend_from_slice(&start.to_le_bytes());
            header.extend_from_slice(&end.to_le_bytes());

            if options.log.debug_output {
                debug!("Placed '{}' at [{}, {}] ({} bytes)", item.tag, start, end, len);
            }

            entries.push(Entry {
                tag: item.tag.clone(),
                start,
                end,
                len,
            });
            cursor += len;
        }

        if header.len() != header_size {
            return Err(ArchiveError::CorruptHeader(format!(
                "serialized header is {} bytes but {} were accounted for",
                header.len(),
                header_size
            )));
        }

        let mut blob = Vec::with_capacity(cursor as usize);
        blob.extend_from_slice(&header);
        for item in pending {
            blob.extend_from_slice(&item.payload);
        }

        if options.log.console {
            info!(
                "Built archive v{} with {} entries ({} header bytes, {} total)",
                options.version,
                entries.len(),
                header.len(),
                blob.len()
            );
        }

        Ok(Self::from_parts(
            header,
            options.version,
            entries,
            Backing::Memory(blob),
            options.log,
        ))
    }

    /// Reopen an archive from its bytes
    pub fn from_bytes(blob: Vec<u8>, options: &BuildOptions) -> Result<Self> {
        let preamble = Preamble::from_bytes(&blob)?;
        let header_size = checked_header_size(&preamble, blob.len() as u64)?;
        let header = blob[..header_size].to_vec();
        let entries = layout_from_records(index::read_records(&header)?, header_size as u64, blob.len() as u64)?;

        if options.log.console {
            info!("Opened in-memory archive with {} entries", entries.len());
        }

        Ok(Self::from_parts(
            header,
            preamble.version,
            entries,
            Backing::Memory(blob),
            options.log,
        ))
    }

    /// Open an archive file, reading only its content header
    ///
    /// Payloads stay on disk and are read on demand by [`Archive::get`].
    pub fn open<P: AsRef<Path>>(path: P, options: &BuildOptions) -> Result<Self> {
        let mut stream = FileStream::open(&path)?;
        let total = stream.size()?;

        if total < PREAMBLE_SIZE as u64 {
            return Err(ArchiveError::CorruptHeader(format!(
                "file is {} bytes, shorter than the preamble",
                total
            )));
        }
        let preamble = Preamble::from_bytes(&read_range(&mut stream, 0, PREAMBLE_SIZE)?)?;
        let header_size = checked_header_size(&preamble, total)?;
        let header = read_range(&mut stream, 0, header_size)?;
        let entries = layout_from_records(index::read_records(&header)?, header_size as u64, total)?;

        if options.log.console {
            info!(
                "Opened archive {:?} with {} entries",
                path.as_ref(),
                entries.len()
            );
        }

        Ok(Self::from_parts(
            header,
            preamble.version,
            entries,
            Backing::File(Mutex::new(stream)),
            options.log,
        ))
    }

    fn from_parts(
        header: Vec<u8>,
        version: PackVersion,
        entries: Vec<Entry>,
        backing: Backing,
        log: LogConfig,
    ) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.tag.clone(), position))
            .collect();

        Archive {
            header,
            version,
            entries,
            index,
            backing,
            log,
        }
    }

    /// Copy of the payload stored under `tag`
    ///
    /// Reads through the active stream and leaves its position unchanged,
    /// also when the read fails. An empty entry yields an empty vector.
    pub fn get(&self, tag: &str) -> Result<Vec<u8>> {
        let entry = self.entry(tag).ok_or_else(|| ArchiveError::TagNotFound(tag.to_string()))?;
        if self.log.debug_output {
            debug!("Reading '{}' ({} bytes at {})", tag, entry.len, entry.start);
        }
        if entry.is_empty() {
            return Ok(Vec::new());
        }

        let len = buffer_len(entry.len)?;

        match &self.backing {
            Backing::Memory(blob) => {
                let mut stream = MemoryStream::new(blob);
                read_range(&mut stream, entry.start, len)
            }
            Backing::File(stream) => {
                let mut stream = stream.lock();
                read_range(&mut *stream, entry.start, len)
            }
        }
    }

    /// Borrowed view of the payload stored under `tag`
    ///
    /// Only memory-resident archives can hand out slices; a file-backed
    /// archive returns `UnsupportedOperation`.
    pub fn get_slice(&self, tag: &str) -> Result<&[u8]> {
        let blob = match &self.backing {
            Backing::Memory(blob) => blob,
            Backing::File(_) => {
                return Err(ArchiveError::UnsupportedOperation(
                    "borrowed payload access requires a memory-resident archive",
                ))
            }
        };

        let entry = self.entry(tag).ok_or_else(|| ArchiveError::TagNotFound(tag.to_string()))?;
        let start = entry.start as usize;
        Ok(&blob[start..start + entry.len as usize])
    }

    pub fn entry(&self, tag: &str) -> Option<&Entry> {
        self.index.get(tag).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.index.contains_key(tag)
    }

    /// Entries in layout order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Tags in layout order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Entry::tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw content header bytes
    pub fn content_header(&self) -> &[u8] {
        &self.header
    }

    pub fn version(&self) -> PackVersion {
        self.version
    }

    /// The complete archive, when it is held in memory
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.backing {
            Backing::Memory(blob) => Some(blob),
            Backing::File(_) => None,
        }
    }

    pub fn is_file_backed(&self) -> bool {
        matches!(self.backing, Backing::File(_))
    }

    /// Total archive size in bytes
    pub fn size(&self) -> Result<u64> {
        match &self.backing {
            Backing::Memory(blob) => Ok(blob.len() as u64),
            Backing::File(stream) => stream.lock().size(),
        }
    }

    /// Write the complete archive to `path`
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        match &self.backing {
            Backing::Memory(blob) => std::fs::write(&path, blob)?,
            Backing::File(stream) => {
                let mut stream = stream.lock();
                let size = buffer_len(stream.size()?)?;
                let blob = read_range(&mut *stream, 0, size)?;
                std::fs::write(&path, blob)?;
            }
        }

        if self.log.console {
            info!("Wrote archive to {:?}", path.as_ref());
        }
        Ok(())
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("version", &self.version)
            .field("header_len", &self.header.len())
            .field("entries", &self.entries)
            .field("file_backed", &self.is_file_backed())
            .finish()
    }
}

/// Recorded header size as a usize, checked against the archive length
fn checked_header_size(preamble: &Preamble, total: u64) -> Result<usize> {
    if preamble.header_size > total {
        return Err(ArchiveError::CorruptHeader(format!(
            "recorded header size {} exceeds archive size {}",
            preamble.header_size, total
        )));
    }
    usize::try_from(preamble.header_size)
        .map_err(|_| ArchiveError::CorruptHeader("header size overflows usize".to_string()))
}

/// Rebuild entries from index records and check the layout
///
/// Ranges must tile the payload region exactly, in record order, from the
/// end of the header to the end of the archive.
fn layout_from_records(records: Vec<IndexRecord>, header_size: u64, total: u64) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = Vec::with_capacity(records.len());
    let mut seen = std::collections::HashSet::with_capacity(records.len());
    let mut cursor = header_size;

    for (position, record) in records.iter().enumerate() {
        if !seen.insert(record.tag.as_str()) {
            return Err(ArchiveError::CorruptHeader(format!(
                "tag '{}' appears more than once",
                record.tag
            )));
        }
        if record.start != cursor {
            return Err(ArchiveError::CorruptHeader(format!(
                "entry '{}' starts at {}, expected {}",
                record.tag, record.start, cursor
            )));
        }

        let next = records.get(position + 1).map_or(total, |next| next.start);
        let len = if next == record.start {
            if record.end != record.start {
                return Err(ArchiveError::CorruptHeader(format!(
                    "empty entry '{}' has end {} past its start {}",
                    record.tag, record.end, record.start
                )));
            }
            0
        } else {
            if record.end < record.start || record.end.checked_add(1) != Some(next) {
                return Err(ArchiveError::CorruptHeader(format!(
                    "entry '{}' range [{}, {}] does not end before {}",
                    record.tag, record.start, record.end, next
                )));
            }
            next - record.start
        };

        cursor += len;
        entries.push(Entry {
            tag: record.tag.clone(),
            start: record.start,
            end: record.end,
            len,
        });
    }

    if cursor != total {
        return Err(ArchiveError::CorruptHeader(format!(
            "payload region ends at {} but archive is {} bytes",
            cursor, total
        )));
    }

    Ok(entries)
}
