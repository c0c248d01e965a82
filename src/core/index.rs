//! Reading the content header index
//!
//! The index is the run of records after the preamble:
//!
//! ```text
//! ┌──────────────┬─────┬──────────────┬──────────────┐
//! │ tag (UTF-8)  │ NUL │ start u64 LE │ end u64 LE   │  repeated
//! └──────────────┴─────┴──────────────┴──────────────┘
//! ```
//!
//! Nothing here looks past the recorded header size, so the payload region
//! is never touched.

use crate::error::{ArchiveError, Result};
use crate::header::{Preamble, PREAMBLE_SIZE};

const OFFSETS_SIZE: usize = 16;

/// One decoded index record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    pub tag: String,

    /// First byte of the payload, absolute
    pub start: u64,

    /// Last byte of the payload, inclusive
    pub end: u64,
}

/// Validate the preamble and return the record region
///
/// `bytes` may be the exact content header or any longer prefix of the
/// archive; only the first `header_size` bytes are considered.
fn record_region(bytes: &[u8]) -> Result<&[u8]> {
    let preamble = Preamble::from_bytes(bytes)?;
    let header_size = usize::try_from(preamble.header_size)
        .ok()
        .filter(|&size| size <= bytes.len())
        .ok_or_else(|| {
            ArchiveError::CorruptHeader(format!(
                "recorded header size {} exceeds the {} bytes available",
                preamble.header_size,
                bytes.len()
            ))
        })?;

    Ok(&bytes[PREAMBLE_SIZE..header_size])
}

/// Walk records, handing each tag's bytes and offset field to `visit`
fn scan<'a>(bytes: &'a [u8], mut visit: impl FnMut(&'a [u8], &'a [u8]) -> Result<()>) -> Result<()> {
    let region = record_region(bytes)?;
    let mut pos = 0;

    while pos < region.len() {
        let nul = region[pos..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| {
                ArchiveError::CorruptHeader(format!(
                    "unterminated tag at header offset {}",
                    PREAMBLE_SIZE + pos
                ))
            })?;

        let tag = &region[pos..pos + nul];
        let offsets_at = pos + nul + 1;
        let offsets = region
            .get(offsets_at..offsets_at + OFFSETS_SIZE)
            .ok_or_else(|| {
                ArchiveError::CorruptHeader(format!(
                    "record at header offset {} is truncated",
                    PREAMBLE_SIZE + pos
                ))
            })?;

        visit(tag, offsets)?;
        pos = offsets_at + OFFSETS_SIZE;
    }

    Ok(())
}

fn decode_tag(raw: &[u8]) -> Result<String> {
    if raw.is_empty() {
        return Err(ArchiveError::CorruptHeader("empty tag in index".to_string()));
    }
    String::from_utf8(raw.to_vec())
        .map_err(|_| ArchiveError::CorruptHeader("tag is not valid UTF-8".to_string()))
}

fn decode_u64(raw: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(raw);
    u64::from_le_bytes(word)
}

/// Tags recorded in a content header, in layout order
pub fn list_tags(header: &[u8]) -> Result<Vec<String>> {
    let mut tags = Vec::new();
    scan(header, |tag, _| {
        tags.push(decode_tag(tag)?);
        Ok(())
    })?;
    Ok(tags)
}

/// Full records, tags plus byte ranges, in layout order
pub fn read_records(header: &[u8]) -> Result<Vec<IndexRecord>> {
    let mut records = Vec::new();
    scan(header, |tag, offsets| {
        records.push(IndexRecord {
            tag: decode_tag(tag)?,
            start: decode_u64(&offsets[..8]),
            end: decode_u64(&offsets[8..]),
        });
        Ok(())
    })?;
    Ok(records)
}
