use crate::error::{ArchiveError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAGIC: [u8; 10] = *b"BinUgrPack";
pub const VERSION_MAJOR: u8 = 1;
pub const VERSION_MINOR: u8 = 0;
pub const VERSION_PATCH: u8 = 0;

/// Size of the fixed preamble that opens every content header
pub const PREAMBLE_SIZE: usize = 32;

/// Bytes a record adds on top of its tag: NUL terminator plus two u64 offsets
pub const RECORD_OVERHEAD: usize = 1 + 16;

const VERSION_OFFSET: usize = 10;
const SIZE_OFFSET: usize = 16;
const RESERVED_OFFSET: usize = 24;

/// Pack format version
///
/// A (major, minor, patch) byte triple packed into a little-endian 32-bit
/// word with a trailing unused byte. Recorded for information only; readers
/// never branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl PackVersion {
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        PackVersion {
            major,
            minor,
            patch,
        }
    }

    /// Version written by this build of the crate
    pub const fn current() -> Self {
        Self::new(VERSION_MAJOR, VERSION_MINOR, VERSION_PATCH)
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [self.major, self.minor, self.patch, 0]
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    /// Packed 32-bit word (major in the lowest byte)
    pub fn to_word(self) -> u32 {
        u32::from_le_bytes(self.to_bytes())
    }

    /// Unpack a 32-bit word, ignoring the unused high byte
    pub fn from_word(word: u32) -> Self {
        Self::from_bytes(word.to_le_bytes())
    }
}

impl Default for PackVersion {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for PackVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl TryFrom<&semver::Version> for PackVersion {
    type Error = ArchiveError;

    fn try_from(version: &semver::Version) -> Result<Self> {
        let component = |value: u64| {
            u8::try_from(value).map_err(|_| ArchiveError::InvalidVersion(version.to_string()))
        };
        Ok(PackVersion::new(
            component(version.major)?,
            component(version.minor)?,
            component(version.patch)?,
        ))
    }
}

/// Fixed-size preamble at the start of the content header
///
/// ```text
/// 0..10   magic "BinUgrPack"
/// 10..14  version word (major, minor, patch, unused)
/// 14..16  zero padding
/// 16..24  total content header size (u64 LE, full length)
/// 24..32  reserved, zero
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preamble {
    pub version: PackVersion,

    /// Total length of the content header, preamble and records included
    pub header_size: u64,
}

impl Preamble {
    pub fn new(version: PackVersion, header_size: u64) -> Self {
        Preamble {
            version,
            header_size,
        }
    }

    /// Serialize preamble to bytes
    pub fn to_bytes(&self) -> [u8; PREAMBLE_SIZE] {
        let mut bytes = [0u8; PREAMBLE_SIZE];
        bytes[..VERSION_OFFSET].copy_from_slice(&MAGIC);
        bytes[VERSION_OFFSET..VERSION_OFFSET + 4].copy_from_slice(&self.version.to_bytes());
        bytes[SIZE_OFFSET..RESERVED_OFFSET].copy_from_slice(&self.header_size.to_le_bytes());
        bytes
    }

    /// Deserialize and validate a preamble
    ///
    /// Checks the magic signature and that the recorded header size can at
    /// least hold the preamble itself. Whether the size matches the actual
    /// header is up to the caller, which knows how many bytes it has.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < PREAMBLE_SIZE {
            return Err(ArchiveError::CorruptHeader(format!(
                "need {} preamble bytes, got {}",
                PREAMBLE_SIZE,
                bytes.len()
            )));
        }

        if bytes[..VERSION_OFFSET] != MAGIC {
            return Err(ArchiveError::InvalidMagic);
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[VERSION_OFFSET..VERSION_OFFSET + 4]);

        let mut size = [0u8; 8];
        size.copy_from_slice(&bytes[SIZE_OFFSET..RESERVED_OFFSET]);
        let header_size = u64::from_le_bytes(size);

        if header_size < PREAMBLE_SIZE as u64 {
            return Err(ArchiveError::CorruptHeader(format!(
                "recorded header size {} is smaller than the preamble",
                header_size
            )));
        }

        Ok(Preamble {
            version: PackVersion::from_bytes(version),
            header_size,
        })
    }
}

/// Header bytes one record for `tag` occupies
pub fn record_size(tag: &str) -> usize {
    tag.len() + RECORD_OVERHEAD
}
