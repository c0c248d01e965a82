//! Random-access byte streams over memory and disk
//!
//! Archive queries go through [`RandomAccessStream`] so the same lookup code
//! works against a finalized in-memory blob or an archive file on disk.

use crate::error::{ArchiveError, Result};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Uniform read/seek/tell/size access to a byte source
///
/// Implementations must agree on observable behavior for equal content:
/// `seek` clamps to `[0, size]` and returns the new position, `read` returns
/// 0 at the end of the stream instead of failing.
pub trait RandomAccessStream {
    /// Read up to `buf.len()` bytes, returning how many were read
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Move to an absolute position, returning the new position
    fn seek(&mut self, offset: u64) -> Result<u64>;

    /// Current position
    fn tell(&mut self) -> Result<u64>;

    /// Total length of the stream
    fn size(&mut self) -> Result<u64>;
}

/// Read exactly `len` bytes at `start` without moving the stream
///
/// The position held before the call is restored on success and on error.
pub fn read_range<S: RandomAccessStream + ?Sized>(
    stream: &mut S,
    start: u64,
    len: usize,
) -> Result<Vec<u8>> {
    let saved = stream.tell()?;
    let result = read_range_inner(stream, start, len);
    let restored = stream.seek(saved);

    let data = result?;
    restored?;
    Ok(data)
}

fn read_range_inner<S: RandomAccessStream + ?Sized>(
    stream: &mut S,
    start: u64,
    len: usize,
) -> Result<Vec<u8>> {
    if stream.seek(start)? != start {
        return Err(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("offset {} lies past the end of the stream", start),
        )
        .into());
    }

    let mut buffer = vec![0u8; len];
    let read = stream.read(&mut buffer)?;
    if read != len {
        return Err(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("expected {} bytes at offset {}, got {}", len, start, read),
        )
        .into());
    }

    Ok(buffer)
}

/// Byte count as a buffer length, or an error where `usize` cannot hold it
pub(crate) fn buffer_len(len: u64) -> Result<usize> {
    usize::try_from(len)
        .map_err(|_| ArchiveError::UnsupportedOperation("read is larger than addressable memory"))
}

/// Read-only stream over a borrowed byte slice
#[derive(Debug, Clone)]
pub struct MemoryStream<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> MemoryStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        MemoryStream { data, offset: 0 }
    }

    /// Bytes from the current position to the end
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }
}

impl RandomAccessStream for MemoryStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let count = buf.len().min(self.data.len() - self.offset);
        buf[..count].copy_from_slice(&self.data[self.offset..self.offset + count]);
        self.offset += count;
        Ok(count)
    }

    fn seek(&mut self, offset: u64) -> Result<u64> {
        self.offset = usize::try_from(offset)
            .unwrap_or(usize::MAX)
            .min(self.data.len());
        Ok(self.offset as u64)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.offset as u64)
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }
}

/// Read-only stream that owns an open file handle
///
/// The handle is closed when the stream is dropped.
#[derive(Debug)]
pub struct FileStream {
    file: File,
    path: PathBuf,
}

impl FileStream {
    /// Open an existing file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;

        Ok(FileStream {
            file,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the remainder of the file from the current position
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let remaining = self.size()?.saturating_sub(self.tell()?);
        let mut buffer = vec![0u8; buffer_len(remaining)?];
        let read = RandomAccessStream::read(self, &mut buffer)?;
        buffer.truncate(read);
        Ok(buffer)
    }
}

impl RandomAccessStream for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    fn seek(&mut self, offset: u64) -> Result<u64> {
        let target = offset.min(self.size()?);
        Ok(self.file.seek(SeekFrom::Start(target))?)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.file.stream_position()?)
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}
