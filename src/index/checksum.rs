//! SHA-1 checksumming over index buffers
//!
//! The index file carries a whole-file SHA-1 digest as its final 20 bytes.
//! Both directions of the codec thread their bytes through a digest so the
//! trailer can be verified (reads) or appended (writes) without a second pass.

use crate::errors::{IndexError, IndexResult};
use crate::index::CHECKSUM_SIZE;
use bytes::Bytes;
use sha1::{Digest, Sha1};

/// Cursor over an in-memory index buffer that hashes everything it reads.
///
/// All reads are bounds-checked; running off the end of the buffer is a
/// `TruncatedData` error carrying the offset where content ran out.
#[derive(Debug)]
pub(crate) struct ChecksumReader<'b> {
    buffer: &'b [u8],
    offset: usize,
    digest: Sha1,
}

impl<'b> ChecksumReader<'b> {
    pub(crate) fn new(buffer: &'b [u8]) -> Self {
        ChecksumReader {
            buffer,
            offset: 0,
            digest: Sha1::new(),
        }
    }

    /// Consume exactly `size` bytes, folding them into the running digest.
    pub(crate) fn read(&mut self, size: usize) -> IndexResult<&'b [u8]> {
        let remaining = self.remaining();
        if size > remaining {
            return Err(IndexError::TruncatedData {
                offset: self.offset,
                needed: size - remaining,
            });
        }

        let bytes = &self.buffer[self.offset..self.offset + size];
        self.digest.update(bytes);
        self.offset += size;
        Ok(bytes)
    }

    /// Distance in bytes from the cursor to the next null byte, not counting
    /// the null itself. Used for paths whose length field is saturated.
    pub(crate) fn distance_to_null(&self) -> IndexResult<usize> {
        self.buffer[self.offset..]
            .iter()
            .position(|&b| b == 0)
            .ok_or(IndexError::TruncatedData {
                offset: self.buffer.len(),
                needed: 1,
            })
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    /// Compare the digest of everything read so far against the trailing
    /// checksum block, which must be exactly the unread remainder.
    pub(crate) fn verify(self) -> IndexResult<()> {
        let remaining = self.remaining();
        if remaining < CHECKSUM_SIZE {
            return Err(IndexError::TruncatedData {
                offset: self.offset,
                needed: CHECKSUM_SIZE - remaining,
            });
        }
        if remaining > CHECKSUM_SIZE {
            return Err(IndexError::Format(format!(
                "{} trailing byte(s) after index checksum",
                remaining - CHECKSUM_SIZE
            )));
        }

        let stored = &self.buffer[self.offset..self.offset + CHECKSUM_SIZE];
        let computed = self.digest.finalize();

        if stored != computed.as_slice() {
            return Err(IndexError::ChecksumMismatch {
                stored: hex::encode(stored),
                computed: hex::encode(computed),
            });
        }

        Ok(())
    }
}

/// Growable output buffer that hashes everything written into it.
#[derive(Debug, Default)]
pub(crate) struct ChecksumWriter {
    buffer: Vec<u8>,
    digest: Sha1,
}

impl ChecksumWriter {
    pub(crate) fn new() -> Self {
        ChecksumWriter::default()
    }

    pub(crate) fn write(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        self.digest.update(data);
    }

    /// Append the digest of everything written so far and hand back the
    /// finished buffer.
    pub(crate) fn finalize(mut self) -> Bytes {
        let checksum = self.digest.finalize();
        self.buffer.extend_from_slice(checksum.as_slice());
        Bytes::from(self.buffer)
    }
}
