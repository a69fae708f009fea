#![allow(dead_code)]

//! Hand-rolled index buffers for parser tests.
//!
//! The builder writes the on-disk layout byte by byte, independently of the
//! crate's own serializer, so that parse tests cannot be fooled by a bug
//! shared between both directions of the codec.

use sha1::{Digest, Sha1};

pub const ENTRY_FIXED_SIZE: usize = 62;
pub const ENTRY_BLOCK: usize = 8;

/// Deterministic per-path object id for test entries.
pub fn oid_for(path: &[u8]) -> [u8; 20] {
    Sha1::digest(path).into()
}

pub struct RawIndexBuilder {
    buffer: Vec<u8>,
}

impl RawIndexBuilder {
    /// Start a buffer with a header declaring `entry_count` entries. The
    /// count is declared up front and not adjusted, so tests can lie.
    pub fn new(version: u32, entry_count: u32) -> Self {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(b"DIRC");
        buffer.extend_from_slice(&version.to_be_bytes());
        buffer.extend_from_slice(&entry_count.to_be_bytes());

        RawIndexBuilder { buffer }
    }

    /// Append a stage-0 regular-file entry with fixed stat fields and an
    /// object id derived from the path.
    pub fn entry(self, path: &[u8]) -> Self {
        self.entry_at_stage(path, 0)
    }

    pub fn entry_at_stage(self, path: &[u8], stage: u8) -> Self {
        let flags = ((stage as u16 & 0b11) << 12) | path.len().min(0xFFF) as u16;
        self.entry_raw(path, &oid_for(path), 0o100644, flags, None)
    }

    /// Append an entry with full control over the mode word, the flags word,
    /// and the optional version-3 extended flags word.
    pub fn entry_raw(
        mut self,
        path: &[u8],
        oid: &[u8; 20],
        mode: u32,
        flags: u16,
        extended_flags: Option<u16>,
    ) -> Self {
        let record_start = self.buffer.len();

        for field in [
            1_700_000_000u32, // ctime
            0,                // ctime_nsec
            1_700_000_001,    // mtime
            0,                // mtime_nsec
            2049,             // dev
            42,               // ino
            mode,
            1000, // uid
            1000, // gid
            6,    // size
        ] {
            self.buffer.extend_from_slice(&field.to_be_bytes());
        }
        self.buffer.extend_from_slice(oid);
        self.buffer.extend_from_slice(&flags.to_be_bytes());
        if let Some(word) = extended_flags {
            self.buffer.extend_from_slice(&word.to_be_bytes());
        }
        self.buffer.extend_from_slice(path);

        self.buffer.push(0);
        while (self.buffer.len() - record_start) % ENTRY_BLOCK != 0 {
            self.buffer.push(0);
        }

        self
    }

    /// Append an extension block (signature, length, payload).
    pub fn extension(mut self, signature: &[u8; 4], payload: &[u8]) -> Self {
        self.buffer.extend_from_slice(signature);
        self.buffer
            .extend_from_slice(&(payload.len() as u32).to_be_bytes());
        self.buffer.extend_from_slice(payload);

        self
    }

    /// Append arbitrary bytes verbatim.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buffer.extend_from_slice(bytes);
        self
    }

    /// Close the buffer with a correct SHA-1 trailer.
    pub fn finish(mut self) -> Vec<u8> {
        let digest = Sha1::digest(&self.buffer);
        self.buffer.extend_from_slice(&digest);
        self.buffer
    }

    /// Close the buffer without any trailer at all.
    pub fn finish_without_checksum(self) -> Vec<u8> {
        self.buffer
    }
}
