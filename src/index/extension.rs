//! Index extension blocks
//!
//! Between the last entry and the trailing checksum, versions 2 and up allow
//! decorated data blocks: a 4-byte ASCII signature, a big-endian payload
//! length, and the payload itself (cached tree, resolve-undo, and friends).
//! The codec carries these opaquely so that re-serialization does not drop
//! state written by other tools; interpreting payloads is the callers' job.

use crate::errors::{IndexError, IndexResult};
use crate::index::CHECKSUM_SIZE;
use crate::index::checksum::{ChecksumReader, ChecksumWriter};
use byteorder::{ByteOrder, NetworkEndian};
use bytes::Bytes;

const EXTENSION_HEADER_SIZE: usize = 8;

/// One opaque extension block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    signature: [u8; 4],
    payload: Bytes,
}

impl Extension {
    pub fn new(signature: [u8; 4], payload: impl Into<Bytes>) -> IndexResult<Self> {
        if !signature.iter().all(u8::is_ascii_alphabetic) {
            return Err(IndexError::Format(format!(
                "invalid extension signature: {signature:?}"
            )));
        }

        Ok(Extension {
            signature,
            payload: payload.into(),
        })
    }

    pub fn signature(&self) -> &[u8; 4] {
        &self.signature
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Extensions whose signature starts with an uppercase letter may be
    /// ignored by readers that do not understand them.
    pub fn is_optional(&self) -> bool {
        self.signature[0].is_ascii_uppercase()
    }

    pub(crate) fn pack(&self, writer: &mut ChecksumWriter) {
        writer.write(&self.signature);
        writer.write(&(self.payload.len() as u32).to_be_bytes());
        writer.write(&self.payload);
    }

    /// Decode the block at the reader's cursor. The payload must leave the
    /// trailing checksum intact.
    pub(crate) fn unpack(reader: &mut ChecksumReader<'_>) -> IndexResult<Self> {
        let header = reader.read(EXTENSION_HEADER_SIZE)?;
        let signature: [u8; 4] = header[0..4]
            .try_into()
            .map_err(|_| IndexError::Format(String::from("short extension header")))?;
        let length = NetworkEndian::read_u32(&header[4..8]) as usize;

        let available = reader.remaining().saturating_sub(CHECKSUM_SIZE);
        if length > available {
            return Err(IndexError::TruncatedData {
                offset: reader.offset(),
                needed: length - available,
            });
        }

        let payload = Bytes::copy_from_slice(reader.read(length)?);
        Extension::new(signature, payload)
    }
}
