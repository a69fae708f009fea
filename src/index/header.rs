use crate::errors::{IndexError, IndexResult};
use crate::index::{HEADER_SIZE, SIGNATURE, SUPPORTED_VERSIONS};
use byteorder::{ByteOrder, NetworkEndian};
use bytes::Bytes;

/// Fixed 12-byte header of an index file: signature, version, entry count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHeader {
    pub(crate) version: u32,
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    pub(crate) fn new(version: u32, entries_count: u32) -> IndexResult<Self> {
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(IndexError::UnsupportedVersion(version));
        }

        Ok(IndexHeader {
            version,
            entries_count,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn entries_count(&self) -> u32 {
        self.entries_count
    }

    pub(crate) fn pack(&self) -> Bytes {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(SIGNATURE);
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&self.entries_count.to_be_bytes());

        Bytes::from(bytes)
    }

    pub(crate) fn unpack(bytes: &[u8]) -> IndexResult<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(IndexError::TruncatedData {
                offset: bytes.len(),
                needed: HEADER_SIZE - bytes.len(),
            });
        }

        if &bytes[0..4] != SIGNATURE {
            return Err(IndexError::Format(format!(
                "invalid index signature: {:?}",
                &bytes[0..4]
            )));
        }

        let version = NetworkEndian::read_u32(&bytes[4..8]);
        let entries_count = NetworkEndian::read_u32(&bytes[8..12]);

        IndexHeader::new(version, entries_count)
    }
}
