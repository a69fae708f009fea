//! Object identifier (SHA-1 hash)
//!
//! The index stores the identity of every staged blob as a raw 20-byte
//! digest. The codec never dereferences these (resolving an identifier to
//! object content belongs to the repository object store), so this type only
//! carries, compares, and renders the bytes.

use crate::errors::{IndexError, IndexResult};
use crate::objects::{OBJECT_ID_HEX_LENGTH, OBJECT_ID_SIZE};
use std::fmt;

/// Binary SHA-1 object identifier
///
/// Stored in the index entry as 20 raw bytes; rendered as 40 lowercase hex
/// characters everywhere user-facing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectId([u8; OBJECT_ID_SIZE]);

impl ObjectId {
    /// The all-zero identifier, used by callers as a "no object" marker.
    pub const fn zero() -> Self {
        ObjectId([0; OBJECT_ID_SIZE])
    }

    /// Build an identifier from its raw binary form.
    pub fn from_bytes(bytes: &[u8]) -> IndexResult<Self> {
        let bytes: [u8; OBJECT_ID_SIZE] = bytes
            .try_into()
            .map_err(|_| IndexError::Format(format!("object id must be {OBJECT_ID_SIZE} bytes")))?;
        Ok(ObjectId(bytes))
    }

    /// Parse an identifier from its 40-character hexadecimal form.
    pub fn from_hex(hex40: &str) -> IndexResult<Self> {
        if hex40.len() != OBJECT_ID_HEX_LENGTH {
            return Err(IndexError::Format(format!(
                "object id hex must be {OBJECT_ID_HEX_LENGTH} characters, found {}",
                hex40.len()
            )));
        }
        let bytes = hex::decode(hex40)
            .map_err(|_| IndexError::Format(format!("invalid object id hex: {hex40}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; OBJECT_ID_SIZE]
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl From<[u8; OBJECT_ID_SIZE]> for ObjectId {
    fn from(bytes: [u8; OBJECT_ID_SIZE]) -> Self {
        ObjectId(bytes)
    }
}
