//! Repository index capability
//!
//! Higher layers (status, staging) talk to an index through this trait so
//! that other backend formats can be slotted in next to the Git index codec.
//! Backends are constructed explicitly through [`open_index`]; there is no
//! process-wide registry.

use crate::errors::{IndexError, IndexResult};
use crate::index::IndexStore;
use crate::index::entry::IndexEntry;
use bytes::Bytes;

/// Read-and-reserialize capability every index backend provides.
pub trait RepositoryIndex {
    /// All retained stage entries for a path, or `None` when absent.
    fn lookup(&self, path: &[u8]) -> Option<&[IndexEntry]>;

    /// Number of entries in the index.
    fn entry_count(&self) -> u32;

    /// Re-encode the index, checksum trailer included.
    fn serialize(&self) -> IndexResult<Bytes>;
}

impl RepositoryIndex for IndexStore {
    fn lookup(&self, path: &[u8]) -> Option<&[IndexEntry]> {
        IndexStore::lookup(self, path)
    }

    fn entry_count(&self) -> u32 {
        IndexStore::entry_count(self)
    }

    fn serialize(&self) -> IndexResult<Bytes> {
        IndexStore::serialize(self)
    }
}

/// Known index backend formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// The Git "DIRC" staging-area file.
    Dirc,
}

impl IndexFormat {
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            "dirc" | "git-index" => Some(IndexFormat::Dirc),
            _ => None,
        }
    }
}

/// Parse `bytes` as an index of the given format.
pub fn open_index(format: IndexFormat, bytes: &[u8]) -> IndexResult<Box<dyn RepositoryIndex>> {
    match format {
        IndexFormat::Dirc => Ok(Box::new(IndexStore::parse(bytes)?)),
    }
}

/// Parse `bytes` as a format named by `identifier` (as recorded in, say, a
/// repository configuration file).
pub fn open_index_by_identifier(
    identifier: &str,
    bytes: &[u8],
) -> IndexResult<Box<dyn RepositoryIndex>> {
    let format = IndexFormat::from_identifier(identifier)
        .ok_or_else(|| IndexError::Format(format!("unknown index format: {identifier:?}")))?;
    open_index(format, bytes)
}
