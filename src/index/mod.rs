//! Git index file format
//!
//! The index (also called staging area or cache) records the state of every
//! tracked file at the last refresh so that working-tree changes can be
//! detected without rehashing content. This module is a pure codec over an
//! in-memory buffer; obtaining the bytes (and any file locking around that)
//! belongs to the caller.
//!
//! ## File Format (Versions 2 and 3)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2 or 3 (4 bytes, big-endian)
//!   - Entry count (4 bytes, big-endian)
//!
//! Entries (variable length):
//!   - Sorted by (path, stage), each record padded to 8-byte alignment
//!
//! Extensions (optional, variable length):
//!   - 4-byte signature + 4-byte length + payload
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod entry;
pub mod entry_mode;
pub mod extension;
pub mod header;

use crate::errors::{IndexError, IndexResult};
use crate::index::checksum::{ChecksumReader, ChecksumWriter};
use crate::index::entry::{IndexEntry, Stage};
use crate::index::extension::Extension;
use crate::index::header::IndexHeader;
use bytes::Bytes;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &[u8; 4] = b"DIRC";

/// Index file format versions this codec reads and writes
pub const SUPPORTED_VERSIONS: [u32; 2] = [2, 3];

/// First version able to carry the extended per-entry flags word
pub(crate) const VERSION_EXTENDED: u32 = 3;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Size of the fixed leading block of every entry
pub const ENTRY_FIXED_SIZE: usize = 62;

/// Parsed, immutable index file.
///
/// Entries are held in on-disk order, which the parser has already verified
/// to be strictly ascending by (path, stage); lookups binary-search that
/// order. The store never mutates after construction, so sharing it across
/// reader threads is unrestricted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStore {
    header: IndexHeader,
    entries: Vec<IndexEntry>,
    extensions: Vec<Extension>,
}

impl IndexStore {
    /// Decode a whole index file.
    ///
    /// Validates the header, decodes exactly the declared number of entries,
    /// carries any extension blocks opaquely, and verifies the trailing
    /// SHA-1 before returning. No partially decoded store ever escapes.
    pub fn parse(bytes: &[u8]) -> IndexResult<Self> {
        let mut reader = ChecksumReader::new(bytes);

        let header = IndexHeader::unpack(reader.read(HEADER_SIZE)?)?;

        // Capacity capped by what the buffer could physically hold, so a
        // corrupt header cannot drive a huge allocation
        let max_entries = reader.remaining() / (ENTRY_FIXED_SIZE + ENTRY_BLOCK);
        let mut entries: Vec<IndexEntry> =
            Vec::with_capacity((header.entries_count() as usize).min(max_entries));
        for _ in 0..header.entries_count() {
            let entry = IndexEntry::unpack(&mut reader, header.version())?;

            if let Some(prev) = entries.last()
                && prev.sort_key() >= entry.sort_key()
            {
                return Err(ordering_violation(prev, &entry));
            }

            entries.push(entry);
        }

        let mut extensions = Vec::new();
        while reader.remaining() > CHECKSUM_SIZE {
            extensions.push(Extension::unpack(&mut reader)?);
        }

        reader.verify()?;

        tracing::debug!(
            version = header.version(),
            entries = entries.len(),
            extensions = extensions.len(),
            "parsed index"
        );

        Ok(IndexStore {
            header,
            entries,
            extensions,
        })
    }

    /// Build a store from in-memory entries, for callers assembling a new
    /// index to serialize. Entries are sorted into on-disk order; duplicate
    /// (path, stage) pairs are rejected rather than collapsed.
    pub fn from_entries(version: u32, mut entries: Vec<IndexEntry>) -> IndexResult<Self> {
        entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        for pair in entries.windows(2) {
            if pair[0].sort_key() >= pair[1].sort_key() {
                return Err(ordering_violation(&pair[0], &pair[1]));
            }
        }

        let header = IndexHeader::new(version, entries.len() as u32)?;
        Ok(IndexStore {
            header,
            entries,
            extensions: Vec::new(),
        })
    }

    /// Index format version this store was read from (or built for).
    pub fn version(&self) -> u32 {
        self.header.version()
    }

    /// Number of entries; always equal to the header's declared count.
    pub fn entry_count(&self) -> u32 {
        self.entries.len() as u32
    }

    /// All entries for a path, one per retained merge stage, or `None` if
    /// the path is not present. A missing path is not an error.
    pub fn lookup(&self, path: impl AsRef<[u8]>) -> Option<&[IndexEntry]> {
        let path = path.as_ref();
        let start = self.entries.partition_point(|e| &e.path[..] < path);
        let len = self.entries[start..].partition_point(|e| &e.path[..] == path);

        (len > 0).then(|| &self.entries[start..start + len])
    }

    /// The entry for a path at one specific merge stage.
    pub fn entry(&self, path: impl AsRef<[u8]>, stage: Stage) -> Option<&IndexEntry> {
        self.lookup(path)?.iter().find(|e| e.stage() == stage)
    }

    /// Entries in on-disk (path, stage) order.
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// Consume the store, yielding owned entries in on-disk order. Useful
    /// when a caller edits the entry set and rebuilds via [`from_entries`].
    ///
    /// [`from_entries`]: IndexStore::from_entries
    pub fn into_entries(self) -> impl Iterator<Item = IndexEntry> {
        self.entries.into_iter()
    }

    /// Extension blocks carried over from the parsed file, in file order.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// True if any entry sits at a non-zero merge stage.
    pub fn has_conflicts(&self) -> bool {
        self.entries.iter().any(|e| e.stage() != Stage::Normal)
    }

    /// Re-encode the store: header, entries in order, retained extensions,
    /// and a freshly computed trailing checksum.
    pub fn serialize(&self) -> IndexResult<Bytes> {
        let mut writer = ChecksumWriter::new();

        let header = IndexHeader::new(self.header.version(), self.entries.len() as u32)?;
        writer.write(&header.pack());

        for entry in &self.entries {
            writer.write(&entry.pack(self.header.version())?);
        }

        for extension in &self.extensions {
            extension.pack(&mut writer);
        }

        tracing::debug!(
            version = header.version(),
            entries = self.entries.len(),
            "serialized index"
        );

        Ok(writer.finalize())
    }
}

fn ordering_violation(prev: &IndexEntry, next: &IndexEntry) -> IndexError {
    IndexError::OrderingViolation {
        prev: String::from_utf8_lossy(&prev.path).into_owned(),
        next: String::from_utf8_lossy(&next.path).into_owned(),
    }
}
