//! Index entry representation
//!
//! Each entry records one tracked path together with the cached stat fields
//! and the object id of the staged blob. The stat fields let the status layer
//! detect working-tree changes without rehashing content; the codec itself
//! only moves them between their binary layout and this structure.
//!
//! ## Entry Format
//!
//! ```text
//! 62-byte fixed block:
//!   - ctime seconds / nanoseconds      (2 x 4 bytes, big-endian)
//!   - mtime seconds / nanoseconds      (2 x 4 bytes, big-endian)
//!   - dev, ino, mode, uid, gid, size   (6 x 4 bytes, big-endian)
//!   - object id                        (20 bytes)
//!   - flags                            (2 bytes, big-endian)
//! Version 3, extended flag set:
//!   - extended flags word              (2 bytes, big-endian)
//! Path bytes, then 1-8 null bytes padding the record to a multiple of 8.
//! ```

use crate::errors::{IndexError, IndexResult};
use crate::index::checksum::ChecksumReader;
use crate::index::entry_mode::EntryMode;
use crate::index::{ENTRY_BLOCK, ENTRY_FIXED_SIZE, VERSION_EXTENDED};
use crate::objects::object_id::ObjectId;
use bitflags::bitflags;
use byteorder::{ByteOrder, NetworkEndian};
use bytes::Bytes;
use std::cmp::min;

/// Maximum value of the 12-bit path length field. A field holding this value
/// means "the real path is at least this long, scan to the null terminator".
pub const MAX_PATH_SIZE: usize = 0xFFF;

const FLAG_ASSUME_VALID: u16 = 1 << 15;
const FLAG_EXTENDED: u16 = 1 << 14;
const STAGE_SHIFT: u16 = 12;
const STAGE_MASK: u16 = 0b11;
const PATH_LENGTH_MASK: u16 = 0xFFF;

/// Merge stage of an entry.
///
/// Stage 0 is a normally resolved entry. During a conflicted merge the index
/// holds up to three entries per path, one per conflict side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Stage {
    #[default]
    Normal = 0,
    Base = 1,
    Ours = 2,
    Theirs = 3,
}

impl Stage {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Stage::Normal,
            1 => Stage::Base,
            2 => Stage::Ours,
            _ => Stage::Theirs,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

bitflags! {
    /// Version-3 extended flags word. Bits outside this set are reserved and
    /// must be zero on disk.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct ExtendedFlags: u16 {
        const INTENT_TO_ADD = 1 << 13;
        const SKIP_WORKTREE = 1 << 14;
    }
}

/// Decoded 16-bit flags field plus the version-3 extension word.
///
/// The 12-bit path length is not kept here; it is derived from the path when
/// packing and only steers how many bytes to read when unpacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct EntryFlags {
    /// "Assume unchanged" marker; the status layer skips stat comparison.
    pub assume_valid: bool,
    /// Merge stage of this entry (non-zero means unresolved conflict side).
    pub stage: Stage,
    /// Version-3 decorations (intent-to-add, skip-worktree). Non-empty flags
    /// force the on-disk extended bit, which only version 3 can carry.
    pub extended: ExtendedFlags,
}

impl EntryFlags {
    pub fn with_stage(stage: Stage) -> Self {
        EntryFlags {
            stage,
            ..EntryFlags::default()
        }
    }
}

/// Cached stat fields of an index entry.
///
/// All fields are stored as 32-bit values, exactly as on disk; `size` is the
/// least-significant 32 bits of the real file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct EntryMetadata {
    pub ctime: u32,
    pub ctime_nsec: u32,
    pub mtime: u32,
    pub mtime_nsec: u32,
    pub dev: u32,
    pub ino: u32,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
}

/// One tracked path with its cached filesystem and object state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    /// Path bytes relative to the repository root. Unique per (path, stage).
    pub path: Bytes,
    /// Object id of the staged blob content.
    pub oid: ObjectId,
    /// Cached stat fields used for change detection.
    pub metadata: EntryMetadata,
    /// Flag bits and merge stage.
    pub flags: EntryFlags,
}

impl IndexEntry {
    pub fn new(
        path: impl Into<Bytes>,
        oid: ObjectId,
        metadata: EntryMetadata,
        flags: EntryFlags,
    ) -> Self {
        IndexEntry {
            path: path.into(),
            oid,
            metadata,
            flags,
        }
    }

    pub fn stage(&self) -> Stage {
        self.flags.stage
    }

    /// Path as UTF-8, if it is valid UTF-8. Git paths are raw bytes; callers
    /// needing display strings decide how to handle the invalid case.
    pub fn path_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.path).ok()
    }

    /// On-disk ordering key: entries sort by path bytes, then stage.
    pub(crate) fn sort_key(&self) -> (&[u8], Stage) {
        (&self.path, self.flags.stage)
    }

    fn packed_flags(&self) -> u16 {
        let mut flags = min(self.path.len(), MAX_PATH_SIZE) as u16;
        flags |= (self.flags.stage.as_u8() as u16) << STAGE_SHIFT;
        if self.flags.assume_valid {
            flags |= FLAG_ASSUME_VALID;
        }
        if !self.flags.extended.is_empty() {
            flags |= FLAG_EXTENDED;
        }
        flags
    }

    /// Encode this entry for a store of the given version, padding the record
    /// with null bytes to a multiple of 8.
    pub(crate) fn pack(&self, version: u32) -> IndexResult<Bytes> {
        if self.path.is_empty() {
            return Err(IndexError::Format(String::from("empty entry path")));
        }
        if self.path.contains(&0) {
            return Err(IndexError::Format(format!(
                "entry path contains a null byte: {:?}",
                self.path
            )));
        }
        if !self.flags.extended.is_empty() && version < VERSION_EXTENDED {
            return Err(IndexError::Format(format!(
                "entry {:?} carries extended flags, which version {version} cannot encode",
                self.path
            )));
        }

        let mut entry_bytes = Vec::with_capacity(ENTRY_FIXED_SIZE + self.path.len() + ENTRY_BLOCK);
        for field in [
            self.metadata.ctime,
            self.metadata.ctime_nsec,
            self.metadata.mtime,
            self.metadata.mtime_nsec,
            self.metadata.dev,
            self.metadata.ino,
            self.metadata.mode.as_u32(),
            self.metadata.uid,
            self.metadata.gid,
            self.metadata.size,
        ] {
            entry_bytes.extend_from_slice(&field.to_be_bytes());
        }
        entry_bytes.extend_from_slice(self.oid.as_bytes());
        entry_bytes.extend_from_slice(&self.packed_flags().to_be_bytes());
        if !self.flags.extended.is_empty() {
            entry_bytes.extend_from_slice(&self.flags.extended.bits().to_be_bytes());
        }
        entry_bytes.extend_from_slice(&self.path);

        // There must be at least one null byte terminating the path
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }

    /// Decode one entry at the reader's cursor, consuming its padding.
    pub(crate) fn unpack(reader: &mut ChecksumReader<'_>, version: u32) -> IndexResult<Self> {
        let record_start = reader.offset();
        let fixed = reader.read(ENTRY_FIXED_SIZE)?;

        let ctime = NetworkEndian::read_u32(&fixed[0..4]);
        let ctime_nsec = NetworkEndian::read_u32(&fixed[4..8]);
        let mtime = NetworkEndian::read_u32(&fixed[8..12]);
        let mtime_nsec = NetworkEndian::read_u32(&fixed[12..16]);
        let dev = NetworkEndian::read_u32(&fixed[16..20]);
        let ino = NetworkEndian::read_u32(&fixed[20..24]);
        let mode = EntryMode::try_from(NetworkEndian::read_u32(&fixed[24..28]))?;
        let uid = NetworkEndian::read_u32(&fixed[28..32]);
        let gid = NetworkEndian::read_u32(&fixed[32..36]);
        let size = NetworkEndian::read_u32(&fixed[36..40]);
        let oid = ObjectId::from_bytes(&fixed[40..60])?;
        let flags_word = NetworkEndian::read_u16(&fixed[60..62]);

        let assume_valid = flags_word & FLAG_ASSUME_VALID != 0;
        let has_extended = flags_word & FLAG_EXTENDED != 0;
        let stage = Stage::from_bits(((flags_word >> STAGE_SHIFT) & STAGE_MASK) as u8);
        let path_length = (flags_word & PATH_LENGTH_MASK) as usize;

        let extended = if has_extended {
            if version < VERSION_EXTENDED {
                return Err(IndexError::Format(format!(
                    "extended entry flag set in a version {version} index"
                )));
            }
            let word = NetworkEndian::read_u16(reader.read(2)?);
            ExtendedFlags::from_bits(word).ok_or_else(|| {
                IndexError::Format(format!("reserved extended flag bits set: {word:#06x}"))
            })?
        } else {
            ExtendedFlags::empty()
        };

        let path_length = if path_length < MAX_PATH_SIZE {
            path_length
        } else {
            // Saturated length field: the real path runs to the terminator
            reader.distance_to_null()?
        };
        let path = Bytes::copy_from_slice(reader.read(path_length)?);
        if path.is_empty() {
            return Err(IndexError::Format(String::from("empty entry path")));
        }
        if path.contains(&0) {
            return Err(IndexError::Format(format!(
                "entry path shorter than its declared length: {path:?}"
            )));
        }

        let consumed = reader.offset() - record_start;
        let padding = ENTRY_BLOCK - consumed % ENTRY_BLOCK;
        if reader.read(padding)?.iter().any(|&b| b != 0) {
            return Err(IndexError::Format(format!(
                "non-null padding after entry {path:?}"
            )));
        }

        Ok(IndexEntry {
            path,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
            },
            flags: EntryFlags {
                assume_valid,
                stage,
                extended,
            },
        })
    }
}
