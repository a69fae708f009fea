//! `dirc`, a codec for the Git index (staging area) file format.
//!
//! The index is the binary cache file recording the state of every tracked
//! file at the last refresh. This crate parses such a file into an immutable
//! in-memory store, answers path lookups (including per-stage conflict
//! entries), and re-serializes a store with a correct trailing checksum.
//! Versions 2 and 3 of the format are supported.
//!
//! The codec is a pure transform over byte buffers: it performs no I/O and
//! never dereferences the object ids it carries. Reading the file, locking
//! it, and resolving hashes to object content are collaborators' concerns.
//!
//! ```
//! use dirc::index::IndexStore;
//! use dirc::index::entry::{EntryFlags, EntryMetadata, IndexEntry};
//! use dirc::objects::object_id::ObjectId;
//!
//! let entry = IndexEntry::new(
//!     &b"src/lib.rs"[..],
//!     ObjectId::zero(),
//!     EntryMetadata::default(),
//!     EntryFlags::default(),
//! );
//! let store = IndexStore::from_entries(2, vec![entry])?;
//!
//! let bytes = store.serialize()?;
//! let reparsed = IndexStore::parse(&bytes)?;
//! assert!(reparsed.lookup("src/lib.rs").is_some());
//! # Ok::<(), dirc::errors::IndexError>(())
//! ```

pub mod backend;
pub mod errors;
pub mod index;
pub mod objects;
