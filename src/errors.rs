//! Parse and encode failures for the index codec
//!
//! Every failure mode maps to exactly one variant so that callers (the
//! staging/status layer) can decide between falling back to a rebuild and
//! reporting corruption. Nothing here is retried internally.

use thiserror::Error;

/// Errors produced while decoding or encoding an index buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    /// The buffer violates the index structure: bad magic, malformed flags,
    /// non-null padding, an invalid mode word, and similar.
    #[error("malformed index: {0}")]
    Format(String),

    /// The signature matched but the version number is not one we handle.
    #[error("unsupported index version: {0}")]
    UnsupportedVersion(u32),

    /// The buffer ended before the content declared by the header did.
    #[error("index truncated at offset {offset}: {needed} more byte(s) required")]
    TruncatedData { offset: usize, needed: usize },

    /// The trailing SHA-1 digest does not match the preceding bytes.
    #[error("index checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch { stored: String, computed: String },

    /// Entries are not in strictly ascending (path, stage) order. This also
    /// covers duplicate entries, which compare equal rather than ascending.
    #[error("index entries out of order: {prev:?} does not precede {next:?}")]
    OrderingViolation { prev: String, next: String },
}

/// Convenience alias used throughout the codec.
pub type IndexResult<T> = Result<T, IndexError>;
