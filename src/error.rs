//! Unified error type for all store operations.

use thiserror::Error;

/// Things that can go wrong when using the store.
///
/// A missing store file on load is not an error; it is reported as
/// [`LoadOutcome::NoStoreFile`](crate::LoadOutcome::NoStoreFile).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// File system problem (read, write, rename, remove).
    #[error("i/o error: {0}")]
    Io(String),
    /// Failed to serialize the cache to bytes.
    #[error("serialization error: {0}")]
    Serialize(String),
    /// The store file is not a valid `{"_hash": .., "data": {..}}` document.
    #[error("deserialization error: {0}")]
    Deserialize(String),
    /// Bad configuration (unresolvable default path, etc.).
    #[error("config error: {0}")]
    Config(String),
    /// The `_hash` in the store file does not match its `data`. Only raised
    /// when load verification is turned on.
    #[error("fingerprint mismatch: file says {stored}, data hashes to {computed}")]
    FingerprintMismatch {
        /// Fingerprint embedded in the file.
        stored: String,
        /// Fingerprint recomputed from the file's data.
        computed: String,
    },
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

// Data errors only come out of the encoding side here; decoding maps its
// errors to `Deserialize` explicitly.
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        let msg = err.to_string();
        match err.classify() {
            Category::Io => Error::Io(msg),
            Category::Syntax | Category::Eof => Error::Deserialize(msg),
            Category::Data => Error::Serialize(msg),
        }
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
