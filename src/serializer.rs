//! The on-disk document and its JSON encoding.
//!
//! A store file is a single JSON object:
//!
//! ```json
//! {"_hash": "<fingerprint>", "data": {"key": <value>, ...}}
//! ```
//!
//! `data` is written in the cache's insertion order and read back the same way.

use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Borrowed view of a store file, used when writing.
#[derive(Debug, Serialize)]
pub struct StoreFileRef<'a, V> {
    /// Fingerprint of `data`.
    #[serde(rename = "_hash")]
    pub hash: &'a Fingerprint,
    /// Every cached entry.
    pub data: &'a IndexMap<String, V>,
}

/// Owned store file, produced when loading.
#[derive(Debug, Deserialize)]
pub struct StoreFile<V> {
    /// Fingerprint recorded by whoever wrote the file.
    #[serde(rename = "_hash")]
    pub hash: Fingerprint,
    /// Every stored entry, in file order.
    pub data: IndexMap<String, V>,
}

/// Check that `value` reads back from its own JSON form. Non-finite floats,
/// for one, are written as `null`, which an `f64` can't be loaded from.
pub fn ensure_representable<V>(value: &V) -> Result<()>
where
    V: Serialize + DeserializeOwned,
{
    let json = serde_json::to_value(value)?;
    match V::deserialize(&json) {
        Ok(_) => Ok(()),
        Err(e) => Err(Error::Serialize(format!("value has no faithful JSON form: {e}"))),
    }
}

/// JSON encoder/decoder with optional pretty-printing.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed JSON with indentation, easier to read by hand.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// `true` if this serializer indents its output.
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Encode a store file to bytes.
    pub fn serialize<V: Serialize>(&self, file: &StoreFileRef<'_, V>) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(file)
        } else {
            serde_json::to_vec(file)
        };
        bytes.map_err(Error::from)
    }

    /// Decode bytes into a store file. Anything that isn't a well-formed
    /// envelope, including an empty file, is a [`Error::Deserialize`].
    pub fn deserialize<V: DeserializeOwned>(&self, bytes: &[u8]) -> Result<StoreFile<V>> {
        serde_json::from_slice(bytes).map_err(|e| Error::Deserialize(e.to_string()))
    }
}
