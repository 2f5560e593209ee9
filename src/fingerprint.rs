//! Change detection.
//!
//! A [`Fingerprint`] is a SHA-256 digest of the cache's canonical JSON form:
//! every object (the top-level map and any nested ones) is written with its
//! keys sorted, so two caches holding the same key/value pairs fingerprint
//! identically no matter what order the keys were inserted in.

use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Deterministic digest of a store's logical content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint of `entries`. Fails only if a value's `Serialize` impl does.
    pub fn of<V: Serialize>(entries: &IndexMap<String, V>) -> Result<Self> {
        let value = serde_json::to_value(entries)?;
        let bytes = serde_json::to_vec(&canonicalize(value))?;
        Ok(Self::of_bytes(&bytes))
    }

    /// Fingerprint of an empty store.
    pub fn empty() -> Self {
        Self::of_bytes(b"{}")
    }

    /// Hex digest text, as stored in the `_hash` field.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// `_hash` may have been written as a number by other tools; keep its text.
impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Fingerprint(s),
            Raw::Number(n) => Fingerprint(n.to_string()),
        })
    }
}

/// Rebuild `value` with every object's keys in lexicographic order.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
