//! Embedded key-value store persisted to a single fingerprinted JSON file.
//!
//! The whole map lives in memory. Call [`write`](JsonStore::write) and
//! [`load`](JsonStore::load) when you want to sync with disk; both compare
//! content fingerprints first and skip the I/O when nothing changed.
//!
//! ```rust,no_run
//! use json_kv::{JsonStore, LoadOutcome};
//! use serde_json::json;
//!
//! let mut db: JsonStore = JsonStore::new("db.json");
//! if db.load().unwrap() == LoadOutcome::NoStoreFile {
//!     println!("first run");
//! }
//! db.set("hello", json!("world")).unwrap();
//! db.write().unwrap();
//! ```
//!
//! The file looks like `{"_hash": "<sha256>", "data": {"hello": "world"}}`.
//!
//! **Single-owner only.** Stores don't coordinate with each other; if two of
//! them write the same file, the last write wins.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod fingerprint;
pub mod location;
pub mod persist;
pub mod serializer;
pub mod store;

pub use error::{Error, Result};
pub use fingerprint::Fingerprint;
pub use location::{default_store_path, store_path_in};
pub use store::{JsonStore, JsonStoreBuilder, LoadOutcome, WriteOutcome};
