//! Core store type, outcomes, and builder.

use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;
use crate::location::default_store_path;
use crate::persist;
use crate::serializer::{ensure_representable, JsonSerializer, StoreFile, StoreFileRef};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What [`JsonStore::write`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file now holds the current cache.
    Written,
    /// Nothing changed since the last write or load; disk was not touched.
    Skipped,
}

/// What [`JsonStore::load`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The cache was replaced with the file's contents.
    Reloaded,
    /// The file's fingerprint matched the cache; the cache was left alone.
    Skipped,
    /// There is no file at the store path. Normal on first run.
    NoStoreFile,
}

/// Embedded key-value store persisted to a single JSON file.
///
/// Keys are strings, values are any serde type (`serde_json::Value` by
/// default). Everything lives in memory; [`write`](Self::write) and
/// [`load`](Self::load) synchronize with disk when you call them, and skip
/// the round-trip when the cache's [`Fingerprint`] shows nothing changed.
///
/// Iteration follows insertion order.
///
/// **One owner per file.** Two stores pointed at the same path don't
/// coordinate; the last write wins.
pub struct JsonStore<V = Value> {
    cache: IndexMap<String, V>,
    path: PathBuf,
    serializer: JsonSerializer,
    verify_on_load: bool,
    fingerprint: Fingerprint,
    persisted: Option<Fingerprint>,
}

impl<V> JsonStore<V>
where
    V: Serialize + DeserializeOwned,
{
    /// Empty store bound to `path`, compact JSON, no load.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::builder(path).build()
    }

    /// Empty store bound to the default location next to the running
    /// executable (see [`location`](crate::location)).
    pub fn with_default_path() -> Result<Self> {
        Ok(Self::new(default_store_path()?))
    }

    /// Create a store at `path` and load whatever is already there.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    /// Start configuring a new store. Call [`.build()`](JsonStoreBuilder::build)
    /// when ready.
    pub fn builder(path: impl AsRef<Path>) -> JsonStoreBuilder<V> {
        JsonStoreBuilder::new(path)
    }

    // ---- reads ----

    /// Get the value for `key`, or `None` if absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.cache.get(key)
    }

    /// `true` if the key exists.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cache.len()
    }

    /// `true` when the store has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, V> {
        self.cache.iter()
    }

    /// All keys in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, V> {
        self.cache.keys()
    }

    /// Path to the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fingerprint of the cache as it is right now.
    #[must_use]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Fingerprint of the last state written to or loaded from disk, if the
    /// store is known to match its file.
    #[must_use]
    pub fn persisted_fingerprint(&self) -> Option<&Fingerprint> {
        self.persisted.as_ref()
    }

    /// `true` if the cache has changed since the last write or load.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.persisted.as_ref() != Some(&self.fingerprint)
    }

    // ---- writes ----

    /// Insert or replace `key`. Always returns `Ok(true)`.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Result<bool> {
        self.set_inner(key.into(), value, true)
    }

    /// Insert `key` only if it isn't there yet. Returns `Ok(false)` and leaves
    /// the existing value alone otherwise.
    pub fn set_if_absent(&mut self, key: impl Into<String>, value: V) -> Result<bool> {
        self.set_inner(key.into(), value, false)
    }

    /// Remove `key`. Returns `Ok(true)` if it was present.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let Some((index, k, v)) = self.cache.shift_remove_full(key) else {
            return Ok(false);
        };
        if let Err(e) = self.refresh_fingerprint() {
            self.cache.shift_insert(index, k, v);
            return Err(e);
        }
        Ok(true)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.fingerprint = Fingerprint::empty();
    }

    /// Bulk-insert from an iterator, replacing existing keys. The fingerprint
    /// is recomputed once at the end, not once per entry.
    pub fn extend<I, K>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Clone,
    {
        let batch: Vec<(String, V)> = iter.into_iter().map(|(k, v)| (k.into(), v)).collect();
        for (_, v) in &batch {
            ensure_representable(v)?;
        }
        let snapshot = self.cache.clone();
        self.cache.extend(batch);
        if let Err(e) = self.refresh_fingerprint() {
            self.cache = snapshot;
            return Err(e);
        }
        Ok(())
    }

    /// Mutate the value at `key` in place. Returns `Ok(false)` if the key
    /// doesn't exist (nothing happens in that case).
    pub fn update<F>(&mut self, key: &str, f: F) -> Result<bool>
    where
        F: FnOnce(&mut V),
        V: Clone,
    {
        let Some(slot) = self.cache.get_mut(key) else {
            return Ok(false);
        };
        let before = slot.clone();
        f(slot);
        let result = ensure_representable(&*slot).and_then(|()| self.refresh_fingerprint());
        if let Err(e) = result {
            if let Some(slot) = self.cache.get_mut(key) {
                *slot = before;
            }
            return Err(e);
        }
        Ok(true)
    }

    /// Point the store at a different file. The cache is kept; the next
    /// [`write`](Self::write) always lands at the new path.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
        self.persisted = None;
    }

    // ---- persistence ----

    /// Write the cache to disk unless it is unchanged since the last write or
    /// load. The file is replaced whole (temp file + rename).
    pub fn write(&mut self) -> Result<WriteOutcome> {
        self.write_inner(false)
    }

    /// Write the cache to disk even if nothing changed.
    pub fn force_write(&mut self) -> Result<WriteOutcome> {
        self.write_inner(true)
    }

    /// Replace the cache with the file's contents, unless the file's
    /// fingerprint already matches the cache.
    ///
    /// A missing file is [`LoadOutcome::NoStoreFile`], not an error. A
    /// malformed file is an error and leaves the cache untouched.
    pub fn load(&mut self) -> Result<LoadOutcome> {
        self.load_inner(false)
    }

    /// Replace the cache with the file's contents even if the fingerprints match.
    pub fn force_load(&mut self) -> Result<LoadOutcome> {
        self.load_inner(true)
    }

    /// Remove the backing file. A file that is already gone is fine. The
    /// cache is kept, so a later [`write`](Self::write) recreates the file.
    pub fn delete_store(&mut self) -> Result<()> {
        let removed = persist::remove(&self.path)?;
        self.persisted = None;
        debug!(path = %self.path.display(), removed, "deleted store file");
        Ok(())
    }

    // ---- internal ----

    fn set_inner(&mut self, key: String, value: V, override_existing: bool) -> Result<bool> {
        if !override_existing && self.cache.contains_key(&key) {
            return Ok(false);
        }
        ensure_representable(&value)?;
        let (index, previous) = self.cache.insert_full(key, value);
        if let Err(e) = self.refresh_fingerprint() {
            match previous {
                Some(prev) => {
                    if let Some((_, slot)) = self.cache.get_index_mut(index) {
                        *slot = prev;
                    }
                }
                None => {
                    self.cache.pop();
                }
            }
            return Err(e);
        }
        Ok(true)
    }

    fn refresh_fingerprint(&mut self) -> Result<()> {
        self.fingerprint = Fingerprint::of(&self.cache)?;
        Ok(())
    }

    fn write_inner(&mut self, force: bool) -> Result<WriteOutcome> {
        if !force && !self.is_dirty() {
            debug!(path = %self.path.display(), "store unchanged, skipping write");
            return Ok(WriteOutcome::Skipped);
        }
        let bytes = self.serializer.serialize(&StoreFileRef {
            hash: &self.fingerprint,
            data: &self.cache,
        })?;
        persist::atomic_write(&self.path, &bytes)?;
        self.persisted = Some(self.fingerprint.clone());
        debug!(
            path = %self.path.display(),
            fingerprint = %self.fingerprint,
            entries = self.cache.len(),
            "wrote store"
        );
        Ok(WriteOutcome::Written)
    }

    fn load_inner(&mut self, force: bool) -> Result<LoadOutcome> {
        let Some(bytes) = persist::read(&self.path)? else {
            debug!(path = %self.path.display(), "no store file");
            return Ok(LoadOutcome::NoStoreFile);
        };
        let file: StoreFile<V> = self.serializer.deserialize(&bytes)?;

        if !force && file.hash == self.fingerprint {
            debug!(path = %self.path.display(), "store file matches cache, skipping load");
            self.persisted = Some(file.hash);
            return Ok(LoadOutcome::Skipped);
        }

        if self.verify_on_load {
            let computed = Fingerprint::of(&file.data)?;
            if computed != file.hash {
                warn!(
                    path = %self.path.display(),
                    stored = %file.hash,
                    computed = %computed,
                    "store file fingerprint does not match its data"
                );
                return Err(Error::FingerprintMismatch {
                    stored: file.hash.to_string(),
                    computed: computed.to_string(),
                });
            }
        }

        self.cache = file.data;
        self.fingerprint = file.hash.clone();
        self.persisted = Some(file.hash);
        debug!(
            path = %self.path.display(),
            fingerprint = %self.fingerprint,
            entries = self.cache.len(),
            "loaded store"
        );
        Ok(LoadOutcome::Reloaded)
    }
}

impl<V> std::fmt::Debug for JsonStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStore")
            .field("path", &self.path)
            .field("entries", &self.cache.len())
            .field("pretty", &self.serializer.is_pretty())
            .field("fingerprint", &self.fingerprint)
            .field("persisted", &self.persisted)
            .finish_non_exhaustive()
    }
}

impl<'a, V> IntoIterator for &'a JsonStore<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = indexmap::map::Iter<'a, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.cache.iter()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures a [`JsonStore`].
///
/// ```rust,no_run
/// use json_kv::JsonStore;
///
/// let db: JsonStore<i32> = JsonStore::builder("db.json")
///     .pretty(true)
///     .verify_on_load(true)
///     .build();
/// ```
pub struct JsonStoreBuilder<V> {
    path: PathBuf,
    pretty: bool,
    verify_on_load: bool,
    _marker: PhantomData<V>,
}

impl<V> JsonStoreBuilder<V>
where
    V: Serialize + DeserializeOwned,
{
    fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pretty: false,
            verify_on_load: false,
            _marker: PhantomData,
        }
    }

    /// Write human-readable JSON with indentation (default: compact).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Recompute the fingerprint of loaded data and reject files whose
    /// `_hash` disagrees (default: off, the stored `_hash` is trusted).
    pub fn verify_on_load(mut self, yes: bool) -> Self {
        self.verify_on_load = yes;
        self
    }

    /// Create the empty store. Nothing is read from disk until
    /// [`load`](JsonStore::load).
    pub fn build(self) -> JsonStore<V> {
        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::new()
        };
        let empty = Fingerprint::empty();

        JsonStore {
            cache: IndexMap::new(),
            path: self.path,
            serializer,
            verify_on_load: self.verify_on_load,
            persisted: Some(empty.clone()),
            fingerprint: empty,
        }
    }
}

impl<V> std::fmt::Debug for JsonStoreBuilder<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStoreBuilder")
            .field("path", &self.path)
            .field("pretty", &self.pretty)
            .field("verify_on_load", &self.verify_on_load)
            .finish()
    }
}
