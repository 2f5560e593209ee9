//! Default store location.
//!
//! Without an explicit path, a store lives at
//! `<directory of the running executable>/.jsonkv/store.json`. The path is
//! resolved once, when the store is constructed.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subdirectory that holds the default store file.
pub const DEFAULT_DIR_NAME: &str = ".jsonkv";

/// File name of the default store file.
pub const DEFAULT_FILE_NAME: &str = "store.json";

/// Resolve the default store path next to the current executable, creating
/// the [`DEFAULT_DIR_NAME`] directory if it is missing.
pub fn default_store_path() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| Error::Config(format!("cannot locate current executable: {e}")))?;
    let base = exe.parent().ok_or_else(|| {
        Error::Config(format!("executable {} has no parent directory", exe.display()))
    })?;
    store_path_in(base)
}

/// Same layout as [`default_store_path`] but rooted at `base`.
pub fn store_path_in(base: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = base.as_ref().join(DEFAULT_DIR_NAME);
    if !dir.is_dir() {
        std::fs::create_dir_all(&dir).map_err(|e| Error::Io(format!("{}: {e}", dir.display())))?;
        debug!(dir = %dir.display(), "created store directory");
    }
    Ok(dir.join(DEFAULT_FILE_NAME))
}
