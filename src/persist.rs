//! Disk I/O helpers: read, atomic write, and remove.
//!
//! The rename-over approach is close to atomic on most platforms. On NTFS
//! (Windows) it's reliable; on FAT32 or network shares there are no hard
//! guarantees.

use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::Path;
use tracing::trace;

/// Read the whole file at `path`. `Ok(None)` means the file does not exist;
/// every other failure is an [`Error::Io`].
pub fn read(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => {
            trace!(path = %path.display(), len = bytes.len(), "read store file");
            Ok(Some(bytes))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Io(format!("{}: {e}", path.display()))),
    }
}

/// Write `bytes` to `<path>.tmp` and then rename over `path`, creating any
/// missing parent directories first. A crash mid-write leaves the old file
/// intact.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::Io(format!("{}: {e}", parent.display())))?;
    }
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let tmp = path.with_extension(format!("{ext}.tmp"));
    if let Err(e) = std::fs::write(&tmp, bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::Io(format!("{}: {e}", tmp.display())));
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::Io(format!("{}: {e}", path.display())));
    }
    trace!(path = %path.display(), len = bytes.len(), "wrote store file");
    Ok(())
}

/// Remove the file at `path`. Returns `Ok(false)` if it was already gone;
/// failing to remove an existing file is an error.
pub fn remove(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::Io(format!("{}: {e}", path.display()))),
    }
}
