//! Upload scratch directory.

use std::fs;
use std::io;
use std::path::Path;

/// Create the upload directory if it is missing.
///
/// Returns `true` when the directory was created by this call. Losing a
/// creation race to another process is not an error.
pub fn ensure_upload_dir(dir: &Path) -> io::Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    tracing::info!(dir = %dir.display(), "Creating tmp upload dir");
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(false),
        Err(e) => Err(e),
    }
}
