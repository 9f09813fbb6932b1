//! Config file reads and crash-safe writes

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::{Error, NormalizedPath, Result};

/// Replace `path` with `content` in one rename.
///
/// The staging file lives next to the destination and is removed if
/// anything fails before the rename. Missing parent directories are created.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native = path.to_native();
    let dir = match native.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

    let mut staged = NamedTempFile::new_in(&dir).map_err(|e| Error::io(&dir, e))?;
    staged
        .write_all(content)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| Error::io(staged.path(), e))?;
    staged
        .persist(&native)
        .map_err(|e| Error::io(&native, e.error))?;

    tracing::debug!(path = %path, bytes = content.len(), "Replaced file");
    Ok(())
}

/// Read a UTF-8 file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    fs::read_to_string(&native).map_err(|e| Error::io(&native, e))
}
