//! Filesystem helpers shared by the build, rewrite and compress steps.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;

use tempfile::NamedTempFile;

/// Replace `path` with `contents` through a sibling temp file and rename.
///
/// Readers see either the old or the new contents, never a mix.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut temp = NamedTempFile::new_in(parent_dir(path))?;
    temp.write_all(contents)?;
    temp.as_file().sync_data()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Like [`write_atomic`], but the new contents come from another file.
pub fn replace_atomic(path: &Path, source: &Path) -> io::Result<()> {
    let contents = fs::read(source)?;
    write_atomic(path, &contents)
}

/// Directory a sibling temp file of `path` goes into.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Modification time of a file, `None` when it cannot be read.
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// File size in bytes, `0` when it cannot be read.
pub fn file_size(path: &Path) -> u64 {
    path.metadata().map(|m| m.len()).unwrap_or(0)
}
