//! Streaming concatenation of members into the artifact.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use super::Bundle;
use crate::debug;
use crate::error::{BundleError, Result};

impl Bundle {
    /// Write the artifact for the retained fingerprint.
    ///
    /// Returns `false` without touching anything when the artifact already
    /// exists. Members are streamed in declared order, each followed by the
    /// kind's separator, into a temporary file that is renamed into place,
    /// so readers never observe a partial artifact.
    pub fn build(&self) -> Result<bool> {
        let target = self.artifact_path();
        if target.is_file() {
            debug!("build"; "{} up to date", self.output_name());
            return Ok(false);
        }

        let bundles_dir = self.bundles_dir();
        let parent = target.parent().unwrap_or(&bundles_dir).to_path_buf();
        ensure_dir(&bundles_dir)?;
        ensure_dir(&parent)?;

        let temp = NamedTempFile::new_in(&parent).map_err(|err| BundleError::io(&parent, err))?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            for file in self.files() {
                let path = self.source_path(file);
                let mut reader = File::open(&path).map_err(|err| self.source_error(err))?;
                io::copy(&mut reader, &mut writer).map_err(|err| BundleError::io(&path, err))?;
                writer
                    .write_all(self.kind().separator())
                    .map_err(|err| BundleError::io(&target, err))?;
            }
            writer.flush().map_err(|err| BundleError::io(&target, err))?;
        }

        temp.persist(&target)
            .map_err(|err| BundleError::io(&target, err.error))?;
        debug!("build"; "{} -> {}", self.name(), target.display());
        Ok(true)
    }
}

/// Create `dir` (and parents) unless it exists, rejecting non-directories.
fn ensure_dir(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(BundleError::OutputPathConflict(dir.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|err| match fs::metadata(dir) {
                Ok(meta) if !meta.is_dir() => BundleError::OutputPathConflict(dir.to_path_buf()),
                _ => conflict_in_ancestors(dir).unwrap_or_else(|| BundleError::io(dir, err)),
            })
        }
        Err(err) => Err(BundleError::io(dir, err)),
    }
}

/// First ancestor of `dir` that exists as a non-directory.
fn conflict_in_ancestors(dir: &Path) -> Option<BundleError> {
    dir.ancestors()
        .skip(1)
        .find(|p| p.exists())
        .filter(|p| !p.is_dir())
        .map(|p| BundleError::OutputPathConflict(p.to_path_buf()))
}
