//! Bundles: declared groups of media files built into one fingerprinted artifact.
//!
//! | Module        | Purpose                                            |
//! |---------------|----------------------------------------------------|
//! | `descriptor`  | Declared identity (name, type, files, options)     |
//! | `kind`        | Per-type behavior (separator, delimiters, markup)  |
//! | `registry`    | Type tag → factory table, table loading            |
//! | `fingerprint` | SHA-1 content hash and `base.hash.ext` names       |
//! | `build`       | Streaming concatenation into the artifact          |
//! | `rewrite`     | Cross-bundle reference rewriting                   |
//! | `table`       | Logical name → bundle mapping                      |
//!
//! # Lifecycle
//!
//! A [`Bundle`] is created (and its members validated) when the registry
//! loads the table. [`Bundle::build`] writes the artifact if it does not
//! exist yet; [`Bundle::refreshed`] recomputes the fingerprint after a
//! source change and yields a new value. Old artifacts stay on disk.

mod build;
mod descriptor;
pub mod fingerprint;
mod kind;
mod registry;
mod rewrite;
mod table;

pub use descriptor::{BundleDescriptor, infer_type};
pub use kind::{BundleKind, DEFAULT_MEDIA, Delimiter};
pub use registry::{Factory, Registry};
pub use rewrite::rewrite_references;
pub use table::BundleTable;

use std::io;
use std::path::{Path, PathBuf};

use crate::config::BUNDLES_DIR;
use crate::error::{BundleError, Result};

/// Runtime bundle: descriptor, resolved kind and current fingerprint.
#[derive(Debug, Clone)]
pub struct Bundle {
    descriptor: BundleDescriptor,
    kind: BundleKind,
    media_root: PathBuf,
    hash: String,
    output_name: String,
}

impl Bundle {
    /// Validate that every member exists under `media_root`, then fingerprint.
    pub fn new(descriptor: BundleDescriptor, kind: BundleKind, media_root: &Path) -> Result<Self> {
        for file in descriptor.files() {
            if !media_root.join(file).exists() {
                return Err(BundleError::MissingSourceFile {
                    bundle: descriptor.name().to_string(),
                    file: file.clone(),
                });
            }
        }

        let mut bundle = Self {
            descriptor,
            kind,
            media_root: media_root.to_path_buf(),
            hash: String::new(),
            output_name: String::new(),
        };
        let hash = bundle.compute_hash()?;
        bundle.set_hash(hash);
        Ok(bundle)
    }

    fn set_hash(&mut self, hash: String) {
        self.output_name = fingerprint::fingerprinted_name(self.name(), &hash);
        self.hash = hash;
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &BundleDescriptor {
        &self.descriptor
    }

    pub fn kind(&self) -> &BundleKind {
        &self.kind
    }

    pub fn files(&self) -> &[String] {
        self.descriptor.files()
    }

    /// Fingerprint retained for this build cycle.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Fingerprinted artifact name, relative to the bundles directory.
    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Absolute path of a member file.
    pub fn source_path(&self, file: &str) -> PathBuf {
        self.media_root.join(file)
    }

    /// Absolute paths of all members, in declared order.
    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.files().iter().map(|f| self.source_path(f)).collect()
    }

    pub fn bundles_dir(&self) -> PathBuf {
        self.media_root.join(BUNDLES_DIR)
    }

    /// `<media-root>/bundles/<fingerprinted-name>`
    pub fn artifact_path(&self) -> PathBuf {
        self.bundles_dir().join(&self.output_name)
    }

    pub fn is_built(&self) -> bool {
        self.artifact_path().is_file()
    }

    /// Recompute the fingerprint from the members' current contents.
    ///
    /// Not cached: callers that need a stable value for a build cycle keep
    /// the result (see [`Bundle::hash`]).
    pub fn compute_hash(&self) -> Result<String> {
        fingerprint::fingerprint_files(&self.source_paths()).map_err(|err| self.source_error(err))
    }

    /// Copy of this bundle with a fingerprint matching current sources.
    pub fn refreshed(&self) -> Result<Self> {
        let mut bundle = self.clone();
        bundle.set_hash(self.compute_hash()?);
        Ok(bundle)
    }

    /// Map a member read failure onto the bundle error taxonomy.
    fn source_error(&self, err: io::Error) -> BundleError {
        if err.kind() == io::ErrorKind::NotFound
            && let Some(file) = self.files().iter().find(|f| !self.source_path(f).exists())
        {
            return BundleError::MissingSourceFile {
                bundle: self.name().to_string(),
                file: file.clone(),
            };
        }
        BundleError::io(&self.media_root, err)
    }
}
