//! Fardel - fingerprinted asset bundles for web projects.
//!
//! Bundles are declared in `bundles.yaml` as ordered lists of files under a
//! media root. Building concatenates each bundle into
//! `bundles/<base>.<fingerprint>.<ext>`, where the fingerprint is derived
//! from member contents, then rewrites references between bundles so built
//! stylesheets and scripts point at current artifacts.
//!
//! ```no_run
//! use std::sync::Arc;
//! use fardel::{BundleManager, Renderer, Settings};
//!
//! # fn main() -> anyhow::Result<()> {
//! let settings = Arc::new(Settings::load(".".as_ref(), None)?);
//! let manager = Arc::new(BundleManager::new(settings));
//! manager.build_all()?;
//!
//! let renderer = Renderer::new(Arc::clone(&manager));
//! println!("{}", renderer.include("site.css")?);
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod compress;
pub mod config;
pub mod error;
pub mod lint;
pub mod logger;
pub mod manager;
pub mod prune;
pub mod render;
pub mod utils;
pub mod watch;

#[cfg(test)]
mod testing;

pub use bundle::{Bundle, BundleDescriptor, BundleKind, BundleTable, Registry};
pub use config::Settings;
pub use error::{BundleError, Result};
pub use manager::{BuildReport, BundleManager};
pub use render::Renderer;
pub use watch::{ChangeWatcher, WatchHandle};
