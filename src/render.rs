//! Markup and URLs for bundles, as consumed by page templates.
//!
//! Development mode includes every member file from the media URL so edits
//! show up without a rebuild; release mode includes the single fingerprinted
//! artifact.

use std::sync::Arc;

use crate::bundle::Bundle;
use crate::error::Result;
use crate::manager::BundleManager;

/// Renders include markup from the manager's current table.
#[derive(Clone)]
pub struct Renderer {
    manager: Arc<BundleManager>,
}

impl Renderer {
    pub fn new(manager: Arc<BundleManager>) -> Self {
        Self { manager }
    }

    /// Markup for `name`, per-file in development mode.
    pub fn include(&self, name: &str) -> Result<String> {
        let bundle = self.manager.get(name)?;
        Ok(self.include_bundle(&bundle, ""))
    }

    /// Markup for the fingerprinted artifact of `name`.
    pub fn include_release(&self, name: &str) -> Result<String> {
        let bundle = self.manager.get(name)?;
        Ok(self.release_markup(&bundle, ""))
    }

    /// One element per member file of `name`, joined by newlines.
    pub fn include_debug(&self, name: &str) -> Result<String> {
        let bundle = self.manager.get(name)?;
        Ok(self.debug_markup(&bundle, ""))
    }

    /// Like [`Renderer::include`] with absolute `http://<site_name>` URLs.
    pub fn include_external(&self, name: &str) -> Result<String> {
        let bundle = self.manager.get(name)?;
        Ok(self.include_bundle(&bundle, &self.site_base()))
    }

    /// Markup for several bundles, concatenated.
    pub fn include_many<S: AsRef<str>>(&self, names: &[S]) -> Result<String> {
        let mut markup = String::new();
        for name in names {
            markup.push_str(&self.include(name.as_ref())?);
        }
        Ok(markup)
    }

    /// `<bundles_url><fingerprinted name>`
    pub fn bundle_url_path(&self, name: &str) -> Result<String> {
        let bundle = self.manager.get(name)?;
        Ok(self.artifact_url(&bundle))
    }

    /// Absolute artifact URL when `site_name` is set, the path otherwise.
    pub fn bundle_url(&self, name: &str) -> Result<String> {
        let path = self.bundle_url_path(name)?;
        Ok(format!("{}{path}", self.site_base()))
    }

    fn include_bundle(&self, bundle: &Bundle, base: &str) -> String {
        if self.manager.settings().debug {
            self.debug_markup(bundle, base)
        } else {
            self.release_markup(bundle, base)
        }
    }

    fn release_markup(&self, bundle: &Bundle, base: &str) -> String {
        bundle
            .kind()
            .include_file(&format!("{base}{}", self.artifact_url(bundle)))
    }

    fn debug_markup(&self, bundle: &Bundle, base: &str) -> String {
        let media_url = &self.manager.settings().media_url;
        bundle
            .files()
            .iter()
            .map(|file| bundle.kind().include_file(&format!("{base}{media_url}{file}")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn artifact_url(&self, bundle: &Bundle) -> String {
        format!("{}{}", self.manager.settings().bundles_url(), bundle.output_name())
    }

    fn site_base(&self) -> String {
        match &self.manager.settings().site_name {
            Some(site) => format!("http://{site}"),
            None => String::new(),
        }
    }
}
