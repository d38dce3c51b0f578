//! Logical name → bundle mapping.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::Bundle;
use crate::error::{BundleError, Result};

/// Table of bundles keyed by logical name.
///
/// Tables are immutable snapshots once published by the manager; updates
/// go through [`BundleTable::with_bundle`], which yields a new table.
#[derive(Debug, Clone, Default)]
pub struct BundleTable {
    bundles: BTreeMap<String, Arc<Bundle>>,
}

impl BundleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bundle, returning the previous entry with the same name.
    pub fn insert(&mut self, bundle: Bundle) -> Option<Arc<Bundle>> {
        self.bundles
            .insert(bundle.name().to_string(), Arc::new(bundle))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Bundle>> {
        self.bundles.get(name)
    }

    /// Like [`BundleTable::get`], failing with `BundleNotFound`.
    pub fn lookup(&self, name: &str) -> Result<Arc<Bundle>> {
        self.bundles
            .get(name)
            .cloned()
            .ok_or_else(|| BundleError::BundleNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bundles.contains_key(name)
    }

    /// Bundles in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Bundle>> {
        self.bundles.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bundles.keys().map(String::as_str)
    }

    /// Bundles that list `file` (relative to the media root) as a member.
    pub fn containing<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a Arc<Bundle>> {
        self.iter().filter(move |b| b.descriptor().contains(file))
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Copy of this table with `bundle` replacing its same-named entry.
    pub fn with_bundle(&self, bundle: Bundle) -> Self {
        let mut table = self.clone();
        table.insert(bundle);
        table
    }
}

impl FromIterator<Bundle> for BundleTable {
    fn from_iter<I: IntoIterator<Item = Bundle>>(iter: I) -> Self {
        let mut table = Self::new();
        for bundle in iter {
            table.insert(bundle);
        }
        table
    }
}
