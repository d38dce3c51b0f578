//! `fardel list`

use std::sync::Arc;

use anyhow::Result;
use fardel::bundle::Bundle;
use fardel::config::Settings;
use serde::Serialize;

use super::{load_table, warn_unknown};

/// One bundle in `--json` output.
#[derive(Debug, Serialize)]
struct BundleEntry<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    type_tag: &'a str,
    output: &'a str,
    built: bool,
    files: &'a [String],
}

impl<'a> From<&'a Bundle> for BundleEntry<'a> {
    fn from(bundle: &'a Bundle) -> Self {
        Self {
            name: bundle.name(),
            type_tag: bundle.descriptor().type_tag(),
            output: bundle.output_name(),
            built: bundle.is_built(),
            files: bundle.files(),
        }
    }
}

/// Print declared bundles, optionally restricted to `names`.
pub fn list_bundles(settings: &Settings, names: &[String], json: bool) -> Result<()> {
    let table = load_table(settings)?;

    let selected: Vec<&Bundle> = if names.is_empty() {
        table.iter().map(Arc::as_ref).collect()
    } else {
        warn_unknown(names.iter().filter(|name| !table.contains(name)));
        names
            .iter()
            .filter_map(|name| table.get(name))
            .map(Arc::as_ref)
            .collect()
    };

    if json {
        let entries: Vec<BundleEntry> = selected.iter().map(|b| BundleEntry::from(*b)).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", render_text(selected.into_iter()));
    }
    Ok(())
}

/// `Bundle: NAME (type TAG)` followed by one tab-indented line per file.
fn render_text<'a>(bundles: impl Iterator<Item = &'a Bundle>) -> String {
    let mut out = String::new();
    for bundle in bundles {
        out.push_str(&format!(
            "Bundle: {} (type {})\n",
            bundle.name(),
            bundle.descriptor().type_tag()
        ));
        for file in bundle.files() {
            out.push_str(&format!("\t{file}\n"));
        }
    }
    out
}
