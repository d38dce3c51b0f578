//! Cross-bundle reference rewriting.
//!
//! A built stylesheet may say `url(../img/logo.png)` where `img/logo.png` is
//! itself a bundle. Rereferencing turns that into the artifact path of the
//! current fingerprint, relative to the bundles directory:
//!
//! ```text
//! url(../img/logo.png)
//!   -> url(../bundles/img/logo.<hash>.png)   name replaced, prefix kept
//!   -> url(img/logo.<hash>.png)              `../bundles/` stripped
//! ```
//!
//! Only names wrapped in the kind's delimiters match, and the text before
//! the name must be empty or end in `/`, so `data.js` never matches the
//! bundle `a.js`. A `?query` or `#fragment` after the name is kept.

use std::fs;

use regex::bytes::{Captures, Regex};

use super::{Bundle, BundleKind, BundleTable, Delimiter};
use crate::error::{BundleError, Result};
use crate::utils::fs::write_atomic;
use crate::{debug, log};

/// Prefix made redundant once a reference points into the bundles directory.
const REDUNDANT_PREFIX: &[u8] = b"../bundles/";

/// Path segment prepended to every rewritten name.
const BUNDLES_SEGMENT: &str = "bundles/";

/// Rewrite references to other bundles of `table` inside `contents`.
///
/// `bundle_name` is skipped so a bundle never points at itself.
pub fn rewrite_references(
    contents: &[u8],
    bundle_name: &str,
    kind: &BundleKind,
    table: &BundleTable,
) -> Vec<u8> {
    let mut targets: Vec<&str> = table.names().filter(|n| *n != bundle_name).collect();
    if targets.is_empty() || kind.delimiters().is_empty() {
        return contents.to_vec();
    }
    // Longest first among names starting at the same position.
    targets.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

    let mut rewritten = contents.to_vec();
    for delimiter in kind.delimiters() {
        let pattern = reference_pattern(delimiter, &targets);
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(err) => {
                log!("warning"; "cannot rewrite references in {}: {}", bundle_name, err);
                continue;
            }
        };

        let replaced = re.replace_all(&rewritten, |caps: &Captures| {
            replacement(caps, delimiter, table)
        });
        rewritten = replaced.into_owned();
    }

    strip_redundant_prefix(&rewritten)
}

/// `open (prefix/)?? (name|...) ([?#]suffix)? close`
///
/// The prefix is lazy, so `lib/app.js` is read as one name rather than as
/// `app.js` under `lib/`.
fn reference_pattern(delimiter: &Delimiter, targets: &[&str]) -> String {
    let names = targets
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    format!(
        r#"{open}((?-u:[^'"()\s]*?/)??)({names})((?-u:[?#][^'"()\s]*)?){close}"#,
        open = regex::escape(delimiter.open),
        close = regex::escape(delimiter.close),
    )
}

fn replacement(caps: &Captures, delimiter: &Delimiter, table: &BundleTable) -> Vec<u8> {
    let whole = caps.get(0).map_or(&[][..], |m| m.as_bytes());
    let target = caps
        .get(2)
        .and_then(|m| std::str::from_utf8(m.as_bytes()).ok())
        .and_then(|name| table.get(name));
    let Some(target) = target else {
        return whole.to_vec();
    };

    let prefix = caps.get(1).map_or(&[][..], |m| m.as_bytes());
    let suffix = caps.get(3).map_or(&[][..], |m| m.as_bytes());

    let mut out = Vec::with_capacity(whole.len() + target.hash().len() + BUNDLES_SEGMENT.len());
    out.extend_from_slice(delimiter.open.as_bytes());
    out.extend_from_slice(prefix);
    out.extend_from_slice(BUNDLES_SEGMENT.as_bytes());
    out.extend_from_slice(target.output_name().as_bytes());
    out.extend_from_slice(suffix);
    out.extend_from_slice(delimiter.close.as_bytes());
    out
}

/// Remove every `../bundles/` occurrence.
fn strip_redundant_prefix(contents: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(contents.len());
    let mut rest = contents;
    while let Some(pos) = find(rest, REDUNDANT_PREFIX) {
        out.extend_from_slice(&rest[..pos]);
        rest = &rest[pos + REDUNDANT_PREFIX.len()..];
    }
    out.extend_from_slice(rest);
    out
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

impl Bundle {
    /// Rewrite references to other bundles inside the built artifact.
    ///
    /// Precondition: every bundle in `table` has been built with its current
    /// fingerprint. Rereferencing earlier leaves references to bundles
    /// whose artifacts do not exist yet. Returns whether the artifact
    /// changed; an unchanged artifact is not rewritten.
    pub fn rereference(&self, table: &BundleTable) -> Result<bool> {
        if self.kind().delimiters().is_empty() {
            return Ok(false);
        }

        let path = self.artifact_path();
        let contents = fs::read(&path).map_err(|err| BundleError::io(&path, err))?;
        let rewritten = rewrite_references(&contents, self.name(), self.kind(), table);
        if rewritten == contents {
            return Ok(false);
        }

        write_atomic(&path, &rewritten).map_err(|err| BundleError::io(&path, err))?;
        debug!("rewrite"; "{}", self.output_name());
        Ok(true)
    }
}
