//! `fardel lint`

use std::path::PathBuf;

use anyhow::Result;
use fardel::bundle::{BundleKind, BundleTable};
use fardel::config::Settings;
use fardel::lint::{LintReport, linter_from_settings};
use fardel::utils::plural::plural_count;
use fardel::{debug, log};
use rayon::prelude::*;

use super::load_table;

/// Lint script members of the named bundles (all script bundles when
/// `targets` is empty), plus explicit `.js` files that are not bundle names.
///
/// Returns the number of files with findings.
pub fn lint_files(settings: &Settings, targets: &[String]) -> Result<usize> {
    let table = load_table(settings)?;
    let files = collect_files(settings, &table, targets);
    if files.is_empty() {
        log!("lint"; "nothing to lint");
        return Ok(0);
    }

    let linter = linter_from_settings(&settings.lint);
    let reports: Vec<LintReport> = files.par_iter().map(|file| linter.lint(file)).collect();

    let mut dirty = 0;
    for report in &reports {
        print_report(report);
        if !report.is_clean() {
            dirty += 1;
        }
    }
    log!("lint"; "{} checked, {} with findings", plural_count(reports.len(), "file"), dirty);
    Ok(dirty)
}

fn collect_files(settings: &Settings, table: &BundleTable, targets: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    let mut push = |path: PathBuf| {
        if !files.contains(&path) {
            files.push(path);
        }
    };

    if targets.is_empty() {
        for bundle in table.iter().filter(|b| *b.kind() == BundleKind::Script) {
            bundle.source_paths().into_iter().for_each(&mut push);
        }
        return files;
    }

    for target in targets {
        match table.get(target) {
            Some(bundle) if *bundle.kind() == BundleKind::Script => {
                bundle.source_paths().into_iter().for_each(&mut push);
            }
            Some(_) => log!("warning"; "`{}` is not a script bundle, skipping", target),
            None if target.ends_with(".js") => push(settings.source_path(target)),
            None => log!("warning"; "`{}` is neither a bundle nor a .js file", target),
        }
    }
    files
}

fn print_report(report: &LintReport) {
    let file = report.file.display();
    if let Some(reason) = &report.unavailable {
        log!("warning"; "{} not linted ({}): {}", file, report.tool, reason);
    } else if report.messages.is_empty() {
        debug!("lint"; "{} ok", file);
    } else {
        log!("lint"; "{} ({})\n{}", file, report.tool, report.messages.join("\n"));
    }
}
