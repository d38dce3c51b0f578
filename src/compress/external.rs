//! Compression through external per-type commands.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::Builder;

use super::{CompressOutcome, Compressor};
use crate::utils::exec::Cmd;
use crate::utils::fs::{file_size, parent_dir, replace_atomic};

const INPUT: &str = "{input}";
const OUTPUT: &str = "{output}";

/// Runs a configured command per file type tag.
///
/// With an `{output}` placeholder the tool writes to a temp file that then
/// replaces the artifact. Without one the tool is expected to rewrite its
/// `{input}` in place; it works on a temp copy so the artifact is never
/// seen half-written. A missing `{input}` appends the path.
#[derive(Debug, Clone, Default)]
pub struct ExternalCompressor {
    commands: BTreeMap<String, Vec<String>>,
}

impl ExternalCompressor {
    pub fn new(commands: BTreeMap<String, Vec<String>>) -> Self {
        let commands = commands
            .into_iter()
            .filter(|(_, argv)| !argv.is_empty())
            .collect();
        Self { commands }
    }

    pub fn handles(&self, file_type: &str) -> bool {
        self.commands.contains_key(file_type)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Compressor for ExternalCompressor {
    fn compress(&self, artifact: &Path, file_type: &str) -> Result<CompressOutcome> {
        let Some(argv) = self.commands.get(file_type) else {
            return Ok(CompressOutcome::Skipped);
        };
        let Some(program) = argv.first() else {
            return Ok(CompressOutcome::Skipped);
        };
        if which::which(program).is_err() {
            return Ok(CompressOutcome::Unavailable(format!(
                "`{program}` not found in PATH"
            )));
        }

        let dir = parent_dir(artifact);
        let suffix = artifact
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let before = file_size(artifact);

        let work = if argv.iter().any(|arg| arg.contains(OUTPUT)) {
            let output = Builder::new()
                .suffix(&suffix)
                .tempfile_in(dir)
                .context("Failed to create temp output")?;
            let args = substitute(argv, artifact, Some(output.path()));
            Cmd::from_slice(&args).run()?;
            output
        } else {
            let copy = Builder::new()
                .suffix(&suffix)
                .tempfile_in(dir)
                .context("Failed to create temp copy")?;
            std::fs::copy(artifact, copy.path())
                .with_context(|| format!("Failed to copy {}", artifact.display()))?;
            let args = substitute(argv, copy.path(), None);
            Cmd::from_slice(&args).run()?;
            copy
        };

        let after = file_size(work.path());
        if after == 0 && before > 0 {
            return Ok(CompressOutcome::Failed(format!(
                "`{program}` produced no output"
            )));
        }
        replace_atomic(artifact, work.path())
            .with_context(|| format!("Failed to replace {}", artifact.display()))?;
        Ok(CompressOutcome::Compressed { before, after })
    }

    fn name(&self) -> &str {
        "external"
    }
}

/// Fill `{input}` / `{output}` placeholders, appending the input path when
/// no argument mentions it.
fn substitute(argv: &[String], input: &Path, output: Option<&Path>) -> Vec<String> {
    let input = input.to_string_lossy();
    let output = output.map(|p| p.to_string_lossy().into_owned());

    let mut args: Vec<String> = argv
        .iter()
        .map(|arg| {
            let arg = arg.replace(INPUT, &input);
            match &output {
                Some(output) => arg.replace(OUTPUT, output),
                None => arg,
            }
        })
        .collect();
    if !argv.iter().any(|arg| arg.contains(INPUT)) {
        args.push(input.into_owned());
    }
    args
}
