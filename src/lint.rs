//! Advisory linting of script sources.
//!
//! Lint never affects build state: reports are printed and discarded.

use std::fs;
use std::path::{Path, PathBuf};

use oxc::allocator::Allocator;
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::config::LintConfig;
use crate::utils::exec::Cmd;

/// Findings for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintReport {
    pub file: PathBuf,
    /// Tool that produced the report.
    pub tool: String,
    pub messages: Vec<String>,
    /// Set when the tool could not run at all.
    pub unavailable: Option<String>,
}

impl LintReport {
    fn new(file: &Path, tool: &str) -> Self {
        Self {
            file: file.to_path_buf(),
            tool: tool.to_string(),
            messages: Vec::new(),
            unavailable: None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.messages.is_empty() && self.unavailable.is_none()
    }
}

pub trait Linter: Send + Sync {
    fn lint(&self, path: &Path) -> LintReport;
}

/// Built-in check: the file must parse as JavaScript.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxLinter;

impl Linter for SyntaxLinter {
    fn lint(&self, path: &Path) -> LintReport {
        let mut report = LintReport::new(path, "oxc");
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                report.unavailable = Some(format!("cannot read file: {err}"));
                return report;
            }
        };

        let source_type = match path.extension().and_then(|ext| ext.to_str()) {
            Some("mjs") => SourceType::mjs(),
            _ => SourceType::mjs().with_module(false),
        };
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, &source, source_type).parse();
        report.messages = ret.errors.iter().map(ToString::to_string).collect();
        report
    }
}

/// Runs `[lint] command` with the file path appended.
#[derive(Debug, Clone)]
pub struct ExternalLinter {
    argv: Vec<String>,
}

impl ExternalLinter {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl Linter for ExternalLinter {
    fn lint(&self, path: &Path) -> LintReport {
        let Some(program) = self.argv.first() else {
            return SyntaxLinter.lint(path);
        };
        let mut report = LintReport::new(path, program);
        if which::which(program).is_err() {
            report.unavailable = Some(format!("`{program}` not found in PATH"));
            return report;
        }

        match Cmd::from_slice(&self.argv).arg(path).output() {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                report.messages = stdout
                    .lines()
                    .chain(stderr.lines())
                    .map(str::trim_end)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
                if !output.status.success() && report.messages.is_empty() {
                    report.messages.push(format!("exited with {}", output.status));
                }
            }
            Err(err) => report.unavailable = Some(format!("{err:#}")),
        }
        report
    }
}

/// Linter for the `[lint]` section.
pub fn linter_from_settings(config: &LintConfig) -> Box<dyn Linter> {
    if config.command.is_empty() {
        Box::new(SyntaxLinter)
    } else {
        Box::new(ExternalLinter::new(config.command.clone()))
    }
}
