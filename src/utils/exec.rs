//! External tool invocation for the compressor and linter.
//!
//! ```ignore
//! // placeholders already substituted from `[compress.commands]`
//! Cmd::from_slice(&["csso", "in.css", "-o", "out.css"]).run()?;
//!
//! // lint findings come back on stdout even when the tool exits non-zero
//! let output = Cmd::from_slice(&["jshint"]).arg(path).output()?;
//! ```

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::{Command, Output, Stdio};

use anyhow::{Context, Result, bail};

/// An argv to run with captured output and no stdin.
#[derive(Debug, Clone)]
pub struct Cmd {
    argv: Vec<OsString>,
}

impl Cmd {
    /// Command from a configured argv; the first element is the program.
    pub fn from_slice<S: AsRef<OsStr>>(argv: &[S]) -> Self {
        Self {
            argv: argv.iter().map(|s| s.as_ref().to_owned()).collect(),
        }
    }

    /// Append an argument. Empty arguments are dropped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.argv.push(arg.to_owned());
        }
        self
    }

    pub fn program(&self) -> Option<&OsStr> {
        self.argv.first().map(OsString::as_os_str)
    }

    /// Run to completion, failing on a non-zero exit status.
    pub fn run(self) -> Result<Output> {
        let line = self.to_string();
        let output = self.output()?;
        if !output.status.success() {
            bail!(failure_message(&line, &output));
        }
        Ok(output)
    }

    /// Run to completion, whatever the exit status.
    pub fn output(self) -> Result<Output> {
        let Some((program, args)) = self.argv.split_first() else {
            bail!("empty command");
        };
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("Failed to run `{self}`"))
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arg in &self.argv {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// `` `line` failed with <status> `` plus trimmed stderr, or stdout when
/// stderr is empty.
fn failure_message(line: &str, output: &Output) -> String {
    let mut message = format!("`{line}` failed with {}", output.status);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let detail = [stderr.trim(), stdout.trim()]
        .into_iter()
        .find(|s| !s.is_empty());
    if let Some(detail) = detail {
        message.push('\n');
        message.push_str(detail);
    }
    message
}
