//! Terminal output: prefixed log lines, watcher status, build progress.
//!
//! ```ignore
//! log!("build"; "{} bundles", count);
//! debug!("rewrite"; "{}", name); // only with --verbose
//!
//! let progress = ProgressLine::new("bundles", 12);
//! progress.inc();
//! progress.finish();
//! ```

use std::io::{StdoutLock, Write, stdout};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::SystemTime;

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;

/// Set by `--verbose`.
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Whether a [`ProgressLine`] currently owns the last terminal line.
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Print `[module] message`.
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like [`log!`], printed only in verbose mode.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Print one prefixed line, keeping an active progress line below it.
pub fn log(module: &str, message: &str) {
    let mut out = stdout().lock();
    // The progress line is redrawn below on its next increment.
    if PROGRESS_ACTIVE.load(Ordering::SeqCst) {
        clear_line(&mut out);
    }
    writeln!(out, "{} {message}", prefix(module)).ok();
    out.flush().ok();
}

fn prefix(module: &str) -> String {
    let label = format!("[{module}]");
    match module {
        "watch" => label.bright_green().bold().to_string(),
        "error" => label.bright_red().bold().to_string(),
        "warning" => label.bright_magenta().bold().to_string(),
        "compress" | "rewrite" => label.bright_blue().bold().to_string(),
        _ => label.bright_yellow().bold().to_string(),
    }
}

fn clear_line(out: &mut StdoutLock<'_>) {
    execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
}

// ============================================================================
// Watcher status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Ok,
    Failed,
}

/// Status block of the change watcher. Each report replaces the previous
/// block, so a long watch session does not scroll.
struct WatchStatus {
    /// Lines printed by the previous report.
    last_lines: usize,
}

static WATCH_STATUS: Mutex<WatchStatus> = Mutex::new(WatchStatus { last_lines: 0 });

impl WatchStatus {
    fn report(&mut self, outcome: Outcome, message: &str) {
        let mut out = stdout().lock();
        if let Ok(lines) = u16::try_from(self.last_lines)
            && lines > 0
        {
            execute!(out, cursor::MoveUp(lines), Clear(ClearType::FromCursorDown)).ok();
        }

        let mark = match outcome {
            Outcome::Ok => "✓".green().to_string(),
            Outcome::Failed => "✗".red().to_string(),
        };
        let stamp = format!("[{}]", clock()).dimmed().to_string();
        writeln!(out, "{stamp} {mark} {message}").ok();
        out.flush().ok();

        self.last_lines = line_count(message);
    }
}

/// Report a successful watcher action.
pub fn status_success(message: &str) {
    WATCH_STATUS.lock().report(Outcome::Ok, message);
}

/// Report a failed watcher action; `detail` goes on the following lines.
pub fn status_error(summary: &str, detail: &str) {
    let message = if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}\n{detail}")
    };
    WATCH_STATUS.lock().report(Outcome::Failed, &message);
}

fn line_count(message: &str) -> usize {
    message.lines().count().max(1)
}

/// `HH:MM:SS` (UTC).
fn clock() -> String {
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    format!("{:02}:{:02}:{:02}", (secs / 3600) % 24, (secs / 60) % 60, secs % 60)
}

// ============================================================================
// Build progress
// ============================================================================

/// One-line counter, `[build] bundles(4/12)`.
///
/// Safe to bump from rayon workers: a worker that finds the terminal busy
/// skips the redraw instead of waiting.
pub struct ProgressLine {
    label: &'static str,
    total: usize,
    done: AtomicUsize,
    terminal: Mutex<()>,
}

impl ProgressLine {
    pub fn new(label: &'static str, total: usize) -> Self {
        let progress = Self {
            label,
            total,
            done: AtomicUsize::new(0),
            terminal: Mutex::new(()),
        };
        if total > 0 {
            PROGRESS_ACTIVE.store(true, Ordering::SeqCst);
            progress.draw(false);
        }
        progress
    }

    pub fn inc(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
        if self.total > 0
            && let Some(_guard) = self.terminal.try_lock()
        {
            self.draw(false);
        }
    }

    fn render(&self) -> String {
        let done = self.done.load(Ordering::Relaxed).min(self.total);
        format!("{}({done}/{})", self.label, self.total)
    }

    fn draw(&self, newline: bool) {
        let mut out = stdout().lock();
        clear_line(&mut out);
        write!(out, "{} {}", prefix("build"), self.render()).ok();
        if newline {
            writeln!(out).ok();
        }
        out.flush().ok();
    }

    /// Leave the final count on screen.
    pub fn finish(self) {
        if self.total > 0 {
            let _guard = self.terminal.lock();
            self.draw(true);
        }
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_count() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("rebuilt app.js"), 1);
        assert_eq!(line_count("rebuild failed: app.js\nfile `a.js` missing"), 2);
    }

    #[test]
    fn test_progress_render() {
        let progress = ProgressLine::new("bundles", 3);
        progress.inc();
        assert_eq!(progress.render(), "bundles(1/3)");
        for _ in 0..5 {
            progress.inc();
        }
        assert_eq!(progress.render(), "bundles(3/3)");
        progress.finish();
    }

    #[test]
    fn test_clock_format() {
        let clock = clock();
        assert_eq!(clock.len(), 8);
        assert_eq!(clock.matches(':').count(), 2);
    }
}
