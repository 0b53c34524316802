//! Terminal rendering of fatal errors.
//!
//! Every fatal error is rendered with its root cause, the sources that were
//! consulted, and the concrete value an operator can supply to fix it.

use std::fmt::{self, Write as _};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Hints shared by several error kinds.
pub mod suggestions {
    /// A backend/architecture combination was rejected.
    pub const LIST_COMBINATIONS: &str =
        "Run `prebuild list` to see supported platform/architecture/backend combinations";

    /// A vendored dependency is missing or out of date.
    pub const SYNC_SUBMODULES: &str = "Run: git submodule update --init --recursive";

    pub const BUILD_FAILED: &str =
        "Inspect the build directory, or rerun with `--verbose` for discovery details";

    /// A build produced no runtime libraries.
    pub const CLEAN_REBUILD: &str = "Rebuild from scratch with `--clean`";
}

/// A fatal error ready for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// File or directory the error is about
    pub location: Option<PathBuf>,
    /// Indented lines under the message, e.g. each source that was tried
    pub notes: Vec<String>,
    /// Numbered remedies
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            ..Diagnostic::default()
        }
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn at(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Render for a terminal; `color` adds ANSI styling to the labels.
    pub fn render(&self, color: bool) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out, color);
        out
    }

    fn write_to(&self, out: &mut String, color: bool) -> fmt::Result {
        writeln!(out, "{}: {}", label("error", "1;31", color), self.message)?;

        if let Some(path) = &self.location {
            writeln!(out, "  --> {}", path.display())?;
        }
        for note in &self.notes {
            writeln!(out, "  {}", note)?;
        }

        if !self.hints.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}: consider:", label("help", "1;32", color))?;
            for (n, hint) in self.hints.iter().enumerate() {
                writeln!(out, "  {}. {}", n + 1, hint)?;
            }
        }
        Ok(())
    }
}

fn label(text: &str, ansi: &str, color: bool) -> String {
    if color {
        format!("\x1b[{}m{}\x1b[0m", ansi, text)
    } else {
        text.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

/// Print to stderr, colored when stderr is a terminal and `NO_COLOR` is unset.
pub fn emit(diagnostic: &Diagnostic) {
    let color = std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none();
    eprint!("{}", diagnostic.render(color));
}
