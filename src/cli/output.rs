//! Terminal output and CI annotations.
//!
//! Progress lines are coloured when stdout is a terminal. Workflow commands
//! (`::error::`, `::warning::`, `::group::`) are always written uncoloured
//! at the start of a line, which is where the CI runner looks for them.

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use std::io::{self, Write};

/// Output manager for coloured terminal output.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Creates an output manager.
    ///
    /// `quiet` suppresses everything except errors; `verbose` enables
    /// [`OutputManager::verbose`] lines.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    fn stdout() -> StandardStream {
        StandardStream::stdout(ColorChoice::Auto)
    }

    fn colored(&self, color: Color, bold: bool, message: &str) -> io::Result<()> {
        let mut stream = Self::stdout();
        stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
        writeln!(stream, "{}", message)?;
        stream.reset()
    }

    /// Print an informational line.
    pub fn info(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(Self::stdout(), "{}", message)
    }

    /// Print a line only in verbose mode.
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose || self.quiet {
            return Ok(());
        }
        self.colored(Color::White, false, message)
    }

    /// Print a progress line.
    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.colored(Color::Cyan, false, &format!("🔹 {}", message))
    }

    /// Print a success line.
    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.colored(Color::Green, true, &format!("✔ {}", message))
    }

    /// Print a warning as a CI annotation.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(Self::stdout(), "::warning::{}", message)
    }

    /// Print an error as a CI annotation. Never suppressed.
    pub fn error(&self, message: &str) -> io::Result<()> {
        writeln!(Self::stdout(), "::error::{}", message)
    }

    /// Print a section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.colored(Color::Blue, true, &format!("\n{}", title))
    }

    /// Print an indented line.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        self.info(&format!("  {}", message))
    }

    /// Open a collapsible log group.
    pub fn group(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(Self::stdout(), "::group::{}", title)
    }

    /// Close the current log group.
    pub fn end_group(&self) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(Self::stdout(), "::endgroup::")
    }
}
