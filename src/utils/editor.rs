//! External editor integration
//!
//! Hands the message draft to the user's editor through a temporary file.
//! The handoff moves through three owned stages: [`PreparedEdit`] (temp file
//! written), [`CompletedEdit`] (editor exited, UI resumed) and finally an
//! [`ExternalEditOutcome`]. Each stage owns the temp file, so it is removed
//! whichever way the handoff ends.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, ExitStatus};

use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Used when `EDITOR` is unset or blank.
pub const DEFAULT_EDITOR: &str = "vi";
pub const TEMP_FILE_PREFIX: &str = "parley_draft_";

/// Gives the terminal to a child process and takes it back.
pub trait TerminalSuspend {
    fn suspend(&mut self) -> io::Result<()>;
    fn resume(&mut self) -> io::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalEditOutcome {
    /// The editor exited cleanly; these lines replace the draft.
    Replaced(Vec<String>),
    /// The editor exited with a failure status; the draft stays as it was.
    Cancelled { code: Option<i32> },
    /// The file was not valid UTF-8 afterwards.
    DecodeFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEditor {
    program: String,
}

impl ExternalEditor {
    /// Reads `EDITOR` now; call once per invocation so changes are picked up.
    pub fn from_env() -> Self {
        let program = std::env::var("EDITOR")
            .ok()
            .filter(|editor| !editor.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
        Self { program }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn prepare(&self, lines: &[String]) -> io::Result<PreparedEdit> {
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .suffix(".md")
            .tempfile()?;
        file.write_all(lines.join("\n").as_bytes())?;
        file.flush()?;
        debug!(path = %file.path().display(), "draft written for external editor");
        Ok(PreparedEdit {
            file,
            program: self.program.clone(),
        })
    }

    /// Runs the whole handoff: write, suspend, edit, resume, read back.
    pub fn edit<T>(&self, lines: &[String], terminal: &mut T) -> io::Result<ExternalEditOutcome>
    where
        T: TerminalSuspend + ?Sized,
    {
        self.prepare(lines)?.run(terminal)?.outcome()
    }
}

pub struct PreparedEdit {
    file: NamedTempFile,
    program: String,
}

impl PreparedEdit {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Suspends the UI, runs `<program> <path>` through the shell and waits.
    /// The UI is resumed even when the editor could not be started.
    pub fn run<T>(self, terminal: &mut T) -> io::Result<CompletedEdit>
    where
        T: TerminalSuspend + ?Sized,
    {
        terminal.suspend()?;
        let command_line = format!("{} {}", self.program, shell_quote(self.path()));
        info!(editor = %self.program, "launching external editor");
        let status = shell_command(&command_line).status();
        let resumed = terminal.resume();
        let status = status?;
        resumed?;
        debug!(%status, "external editor exited");
        Ok(CompletedEdit {
            file: self.file,
            status,
        })
    }
}

pub struct CompletedEdit {
    file: NamedTempFile,
    status: ExitStatus,
}

impl CompletedEdit {
    pub fn outcome(self) -> io::Result<ExternalEditOutcome> {
        if !self.status.success() {
            return Ok(ExternalEditOutcome::Cancelled {
                code: self.status.code(),
            });
        }
        let bytes = fs::read(self.file.path())?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => ExternalEditOutcome::Replaced(text.lines().map(str::to_string).collect()),
            Err(err) => ExternalEditOutcome::DecodeFailed(err.to_string()),
        })
    }
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(command_line);
    command
}

#[cfg(not(windows))]
fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', r"'\''"))
}

#[cfg(windows)]
fn shell_quote(path: &Path) -> String {
    format!("\"{}\"", path.display())
}
