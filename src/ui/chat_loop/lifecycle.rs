use std::{error::Error, io};

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;

use crate::utils::editor::TerminalSuspend;

pub type ChatTerminal = Terminal<CrosstermBackend<io::Stdout>>;

pub fn setup_terminal() -> Result<ChatTerminal, Box<dyn Error>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let terminal = Terminal::new(CrosstermBackend::new(stdout)).inspect_err(|_| {
        let _ = disable_raw_mode();
    })?;
    Ok(terminal)
}

pub fn restore_terminal(terminal: &mut ChatTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()
}

/// Hands the real terminal to a child process for the duration of an
/// external edit.
pub struct SuspendableTerminal<'a> {
    terminal: &'a mut ChatTerminal,
}

impl<'a> SuspendableTerminal<'a> {
    pub fn new(terminal: &'a mut ChatTerminal) -> Self {
        Self { terminal }
    }
}

impl TerminalSuspend for SuspendableTerminal<'_> {
    fn suspend(&mut self) -> io::Result<()> {
        restore_terminal(self.terminal)
    }

    fn resume(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            EnterAlternateScreen,
            EnableBracketedPaste
        )?;
        self.terminal.hide_cursor()?;
        // The editor drew over everything; force a full repaint.
        self.terminal.clear()
    }
}
