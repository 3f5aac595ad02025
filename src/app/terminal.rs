use std::{
    io::{self, Stdout},
    sync::Once,
};

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use tracing::{debug, warn};

static PANIC_HOOK: Once = Once::new();

/// The editor's hold on the terminal: raw mode plus the alternate screen.
///
/// [`TerminalGuard::leave`] hands the terminal back and reports failures.
/// A guard dropped without leaving (an error unwinding out of the event loop)
/// restores on a best-effort basis, and so does the panic hook.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err).context("failed to enter alternate screen");
        }
        install_panic_hook();
        let terminal = Terminal::new(CrosstermBackend::new(stdout))
            .context("failed to initialize terminal")?;
        debug!("terminal switched to raw mode");
        Ok(Self {
            terminal,
            active: true,
        })
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame<'_>)) -> Result<()> {
        self.terminal
            .draw(render)
            .context("failed to draw the editor")?;
        Ok(())
    }

    pub fn leave(mut self) -> Result<()> {
        self.active = false;
        self.terminal.show_cursor().context("failed to show cursor")?;
        restore_terminal().context("failed to restore the terminal")?;
        debug!("terminal restored");
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        let _ = self.terminal.show_cursor();
        if let Err(err) = restore_terminal() {
            warn!("failed to restore the terminal: {err}");
        }
    }
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = restore_terminal();
            previous(panic_info);
        }));
    });
}

fn restore_terminal() -> io::Result<()> {
    let raw = disable_raw_mode();
    execute!(io::stdout(), LeaveAlternateScreen, Show)?;
    raw
}
