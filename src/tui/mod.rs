//! Terminal dashboard for the intersection.
//!
//! A full-screen live view showing per-lane queues, the vehicle currently
//! crossing, the recent-service history, and an ASCII junction diagram.
//! Keyboard input doubles as the interactive arrival source: `1`-`4` add a
//! regular car on lane 0-3, `a`-`d` add an ambulance, `q` quits.

mod events;
mod runner;
mod views;

pub use events::{Event, EventHandler};
pub use runner::TuiRunner;

use std::io::{self, Stdout};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::controller::ControllerHandle;
use crate::inbox::InboxSender;

/// Terminal type alias
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Run the dashboard until the user quits. Returns once the terminal has
/// been restored; the caller owns shutdown of the controller tasks.
pub async fn run(handle: ControllerHandle, sender: InboxSender) -> Result<()> {
    let terminal = init()?;

    // Use a guard to ensure terminal is restored even on early return/error
    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore();
        }
    }
    let _guard = TerminalGuard;

    let mut runner = TuiRunner::new(terminal, handle, sender);
    runner.run().await
}
