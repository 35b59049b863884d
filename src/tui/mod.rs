mod app_logic;
mod app_state;
mod event_handler;
mod ui_renderer;

pub use app_logic::TuiApp;
pub use app_state::{Action, Outcome, ScrollSettings, SessionState};
pub use event_handler::key_to_action;

pub use self::session::run_session;

// Terminal setup/teardown and the draw/input loop.
mod session {
    use super::app_logic::TuiApp;
    use super::event_handler::handle_events;
    use super::ui_renderer::ui_frame;
    use anyhow::Result;
    use crossterm::{
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::prelude::{CrosstermBackend, Terminal};
    use std::io::{self, Stdout};
    use std::sync::atomic::AtomicBool;
    use tracing::debug;

    /// Owns raw mode and the alternate screen. Released exactly once, either
    /// through [`TerminalGuard::release`] or on drop.
    struct TerminalGuard {
        terminal: Terminal<CrosstermBackend<Stdout>>,
        released: bool,
    }

    impl TerminalGuard {
        fn acquire() -> Result<Self> {
            let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
            enable_raw_mode()?;
            let mut guard = TerminalGuard {
                terminal,
                released: false,
            };
            execute!(guard.terminal.backend_mut(), EnterAlternateScreen)?;
            guard.terminal.clear()?;
            debug!("terminal acquired");
            Ok(guard)
        }

        fn release(&mut self) -> Result<()> {
            if self.released {
                return Ok(());
            }
            self.released = true;
            // Run every step even if an earlier one fails.
            let raw = disable_raw_mode();
            let screen = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
            let cursor = self.terminal.show_cursor();
            debug!("terminal released");
            raw?;
            screen?;
            cursor?;
            Ok(())
        }
    }

    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = self.release();
        }
    }

    /// Runs the picker until the user confirms or cancels, or `interrupted`
    /// is raised. The terminal is restored before this returns, on every path.
    pub fn run_session(mut app: TuiApp, interrupted: &AtomicBool) -> Result<TuiApp> {
        let mut guard = TerminalGuard::acquire()?;

        while app.outcome().is_none() {
            guard.terminal.draw(|frame| ui_frame(frame, &app))?;
            handle_events(&mut app, interrupted)?;
        }

        guard.release()?;
        Ok(app)
    }
}
