use super::app_logic::TuiApp;
use super::app_state::Action;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Longest wait for input when no animation step is pending.
const IDLE_POLL: Duration = Duration::from_millis(100);

pub fn key_to_action(key: KeyEvent) -> Option<Action> {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Up if shift => Some(Action::ScrollUp),
        KeyCode::Down if shift => Some(Action::ScrollDown),
        KeyCode::Up => Some(Action::Up),
        KeyCode::Down => Some(Action::Down),
        KeyCode::Left => Some(Action::Collapse),
        KeyCode::Right => Some(Action::Expand),
        KeyCode::Tab => Some(Action::ToggleAll),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::Cancel)
        }
        KeyCode::Char(' ') => Some(Action::Toggle),
        KeyCode::Char(c)
            if !c.is_control() && key.modifiers.difference(KeyModifiers::SHIFT).is_empty() =>
        {
            Some(Action::Type(c))
        }
        _ => None,
    }
}

/// Waits for one key or the next animation deadline, whichever comes first,
/// and feeds the result into `app`.
pub(super) fn handle_events(app: &mut TuiApp, interrupted: &AtomicBool) -> Result<()> {
    let now = Instant::now();
    let timeout = match app.next_tick() {
        Some((_, due)) => due.saturating_duration_since(now).min(IDLE_POLL),
        None => IDLE_POLL,
    };

    if event::poll(timeout)? {
        if let Event::Key(key_event) = event::read()? {
            if key_event.kind == KeyEventKind::Press {
                if let Some(action) = key_to_action(key_event) {
                    app.apply(action, Instant::now());
                }
            }
        }
    }

    if interrupted.load(Ordering::SeqCst) {
        app.apply(Action::Cancel, Instant::now());
        return Ok(());
    }

    if let Some((token, due)) = app.next_tick() {
        let now = Instant::now();
        if now >= due {
            app.on_tick(token, now);
        }
    }
    Ok(())
}
