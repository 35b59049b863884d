use std::time::{Duration, Instant};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Animating,
    Terminated(Outcome),
}

/// Discrete input the state machine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    ScrollUp,
    ScrollDown,
    Collapse,
    Expand,
    Toggle,
    ToggleAll,
    Confirm,
    Cancel,
    Backspace,
    Type(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSettings {
    pub rows: usize,
    pub tick: Duration,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            rows: 10,
            tick: Duration::from_millis(25),
        }
    }
}

/// An in-flight smooth scroll. Only valid while `token` matches the app's
/// current animation generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ScrollAnimation {
    pub(super) direction: ScrollDirection,
    pub(super) remaining: usize,
    pub(super) next_tick: Instant,
    pub(super) token: u64,
}
