//! Scroll window and sticky ancestor rows for the tree list.
//!
//! Sticky rows eat into the row budget, which moves the window, which can
//! change which ancestors need pinning. The layout is therefore refined until
//! the sticky count and the window start stop changing.

use crate::tree_builder::FlatNode;
use std::ops::Range;

/// Upper bound on layout refinement rounds.
pub const MAX_LAYOUT_ITERATIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    /// Rows pinned above the window, shallowest first.
    pub sticky: Vec<usize>,
    pub start: usize,
    pub end: usize,
    pub iterations: usize,
    pub converged: bool,
}

impl Viewport {
    pub fn window(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn contains(&self, row: usize) -> bool {
        self.window().contains(&row)
    }

    /// Screen rows used, sticky headers included.
    pub fn height(&self) -> usize {
        self.sticky.len() + (self.end - self.start)
    }
}

/// Lays out `rows` for a list area of `budget` lines with the cursor on
/// `cursor`. The cursor row is always inside the returned window.
pub fn compute_viewport(rows: &[FlatNode], cursor: usize, budget: usize) -> Viewport {
    let budget = budget.max(1);
    let mut viewport = Viewport {
        sticky: Vec::new(),
        start: 0,
        end: 0,
        iterations: 0,
        converged: true,
    };
    if rows.is_empty() {
        return viewport;
    }
    let cursor = cursor.min(rows.len() - 1);

    let mut sticky_count = 0;
    let mut previous_start: Option<usize> = None;
    for iteration in 1..=MAX_LAYOUT_ITERATIONS {
        let (start, end) = window_around(rows.len(), cursor, budget - sticky_count);
        let sticky = sticky_rows(rows, start, budget - 1);
        let converged =
            sticky.len() == sticky_count && previous_start.is_none_or(|prev| prev == start);

        viewport = Viewport {
            sticky,
            start,
            end,
            iterations: iteration,
            converged,
        };
        if converged {
            return viewport;
        }
        previous_start = Some(start);
        sticky_count = viewport.sticky.len();
    }

    // No fixed point: keep the last window and drop the shallowest headers
    // that no longer fit.
    tracing::debug!(
        cursor,
        budget,
        "viewport did not settle after {} rounds",
        MAX_LAYOUT_ITERATIONS
    );
    let room = budget - (viewport.end - viewport.start);
    if viewport.sticky.len() > room {
        let excess = viewport.sticky.len() - room;
        viewport.sticky.drain(..excess);
    }
    viewport
}

/// Window of at most `avail` rows centred on `cursor`, clamped to `0..len`.
fn window_around(len: usize, cursor: usize, avail: usize) -> (usize, usize) {
    let avail = avail.max(1);
    if len <= avail {
        return (0, len);
    }
    let start = cursor.saturating_sub(avail / 2).min(len - avail);
    (start, start + avail)
}

/// Ancestors of the first windowed row that sit above the window. Any
/// ancestor above the window with a descendant inside it is one of these,
/// because a folder's rows form one contiguous run after its header.
fn sticky_rows(rows: &[FlatNode], start: usize, cap: usize) -> Vec<usize> {
    let mut chain = Vec::new();
    let mut parent = rows[start].parent_row;
    while let Some(row) = parent {
        chain.push(row);
        parent = rows[row].parent_row;
    }
    // Nearest ancestors win when they do not all fit.
    chain.truncate(cap);
    chain.reverse();
    chain
}
