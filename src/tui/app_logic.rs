use super::app_state::{
    Action, Outcome, ScrollAnimation, ScrollDirection, ScrollSettings, SessionState,
};
use crate::selection::{SelectionMark, SelectionSet};
use crate::tree_builder::{FlatNode, Tree, TreeNode, build_tree, filter_tree, flatten_tree};
use std::time::Instant;
use tracing::debug;

/// All state of one picker session. Every transition goes through
/// [`TuiApp::apply`] or [`TuiApp::on_tick`]; rendering only reads it.
pub struct TuiApp {
    /// Unfiltered tree, built once. Open flags toggled in the view are
    /// mirrored here so they outlive query changes.
    pub(super) tree: Tree,
    /// `tree` filtered by `query`.
    pub(super) view: Tree,
    pub(super) rows: Vec<FlatNode>,
    pub(super) discovered: Vec<String>,
    pub(super) selection: SelectionSet,
    pub(super) query: String,
    pub(super) cursor: usize,
    pub(super) outcome: Option<Outcome>,
    animation: Option<ScrollAnimation>,
    animation_generation: u64,
    scroll: ScrollSettings,
}

impl TuiApp {
    pub fn new(
        discovered: Vec<String>,
        strip_root: Option<&str>,
        selection: SelectionSet,
        scroll: ScrollSettings,
    ) -> Self {
        let tree = build_tree(&discovered, strip_root);
        let view = tree.clone();
        let rows = flatten_tree(&view);
        TuiApp {
            tree,
            view,
            rows,
            discovered,
            selection,
            query: String::new(),
            cursor: 0,
            outcome: None,
            animation: None,
            animation_generation: 0,
            scroll,
        }
    }

    pub fn state(&self) -> SessionState {
        match (self.outcome, self.animation) {
            (Some(outcome), _) => SessionState::Terminated(outcome),
            (None, Some(_)) => SessionState::Animating,
            (None, None) => SessionState::Idle,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn rows(&self) -> &[FlatNode] {
        &self.rows
    }

    pub fn view(&self) -> &Tree {
        &self.view
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn discovered(&self) -> &[String] {
        &self.discovered
    }

    /// Picked paths in discovery order.
    pub fn selected_paths(&self) -> Vec<String> {
        self.selection.selected(&self.discovered)
    }

    pub fn row_node(&self, row: usize) -> Option<&TreeNode> {
        self.rows.get(row).map(|r| self.view.node(r.id))
    }

    pub fn row_mark(&self, row: usize) -> SelectionMark {
        match self.rows.get(row) {
            Some(r) => self.selection.mark(&self.view, r.id),
            None => SelectionMark::Unselected,
        }
    }

    /// Applies one input. Ignored once the session has ended.
    ///
    /// Keys that move the cursor or reshape the rows cancel a running smooth
    /// scroll first; selection keys leave it running.
    pub fn apply(&mut self, action: Action, now: Instant) {
        if self.outcome.is_some() {
            return;
        }
        match action {
            Action::Up => {
                self.cancel_animation();
                self.move_cursor_wrapping(-1);
            }
            Action::Down => {
                self.cancel_animation();
                self.move_cursor_wrapping(1);
            }
            Action::ScrollUp => self.start_scroll(ScrollDirection::Up, now),
            Action::ScrollDown => self.start_scroll(ScrollDirection::Down, now),
            Action::Collapse => {
                self.cancel_animation();
                self.set_open_under_cursor(false);
            }
            Action::Expand => {
                self.cancel_animation();
                self.set_open_under_cursor(true);
            }
            Action::Toggle => self.toggle_under_cursor(),
            Action::ToggleAll => self.selection.toggle_all(&self.discovered),
            Action::Confirm => self.finish(Outcome::Confirmed),
            Action::Cancel => self.finish(Outcome::Cancelled),
            Action::Backspace => {
                self.cancel_animation();
                self.query.pop();
                self.refresh_view();
            }
            Action::Type(c) => {
                self.cancel_animation();
                self.query.push(c);
                self.refresh_view();
            }
        }
    }

    /// Token and deadline of the pending smooth-scroll step, if any.
    pub fn next_tick(&self) -> Option<(u64, Instant)> {
        self.animation.map(|a| (a.token, a.next_tick))
    }

    /// Runs one smooth-scroll step. Stale tokens and early calls do nothing.
    /// Returns whether the cursor moved.
    pub fn on_tick(&mut self, token: u64, now: Instant) -> bool {
        let Some(mut animation) = self.animation else {
            return false;
        };
        if token != animation.token || token != self.animation_generation {
            return false;
        }
        if now < animation.next_tick {
            return false;
        }

        let moved = !self.at_boundary(animation.direction);
        if moved {
            match animation.direction {
                ScrollDirection::Up => self.cursor -= 1,
                ScrollDirection::Down => self.cursor += 1,
            }
        }
        animation.remaining = animation.remaining.saturating_sub(1);

        if !moved || animation.remaining == 0 || self.at_boundary(animation.direction) {
            self.animation = None;
        } else {
            animation.next_tick = now + self.scroll.tick;
            self.animation = Some(animation);
        }
        moved
    }

    fn start_scroll(&mut self, direction: ScrollDirection, now: Instant) {
        self.cancel_animation();
        if self.scroll.rows == 0 || self.at_boundary(direction) {
            return;
        }
        self.animation_generation = self.animation_generation.wrapping_add(1);
        self.animation = Some(ScrollAnimation {
            direction,
            remaining: self.scroll.rows,
            next_tick: now,
            token: self.animation_generation,
        });
    }

    fn cancel_animation(&mut self) {
        if self.animation.take().is_some() {
            self.animation_generation = self.animation_generation.wrapping_add(1);
            debug!("smooth scroll cancelled");
        }
    }

    fn at_boundary(&self, direction: ScrollDirection) -> bool {
        match direction {
            ScrollDirection::Up => self.cursor == 0,
            ScrollDirection::Down => self.cursor + 1 >= self.rows.len(),
        }
    }

    fn move_cursor_wrapping(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let len = self.rows.len() as isize;
        self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
    }

    fn set_open_under_cursor(&mut self, open: bool) {
        let Some(row) = self.rows.get(self.cursor).copied() else {
            return;
        };
        if self.view.set_open(row.id, open) {
            let origin = self.view.node(row.id).origin;
            self.tree.set_open(origin, open);
            self.reflatten();
        }
    }

    fn toggle_under_cursor(&mut self) {
        if let Some(row) = self.rows.get(self.cursor) {
            self.selection.toggle(&self.view, row.id);
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.cancel_animation();
        self.outcome = Some(outcome);
        debug!(?outcome, selected = self.selection.len(), "session finished");
    }

    /// Re-filters from the unfiltered tree and puts the cursor on top.
    fn refresh_view(&mut self) {
        self.view = filter_tree(&self.tree, &self.query);
        self.rows = flatten_tree(&self.view);
        self.cursor = 0;
        debug!(query = %self.query, rows = self.rows.len(), "filter applied");
    }

    fn reflatten(&mut self) {
        self.rows = flatten_tree(&self.view);
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn app_with(paths: &[&str], scroll_rows: usize) -> TuiApp {
        TuiApp::new(
            paths.iter().map(|s| s.to_string()).collect(),
            None,
            SelectionSet::new(),
            ScrollSettings {
                rows: scroll_rows,
                tick: Duration::from_millis(10),
            },
        )
    }

    fn scenario() -> TuiApp {
        app_with(&["a/1.spec.ts", "a/2.spec.ts", "b/3.spec.ts"], 5)
    }

    fn flat_files(count: usize) -> TuiApp {
        let paths: Vec<String> = (0..count).map(|i| format!("f{i:02}.ts")).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        app_with(&refs, 3)
    }

    fn row_names(app: &TuiApp) -> Vec<String> {
        (0..app.rows().len())
            .filter_map(|r| app.row_node(r).map(|n| n.name.clone()))
            .collect()
    }

    #[test]
    fn selecting_a_folder_and_confirming_yields_its_leaves() {
        let mut app = scenario();
        let now = Instant::now();
        assert_eq!(row_names(&app), vec!["a", "b"]);

        app.apply(Action::Toggle, now);
        app.apply(Action::Confirm, now);

        assert_eq!(app.state(), SessionState::Terminated(Outcome::Confirmed));
        assert_eq!(app.selected_paths(), vec!["a/1.spec.ts", "a/2.spec.ts"]);
    }

    #[test]
    fn typing_filters_and_opens_matching_folders() {
        let mut app = scenario();
        let now = Instant::now();
        app.apply(Action::Down, now);
        app.apply(Action::Type('3'), now);

        assert_eq!(app.query(), "3");
        assert_eq!(row_names(&app), vec!["b", "3.spec.ts"]);
        assert!(app.row_node(0).unwrap().is_open());
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn backspace_restores_rows_and_resets_cursor() {
        let mut app = scenario();
        let now = Instant::now();
        app.apply(Action::Type('3'), now);
        app.apply(Action::Down, now);
        app.apply(Action::Backspace, now);

        assert_eq!(app.query(), "");
        assert_eq!(row_names(&app), vec!["a", "b"]);
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn backspace_on_empty_query_still_resets_cursor() {
        let mut app = scenario();
        let now = Instant::now();
        app.apply(Action::Down, now);
        assert_eq!(app.cursor(), 1);

        app.apply(Action::Backspace, now);
        assert_eq!(app.query(), "");
        assert_eq!(row_names(&app), vec!["a", "b"]);
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn arrows_wrap_around() {
        let mut app = scenario();
        let now = Instant::now();
        app.apply(Action::Up, now);
        assert_eq!(app.cursor(), 1);
        app.apply(Action::Down, now);
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn expand_and_collapse_recompute_rows() {
        let mut app = scenario();
        let now = Instant::now();
        app.apply(Action::Expand, now);
        assert_eq!(row_names(&app), vec!["a", "1.spec.ts", "2.spec.ts", "b"]);

        // Leaves ignore expand/collapse.
        app.apply(Action::Down, now);
        app.apply(Action::Collapse, now);
        assert_eq!(app.rows().len(), 4);

        app.apply(Action::Up, now);
        app.apply(Action::Collapse, now);
        assert_eq!(row_names(&app), vec!["a", "b"]);
        assert!(app.cursor() < app.rows().len());
    }

    #[test]
    fn open_state_survives_query_changes() {
        let mut app = scenario();
        let now = Instant::now();
        app.apply(Action::Expand, now);
        app.apply(Action::Type('z'), now);
        assert!(app.rows().is_empty());
        app.apply(Action::Backspace, now);
        assert_eq!(app.rows().len(), 4);
    }

    #[test]
    fn selection_persists_while_filtered_out() {
        let mut app = scenario();
        let now = Instant::now();
        app.apply(Action::Toggle, now);
        app.apply(Action::Type('3'), now);
        app.apply(Action::Down, now);
        app.apply(Action::Toggle, now);
        app.apply(Action::Backspace, now);

        assert_eq!(
            app.selected_paths(),
            vec!["a/1.spec.ts", "a/2.spec.ts", "b/3.spec.ts"]
        );
        assert_eq!(app.row_mark(0), SelectionMark::Selected);
    }

    #[test]
    fn tab_toggles_everything_even_when_filtered() {
        let mut app = scenario();
        let now = Instant::now();
        app.apply(Action::Type('3'), now);
        app.apply(Action::ToggleAll, now);
        assert_eq!(app.selection().len(), 3);
        app.apply(Action::ToggleAll, now);
        assert!(app.selection().is_empty());
    }

    #[test]
    fn empty_view_ignores_navigation_and_toggles() {
        let mut app = scenario();
        let now = Instant::now();
        app.apply(Action::Type('q'), now);
        app.apply(Action::Down, now);
        app.apply(Action::Up, now);
        app.apply(Action::Toggle, now);
        app.apply(Action::Expand, now);
        app.apply(Action::ScrollDown, now);
        assert_eq!(app.cursor(), 0);
        assert!(app.selection().is_empty());
        assert_eq!(app.state(), SessionState::Idle);
    }

    #[test]
    fn cancel_ends_session_and_ignores_later_keys() {
        let mut app = scenario();
        let now = Instant::now();
        app.apply(Action::Cancel, now);
        app.apply(Action::Toggle, now);
        assert_eq!(app.outcome(), Some(Outcome::Cancelled));
        assert!(app.selection().is_empty());
    }

    #[test]
    fn smooth_scroll_steps_once_per_tick() {
        let mut app = flat_files(10);
        let start = Instant::now();
        app.apply(Action::ScrollDown, start);
        assert_eq!(app.state(), SessionState::Animating);

        let (token, due) = app.next_tick().unwrap();
        assert_eq!(due, start);
        assert!(app.on_tick(token, start));
        assert_eq!(app.cursor(), 1);

        // Not due yet.
        assert!(!app.on_tick(token, start));

        let mut now = start;
        while let Some((token, due)) = app.next_tick() {
            now = due.max(now);
            app.on_tick(token, now);
        }
        assert_eq!(app.cursor(), 3);
        assert_eq!(app.state(), SessionState::Idle);
    }

    #[test]
    fn smooth_scroll_stops_at_the_end() {
        let mut app = flat_files(4);
        let now = Instant::now();
        app.apply(Action::Up, now);
        app.apply(Action::Up, now);
        assert_eq!(app.cursor(), 2);

        app.apply(Action::ScrollDown, now);
        let (token, _) = app.next_tick().unwrap();
        assert!(app.on_tick(token, now));
        assert_eq!(app.cursor(), 3);
        assert!(app.next_tick().is_none());

        app.apply(Action::ScrollDown, now);
        assert!(app.next_tick().is_none());
        app.apply(Action::ScrollUp, now);
        assert!(app.next_tick().is_some());
    }

    #[test]
    fn new_scroll_supersedes_old_one() {
        let mut app = flat_files(10);
        let now = Instant::now();
        app.apply(Action::ScrollDown, now);
        let (old_token, _) = app.next_tick().unwrap();
        assert!(app.on_tick(old_token, now));

        app.apply(Action::ScrollUp, now);
        let (new_token, _) = app.next_tick().unwrap();
        assert_ne!(old_token, new_token);
        assert!(!app.on_tick(old_token, now));
        assert_eq!(app.cursor(), 1);
        assert!(app.on_tick(new_token, now));
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn cursor_keys_cancel_scroll_but_selection_keys_do_not() {
        let mut app = flat_files(10);
        let now = Instant::now();
        app.apply(Action::ScrollDown, now);
        app.apply(Action::Toggle, now);
        assert_eq!(app.state(), SessionState::Animating);
        assert_eq!(app.selection().len(), 1);

        let (token, _) = app.next_tick().unwrap();
        app.apply(Action::Down, now);
        assert_eq!(app.state(), SessionState::Idle);
        assert!(!app.on_tick(token, now));
        assert_eq!(app.cursor(), 1);
    }
}
