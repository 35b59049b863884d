use super::app_logic::TuiApp;
use crate::selection::SelectionMark;
use crate::viewport::compute_viewport;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

const SEARCH_PROMPT: &str = "Search: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowRole {
    Plain,
    Hovered,
    /// Pinned ancestor header. Never drawn as hovered.
    Sticky,
}

fn accent() -> Style {
    Style::default().fg(Color::Cyan)
}

fn draw_help_block(f: &mut Frame, area: Rect) {
    let key = |k: &'static str| Span::styled(k, accent().add_modifier(Modifier::BOLD));
    let help_lines = vec![
        Line::from(vec![
            key("↑/↓"),
            " move  ".into(),
            key("⇧↑/⇧↓"),
            " jump  ".into(),
            key("←/→"),
            " close/open folder  ".into(),
            key("space"),
            " select  ".into(),
            key("tab"),
            " select all".into(),
        ]),
        Line::from(vec![
            Span::styled("enter", Style::default().bg(Color::Green).add_modifier(Modifier::BOLD)),
            " run  ".into(),
            Span::styled("esc", Style::default().bg(Color::Red).add_modifier(Modifier::BOLD)),
            " cancel  ".into(),
            key("type"),
            " to search".into(),
        ]),
    ];
    let help_paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Select the tests to run"),
    );
    f.render_widget(help_paragraph, area);
}

fn tree_line(app: &TuiApp, row: usize, role: RowRole) -> Line<'static> {
    let Some(node) = app.row_node(row) else {
        return Line::default();
    };
    let depth = app.rows()[row].depth;
    let hovered = role == RowRole::Hovered;

    let mut spans = Vec::with_capacity(5);
    spans.push(if hovered {
        Span::styled("❯", accent())
    } else {
        Span::raw(" ")
    });
    spans.push(Span::raw("  ".repeat(depth)));
    spans.push(if node.is_folder() {
        Span::styled(if node.is_open() { "▼ " } else { "▶ " }, accent())
    } else {
        Span::raw("  ")
    });
    spans.push(match app.row_mark(row) {
        SelectionMark::Selected => Span::styled("● ", Style::default().fg(Color::Green)),
        SelectionMark::Partial => Span::styled("◐ ", Style::default().fg(Color::Yellow)),
        SelectionMark::Unselected if hovered => Span::styled("◯ ", accent()),
        SelectionMark::Unselected => Span::raw("◯ "),
    });

    let label = if node.is_folder() {
        format!("{}/", node.name)
    } else {
        node.name.clone()
    };
    spans.push(match role {
        RowRole::Hovered => Span::styled(label, accent()),
        RowRole::Sticky => Span::styled(
            label,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ),
        RowRole::Plain => Span::raw(label),
    });
    Line::from(spans)
}

fn draw_tree_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let budget = area.height.saturating_sub(2) as usize;
    let viewport = compute_viewport(app.rows(), app.cursor(), budget);

    let mut lines: Vec<Line> = Vec::with_capacity(viewport.height().max(1));
    for &row in &viewport.sticky {
        lines.push(tree_line(app, row, RowRole::Sticky));
    }
    for row in viewport.window() {
        let role = if row == app.cursor() {
            RowRole::Hovered
        } else {
            RowRole::Plain
        };
        lines.push(tree_line(app, row, role));
    }
    if app.rows().is_empty() {
        lines.push(Line::styled(
            format!("No tests match '{}'", app.query()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let title = format!(
        "Tests ({} of {} selected)",
        app.selection().len(),
        app.discovered().len()
    );
    let tree_paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(tree_paragraph, area);
}

fn draw_search_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let search_paragraph = Paragraph::new(Line::from(vec![
        Span::styled(SEARCH_PROMPT, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(app.query().to_string()),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(search_paragraph, area);

    let typed = (SEARCH_PROMPT.len() + app.query().chars().count()) as u16;
    let max_x = area.x + area.width.saturating_sub(2);
    f.set_cursor_position(((area.x + 1 + typed).min(max_x), area.y + 1));
}

/// Draws one frame. Reads `app` only.
pub(super) fn ui_frame(frame: &mut Frame, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_help_block(frame, chunks[0]);
    draw_tree_block(frame, app, chunks[1]);
    draw_search_block(frame, app, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionSet;
    use crate::tui::{Action, ScrollSettings};
    use ratatui::backend::TestBackend;
    use std::time::Instant;

    fn render(app: &TuiApp, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| ui_frame(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    fn app_for(paths: &[String]) -> TuiApp {
        TuiApp::new(paths.to_vec(), None, SelectionSet::new(), ScrollSettings::default())
    }

    #[test]
    fn renders_closed_folders_with_cursor_on_first() {
        let paths: Vec<String> = ["a/1.spec.ts", "a/2.spec.ts", "b/3.spec.ts"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let app = app_for(&paths);
        let lines = render(&app, 60, 16);

        let a_line = lines.iter().find(|l| l.contains("a/")).unwrap();
        assert!(a_line.contains('❯'));
        assert!(a_line.contains('▶'));
        let b_line = lines.iter().find(|l| l.contains("b/")).unwrap();
        assert!(!b_line.contains('❯'));
        assert!(lines.iter().any(|l| l.contains("0 of 3 selected")));
        assert!(lines.iter().any(|l| l.contains("Search:")));
    }

    #[test]
    fn selected_folder_shows_filled_marker() {
        let paths: Vec<String> = ["a/1.spec.ts", "b/3.spec.ts"].iter().map(|s| s.to_string()).collect();
        let mut app = app_for(&paths);
        app.apply(Action::Toggle, Instant::now());
        let lines = render(&app, 60, 16);
        let a_line = lines.iter().find(|l| l.contains("a/")).unwrap();
        assert!(a_line.contains('●'));
        assert!(lines.iter().any(|l| l.contains("1 of 2 selected")));
    }

    #[test]
    fn scrolled_view_pins_parent_folder() {
        let paths: Vec<String> = (0..40).map(|i| format!("d0/f{i:02}.ts")).collect();
        let mut app = app_for(&paths);
        let now = Instant::now();
        app.apply(Action::Expand, now);
        for _ in 0..30 {
            app.apply(Action::Down, now);
        }
        assert_eq!(app.cursor(), 30);

        // 4 header rows, then the list border, then the first list row.
        let lines = render(&app, 60, 19);
        assert!(lines[5].contains("d0/"));
        assert!(lines[5].contains('▼'));
        assert!(!lines[5].contains('❯'));

        let hovered: Vec<&String> = lines.iter().filter(|l| l.contains('❯')).collect();
        assert_eq!(hovered.len(), 1);
        assert!(hovered[0].contains("f29.ts"));
    }

    #[test]
    fn no_match_message_and_query_are_shown() {
        let paths = vec!["a/1.spec.ts".to_string()];
        let mut app = app_for(&paths);
        let now = Instant::now();
        for c in "zzz".chars() {
            app.apply(Action::Type(c), now);
        }
        let lines = render(&app, 60, 16);
        assert!(lines.iter().any(|l| l.contains("No tests match 'zzz'")));
        assert!(lines.iter().any(|l| l.contains("Search: zzz")));
    }
}
