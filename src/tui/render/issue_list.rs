use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::issue::Issue;
use crate::ops::suggest::issue_label;
use crate::tui::app::App;
use crate::util::unicode;

use super::scroll_to_cursor;

/// Render the issue list, keeping the cursor row on screen
pub fn render_issue_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;

    if app.issues().is_empty() {
        let empty = Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled(
                "  No todos yet. Press 'n' to create one.",
                Style::default().fg(app.theme.dim).bg(bg),
            )),
        ])
        .style(Style::default().bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let height = area.height as usize;
    app.scroll = scroll_to_cursor(app.scroll, app.cursor, height);
    let app: &App = app;

    let width = area.width as usize;
    let lines: Vec<Line> = app
        .issues()
        .iter()
        .enumerate()
        .skip(app.scroll)
        .take(height)
        .map(|(i, issue)| issue_row(app, issue, i == app.cursor, width))
        .collect();

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

fn issue_row<'a>(app: &App, issue: &Issue, selected: bool, width: usize) -> Line<'a> {
    let bg = if selected {
        app.theme.primary
    } else {
        app.theme.background
    };
    let label_style = if selected {
        Style::default()
            .fg(app.theme.selection_bg)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(app.theme.issue_status_color(issue.status))
            .bg(bg)
    };

    let mut spans = vec![Span::styled(issue_label(issue), label_style)];
    if !issue.labels.is_empty() {
        let labels: Vec<&str> = issue.labels.iter().map(String::as_str).collect();
        let fg = if selected {
            app.theme.selection_bg
        } else {
            app.theme.accent
        };
        spans.push(Span::styled(
            format!("({}) ", labels.join(", ")),
            Style::default().fg(fg).bg(bg),
        ));
    }

    let used: usize = spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum();
    if selected && used < width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
    }
    Line::from(spans)
}
