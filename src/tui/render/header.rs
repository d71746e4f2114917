use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;

use super::split_line;

/// Title, remote label and issue counts, with a separator line below
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let bg = app.theme.background;
    let fill = Style::default().bg(bg);
    let muted = Style::default().fg(app.theme.muted).bg(bg);

    let mut left = vec![
        Span::styled(" ", fill),
        Span::styled(
            "openissue",
            Style::default()
                .fg(app.theme.primary)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ", fill),
        Span::styled(app.session.remote_label(), muted),
    ];
    if app.syncing {
        left.push(Span::styled(
            "  syncing\u{2026}",
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let stats = app.stats();
    let right = vec![
        Span::styled(format!("Total {}", stats.total), muted),
        Span::styled("  ", fill),
        Span::styled(
            format!("Open {}", stats.open),
            Style::default().fg(app.theme.primary).bg(bg),
        ),
        Span::styled("  ", fill),
        Span::styled(format!("Closed {}", stats.closed), muted),
        Span::styled("  ", fill),
        Span::styled(format!("Synced {}", stats.synced), muted),
        Span::styled("  ", fill),
        Span::styled(format!("Local {}", stats.local()), muted),
        Span::styled(" ", fill),
    ];

    let line = Line::from(split_line(left, right, area.width as usize, fill));
    frame.render_widget(Paragraph::new(line).style(fill), chunks[0]);

    let separator = Line::from(Span::styled(
        "\u{2500}".repeat(area.width as usize),
        Style::default().fg(app.theme.border).bg(bg),
    ));
    frame.render_widget(Paragraph::new(separator).style(fill), chunks[1]);
}
