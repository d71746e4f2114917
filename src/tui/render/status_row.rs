use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::tui::input::key_hints;
use crate::util::unicode;

use super::{spans_width, split_line};

/// Render the status row (bottom of screen): last message left, key hints right
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let fill = Style::default().bg(bg);

    let left = match &app.message {
        Some(message) => vec![
            Span::styled(" ", fill),
            Span::styled(message.clone(), Style::default().fg(app.theme.primary).bg(bg)),
        ],
        None => Vec::new(),
    };
    let width = area.width as usize;
    // Hints yield to the message: cut to the room left after it plus a gap
    let room = width.saturating_sub(spans_width(&left) + 2);
    let right = if app.show_key_hints && room > 1 {
        vec![
            Span::styled(
                unicode::truncate_to_width(key_hints(app), room - 1),
                Style::default().fg(app.theme.dim).bg(bg),
            ),
            Span::styled(" ", fill),
        ]
    } else {
        Vec::new()
    };

    let line = Line::from(split_line(left, right, width, fill));
    frame.render_widget(Paragraph::new(line).style(fill), area);
}
