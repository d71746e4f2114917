pub mod agent_view;
pub mod editor;
pub mod header;
pub mod issue_list;
pub mod read_view;
pub mod status_row;
pub mod suggestions;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;

use crate::util::unicode;

use super::app::{App, View};

/// Main render function: dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header (2 rows) | content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title + separator
            Constraint::Min(1),    // content area
            Constraint::Length(1), // status row
        ])
        .split(area);

    header::render_header(frame, app, chunks[0]);

    match app.view {
        View::List => issue_list::render_issue_list(frame, app, chunks[1]),
        View::Read => read_view::render_read_view(frame, app, chunks[1]),
        View::Edit => editor::render_editor(frame, app, chunks[1]),
        View::Agents => agent_view::render_agent_view(frame, app, chunks[1]),
    }

    status_row::render_status_row(frame, app, chunks[2]);
}

/// `left` flush left and `right` flush right, padded with `fill` style.
/// `right` is dropped when both do not fit.
pub(super) fn split_line<'a>(
    mut left: Vec<Span<'a>>,
    right: Vec<Span<'a>>,
    width: usize,
    fill: Style,
) -> Vec<Span<'a>> {
    let left_w = spans_width(&left);
    let right_w = spans_width(&right);
    if left_w + right_w < width {
        left.push(Span::styled(" ".repeat(width - left_w - right_w), fill));
        left.extend(right);
    }
    left
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

pub(super) fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

/// Adjust `scroll` so that `cursor` is inside a window of `height` rows
pub(super) fn scroll_to_cursor(scroll: usize, cursor: usize, height: usize) -> usize {
    if height == 0 {
        return scroll;
    }
    if cursor < scroll {
        cursor
    } else if cursor >= scroll + height {
        cursor + 1 - height
    } else {
        scroll
    }
}
