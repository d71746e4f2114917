use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::ops::suggest::{SuggestionItem, SuggestionState, TriggerKind};
use crate::tui::app::App;
use crate::util::unicode;

/// Maximum number of visible entries in the dropdown
const MAX_VISIBLE: usize = 8;

/// Render the suggestion dropdown below `field_area`, starting at column `cursor_x`.
/// Flips above the field when there is no room below.
pub fn render_suggestions(frame: &mut Frame, app: &App, field_area: Rect, cursor_x: u16) {
    let (kind, items, selected) = match app.suggestions.state() {
        SuggestionState::Showing {
            kind,
            items,
            selected,
            ..
        } => (*kind, items.as_slice(), *selected),
        _ => return,
    };

    let bg = app.theme.background;
    let count = items.len().min(MAX_VISIBLE);

    // Widest entry plus marker and borders
    let max_width = items
        .iter()
        .take(MAX_VISIBLE)
        .map(|s| unicode::display_width(s.label()))
        .max()
        .unwrap_or(10)
        + 5;

    let term_area = frame.area();
    let popup_w = (max_width as u16).min(term_area.width).max(14);
    let popup_h = count as u16 + 2;

    let below = field_area.y + field_area.height;
    let y = if below + popup_h <= term_area.height {
        below
    } else {
        field_area.y.saturating_sub(popup_h)
    };
    let x = cursor_x.min(term_area.width.saturating_sub(popup_w));
    let popup_area = Rect::new(x, y, popup_w, popup_h.min(term_area.height));

    // Scroll window around selected item
    let scroll_start = if selected >= MAX_VISIBLE {
        selected - MAX_VISIBLE + 1
    } else {
        0
    };

    let inner_w = (popup_w as usize).saturating_sub(5);
    let mut lines: Vec<Line> = Vec::new();
    for (i, item) in items.iter().skip(scroll_start).take(MAX_VISIBLE).enumerate() {
        let is_selected = scroll_start + i == selected;
        let style = if is_selected {
            Style::default()
                .fg(app.theme.selection_bg)
                .bg(app.theme.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(item_color(app, item)).bg(bg)
        };

        let prefix = if is_selected { " \u{25B8} " } else { "   " };
        let label = unicode::truncate_to_width(item.label(), inner_w);
        let pad = inner_w.saturating_sub(unicode::display_width(&label));
        lines.push(Line::from(vec![
            Span::styled(prefix, style),
            Span::styled(format!("{}{}", label, " ".repeat(pad)), style),
        ]));
    }

    let title = match kind {
        TriggerKind::Issue => " issues ",
        TriggerKind::File => " files ",
    };

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, Style::default().fg(app.theme.dim).bg(bg)))
        .border_style(Style::default().fg(app.theme.primary).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines).block(block).style(Style::default().bg(bg));
    frame.render_widget(paragraph, popup_area);
}

fn item_color(app: &App, item: &SuggestionItem) -> ratatui::style::Color {
    match item {
        SuggestionItem::Issue { .. } => app.theme.text,
        SuggestionItem::File(_) => app.theme.accent,
    }
}
