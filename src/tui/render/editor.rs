use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ops::suggest::Field;
use crate::tui::app::{App, EditorState};
use crate::tui::text_field::TextField;
use crate::util::unicode;

use super::suggestions::render_suggestions;

const BODY_PLACEHOLDER: &str = "Description (markdown supported)";

/// Render the title/body form, the terminal cursor and any suggestion dropdown
pub fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let Some(editor) = app.editor.as_ref() else {
        return;
    };
    let bg = app.theme.background;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let heading = match &editor.editing_id {
        Some(id) => {
            let reference = app
                .session
                .issues
                .get(id)
                .map(|i| i.reference_token())
                .unwrap_or_else(|| format!("#{}", id));
            format!(" Edit todo {} ", reference)
        }
        None => " New todo ".to_string(),
    };
    let title_block = field_block(app, editor, Field::Title, heading);
    let title_inner = title_block.inner(chunks[0]);
    let body_block = field_block(app, editor, Field::Body, " Description ".to_string());
    let body_inner = body_block.inner(chunks[1]);

    let text_style = Style::default().fg(app.theme.text_bright).bg(bg);

    let (_, title_col) = editor.title.cursor_line_col();
    let title_offset = h_offset(title_col, title_inner.width as usize);
    let title_line = Line::from(Span::styled(
        visible_slice(editor.title.text(), title_offset, title_inner.width as usize),
        text_style,
    ));
    frame.render_widget(
        Paragraph::new(title_line).block(title_block).style(Style::default().bg(bg)),
        chunks[0],
    );

    let (body_row, body_col) = editor.body.cursor_line_col();
    let height = body_inner.height as usize;
    let v_offset = (body_row + 1).saturating_sub(height);
    let b_offset = h_offset(body_col, body_inner.width as usize);
    let body_lines: Vec<Line> = if editor.body.text().is_empty() {
        vec![Line::from(Span::styled(
            BODY_PLACEHOLDER,
            Style::default().fg(app.theme.dim).bg(bg),
        ))]
    } else {
        body_text_lines(&editor.body)
            .skip(v_offset)
            .take(height)
            .map(|l| {
                Line::from(Span::styled(
                    visible_slice(l, b_offset, body_inner.width as usize),
                    Style::default().fg(app.theme.text).bg(bg),
                ))
            })
            .collect()
    };
    frame.render_widget(
        Paragraph::new(body_lines).block(body_block).style(Style::default().bg(bg)),
        chunks[1],
    );

    // Cursor and dropdown follow the active field
    let (anchor, cursor) = match editor.field {
        Field::Title => {
            let x = title_inner.x + (title_col - title_offset) as u16;
            (chunks[0], (x, title_inner.y))
        }
        Field::Body => {
            let x = body_inner.x + (body_col - b_offset) as u16;
            let y = body_inner.y + (body_row - v_offset) as u16;
            (Rect::new(body_inner.x, y, body_inner.width, 1), (x, y))
        }
    };
    frame.set_cursor_position(cursor);
    render_suggestions(frame, app, anchor, cursor.0);
}

fn field_block<'a>(app: &App, editor: &EditorState, field: Field, title: String) -> Block<'a> {
    let bg = app.theme.background;
    let active = editor.field == field;
    let (border, title_style) = if active {
        (
            app.theme.primary,
            Style::default()
                .fg(app.theme.primary)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (app.theme.border, Style::default().fg(app.theme.muted).bg(bg))
    };
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, title_style))
        .border_style(Style::default().fg(border).bg(bg))
        .style(Style::default().bg(bg))
}

/// `split('\n')` keeps a trailing empty line so the cursor after a newline has a row
fn body_text_lines(field: &TextField) -> impl Iterator<Item = &str> {
    field.text().split('\n')
}

/// First display column shown so that `col` stays inside `width` cells
fn h_offset(col: usize, width: usize) -> usize {
    col.saturating_sub(width.saturating_sub(1))
}

/// The part of `line` between display columns `offset` and `offset + width`
fn visible_slice(line: &str, offset: usize, width: usize) -> String {
    let start = unicode::display_col_to_byte_offset(line, offset);
    let end = unicode::display_col_to_byte_offset(line, offset + width);
    line[start..end.max(start)].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::sync::{self, IssueDraft};
    use crate::tui::render::test_helpers::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn new_form_shows_placeholder() {
        let (_tmp, mut app) = app_in_temp_project();
        app.open_editor(None);
        let output = render_to_string(TERM_W, 12, |frame, area| {
            render_editor(frame, &app, area);
        });
        assert!(output.contains(" New todo "));
        assert!(output.contains("Description (markdown supported)"));
    }

    #[test]
    fn edit_form_names_the_issue() {
        let (_tmp, mut app) = app_in_temp_project();
        let issue =
            sync::create_local(&mut app.session.issues, IssueDraft::new("Old title", "a\nb")).unwrap();
        app.edit_selected();
        let output = render_to_string(TERM_W, 12, |frame, area| {
            render_editor(frame, &app, area);
        });
        assert!(output.contains(&format!(" Edit todo {} ", issue.reference_token())));
        assert!(output.contains("Old title"));
        assert!(output.contains("\u{2502}a"));
        assert!(output.contains("\u{2502}b"));
    }

    #[test]
    fn cursor_tracks_active_field() {
        let (_tmp, mut app) = app_in_temp_project();
        app.open_editor(None);
        app.editor.as_mut().unwrap().title.insert_str("abc");

        let mut terminal = Terminal::new(TestBackend::new(TERM_W, 12)).unwrap();
        terminal
            .draw(|frame| render_editor(frame, &app, frame.area()))
            .unwrap();
        // margin 1 + border 1 + three characters
        assert_eq!(terminal.get_cursor_position().unwrap(), (5, 1).into());

        app.switch_field();
        app.editor.as_mut().unwrap().body.insert_str("x\nyz");
        terminal
            .draw(|frame| render_editor(frame, &app, frame.area()))
            .unwrap();
        assert_eq!(terminal.get_cursor_position().unwrap(), (4, 5).into());
    }

    #[test]
    fn long_title_scrolls_to_cursor() {
        assert_eq!(h_offset(3, 10), 0);
        assert_eq!(h_offset(15, 10), 6);
        assert_eq!(visible_slice("abcdefghij", 6, 3), "ghi");
        assert_eq!(visible_slice("abc", 6, 3), "");
    }
}
