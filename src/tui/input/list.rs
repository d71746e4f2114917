use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;

pub(super) fn handle_list(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('n') => app.open_editor(None),
        KeyCode::Char('e') | KeyCode::Enter => app.edit_selected(),
        KeyCode::Char(' ') => app.open_read(),
        KeyCode::Char('x') => app.toggle_selected(),
        KeyCode::Char('a') => app.open_agents(),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
        KeyCode::PageUp => app.move_cursor(-10),
        KeyCode::PageDown => app.move_cursor(10),
        KeyCode::Home | KeyCode::Char('g') => app.jump_to(0),
        KeyCode::End | KeyCode::Char('G') => app.jump_to(usize::MAX),
        _ => {}
    }
}
