use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;

pub(super) fn handle_read(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char(' ') => app.close_read(),
        KeyCode::Char('e') => {
            let id = app.read.as_ref().map(|r| r.issue_id.clone());
            app.open_editor(id);
        }
        KeyCode::Up | KeyCode::Char('k') => app.scroll_read(-1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_read(1),
        KeyCode::PageUp => app.scroll_read(-10),
        KeyCode::PageDown => app.scroll_read(10),
        KeyCode::Home | KeyCode::Char('g') => {
            if let Some(read) = &mut app.read {
                read.scroll = 0;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crate::ops::sync::{self, IssueDraft};
    use crate::tui::app::View;
    use crate::tui::input::handle_key;
    use crate::tui::input::testing::*;
    use crate::tui::render::test_helpers::app_in_temp_project;
    use crossterm::event::KeyCode;

    #[test]
    fn scroll_stops_at_top_and_escape_returns() {
        let (_tmp, mut app) = app_in_temp_project();
        sync::create_local(&mut app.session.issues, IssueDraft::new("a", "body")).unwrap();
        handle_key(&mut app, ch(' '));
        handle_key(&mut app, press(KeyCode::Up));
        assert_eq!(app.read.as_ref().unwrap().scroll, 0);
        handle_key(&mut app, ch('j'));
        assert_eq!(app.read.as_ref().unwrap().scroll, 1);
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.view, View::List);
        assert!(app.read.is_none());
    }

    #[test]
    fn e_edits_the_issue_being_read() {
        let (_tmp, mut app) = app_in_temp_project();
        let issue = sync::create_local(&mut app.session.issues, IssueDraft::new("a", "")).unwrap();
        handle_key(&mut app, ch(' '));
        handle_key(&mut app, ch('e'));
        assert_eq!(app.view, View::Edit);
        assert_eq!(
            app.editor.as_ref().unwrap().editing_id.as_deref(),
            Some(issue.id.as_str())
        );
    }
}
