use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::suggest::Field;
use crate::tui::app::App;
use crate::tui::text_field::TextField;

pub(super) fn handle_editor(app: &mut App, key: KeyEvent) {
    if app.suggestions.is_showing() && handle_suggestion_key(app, key) {
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let in_body = app.editor.as_ref().is_some_and(|e| e.field == Field::Body);

    match key.code {
        KeyCode::Esc => app.close_editor(),
        KeyCode::Tab | KeyCode::BackTab => app.switch_field(),
        // Shift+Enter needs keyboard enhancement; Alt+Enter and Ctrl+J work everywhere
        KeyCode::Enter if in_body && (shift || alt) => edit(app, |f| f.insert_char('\n')),
        KeyCode::Char('j') if ctrl && in_body => edit(app, |f| f.insert_char('\n')),
        KeyCode::Enter => app.save_editor(),
        KeyCode::Char('v') if ctrl => app.paste_clipboard_image(),
        KeyCode::Char('w') if ctrl => edit(app, |f| f.delete_word_back()),
        KeyCode::Char('a') if ctrl => move_cursor(app, |f| f.home()),
        KeyCode::Char('e') if ctrl => move_cursor(app, |f| f.end()),
        KeyCode::Char(c) if !ctrl => edit(app, |f| f.insert_char(c)),
        KeyCode::Backspace if alt || ctrl => edit(app, |f| f.delete_word_back()),
        KeyCode::Backspace => edit(app, |f| f.backspace()),
        KeyCode::Delete => edit(app, |f| f.delete()),
        KeyCode::Left if alt || ctrl => move_cursor(app, |f| f.word_left()),
        KeyCode::Right if alt || ctrl => move_cursor(app, |f| f.word_right()),
        KeyCode::Left => move_cursor(app, |f| f.move_left()),
        KeyCode::Right => move_cursor(app, |f| f.move_right()),
        KeyCode::Home => move_cursor(app, |f| f.home()),
        KeyCode::End => move_cursor(app, |f| f.end()),
        KeyCode::Up => move_cursor(app, |f| {
            f.move_up();
        }),
        KeyCode::Down => move_cursor(app, |f| {
            f.move_down();
        }),
        _ => {}
    }
}

/// Keys that drive a visible suggestion list. Returns false to let the key
/// fall through to normal editing.
fn handle_suggestion_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Up => app.suggestions.move_selection(-1),
        KeyCode::Down => app.suggestions.move_selection(1),
        KeyCode::Tab | KeyCode::Enter => {
            app.accept_suggestion();
        }
        KeyCode::Esc => app.suggestions.cancel(),
        _ => return false,
    }
    true
}

/// Mutate the active field, then re-run trigger detection
fn edit(app: &mut App, f: impl FnOnce(&mut TextField)) {
    if let Some(editor) = &mut app.editor {
        f(editor.active_mut());
        app.editor_input_changed();
    }
}

fn move_cursor(app: &mut App, f: impl FnOnce(&mut TextField)) {
    if let Some(editor) = &mut app.editor {
        f(editor.active_mut());
    }
}
