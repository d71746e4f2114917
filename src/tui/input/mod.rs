mod agent;
mod editor;
mod list;
mod read;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, View};

use agent::handle_agents;
use editor::handle_editor;
use list::handle_list;
use read::handle_read;

/// Handle a key event in the current view
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.view {
        View::List => handle_list(app, key),
        View::Read => handle_read(app, key),
        View::Edit => handle_editor(app, key),
        View::Agents => handle_agents(app, key),
    }
}

/// Handle a bracketed paste (the terminal sends pasted text as a single string)
pub fn handle_paste(app: &mut App, text: &str) {
    app.paste(text);
}

/// Keys shown in the status row for the current view
pub fn key_hints(app: &App) -> &'static str {
    match app.view {
        View::List => "n: new  j/k: nav  space: view  enter/e: edit  x: close  a: agents  q: quit",
        View::Read => "esc/q: back",
        View::Edit => "tab: navigate  enter: save  esc: cancel",
        View::Agents if app.agents.create.is_some() => "up/down: link issue  enter: create  esc: cancel",
        View::Agents if app.agents.log.is_some() => "j/k: scroll  esc/q: close",
        View::Agents => "j/k: nav  []: tab  n: new  r: refresh  enter: view  esc/q: back",
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    pub fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn ch(c: char) -> KeyEvent {
        press(KeyCode::Char(c))
    }

    pub fn with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }
}
