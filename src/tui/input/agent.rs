use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;

pub(super) fn handle_agents(app: &mut App, key: KeyEvent) {
    if app.agents.create.is_some() {
        handle_create_dialog(app, key);
        return;
    }
    if app.agents.log.is_some() {
        handle_log(app, key);
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_agents(),
        KeyCode::Up | KeyCode::Char('k') => app.move_agent_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_agent_cursor(1),
        KeyCode::Left | KeyCode::Char('[') => app.set_agent_tab(app.agents.tab.prev()),
        KeyCode::Right | KeyCode::Char(']') => app.set_agent_tab(app.agents.tab.next()),
        KeyCode::Char('n') => app.open_agent_create(),
        KeyCode::Char('r') => app.refresh_agents(),
        KeyCode::Enter => app.view_selected_agent_log(),
        _ => {}
    }
}

fn handle_create_dialog(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.agents.create = None,
        KeyCode::Enter => app.submit_agent_create(),
        KeyCode::Up => app.move_agent_link(-1),
        KeyCode::Down => app.move_agent_link(1),
        _ => {
            let Some(create) = &mut app.agents.create else {
                return;
            };
            let field = &mut create.description;
            match key.code {
                KeyCode::Char('w') if ctrl => field.delete_word_back(),
                KeyCode::Char(c) if !ctrl => field.insert_char(c),
                KeyCode::Backspace => field.backspace(),
                KeyCode::Delete => field.delete(),
                KeyCode::Left => field.move_left(),
                KeyCode::Right => field.move_right(),
                KeyCode::Home => field.home(),
                KeyCode::End => field.end(),
                _ => {}
            }
        }
    }
}

fn handle_log(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
        app.agents.log = None;
        return;
    }
    let Some(log) = &mut app.agents.log else {
        return;
    };
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => log.scroll = log.scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => log.scroll += 1,
        KeyCode::PageUp => log.scroll = log.scroll.saturating_sub(10),
        KeyCode::PageDown => log.scroll += 10,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crate::model::agent::{AgentTask, AgentTaskStatus};
    use crate::ops::sync;
    use crate::tui::app::{AgentTab, App, View};
    use crate::tui::input::handle_key;
    use crate::tui::input::testing::*;
    use crate::tui::render::test_helpers::app_in_temp_project;
    use chrono::{TimeZone, Utc};
    use crossterm::event::KeyCode;

    fn task(id: &str, status: AgentTaskStatus, minute: u32) -> AgentTask {
        AgentTask {
            id: id.into(),
            title: format!("Task {}", id),
            pull_request_number: None,
            repository: "octo/repo".into(),
            status,
            created_at: Utc.with_ymd_and_hms(2025, 5, 14, 10, minute, 0).unwrap(),
            updated_at: None,
        }
    }

    fn agent_app() -> (tempfile::TempDir, App) {
        let (tmp, mut app) = app_in_temp_project();
        sync::merge_agent_tasks(
            &mut app.session.agent_tasks,
            vec![
                task("a", AgentTaskStatus::InProgress, 1),
                task("b", AgentTaskStatus::Completed, 2),
                task("c", AgentTaskStatus::Failed, 3),
            ],
        )
        .unwrap();
        handle_key(&mut app, ch('a'));
        (tmp, app)
    }

    #[test]
    fn tabs_filter_newest_first() {
        let (_tmp, mut app) = agent_app();
        assert_eq!(app.view, View::Agents);
        let ids: Vec<&str> = app.visible_agent_tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        handle_key(&mut app, ch(']'));
        assert_eq!(app.agents.tab, AgentTab::Active);
        let ids: Vec<&str> = app.visible_agent_tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);

        handle_key(&mut app, press(KeyCode::Left));
        handle_key(&mut app, press(KeyCode::Left));
        assert_eq!(app.agents.tab, AgentTab::Failed);
    }

    #[test]
    fn create_dialog_collects_description() {
        let (_tmp, mut app) = agent_app();
        handle_key(&mut app, ch('n'));
        for c in "add tests".chars() {
            handle_key(&mut app, ch(c));
        }
        // q is text here, not "back"
        handle_key(&mut app, ch('q'));
        handle_key(&mut app, press(KeyCode::Backspace));
        assert_eq!(
            app.agents.create.as_ref().unwrap().description.text(),
            "add tests"
        );
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(app.agents.create.is_none());
        assert_eq!(app.view, View::Agents);
    }

    #[test]
    fn blank_description_is_not_submitted() {
        let (_tmp, mut app) = agent_app();
        handle_key(&mut app, ch('n'));
        handle_key(&mut app, press(KeyCode::Enter));
        assert!(app.agents.create.is_some());
        assert_eq!(app.jobs.in_flight(), 0);
    }

    #[test]
    fn escape_returns_to_list() {
        let (_tmp, mut app) = agent_app();
        handle_key(&mut app, ch('j'));
        assert_eq!(app.agents.cursor, 1);
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.view, View::List);
    }
}
