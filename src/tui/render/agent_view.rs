use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::model::agent::{AgentTask, AgentTaskStatus};
use crate::tui::app::{AgentCreateState, AgentLogState, AgentTab, App};
use crate::util::unicode;

use super::{centered_rect_fixed, scroll_to_cursor, split_line};

/// Render the agent task dashboard and whichever dialog is open over it
pub fn render_agent_view(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // stats
            Constraint::Length(1), // separator
            Constraint::Min(1),    // list | details
        ])
        .split(area);

    render_tabs(frame, app, chunks[0]);
    render_stats(frame, app, chunks[1]);
    let separator = Line::from(Span::styled(
        "\u{2500}".repeat(area.width as usize),
        Style::default().fg(app.theme.border).bg(app.theme.background),
    ));
    frame.render_widget(Paragraph::new(separator), chunks[2]);

    let tasks = app.visible_agent_tasks();
    if tasks.is_empty() {
        let empty = Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled(
                "  No agent tasks found. Press 'n' to create one.",
                Style::default().fg(app.theme.dim).bg(app.theme.background),
            )),
        ])
        .style(Style::default().bg(app.theme.background));
        frame.render_widget(empty, chunks[3]);
    } else {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[3]);
        render_task_list(frame, app, &tasks, body[0]);
        if let Some(task) = tasks.get(app.agents.cursor) {
            render_details(frame, app, task, body[1]);
        }
    }

    if let Some(create) = &app.agents.create {
        render_create_dialog(frame, app, create, area);
    } else if let Some(log) = &app.agents.log {
        render_log_overlay(frame, app, log, area);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let fill = Style::default().bg(bg);
    let mut left = vec![Span::styled(" ", fill)];
    for tab in AgentTab::ALL {
        let style = if tab == app.agents.tab {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(app.theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.muted).bg(bg)
        };
        left.push(Span::styled(format!(" {} ", tab.label()), style));
        left.push(Span::styled(" ", fill));
    }
    let right = if app.agents.refreshing {
        vec![
            Span::styled("refreshing\u{2026}", Style::default().fg(app.theme.dim).bg(bg)),
            Span::styled(" ", fill),
        ]
    } else {
        Vec::new()
    };
    let line = Line::from(split_line(left, right, area.width as usize, fill));
    frame.render_widget(Paragraph::new(line).style(fill), area);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let tasks = app.session.agent_tasks.records();
    let count = |tab: AgentTab| tasks.iter().filter(|t| tab.includes(t.status)).count();
    let muted = Style::default().fg(app.theme.muted).bg(bg);
    let line = Line::from(vec![
        Span::styled(format!(" Total: {}", tasks.len()), muted),
        Span::styled(
            format!("  Active: {}", count(AgentTab::Active)),
            Style::default().fg(app.theme.primary).bg(bg),
        ),
        Span::styled(
            format!("  Done: {}", count(AgentTab::Done)),
            Style::default().fg(app.theme.green).bg(bg),
        ),
        Span::styled(
            format!("  Failed: {}", count(AgentTab::Failed)),
            Style::default().fg(app.theme.red).bg(bg),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}

fn render_task_list(frame: &mut Frame, app: &App, tasks: &[&AgentTask], area: Rect) {
    let bg = app.theme.background;
    let height = area.height as usize;
    let width = area.width as usize;
    let scroll = scroll_to_cursor(0, app.agents.cursor, height);

    let lines: Vec<Line> = tasks
        .iter()
        .enumerate()
        .skip(scroll)
        .take(height)
        .map(|(i, task)| {
            let selected = i == app.agents.cursor;
            let (row_bg, fg, icon_fg) = if selected {
                (app.theme.primary, app.theme.selection_bg, app.theme.selection_bg)
            } else {
                (bg, app.theme.text, app.theme.agent_status_color(task.status))
            };
            let when = task.created_at.format("%m-%d %H:%M").to_string();
            let title_w = width.saturating_sub(when.len() + 6);
            let title = unicode::truncate_to_width(&task.title, title_w);
            let pad = title_w.saturating_sub(unicode::display_width(&title));
            Line::from(vec![
                Span::styled(
                    format!(" {} ", task.status.icon()),
                    Style::default().fg(icon_fg).bg(row_bg),
                ),
                Span::styled(
                    format!("{}{} ", title, " ".repeat(pad)),
                    Style::default().fg(fg).bg(row_bg),
                ),
                Span::styled(
                    format!("{} ", when),
                    Style::default()
                        .fg(if selected { fg } else { app.theme.dim })
                        .bg(row_bg),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

fn status_text(status: AgentTaskStatus) -> &'static str {
    match status {
        AgentTaskStatus::Draft => "Draft",
        AgentTaskStatus::InProgress => "In progress",
        AgentTaskStatus::Completed => "Completed",
        AgentTaskStatus::Failed => "Failed",
    }
}

fn render_details(frame: &mut Frame, app: &App, task: &AgentTask, area: Rect) {
    let bg = app.theme.background;
    let label = Style::default().fg(app.theme.dim).bg(bg);
    let value = Style::default().fg(app.theme.text).bg(bg);
    let field = |name: &'static str, v: String| {
        Line::from(vec![Span::styled(format!("{:<14}", name), label), Span::styled(v, value)])
    };

    let pull_request = task
        .pull_request_number
        .map_or_else(|| "none".to_string(), |n| format!("#{}", n));
    let updated = task
        .updated_at
        .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());

    let lines = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled(format!("{:<14}", "Status:"), label),
            Span::styled(
                format!("{} {}", task.status.icon(), status_text(task.status)),
                Style::default().fg(app.theme.agent_status_color(task.status)).bg(bg),
            ),
        ]),
        field("Pull Request:", pull_request),
        field("Repository:", task.repository.clone()),
        field("Created:", task.created_at.format("%Y-%m-%d %H:%M").to_string()),
        field("Updated:", updated),
        Line::default(),
        Line::from(Span::styled("Press Enter to view logs and details", label)),
    ];

    let block = Block::default()
        .title(Span::styled(" Details ", Style::default().fg(app.theme.muted).bg(bg)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border).bg(bg))
        .style(Style::default().bg(bg));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn render_create_dialog(frame: &mut Frame, app: &App, create: &AgentCreateState, area: Rect) {
    let bg = app.theme.background;
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let text = Style::default().fg(app.theme.text).bg(bg);
    let popup = centered_rect_fixed(64, 11, area);

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(Span::styled(
            " Create Agent Task ",
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.primary).bg(bg))
        .style(Style::default().bg(bg));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let field_w = inner.width.saturating_sub(2) as usize;
    let (_, col) = create.description.cursor_line_col();
    let offset = col.saturating_sub(field_w.saturating_sub(1));
    let description = create.description.text();
    let start = unicode::display_col_to_byte_offset(description, offset);
    let end = unicode::display_col_to_byte_offset(description, offset + field_w);

    let linkable = app.linkable_issues();
    let link = match create.linked.checked_sub(1).and_then(|i| linkable.get(i)) {
        Some(issue) => format!("{} {}", issue.reference_token(), issue.title),
        None => "No issue".to_string(),
    };
    let link = unicode::truncate_to_width(&link, field_w.saturating_sub(4));

    let lines = vec![
        Line::from(Span::styled(" Describe what you want the agent to do:", text)),
        Line::from(vec![
            Span::styled(" ", text),
            Span::styled(
                description[start..end.max(start)].to_string(),
                Style::default().fg(app.theme.text_bright).bg(app.theme.selection_bg),
            ),
        ]),
        Line::default(),
        Line::from(Span::styled(" Link to an issue (optional):", text)),
        Line::from(vec![
            Span::styled(" \u{2039} ", dim),
            Span::styled(link, Style::default().fg(app.theme.accent).bg(bg)),
            Span::styled(" \u{203A}", dim),
        ]),
        Line::default(),
        Line::from(Span::styled(" Enter: Create | Esc: Cancel", dim)),
    ];
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);
    frame.set_cursor_position((inner.x + 1 + (col - offset) as u16, inner.y + 1));
}

fn render_log_overlay(frame: &mut Frame, app: &App, log: &AgentLogState, area: Rect) {
    let bg = app.theme.background;

    // Size: centered, taking most of the screen
    let margin_x = 4u16.min(area.width / 8);
    let margin_y = 2u16.min(area.height / 8);
    let popup = Rect::new(
        area.x + margin_x,
        area.y + margin_y,
        area.width.saturating_sub(margin_x * 2),
        area.height.saturating_sub(margin_y * 2),
    );
    frame.render_widget(Clear, popup);

    let title = app
        .session
        .agent_tasks
        .get(&log.id)
        .map_or_else(|| log.id.clone(), |t| t.title.clone());
    let block = Block::default()
        .title(Span::styled(
            format!(" Log: {} ", title),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let lines: Vec<Line> = match &log.content {
        None => vec![Line::from(Span::styled(
            "Loading...",
            Style::default().fg(app.theme.dim).bg(bg),
        ))],
        Some(content) => content
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(app.theme.text).bg(bg))))
            .collect(),
    };
    let scroll = log.scroll.min(lines.len().saturating_sub(1));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0))
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::sync;
    use crate::tui::render::test_helpers::*;
    use chrono::{TimeZone, Utc};

    fn task(id: &str, title: &str, status: AgentTaskStatus, minute: u32, pr: Option<u64>) -> AgentTask {
        AgentTask {
            id: id.into(),
            title: title.into(),
            pull_request_number: pr,
            repository: "octo/repo".into(),
            status,
            created_at: Utc.with_ymd_and_hms(2025, 5, 14, 10, minute, 0).unwrap(),
            updated_at: None,
        }
    }

    fn seeded() -> (tempfile::TempDir, App) {
        let (tmp, mut app) = app_in_temp_project();
        sync::merge_agent_tasks(
            &mut app.session.agent_tasks,
            vec![
                task("1", "Add tests", AgentTaskStatus::InProgress, 40, Some(12)),
                task("2", "Fix docs", AgentTaskStatus::Completed, 30, None),
            ],
        )
        .unwrap();
        app.view = crate::tui::app::View::Agents;
        (tmp, app)
    }

    #[test]
    fn empty_dashboard_explains_how_to_start() {
        let (_tmp, app) = app_in_temp_project();
        let output = render_to_string(TERM_W, 10, |frame, area| {
            render_agent_view(frame, &app, area);
        });
        assert!(output.contains(" All   Active   Done   Failed"));
        assert!(output.contains("Total: 0  Active: 0  Done: 0  Failed: 0"));
        assert!(output.contains("No agent tasks found. Press 'n' to create one."));
    }

    #[test]
    fn details_follow_the_cursor() {
        let (_tmp, app) = seeded();
        let output = render_to_string(TERM_W, 16, |frame, area| {
            render_agent_view(frame, &app, area);
        });
        assert!(output.contains("Total: 2  Active: 1  Done: 1  Failed: 0"));
        assert!(output.contains("Add tests"));
        assert!(output.contains("Pull Request: #12"));
        assert!(output.contains("Repository:   octo/repo"));
        assert!(output.contains("Press Enter to view logs"));
    }

    #[test]
    fn create_dialog_lists_link_choice() {
        let (_tmp, mut app) = seeded();
        app.open_agent_create();
        app.agents
            .create
            .as_mut()
            .unwrap()
            .description
            .insert_str("write docs");
        let output = render_to_string(TERM_W, 16, |frame, area| {
            render_agent_view(frame, &app, area);
        });
        assert!(output.contains("Create Agent Task"));
        assert!(output.contains("Describe what you want the agent to do:"));
        assert!(output.contains(" write docs"));
        assert!(output.contains("\u{2039} No issue \u{203A}"));
        assert!(output.contains("Enter: Create | Esc: Cancel"));
    }

    #[test]
    fn log_overlay_shows_loading_then_content() {
        let (_tmp, mut app) = seeded();
        app.agents.log = Some(AgentLogState {
            id: "1".into(),
            content: None,
            scroll: 0,
        });
        let output = render_to_string(TERM_W, 16, |frame, area| {
            render_agent_view(frame, &app, area);
        });
        assert!(output.contains(" Log: Add tests "));
        assert!(output.contains("Loading..."));

        app.agents.log.as_mut().unwrap().content = Some("step 1\nstep 2".into());
        let output = render_to_string(TERM_W, 16, |frame, area| {
            render_agent_view(frame, &app, area);
        });
        assert!(output.contains("step 2"));
    }
}
