use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::model::comment::Comment;
use crate::model::issue::Issue;
use crate::tui::app::{App, CommentsState};
use crate::tui::theme::Theme;

/// Render the read-only view of one issue: body, referenced files, comments
pub fn render_read_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let Some(issue) = app.read_issue() else {
        let empty = Paragraph::new(" Issue not found")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    };
    let Some(read) = app.read.as_ref() else {
        return;
    };

    let mut lines = issue_lines(&app.theme, issue);
    lines.extend(file_lines(&app.theme, &read.excerpts));
    lines.extend(comment_lines(&app.theme, &read.comments));

    // Keep at least the last line on screen
    let max_scroll = lines.len().saturating_sub(1);
    let scroll = read.scroll.min(max_scroll);
    if let Some(read) = &mut app.read {
        read.scroll = scroll;
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0))
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn issue_lines(theme: &Theme, issue: &Issue) -> Vec<Line<'static>> {
    let bg = theme.background;
    let dim = Style::default().fg(theme.dim).bg(bg);
    let mut lines = vec![Line::default()];

    lines.push(Line::from(vec![
        Span::styled(
            format!(" {} ", issue.status.checkbox()),
            Style::default().fg(theme.issue_status_color(issue.status)).bg(bg),
        ),
        Span::styled(
            issue.title.clone(),
            Style::default()
                .fg(theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
    ]));

    let mut meta = vec![
        Span::styled(" ", dim),
        Span::styled(issue.reference_token(), Style::default().fg(theme.accent).bg(bg)),
        Span::styled(format!(" \u{00B7} {}", issue.status), dim),
    ];
    if let Some(remote) = issue.remote {
        meta.push(Span::styled(
            format!(" \u{00B7} {} #{}", remote.provider, remote.number),
            dim,
        ));
    }
    meta.push(Span::styled(
        format!(" \u{00B7} created {}", issue.created_at.format("%Y-%m-%d")),
        dim,
    ));
    if !issue.labels.is_empty() {
        let labels: Vec<&str> = issue.labels.iter().map(String::as_str).collect();
        meta.push(Span::styled(format!(" \u{00B7} {}", labels.join(", ")), dim));
    }
    lines.push(Line::from(meta));
    lines.push(Line::default());

    if issue.body.trim().is_empty() {
        lines.push(Line::from(Span::styled(" No description", dim)));
    } else {
        let text = Style::default().fg(theme.text).bg(bg);
        for line in issue.body.lines() {
            lines.push(Line::from(Span::styled(format!(" {}", line), text)));
        }
    }
    lines
}

fn file_lines(theme: &Theme, excerpts: &[(String, Option<String>)]) -> Vec<Line<'static>> {
    if excerpts.is_empty() {
        return Vec::new();
    }
    let bg = theme.background;
    let dim = Style::default().fg(theme.dim).bg(bg);
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(" \u{2500}\u{2500}\u{2500} Files \u{2500}\u{2500}\u{2500}", dim)),
    ];
    for (path, content) in excerpts {
        lines.push(Line::from(Span::styled(
            format!(" @{}", path),
            Style::default().fg(theme.accent).bg(bg),
        )));
        match content {
            Some(content) => {
                let text = Style::default().fg(theme.muted).bg(bg);
                for line in content.lines() {
                    lines.push(Line::from(vec![
                        Span::styled("   \u{2502} ", dim),
                        Span::styled(line.to_string(), text),
                    ]));
                }
            }
            None => lines.push(Line::from(Span::styled("   (file not readable)", dim))),
        }
    }
    lines
}

fn comment_lines(theme: &Theme, comments: &CommentsState) -> Vec<Line<'static>> {
    let bg = theme.background;
    let dim = Style::default().fg(theme.dim).bg(bg);
    let header = Line::from(Span::styled(
        " \u{2500}\u{2500}\u{2500} Comments \u{2500}\u{2500}\u{2500}",
        dim,
    ));
    match comments {
        CommentsState::Unavailable => Vec::new(),
        CommentsState::Loading => vec![
            Line::default(),
            Line::from(Span::styled(" Loading comments...", dim)),
        ],
        CommentsState::Loaded(list) if list.is_empty() => vec![
            Line::default(),
            header,
            Line::from(Span::styled(" No comments", dim)),
        ],
        CommentsState::Loaded(list) => {
            let mut lines = vec![Line::default(), header];
            for comment in list {
                lines.extend(single_comment(theme, comment));
            }
            lines
        }
    }
}

fn single_comment(theme: &Theme, comment: &Comment) -> Vec<Line<'static>> {
    let bg = theme.background;
    let mut byline = vec![Span::styled(
        format!(" @{}", comment.author),
        Style::default()
            .fg(theme.primary)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(at) = comment.created_at {
        byline.push(Span::styled(
            format!(" \u{00B7} {}", at.format("%Y-%m-%d")),
            Style::default().fg(theme.dim).bg(bg),
        ));
    }
    let mut lines = vec![Line::default(), Line::from(byline)];
    let text = Style::default().fg(theme.text).bg(bg);
    lines.extend(
        comment
            .body
            .lines()
            .map(|l| Line::from(Span::styled(format!(" {}", l), text))),
    );
    lines
}
