use serde::Serialize;

use crate::model::agent::AgentTask;
use crate::model::comment::Comment;
use crate::model::issue::Issue;
use crate::ops::sync::SyncReport;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

/// An issue as stored, plus the id it is displayed under
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueJson<'a> {
    pub display_id: String,
    #[serde(flatten)]
    pub issue: &'a Issue,
}

#[derive(Serialize)]
pub struct SyncJson {
    pub listed: usize,
    pub added: usize,
    pub persisted: bool,
}

#[derive(Serialize)]
pub struct ActionJson {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
}

#[derive(Serialize)]
pub struct RemoteJson {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn issue_to_json(issue: &Issue) -> IssueJson<'_> {
    IssueJson {
        display_id: issue.display_id(),
        issue,
    }
}

pub fn sync_to_json(report: &SyncReport) -> SyncJson {
    SyncJson {
        listed: report.listed,
        added: report.added,
        persisted: report.persisted,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// `[ ] #42          Title  (bug, ui)`
pub fn format_issue_line(issue: &Issue) -> String {
    let labels = if issue.labels.is_empty() {
        String::new()
    } else {
        format!(
            "  ({})",
            issue.labels.iter().cloned().collect::<Vec<_>>().join(", ")
        )
    };
    format!(
        "{} {:<12} {}{}",
        issue.status.checkbox(),
        issue.reference_token(),
        issue.title,
        labels
    )
}

/// Format detailed issue view
pub fn format_issue_detail(issue: &Issue) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} {}",
        issue.status.checkbox(),
        issue.reference_token(),
        issue.title
    )];

    lines.push(format!("id: {}", issue.id));
    lines.push(format!("status: {}", issue.status));
    match issue.remote {
        Some(remote) => lines.push(format!("remote: {} #{}", remote.provider, remote.number)),
        None => lines.push("remote: (local only)".to_string()),
    }
    if !issue.labels.is_empty() {
        lines.push(format!(
            "labels: {}",
            issue.labels.iter().cloned().collect::<Vec<_>>().join(", ")
        ));
    }
    lines.push(format!("created: {}", issue.created_at.format("%Y-%m-%d %H:%M")));
    lines.push(format!("updated: {}", issue.updated_at.format("%Y-%m-%d %H:%M")));
    for file in &issue.files {
        lines.push(format!("file: {}", file));
    }

    if !issue.body.is_empty() {
        lines.push(String::new());
        lines.extend(issue.body.lines().map(String::from));
    }
    lines
}

/// `author (2025-05-14 10:00)` followed by the indented body
pub fn format_comment(comment: &Comment) -> Vec<String> {
    let mut lines = vec![match comment.created_at {
        Some(at) => format!("{} ({})", comment.author, at.format("%Y-%m-%d %H:%M")),
        None => comment.author.clone(),
    }];
    lines.extend(comment.body.lines().map(|l| format!("  {}", l)));
    lines
}

/// `◐ in_progress  Fix flaky test  #12`
pub fn format_agent_task_line(task: &AgentTask) -> String {
    let pr = task
        .pull_request_number
        .map(|n| format!("  #{}", n))
        .unwrap_or_default();
    format!(
        "{} {:<12} {}{}",
        task.status.icon(),
        task.status.to_string(),
        task.title,
        pr
    )
}

pub fn format_sync_report(report: &SyncReport) -> String {
    let mut out = format!(
        "Imported {} of {} remote issue{}",
        report.added,
        report.listed,
        if report.listed == 1 { "" } else { "s" }
    );
    if !report.persisted {
        out.push_str(" (save failed, see `oi recovery`)");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::agent::AgentTaskStatus;
    use crate::model::issue::{IssueStatus, ProviderKind, RemoteIdentity};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn issue() -> Issue {
        let mut issue = Issue::new("Fix bug", "Steps:\n1. run");
        issue.id = "gh-42".into();
        issue.remote = Some(RemoteIdentity {
            provider: ProviderKind::Github,
            number: 42,
        });
        issue.created_at = Utc.with_ymd_and_hms(2025, 5, 14, 10, 0, 0).unwrap();
        issue.updated_at = issue.created_at;
        issue
    }

    #[test]
    fn issue_line_pads_reference() {
        let mut issue = issue();
        assert_eq!(format_issue_line(&issue), "[ ] #42          Fix bug");
        issue.labels.insert("bug".into());
        issue.labels.insert("ui".into());
        issue.status = IssueStatus::Closed;
        assert_eq!(format_issue_line(&issue), "[x] #42          Fix bug  (bug, ui)");
    }

    #[test]
    fn issue_detail_lists_metadata_then_body() {
        let lines = format_issue_detail(&issue());
        assert_eq!(
            lines,
            vec![
                "[ ] #42 Fix bug",
                "id: gh-42",
                "status: open",
                "remote: github #42",
                "created: 2025-05-14 10:00",
                "updated: 2025-05-14 10:00",
                "",
                "Steps:",
                "1. run",
            ]
        );
    }

    #[test]
    fn issue_json_carries_display_id() {
        let issue = issue();
        let value = serde_json::to_value(issue_to_json(&issue)).unwrap();
        assert_eq!(value["displayId"], "42");
        assert_eq!(value["remoteNumber"], 42);
        assert_eq!(value["provider"], "github");
    }

    #[test]
    fn comment_and_agent_lines() {
        let comment = Comment {
            id: "1".into(),
            author: "octocat".into(),
            body: "LGTM\nship it".into(),
            created_at: Some(Utc.with_ymd_and_hms(2025, 5, 14, 9, 30, 0).unwrap()),
        };
        assert_eq!(
            format_comment(&comment),
            vec!["octocat (2025-05-14 09:30)", "  LGTM", "  ship it"]
        );

        let task = AgentTask {
            id: "pr-12".into(),
            title: "Fix flaky test".into(),
            pull_request_number: Some(12),
            repository: "octo/repo".into(),
            status: AgentTaskStatus::InProgress,
            created_at: Utc::now(),
            updated_at: None,
        };
        assert_eq!(
            format_agent_task_line(&task),
            "\u{25D0} in_progress  Fix flaky test  #12"
        );
    }

    #[test]
    fn sync_report_text() {
        let report = SyncReport {
            added: 1,
            listed: 1,
            persisted: false,
        };
        assert_eq!(
            format_sync_report(&report),
            "Imported 1 of 1 remote issue (save failed, see `oi recovery`)"
        );
    }
}
