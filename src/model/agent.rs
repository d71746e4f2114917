use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a remote coding-agent task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentTaskStatus {
    Draft,
    InProgress,
    Completed,
    Failed,
}

impl AgentTaskStatus {
    /// Map the status column of `gh agent-task list` onto our four states
    pub fn from_remote_label(label: &str) -> AgentTaskStatus {
        if label.contains("Ready for review") || label.contains("Merged") {
            AgentTaskStatus::Completed
        } else if label.contains("Draft") {
            AgentTaskStatus::Draft
        } else if label.contains("Closed") || label.contains("Failed") {
            AgentTaskStatus::Failed
        } else {
            AgentTaskStatus::InProgress
        }
    }

    /// Status glyph for the agent view
    pub fn icon(self) -> &'static str {
        match self {
            AgentTaskStatus::Draft => "\u{25CB}",      // ○
            AgentTaskStatus::InProgress => "\u{25D0}", // ◐
            AgentTaskStatus::Completed => "\u{25CF}",  // ●
            AgentTaskStatus::Failed => "\u{2715}",     // ✕
        }
    }

    /// Draft tasks count as active
    pub fn is_active(self) -> bool {
        matches!(self, AgentTaskStatus::Draft | AgentTaskStatus::InProgress)
    }
}

impl fmt::Display for AgentTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentTaskStatus::Draft => write!(f, "draft"),
            AgentTaskStatus::InProgress => write!(f, "in_progress"),
            AgentTaskStatus::Completed => write!(f, "completed"),
            AgentTaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A coding-agent session working on the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTask {
    /// Session identifier (or `pr-<n>` when the session id is unknown)
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_number: Option<u64>,
    pub repository: String,
    pub status: AgentTaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Shallow patch over an agent task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentTaskPatch {
    pub title: Option<String>,
    pub pull_request_number: Option<u64>,
    pub status: Option<AgentTaskStatus>,
}

impl AgentTaskPatch {
    pub fn apply_to(self, task: &mut AgentTask) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(pr) = self.pull_request_number {
            task.pull_request_number = Some(pr);
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}
