use std::path::Path;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;

use super::{CommandRunner, ProviderError, RemoteOperationError, RepoCli, github_bin};
use crate::model::agent::{AgentTask, AgentTaskStatus};
use crate::model::config::RemoteConfig;
use crate::model::issue::ProviderKind;

/// Default number of tasks requested from `gh agent-task list`
pub const DEFAULT_AGENT_LIST_LIMIT: usize = 30;

static LIST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\t#(\d+)\t(.+?)\t(.+?)\t(.+)$").expect("valid regex")
});
static PULL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pull/(\d+)").expect("valid regex"));
static SESSION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"agent-sessions/([a-zA-Z0-9-]+)").expect("valid regex"));

/// Coding-agent sessions through `gh agent-task`. GitHub only.
pub struct AgentTaskProvider {
    cli: RepoCli,
}

impl AgentTaskProvider {
    pub(crate) fn new(cli: RepoCli) -> Self {
        AgentTaskProvider { cli }
    }

    /// Build the provider for `kind`; GitLab has no agent tasks.
    pub fn connect(
        kind: ProviderKind,
        repo: &str,
        config: &RemoteConfig,
        root: &Path,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, ProviderError> {
        match kind {
            ProviderKind::Github => Ok(AgentTaskProvider::new(RepoCli::new(
                runner,
                github_bin(config),
                repo,
                Some(root),
            ))),
            ProviderKind::Gitlab => Err(ProviderError::Unsupported(
                "agent tasks are only supported on GitHub".into(),
            )),
        }
    }

    pub fn repo(&self) -> &str {
        self.cli.repo()
    }

    /// Up to `limit` recent tasks. Empty on any failure.
    pub fn list_agent_tasks(&self, limit: usize) -> Vec<AgentTask> {
        let limit = limit.to_string();
        match self.cli.run(&["agent-task", "list", "--limit", limit.as_str()]) {
            Ok(out) => out
                .lines()
                .filter(|l| !l.trim().is_empty())
                .filter_map(|l| parse_list_line(l, self.repo()))
                .collect(),
            Err(e) => {
                tracing::warn!(repo = self.repo(), "listing agent tasks failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Start a new agent session, optionally linked to issue `issue_number`
    pub fn create_agent_task(
        &self,
        description: &str,
        issue_number: Option<u64>,
    ) -> Result<AgentTask, RemoteOperationError> {
        let prompt = match issue_number {
            Some(n) => format!("{}\n\nRelated issue: #{}", description, n),
            None => description.to_string(),
        };
        let out = self.cli.run(&["agent-task", "create", prompt.as_str()])?;
        Ok(parse_created_task(&out, description, self.repo(), Utc::now()))
    }

    /// Session details and log
    pub fn view_agent_task(&self, session_id: &str) -> Result<String, RemoteOperationError> {
        self.cli.run(&["agent-task", "view", session_id, "--log"])
    }
}

/// `title\t#PR\trepo\tstatus\tcreated` as printed by `gh agent-task list`
fn parse_list_line(line: &str, fallback_repo: &str) -> Option<AgentTask> {
    let caps = LIST_LINE.captures(line)?;
    let number: u64 = caps[2].parse().ok()?;
    let title = caps[1].trim();
    let repository = caps[3].trim();
    let created_at = DateTime::parse_from_rfc3339(caps[5].trim())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());
    Some(AgentTask {
        id: format!("pr-{}", number),
        title: if title.is_empty() {
            "Untitled task".to_string()
        } else {
            title.to_string()
        },
        pull_request_number: Some(number),
        repository: if repository.is_empty() {
            fallback_repo.to_string()
        } else {
            repository.to_string()
        },
        status: AgentTaskStatus::from_remote_label(&caps[4]),
        created_at,
        updated_at: None,
    })
}

/// Output looks like `https://github.com/OWNER/REPO/pull/123/agent-sessions/abc-123`
fn parse_created_task(output: &str, description: &str, repo: &str, now: DateTime<Utc>) -> AgentTask {
    let number: Option<u64> = PULL_NUMBER
        .captures(output)
        .and_then(|c| c[1].parse().ok());
    let id = SESSION_ID
        .captures(output)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| match number {
            Some(n) => format!("pr-{}", n),
            None => format!("pr-{}", now.timestamp_millis()),
        });
    AgentTask {
        id,
        title: description.to_string(),
        pull_request_number: number,
        repository: repo.to_string(),
        status: AgentTaskStatus::InProgress,
        created_at: now,
        updated_at: None,
    }
}
