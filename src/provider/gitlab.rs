use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{RemoteOperationError, RemoteProvider, RepoCli, parse_issue_number};
use crate::model::comment::Comment;
use crate::model::issue::{Issue, IssuePriority, IssueStatus, ProviderKind, RemoteIdentity};

/// GitLab through the `glab` CLI
pub struct GitLabProvider {
    cli: RepoCli,
    list_limit: usize,
}

#[derive(Debug, Deserialize)]
struct GlIssue {
    iid: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    state: String,
    #[serde(default)]
    labels: Vec<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GlNote {
    id: u64,
    author: Option<GlAuthor>,
    #[serde(default)]
    body: String,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GlAuthor {
    username: String,
}

impl GlIssue {
    fn into_issue(self) -> Issue {
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        Issue {
            id: ProviderKind::Gitlab.synthesize_id(self.iid),
            title: self.title,
            body: self.description.unwrap_or_default(),
            status: if self.state == "opened" {
                IssueStatus::Open
            } else {
                IssueStatus::Closed
            },
            priority: IssuePriority::default(),
            labels: self.labels.into_iter().collect(),
            files: Vec::new(),
            remote: Some(RemoteIdentity {
                provider: ProviderKind::Gitlab,
                number: self.iid,
            }),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at).max(created_at),
        }
    }
}

impl GitLabProvider {
    pub(crate) fn new(cli: RepoCli, list_limit: usize) -> Self {
        GitLabProvider { cli, list_limit }
    }

    fn try_list(&self) -> Result<Vec<Issue>, RemoteOperationError> {
        let per_page = self.list_limit.to_string();
        let args = ["issue", "list", "--output", "json", "--per-page", per_page.as_str()];
        let out = self.cli.run(&args)?;
        let items: Vec<GlIssue> =
            serde_json::from_str(&out).map_err(|_| self.cli.parse_error(&args, &out))?;
        Ok(items.into_iter().map(GlIssue::into_issue).collect())
    }

    fn try_comments(&self, number: u64) -> Result<Vec<Comment>, RemoteOperationError> {
        let endpoint = format!("/projects/:id/issues/{}/notes", number);
        let args = ["api", endpoint.as_str(), "--method", "GET"];
        let out = self.cli.run(&args)?;
        let notes: Vec<GlNote> =
            serde_json::from_str(&out).map_err(|_| self.cli.parse_error(&args, &out))?;
        Ok(notes
            .into_iter()
            .map(|n| Comment {
                id: n.id.to_string(),
                author: n.author.map(|a| a.username).unwrap_or_else(|| "ghost".into()),
                body: n.body,
                created_at: n.created_at,
            })
            .collect())
    }
}

impl RemoteProvider for GitLabProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gitlab
    }

    fn repo(&self) -> &str {
        self.cli.repo()
    }

    fn list_remote(&self) -> Vec<Issue> {
        self.try_list().unwrap_or_else(|e| {
            tracing::warn!(repo = self.repo(), "listing GitLab issues failed: {}", e);
            Vec::new()
        })
    }

    fn create_remote(
        &self,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<u64, RemoteOperationError> {
        let mut args = vec!["issue", "create", "--title", title, "--description", body];
        for label in labels {
            args.push("--label");
            args.push(label);
        }
        let out = self.cli.run(&args)?;
        parse_issue_number(&out).ok_or_else(|| self.cli.parse_error(&args, &out))
    }

    fn close_remote(&self, number: u64) -> Result<(), RemoteOperationError> {
        self.cli.run(&["issue", "close", &number.to_string()]).map(drop)
    }

    fn reopen_remote(&self, number: u64) -> Result<(), RemoteOperationError> {
        self.cli.run(&["issue", "reopen", &number.to_string()]).map(drop)
    }

    fn fetch_comments(&self, number: u64) -> Vec<Comment> {
        self.try_comments(number).unwrap_or_else(|e| {
            tracing::warn!(number, "fetching GitLab notes failed: {}", e);
            Vec::new()
        })
    }
}
