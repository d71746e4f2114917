use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::Deserialize;

use super::{RemoteOperationError, RemoteProvider, RepoCli, parse_issue_number};
use crate::model::comment::Comment;
use crate::model::issue::{
    FileRef, Issue, IssuePriority, IssueStatus, ProviderKind, RemoteIdentity,
};

const LIST_FIELDS: &str = "number,title,body,state,labels,createdAt,updatedAt";

/// GitHub through the `gh` CLI
pub struct GitHubProvider {
    cli: RepoCli,
    list_limit: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    state: String,
    #[serde(default)]
    labels: Vec<GhLabel>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GhLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GhComments {
    #[serde(default)]
    comments: Vec<GhComment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhComment {
    id: String,
    author: Option<GhAuthor>,
    #[serde(default)]
    body: String,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GhAuthor {
    login: String,
}

impl GhIssue {
    fn into_issue(self) -> Issue {
        let now = Utc::now();
        let created_at = self.created_at.unwrap_or(now);
        Issue {
            id: ProviderKind::Github.synthesize_id(self.number),
            title: self.title,
            body: self.body.unwrap_or_default(),
            status: if self.state == "OPEN" {
                IssueStatus::Open
            } else {
                IssueStatus::Closed
            },
            priority: IssuePriority::default(),
            labels: self.labels.into_iter().map(|l| l.name).collect::<IndexSet<_>>(),
            files: Vec::<FileRef>::new(),
            remote: Some(RemoteIdentity {
                provider: ProviderKind::Github,
                number: self.number,
            }),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at).max(created_at),
        }
    }
}

impl GitHubProvider {
    pub(crate) fn new(cli: RepoCli, list_limit: usize) -> Self {
        GitHubProvider { cli, list_limit }
    }

    fn try_list(&self) -> Result<Vec<Issue>, RemoteOperationError> {
        let limit = self.list_limit.to_string();
        let args = ["issue", "list", "--json", LIST_FIELDS, "--limit", limit.as_str()];
        let out = self.cli.run(&args)?;
        let items: Vec<GhIssue> =
            serde_json::from_str(&out).map_err(|_| self.cli.parse_error(&args, &out))?;
        Ok(items.into_iter().map(GhIssue::into_issue).collect())
    }

    fn try_comments(&self, number: u64) -> Result<Vec<Comment>, RemoteOperationError> {
        let number = number.to_string();
        let args = ["issue", "view", number.as_str(), "--json", "comments"];
        let out = self.cli.run(&args)?;
        let data: GhComments =
            serde_json::from_str(&out).map_err(|_| self.cli.parse_error(&args, &out))?;
        Ok(data
            .comments
            .into_iter()
            .map(|c| Comment {
                id: c.id,
                author: c.author.map(|a| a.login).unwrap_or_else(|| "ghost".into()),
                body: c.body,
                created_at: c.created_at,
            })
            .collect())
    }
}

impl RemoteProvider for GitHubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Github
    }

    fn repo(&self) -> &str {
        self.cli.repo()
    }

    fn list_remote(&self) -> Vec<Issue> {
        self.try_list().unwrap_or_else(|e| {
            tracing::warn!(repo = self.repo(), "listing GitHub issues failed: {}", e);
            Vec::new()
        })
    }

    fn create_remote(
        &self,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<u64, RemoteOperationError> {
        let mut args = vec!["issue", "create", "--title", title, "--body", body];
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
            tracing::warn!(number, "fetching GitHub comments failed: {}", e);
            Vec::new()
        })
    }
}
