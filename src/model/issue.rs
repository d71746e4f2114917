use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Number of characters of a local id shown when an issue has no remote number
pub const SHORT_ID_LEN: usize = 8;

/// Open/closed state of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    #[default]
    Open,
    Closed,
}

impl IssueStatus {
    /// The opposite state (used by the toggle action)
    pub fn toggled(self) -> IssueStatus {
        match self {
            IssueStatus::Open => IssueStatus::Closed,
            IssueStatus::Closed => IssueStatus::Open,
        }
    }

    /// Checkbox shown in lists and suggestion labels
    pub fn checkbox(self) -> &'static str {
        match self {
            IssueStatus::Open => "[ ]",
            IssueStatus::Closed => "[x]",
        }
    }

    pub fn parse_status(s: &str) -> Option<IssueStatus> {
        match s {
            "open" => Some(IssueStatus::Open),
            "closed" => Some(IssueStatus::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueStatus::Open => write!(f, "open"),
            IssueStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Issue priority. Every issue is created with the default for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssuePriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Which remote tracker a record is mirrored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Github,
    Gitlab,
}

impl ProviderKind {
    /// Prefix for ids synthesized from a remote number (`gh-12`, `gl-12`)
    pub fn id_prefix(self) -> &'static str {
        match self {
            ProviderKind::Github => "gh",
            ProviderKind::Gitlab => "gl",
        }
    }

    /// Local id for a record discovered remotely
    pub fn synthesize_id(self, number: u64) -> String {
        format!("{}-{}", self.id_prefix(), number)
    }

    pub fn parse_kind(s: &str) -> Option<ProviderKind> {
        match s {
            "github" => Some(ProviderKind::Github),
            "gitlab" => Some(ProviderKind::Gitlab),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Github => write!(f, "github"),
            ProviderKind::Gitlab => write!(f, "gitlab"),
        }
    }
}

/// The counterpart of a record on a remote tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteIdentity {
    pub provider: ProviderKind,
    #[serde(rename = "remoteNumber")]
    pub number: u64,
}

/// Inclusive line range of a file reference (`#10-25`, or `#10` alone)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

/// A project file mentioned by an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<LineRange>,
}

impl FileRef {
    pub fn new(path: impl Into<String>) -> Self {
        FileRef {
            path: path.into(),
            lines: None,
        }
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lines {
            Some(LineRange {
                start,
                end: Some(end),
            }) => write!(f, "{}#{}-{}", self.path, start, end),
            Some(LineRange { start, end: None }) => write!(f, "{}#{}", self.path, start),
            None => write!(f, "{}", self.path),
        }
    }
}

/// A locally tracked issue, optionally mirrored to a remote tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default)]
    pub priority: IssuePriority,
    #[serde(default)]
    pub labels: IndexSet<String>,
    #[serde(default)]
    pub files: Vec<FileRef>,
    /// Flattened as `provider` + `remoteNumber`
    #[serde(flatten)]
    pub remote: Option<RemoteIdentity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// A fresh open issue with a newly generated local id
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Issue {
            id: generate_local_id(),
            title: title.into(),
            body: body.into(),
            status: IssueStatus::Open,
            priority: IssuePriority::default(),
            labels: IndexSet::new(),
            files: Vec::new(),
            remote: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The remote number if this issue is mirrored to `kind`
    pub fn remote_number_for(&self, kind: ProviderKind) -> Option<u64> {
        self.remote
            .filter(|r| r.provider == kind)
            .map(|r| r.number)
    }

    /// Remote number if present, otherwise the first characters of the local id.
    /// Used for list rows, suggestion labels and reference tokens alike.
    pub fn display_id(&self) -> String {
        match self.remote {
            Some(remote) => remote.number.to_string(),
            None => short_id(&self.id).to_string(),
        }
    }

    /// The `#…` token inserted when this issue is referenced from text
    pub fn reference_token(&self) -> String {
        format!("#{}", self.display_id())
    }

    /// Whether `reference` (with or without a leading `#`) names this issue
    pub fn matches_reference(&self, reference: &str) -> bool {
        let reference = reference.strip_prefix('#').unwrap_or(reference);
        !reference.is_empty() && (self.id == reference || self.display_id() == reference)
    }
}

/// Counts shown in the TUI header and `oi list --json` summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IssueStats {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    /// Records carrying a remote identity
    pub synced: usize,
}

impl IssueStats {
    pub fn of(issues: &[Issue]) -> Self {
        issues.iter().fold(IssueStats::default(), |mut stats, issue| {
            stats.total += 1;
            match issue.status {
                IssueStatus::Open => stats.open += 1,
                IssueStatus::Closed => stats.closed += 1,
            }
            if issue.remote.is_some() {
                stats.synced += 1;
            }
            stats
        })
    }

    /// Records that exist only locally
    pub fn local(&self) -> usize {
        self.total - self.synced
    }
}

/// First `SHORT_ID_LEN` characters of an id (char-safe)
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Generate a new local id: the first 8 hex characters of a v4 UUID
pub fn generate_local_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    uuid[..SHORT_ID_LEN].to_string()
}

/// A shallow patch over an issue. `None` leaves the field untouched.
/// `updated_at` is not patchable; the store stamps it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<IssueStatus>,
    pub priority: Option<IssuePriority>,
    pub labels: Option<IndexSet<String>>,
    pub files: Option<Vec<FileRef>>,
    pub remote: Option<RemoteIdentity>,
}

impl IssuePatch {
    pub fn status(status: IssueStatus) -> Self {
        IssuePatch {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn remote(remote: RemoteIdentity) -> Self {
        IssuePatch {
            remote: Some(remote),
            ..Default::default()
        }
    }

    pub fn apply_to(self, issue: &mut Issue) {
        if let Some(title) = self.title {
            issue.title = title;
        }
        if let Some(body) = self.body {
            issue.body = body;
        }
        if let Some(status) = self.status {
            issue.status = status;
        }
        if let Some(priority) = self.priority {
            issue.priority = priority;
        }
        if let Some(labels) = self.labels {
            issue.labels = labels;
        }
        if let Some(files) = self.files {
            issue.files = files;
        }
        if let Some(remote) = self.remote {
            issue.remote = Some(remote);
        }
    }
}
