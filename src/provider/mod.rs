//! Remote issue trackers driven through their command-line clients.
//!
//! Every provider runs its CLI through a [`CommandRunner`]; read operations
//! degrade to empty results, mutating operations return a
//! [`RemoteOperationError`] the caller must handle.

pub mod agents;
pub mod detect;
pub mod github;
pub mod gitlab;
pub mod runner;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::model::comment::Comment;
use crate::model::config::{RemoteConfig, RemoteMode};
use crate::model::issue::{Issue, ProviderKind};
pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;
pub use runner::{CommandRunner, ProcessCommandRunner};

#[derive(Debug, thiserror::Error)]
pub enum RemoteOperationError {
    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("`{command}` failed: {stderr}")]
    Failed { command: String, stderr: String },
    #[error("could not parse output of `{command}`: {output}")]
    Parse { command: String, output: String },
}

/// Why no provider could be constructed
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no GitHub or GitLab remote detected (set one with `oi remote set`)")]
    NoRemote,
    #[error("remote sync is turned off (`oi remote auto` to re-enable)")]
    Disabled,
    #[error("{0}")]
    Unsupported(String),
}

/// A remote issue tracker
pub trait RemoteProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// `owner/name`
    fn repo(&self) -> &str;

    fn label(&self) -> String {
        format!("{}: {}", self.kind(), self.repo())
    }

    /// Up to the configured page size of remote issues, as local records.
    /// Empty on any failure.
    fn list_remote(&self) -> Vec<Issue>;

    /// Create an issue remotely and return its number
    fn create_remote(
        &self,
        title: &str,
        body: &str,
        labels: &[String],
    ) -> Result<u64, RemoteOperationError>;

    fn close_remote(&self, number: u64) -> Result<(), RemoteOperationError>;

    fn reopen_remote(&self, number: u64) -> Result<(), RemoteOperationError>;

    /// Comments on issue `number`. Empty on any failure.
    fn fetch_comments(&self, number: u64) -> Vec<Comment>;
}

/// One CLI bound to one repository. Every invocation gets `--repo <repo>` appended.
#[derive(Clone)]
pub(crate) struct RepoCli {
    runner: Arc<dyn CommandRunner>,
    program: String,
    repo: String,
    cwd: Option<PathBuf>,
}

impl RepoCli {
    pub(crate) fn new(
        runner: Arc<dyn CommandRunner>,
        program: impl Into<String>,
        repo: impl Into<String>,
        cwd: Option<&Path>,
    ) -> Self {
        RepoCli {
            runner,
            program: program.into(),
            repo: repo.into(),
            cwd: cwd.map(Path::to_path_buf),
        }
    }

    pub(crate) fn repo(&self) -> &str {
        &self.repo
    }

    /// Run `program args... --repo R` and return stdout, or an error carrying stderr
    pub(crate) fn run(&self, args: &[&str]) -> Result<String, RemoteOperationError> {
        let mut full: Vec<OsString> = runner::os_args(args.iter().copied());
        full.push("--repo".into());
        full.push(self.repo.clone().into());

        let command = self.describe(args);
        tracing::debug!(command = %command, "running remote command");
        let output = self
            .runner
            .run(&self.program, &full, self.cwd.as_deref())
            .map_err(|source| RemoteOperationError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RemoteOperationError::Failed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// `gh issue list` style label for messages (first two arguments only)
    pub(crate) fn describe(&self, args: &[&str]) -> String {
        let mut parts = vec![self.program.as_str()];
        parts.extend(args.iter().take(2));
        parts.join(" ")
    }

    pub(crate) fn parse_error(&self, args: &[&str], output: &str) -> RemoteOperationError {
        RemoteOperationError::Parse {
            command: self.describe(args),
            output: output.trim().chars().take(200).collect(),
        }
    }
}

static ISSUE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/issues/(\d+)").expect("valid regex"));

/// Issue number from the URL printed by `gh issue create` / `glab issue create`
pub(crate) fn parse_issue_number(output: &str) -> Option<u64> {
    ISSUE_URL
        .captures(output)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Which tracker and repository to talk to, per config and `git remote`.
pub fn resolve_remote(
    config: &RemoteConfig,
    root: &Path,
    runner: &dyn CommandRunner,
) -> Result<(ProviderKind, String), ProviderError> {
    if config.mode == RemoteMode::Off {
        return Err(ProviderError::Disabled);
    }
    if let (Some(kind), Some(repo)) = (config.mode.forced_kind(), config.repo.as_ref()) {
        return Ok((kind, repo.clone()));
    }
    let detected = detect::detect_remote(runner, root);
    match (config.mode.forced_kind(), detected) {
        (Some(kind), Some((_, repo))) => Ok((kind, repo)),
        (None, Some((kind, repo))) => Ok((kind, config.repo.clone().unwrap_or(repo))),
        (_, None) => Err(ProviderError::NoRemote),
    }
}

/// Build the provider for this project
pub fn connect(
    config: &RemoteConfig,
    root: &Path,
    runner: Arc<dyn CommandRunner>,
) -> Result<Arc<dyn RemoteProvider>, ProviderError> {
    let (kind, repo) = resolve_remote(config, root, runner.as_ref())?;
    Ok(connect_resolved(kind, &repo, config, root, runner))
}

/// Build the provider for an already resolved tracker and repository
pub fn connect_resolved(
    kind: ProviderKind,
    repo: &str,
    config: &RemoteConfig,
    root: &Path,
    runner: Arc<dyn CommandRunner>,
) -> Arc<dyn RemoteProvider> {
    tracing::info!(provider = %kind, repo, "remote resolved");
    match kind {
        ProviderKind::Github => Arc::new(GitHubProvider::new(
            RepoCli::new(runner, github_bin(config), repo, Some(root)),
            config.list_limit,
        )),
        ProviderKind::Gitlab => Arc::new(GitLabProvider::new(
            RepoCli::new(runner, gitlab_bin(config), repo, Some(root)),
            config.list_limit,
        )),
    }
}

pub(crate) fn github_bin(config: &RemoteConfig) -> String {
    config
        .gh_bin
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "gh".to_string())
}

pub(crate) fn gitlab_bin(config: &RemoteConfig) -> String {
    config
        .glab_bin
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "glab".to_string())
}
