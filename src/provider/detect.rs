use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::runner::{CommandRunner, os_args};
use crate::model::issue::ProviderKind;

static GITHUB_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com[:/](.+?)(?:\.git)?$").expect("valid regex"));
static GITLAB_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gitlab\.com[:/](.+?)(?:\.git)?$").expect("valid regex"));

/// Classify a remote URL (SSH or HTTPS) as GitHub or GitLab and extract `owner/repo`
pub fn parse_remote_url(url: &str) -> Option<(ProviderKind, String)> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    [
        (ProviderKind::Github, &*GITHUB_URL),
        (ProviderKind::Gitlab, &*GITLAB_URL),
    ]
    .into_iter()
    .find_map(|(kind, re)| {
        re.captures(url)
            .and_then(|c| c.get(1))
            .map(|m| (kind, m.as_str().trim_end_matches('/').to_string()))
    })
}

/// Inspect `git remote get-url origin` in `root`
pub fn detect_remote(runner: &dyn CommandRunner, root: &Path) -> Option<(ProviderKind, String)> {
    let output = runner
        .run("git", &os_args(["remote", "get-url", "origin"]), Some(root))
        .ok()?;
    if !output.status.success() {
        tracing::debug!("no origin remote in {}", root.display());
        return None;
    }
    parse_remote_url(&String::from_utf8_lossy(&output.stdout))
}
