use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use super::issue::ProviderKind;

/// Configuration from `.openissue/config.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// How the remote tracker is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteMode {
    /// Detect from `git remote get-url origin`
    #[default]
    Auto,
    Github,
    Gitlab,
    /// Never talk to a remote
    Off,
}

impl RemoteMode {
    /// The provider kind forced by this mode, if any
    pub fn forced_kind(self) -> Option<ProviderKind> {
        match self {
            RemoteMode::Github => Some(ProviderKind::Github),
            RemoteMode::Gitlab => Some(ProviderKind::Gitlab),
            RemoteMode::Auto | RemoteMode::Off => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RemoteMode::Auto => "auto",
            RemoteMode::Github => "github",
            RemoteMode::Gitlab => "gitlab",
            RemoteMode::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub mode: RemoteMode,
    /// `owner/name`; detected from the git remote when absent
    #[serde(default)]
    pub repo: Option<String>,
    /// Default: see DEFAULT_LIST_LIMIT
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
    #[serde(default)]
    pub gh_bin: Option<PathBuf>,
    #[serde(default)]
    pub glab_bin: Option<PathBuf>,
}

/// Page size for remote issue listings
pub const DEFAULT_LIST_LIMIT: usize = 50;

fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            mode: RemoteMode::Auto,
            repo: None,
            list_limit: DEFAULT_LIST_LIMIT,
            gh_bin: None,
            glab_bin: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_key_hints: true,
            colors: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: ProjectConfig = toml::from_str("").unwrap();
        assert_eq!(config.remote.mode, RemoteMode::Auto);
        assert_eq!(config.remote.list_limit, DEFAULT_LIST_LIMIT);
        assert!(config.remote.repo.is_none());
        assert!(config.ui.show_key_hints);
    }

    #[test]
    fn remote_section_overrides() {
        let config: ProjectConfig = toml::from_str(
            r##"
[remote]
mode = "gitlab"
repo = "group/project"
list_limit = 20
glab_bin = "/opt/bin/glab"

[ui]
show_key_hints = false

[ui.colors]
background = "#000000"
"##,
        )
        .unwrap();
        assert_eq!(config.remote.mode, RemoteMode::Gitlab);
        assert_eq!(config.remote.mode.forced_kind(), Some(ProviderKind::Gitlab));
        assert_eq!(config.remote.repo.as_deref(), Some("group/project"));
        assert_eq!(config.remote.list_limit, 20);
        assert_eq!(
            config.remote.glab_bin,
            Some(PathBuf::from("/opt/bin/glab"))
        );
        assert!(!config.ui.show_key_hints);
        assert_eq!(config.ui.colors.get("background").map(String::as_str), Some("#000000"));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(toml::from_str::<ProjectConfig>("[remote]\nmode = \"bitbucket\"\n").is_err());
    }
}
