use std::fs;
use std::path::{Path, PathBuf};

use crate::io::config_io::{self, ConfigError};
use crate::model::project::{DATA_DIR, Project};

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("not an openissue project: no .openissue/ directory found (run `oi init`)")]
    NotAProject,
    #[error("an openissue project already exists at {0}")]
    AlreadyInitialized(PathBuf),
    #[error("could not create {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

const CONFIG_TEMPLATE: &str = r##"# openissue settings

[remote]
# auto: detect GitHub/GitLab from `git remote get-url origin`
# github | gitlab: use the given repo; off: never talk to a remote
mode = "auto"
# repo = "owner/name"
list_limit = 50
# gh_bin = "gh"
# glab_bin = "glab"

[ui]
show_key_hints = true

# [ui.colors]
# background = "#1A1816"
# text = "#D4C5B0"
# text_bright = "#F4EDE4"
# primary = "#D97706"
# muted = "#A18F7A"
# dim = "#6B625A"
# border = "#3D3832"
# selection_bg = "#2D2722"
# accent = "#CC9B6D"
# red = "#E05252"
# green = "#7FB069"
"##;

/// Walk up from `start` looking for a directory that contains `.openissue/`.
pub fn discover_project(start: &Path) -> Result<PathBuf, ProjectError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(DATA_DIR).is_dir() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ProjectError::NotAProject);
        }
    }
}

pub fn load_project(root: &Path) -> Result<Project, ProjectError> {
    let data_dir = root.join(DATA_DIR);
    if !data_dir.is_dir() {
        return Err(ProjectError::NotAProject);
    }
    let (config, _) = config_io::read_config(&data_dir)?;
    Ok(Project {
        root: root.to_path_buf(),
        data_dir,
        config,
    })
}

/// Create `.openissue/` with its marker, a commented config and empty stores.
pub fn init_project(root: &Path) -> Result<Project, ProjectError> {
    let data_dir = root.join(DATA_DIR);
    if data_dir.is_dir() {
        return Err(ProjectError::AlreadyInitialized(data_dir));
    }
    let create = |path: PathBuf, content: &str| {
        fs::write(&path, content).map_err(|source| ProjectError::Create { path, source })
    };
    fs::create_dir_all(&data_dir).map_err(|source| ProjectError::Create {
        path: data_dir.clone(),
        source,
    })?;
    create(data_dir.join(".gitkeep"), "")?;
    create(data_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    create(data_dir.join("issues.json"), "[]")?;
    create(data_dir.join("agent-tasks.json"), "[]")?;
    create(data_dir.join(".gitignore"), ".lock\nopenissue.log\n")?;
    load_project(root)
}
