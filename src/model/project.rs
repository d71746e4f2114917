use std::path::PathBuf;

use super::config::ProjectConfig;

/// Name of the per-project data directory
pub const DATA_DIR: &str = ".openissue";

/// A discovered openissue project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of `.openissue/`)
    pub root: PathBuf,
    /// Path to the `.openissue/` directory
    pub data_dir: PathBuf,
    /// Parsed config.toml (defaults when absent)
    pub config: ProjectConfig,
}

impl Project {
    pub fn issues_path(&self) -> PathBuf {
        self.data_dir.join("issues.json")
    }

    pub fn agent_tasks_path(&self) -> PathBuf {
        self.data_dir.join("agent-tasks.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("openissue.log")
    }
}
