use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::{ProjectConfig, RemoteMode};
use crate::model::issue::ProviderKind;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not parse config.toml: {0}")]
    Document(#[from] toml_edit::TomlError),
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

/// Read the config, returning both the parsed form and the raw document for
/// format-preserving edits. A missing file yields defaults and an empty document.
pub fn read_config(data_dir: &Path) -> Result<(ProjectConfig, toml_edit::DocumentMut), ConfigError> {
    let path = config_path(data_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    let config: ProjectConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

pub fn write_config(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let path = config_path(data_dir);
    fs::write(&path, doc.to_string()).map_err(|source| ConfigError::Write { path, source })
}

fn remote_table(doc: &mut toml_edit::DocumentMut) -> &mut toml_edit::Item {
    if !doc.contains_key("remote") {
        doc["remote"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    &mut doc["remote"]
}

/// Pin the remote to `kind` and `repo`
pub fn set_remote(doc: &mut toml_edit::DocumentMut, kind: ProviderKind, repo: &str) {
    let remote = remote_table(doc);
    remote["mode"] = toml_edit::value(kind.to_string());
    remote["repo"] = toml_edit::value(repo);
}

/// Switch the remote mode. `auto` also drops a pinned repo so detection applies again.
pub fn set_remote_mode(doc: &mut toml_edit::DocumentMut, mode: RemoteMode) {
    let remote = remote_table(doc);
    remote["mode"] = toml_edit::value(mode.as_str());
    if mode == RemoteMode::Auto
        && let Some(table) = remote.as_table_mut()
    {
        table.remove("repo");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"# openissue settings
[remote]
mode = "auto"   # auto | github | gitlab | off
list_limit = 25

[ui]
show_key_hints = true
"#;

    #[test]
    fn round_trip_preserves_formatting() {
        let tmp = TempDir::new().unwrap();
        fs::write(config_path(tmp.path()), SAMPLE).unwrap();
        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config.remote.list_limit, 25);
        write_config(tmp.path(), &doc).unwrap();
        assert_eq!(fs::read_to_string(config_path(tmp.path())).unwrap(), SAMPLE);
    }

    #[test]
    fn missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config.remote.mode, RemoteMode::Auto);
        assert!(doc.to_string().is_empty());
    }

    #[test]
    fn set_remote_then_auto() {
        let mut doc: toml_edit::DocumentMut = SAMPLE.parse().unwrap();
        set_remote(&mut doc, ProviderKind::Gitlab, "group/project");
        let config: ProjectConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.remote.mode, RemoteMode::Gitlab);
        assert_eq!(config.remote.repo.as_deref(), Some("group/project"));
        assert_eq!(config.remote.list_limit, 25);
        assert!(doc.to_string().starts_with("# openissue settings\n"));

        set_remote_mode(&mut doc, RemoteMode::Auto);
        let config: ProjectConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.remote.mode, RemoteMode::Auto);
        assert!(config.remote.repo.is_none());
    }

    #[test]
    fn set_mode_on_empty_document() {
        let mut doc = toml_edit::DocumentMut::new();
        set_remote_mode(&mut doc, RemoteMode::Off);
        let config: ProjectConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.remote.mode, RemoteMode::Off);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(config_path(tmp.path()), "[remote\nmode = ").unwrap();
        assert!(matches!(read_config(tmp.path()), Err(ConfigError::Parse(_))));
    }
}
