use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Files under `.openissue/` whose out-of-band edits the TUI picks up
const WATCHED_FILES: &[&str] = &["issues.json", "agent-tasks.json", "config.toml"];

#[derive(Debug)]
pub enum FileEvent {
    /// One or more watched files changed on disk
    Changed(Vec<PathBuf>),
}

/// Watches the `.openissue/` directory; call `poll()` once per tick.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl StoreWatcher {
    pub fn start(data_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else { return };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }
                let relevant: Vec<PathBuf> =
                    event.paths.into_iter().filter(|p| is_watched(p)).collect();
                if !relevant.is_empty() {
                    let _ = tx.send(FileEvent::Changed(relevant));
                }
            },
            Config::default(),
        )?;

        watcher.watch(data_dir, RecursiveMode::NonRecursive)?;
        Ok(StoreWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain every queued event without blocking
    pub fn poll(&self) -> Vec<FileEvent> {
        self.rx.try_iter().collect()
    }
}

/// Temp files from atomic writes and the lock file are ignored
fn is_watched(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| WATCHED_FILES.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_store_and_config_files_are_watched() {
        assert!(is_watched(Path::new("/p/.openissue/issues.json")));
        assert!(is_watched(Path::new("/p/.openissue/agent-tasks.json")));
        assert!(is_watched(Path::new("/p/.openissue/config.toml")));
        assert!(!is_watched(Path::new("/p/.openissue/.lock")));
        assert!(!is_watched(Path::new("/p/.openissue/.tmpAbc123")));
        assert!(!is_watched(Path::new("/p/.openissue/openissue.log")));
    }
}
