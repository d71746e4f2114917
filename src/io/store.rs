use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::io::lock::{DEFAULT_LOCK_TIMEOUT, FileLock, LockError};
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::agent::{AgentTask, AgentTaskPatch};
use crate::model::issue::{Issue, IssuePatch, RemoteIdentity};

/// A record kept in a `RecordStore`: identified by a string id, patched shallowly,
/// and stamped by the store on every update.
pub trait StoredRecord: Serialize + DeserializeOwned + Clone {
    type Patch;

    fn id(&self) -> &str;
    fn apply(&mut self, patch: Self::Patch);
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
    fn touch(&mut self, now: DateTime<Utc>);
}

impl StoredRecord for Issue {
    type Patch = IssuePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: IssuePatch) {
        patch.apply_to(self);
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl StoredRecord for AgentTask {
    type Patch = AgentTaskPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: AgentTaskPatch) {
        patch.apply_to(self);
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("a record with id {0} already exists")]
    DuplicateId(String),
}

/// What `load()` found on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No backing file yet
    Fresh,
    /// Parsed this many records
    Loaded(usize),
    /// The file was unreadable and the store was reset to empty
    Recovered,
}

/// Change notification delivered to subscribers, in mutation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added(String),
    Updated(String),
    Removed(String),
    Loaded,
    Saved,
}

/// An ordered collection of records backed by one JSON file.
///
/// Memory is the working copy; the file is rewritten wholesale on `save()`.
pub struct RecordStore<R: StoredRecord> {
    path: PathBuf,
    records: Vec<R>,
    subscribers: Vec<mpsc::Sender<StoreEvent>>,
    /// Bytes last read from or written to `path`
    last_bytes: Option<Vec<u8>>,
    last_outcome: LoadOutcome,
    lock_timeout: Duration,
}

pub type IssueStore = RecordStore<Issue>;
pub type AgentTaskStore = RecordStore<AgentTask>;

impl<R: StoredRecord> RecordStore<R> {
    /// An empty store for `path`. Nothing is read until `load()`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RecordStore {
            path: path.into(),
            records: Vec::new(),
            subscribers: Vec::new(),
            last_bytes: None,
            last_outcome: LoadOutcome::Fresh,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Construct and load in one step
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);
        store.load();
        store
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn data_dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    pub fn last_outcome(&self) -> LoadOutcome {
        self.last_outcome
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Register a new observer. Dropped receivers are pruned on the next event.
    pub fn subscribe(&mut self) -> mpsc::Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Append a record. Memory only; call `save()` to persist.
    pub fn add(&mut self, mut record: R) -> Result<(), StoreError> {
        if self.contains(record.id()) {
            return Err(StoreError::DuplicateId(record.id().to_string()));
        }
        let created = record.created_at();
        if record.updated_at().is_some_and(|u| u < created) {
            record.touch(created);
        }
        let id = record.id().to_string();
        self.records.push(record);
        self.emit(StoreEvent::Added(id));
        Ok(())
    }

    /// Shallow-merge `patch` into the record and stamp `updated_at`.
    /// Returns false (and changes nothing) if the id is unknown.
    pub fn update(&mut self, id: &str, patch: R::Patch) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id() == id) else {
            return false;
        };
        record.apply(patch);
        let now = Utc::now().max(record.created_at());
        record.touch(now);
        self.emit(StoreEvent::Updated(id.to_string()));
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<R> {
        let idx = self.records.iter().position(|r| r.id() == id)?;
        let removed = self.records.remove(idx);
        self.emit(StoreEvent::Removed(id.to_string()));
        Some(removed)
    }

    /// Replace the in-memory collection with the file's contents.
    ///
    /// Never fails: a missing file is an empty store, and a file that cannot be
    /// read or parsed resets the store to empty after its bytes are copied
    /// into the recovery log.
    pub fn load(&mut self) -> LoadOutcome {
        let outcome = match fs::read(&self.path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.records.clear();
                self.last_bytes = None;
                LoadOutcome::Fresh
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "could not read store: {}", e);
                self.records.clear();
                self.last_bytes = None;
                LoadOutcome::Recovered
            }
            Ok(bytes) => {
                let outcome = match serde_json::from_slice::<Vec<R>>(&bytes) {
                    Ok(records) => {
                        let n = records.len();
                        self.records = records;
                        LoadOutcome::Loaded(n)
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %self.path.display(),
                            "store file is corrupt, starting empty: {}",
                            e
                        );
                        recovery::log_recovery(
                            self.data_dir(),
                            RecoveryEntry::new(
                                RecoveryCategory::Parser,
                                format!("{} could not be parsed", self.file_name()),
                            )
                            .field("Error", e.to_string())
                            .body(String::from_utf8_lossy(&bytes)),
                        );
                        self.records.clear();
                        LoadOutcome::Recovered
                    }
                };
                self.last_bytes = Some(bytes);
                outcome
            }
        };
        self.last_outcome = outcome;
        self.emit(StoreEvent::Loaded);
        outcome
    }

    /// Reload when the file on disk differs from what this store last read or wrote.
    pub fn reload_if_changed(&mut self) -> bool {
        let current = fs::read(&self.path).ok();
        if current == self.last_bytes {
            return false;
        }
        tracing::debug!(path = %self.path.display(), "store changed on disk, reloading");
        self.load();
        true
    }

    /// Serialize the whole collection and atomically replace the backing file.
    ///
    /// On failure the payload goes to the recovery log and the in-memory state
    /// is left as it was.
    pub fn save(&mut self) -> Result<(), PersistenceError> {
        let payload = serde_json::to_string_pretty(&self.records)?;
        if let Err(e) = self.write_payload(payload.as_bytes()) {
            tracing::error!(path = %self.path.display(), "save failed: {}", e);
            recovery::log_recovery(
                self.data_dir(),
                RecoveryEntry::new(
                    RecoveryCategory::Write,
                    format!("{} could not be saved", self.file_name()),
                )
                .field("Error", e.to_string())
                .body(payload),
            );
            return Err(e);
        }
        self.last_bytes = Some(payload.into_bytes());
        self.emit(StoreEvent::Saved);
        Ok(())
    }

    fn write_payload(&self, payload: &[u8]) -> Result<(), PersistenceError> {
        let dir = self.data_dir();
        fs::create_dir_all(dir).map_err(io_error(dir))?;
        let marker = dir.join(".gitkeep");
        if !marker.exists() {
            fs::write(&marker, "").map_err(io_error(&marker))?;
        }
        let _lock = FileLock::acquire(dir, self.lock_timeout)?;
        recovery::atomic_write(&self.path, payload).map_err(io_error(&self.path))
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistenceError + use<> {
    let path = path.to_path_buf();
    move |source| PersistenceError::Io { path, source }
}

impl RecordStore<Issue> {
    /// Every `(provider, number)` pair held by the store
    pub fn remote_identities(&self) -> HashSet<RemoteIdentity> {
        self.records.iter().filter_map(|i| i.remote).collect()
    }

    /// Resolve a user-supplied reference: full id, display id, or `#N`
    pub fn find_reference(&self, reference: &str) -> Option<&Issue> {
        self.get(reference)
            .or_else(|| self.records.iter().find(|i| i.matches_reference(reference)))
    }
}

impl RecordStore<AgentTask> {
    /// Every task linked to pull request `number`
    pub fn get_by_pr(&self, number: u64) -> Vec<&AgentTask> {
        self.records
            .iter()
            .filter(|t| t.pull_request_number == Some(number))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::agent::AgentTaskStatus;
    use crate::model::issue::{IssueStatus, ProviderKind};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn issue(id: &str, title: &str) -> Issue {
        let mut issue = Issue::new(title, "");
        issue.id = id.to_string();
        issue
    }

    fn store_in(tmp: &TempDir) -> IssueStore {
        IssueStore::new(tmp.path().join(".openissue").join("issues.json"))
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        store.add(issue("a1", "First")).unwrap();
        assert_eq!(
            store.add(issue("a1", "Again")),
            Err(StoreError::DuplicateId("a1".into()))
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a1").unwrap().title, "First");
    }

    #[test]
    fn update_missing_is_noop() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        let events = store.subscribe();
        assert!(!store.update("nope", IssuePatch::status(IssueStatus::Closed)));
        assert!(store.is_empty());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn update_stamps_updated_at_not_before_created_at() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        let mut future = issue("f1", "From the future");
        future.created_at = Utc::now() + chrono::Duration::days(2);
        store.add(future).unwrap();
        assert!(store.get("f1").unwrap().updated_at >= store.get("f1").unwrap().created_at);

        store.update("f1", IssuePatch::status(IssueStatus::Closed));
        let stored = store.get("f1").unwrap();
        assert_eq!(stored.status, IssueStatus::Closed);
        assert!(stored.updated_at >= stored.created_at);
    }

    #[test]
    fn update_refreshes_timestamp() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        let mut old = issue("o1", "Old");
        old.created_at = Utc::now() - chrono::Duration::days(3);
        old.updated_at = old.created_at;
        store.add(old).unwrap();
        let before = store.get("o1").unwrap().updated_at;
        store.update(
            "o1",
            IssuePatch {
                title: Some("Renamed".into()),
                ..Default::default()
            },
        );
        assert!(store.get("o1").unwrap().updated_at > before);
        assert_eq!(store.get("o1").unwrap().title, "Renamed");
    }

    #[test]
    fn remove_returns_record() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        store.add(issue("a1", "One")).unwrap();
        assert_eq!(store.remove("a1").map(|i| i.title), Some("One".to_string()));
        assert!(store.remove("a1").is_none());
    }

    #[test]
    fn save_creates_directory_marker_and_pretty_json() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        store.add(issue("a1", "One")).unwrap();
        store.add(issue("b2", "Two")).unwrap();
        store.save().unwrap();

        let dir = tmp.path().join(".openissue");
        assert!(dir.join(".gitkeep").exists());
        assert!(!dir.join(".lock").exists());
        let content = fs::read_to_string(dir.join("issues.json")).unwrap();
        assert!(content.starts_with("[\n  {\n"));

        let reloaded = IssueStore::open(dir.join("issues.json"));
        assert_eq!(reloaded.last_outcome(), LoadOutcome::Loaded(2));
        let ids: Vec<&str> = reloaded.records().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b2"]);
    }

    #[test]
    fn load_missing_file_is_fresh() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        assert_eq!(store.load(), LoadOutcome::Fresh);
        assert!(store.is_empty());
    }

    #[test]
    fn load_corrupt_file_recovers_empty_and_logs_bytes() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".openissue");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("issues.json"), "[{\"id\": broken").unwrap();

        let store = IssueStore::open(dir.join("issues.json"));
        assert_eq!(store.last_outcome(), LoadOutcome::Recovered);
        assert!(store.is_empty());

        let entries = recovery::read_recovery_entries(&dir, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Parser);
        assert_eq!(entries[0].body, "[{\"id\": broken");
    }

    #[test]
    fn save_failure_keeps_memory_and_reports_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();
        let mut store = IssueStore::new(blocker.join("issues.json"));
        store.add(issue("a1", "One")).unwrap();

        let err = store.save().unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn save_fails_while_another_process_holds_the_lock() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".openissue");
        fs::create_dir_all(&dir).unwrap();
        let _held = FileLock::acquire(&dir, DEFAULT_LOCK_TIMEOUT).unwrap();

        let mut store = IssueStore::new(dir.join("issues.json"))
            .with_lock_timeout(Duration::from_millis(30));
        store.add(issue("a1", "One")).unwrap();
        assert!(matches!(store.save(), Err(PersistenceError::Lock(_))));

        let entries = recovery::read_recovery_entries(&dir, None);
        assert_eq!(entries[0].category, RecoveryCategory::Write);
        assert!(entries[0].body.contains("\"a1\""));
    }

    #[test]
    fn events_arrive_in_mutation_order() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        let rx = store.subscribe();
        store.add(issue("a1", "One")).unwrap();
        store.update("a1", IssuePatch::status(IssueStatus::Closed));
        store.save().unwrap();
        store.remove("a1");
        store.load();

        let events: Vec<StoreEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                StoreEvent::Added("a1".into()),
                StoreEvent::Updated("a1".into()),
                StoreEvent::Saved,
                StoreEvent::Removed("a1".into()),
                StoreEvent::Loaded,
            ]
        );
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        let kept = store.subscribe();
        drop(store.subscribe());
        store.add(issue("a1", "One")).unwrap();
        assert_eq!(store.subscribers.len(), 1);
        assert_eq!(kept.try_recv(), Ok(StoreEvent::Added("a1".into())));
    }

    #[test]
    fn reload_if_changed_picks_up_external_edits() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        store.add(issue("a1", "One")).unwrap();
        store.save().unwrap();
        assert!(!store.reload_if_changed());

        let mut other = IssueStore::open(store.path().to_path_buf());
        other.add(issue("b2", "Two")).unwrap();
        other.save().unwrap();

        assert!(store.reload_if_changed());
        assert_eq!(store.len(), 2);
        assert!(!store.reload_if_changed());
    }

    #[test]
    fn find_reference_accepts_display_ids() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp);
        let mut remote = issue("gh-42", "Remote");
        remote.remote = Some(RemoteIdentity {
            provider: ProviderKind::Github,
            number: 42,
        });
        store.add(remote).unwrap();
        store.add(issue("abcdef1234", "Local")).unwrap();

        assert_eq!(store.find_reference("#42").unwrap().id, "gh-42");
        assert_eq!(store.find_reference("gh-42").unwrap().id, "gh-42");
        assert_eq!(store.find_reference("abcdef12").unwrap().id, "abcdef1234");
        assert!(store.find_reference("#7").is_none());
        assert_eq!(store.remote_identities().len(), 1);
    }

    #[test]
    fn agent_tasks_by_pull_request() {
        let tmp = TempDir::new().unwrap();
        let mut store = AgentTaskStore::new(tmp.path().join("agent-tasks.json"));
        for (id, pr) in [("s1", Some(3)), ("s2", Some(3)), ("s3", None)] {
            store
                .add(AgentTask {
                    id: id.into(),
                    title: "Task".into(),
                    pull_request_number: pr,
                    repository: "octo/repo".into(),
                    status: AgentTaskStatus::InProgress,
                    created_at: Utc::now(),
                    updated_at: None,
                })
                .unwrap();
        }
        let ids: Vec<&str> = store.get_by_pr(3).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2"]);

        assert!(store.update(
            "s3",
            AgentTaskPatch {
                status: Some(AgentTaskStatus::Completed),
                ..Default::default()
            }
        ));
        assert!(store.get("s3").unwrap().updated_at.is_some());
    }
}
