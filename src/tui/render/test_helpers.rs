use std::sync::{Arc, Mutex};

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::project_io::init_project;
use crate::model::comment::Comment;
use crate::model::issue::{Issue, ProviderKind, RemoteIdentity};
use crate::ops::session::Session;
use crate::provider::{RemoteOperationError, RemoteProvider};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An initialized, empty project in a temp dir with no remote
pub fn app_in_temp_project() -> (TempDir, App) {
    let tmp = TempDir::new().unwrap();
    let project = init_project(tmp.path()).unwrap();
    let app = App::new(Session::local(project));
    (tmp, app)
}

/// Like [`app_in_temp_project`], connected to `remote`
pub fn remote_app(remote: FakeRemote) -> (TempDir, App, Arc<FakeRemote>) {
    let tmp = TempDir::new().unwrap();
    let project = init_project(tmp.path()).unwrap();
    let remote = Arc::new(remote);
    let mut session = Session::local(project);
    session.provider = Some(remote.clone());
    let app = App::new(session);
    (tmp, app, remote)
}

/// In-memory GitHub tracker for `octo/repo`. Records every mutation.
#[derive(Default)]
pub struct FakeRemote {
    create_result: Mutex<Option<Result<u64, RemoteOperationError>>>,
    listing: Mutex<Vec<Issue>>,
    created: Mutex<Vec<String>>,
    closed: Mutex<Vec<u64>>,
}

impl FakeRemote {
    /// The next `create_remote` returns `result`
    pub fn creating(result: Result<u64, RemoteOperationError>) -> Self {
        FakeRemote {
            create_result: Mutex::new(Some(result)),
            ..Default::default()
        }
    }

    /// Issue `number` as `list_remote` would return it
    pub fn listed(number: u64, title: &str) -> Issue {
        let mut issue = Issue::new(title, "");
        issue.id = ProviderKind::Github.synthesize_id(number);
        issue.remote = Some(RemoteIdentity {
            provider: ProviderKind::Github,
            number,
        });
        issue
    }

    pub fn set_listing(&self, issues: Vec<Issue>) {
        *self.listing.lock().unwrap() = issues;
    }

    /// Titles passed to `create_remote`
    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    pub fn closed(&self) -> Vec<u64> {
        self.closed.lock().unwrap().clone()
    }
}

impl RemoteProvider for FakeRemote {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Github
    }

    fn repo(&self) -> &str {
        "octo/repo"
    }

    fn list_remote(&self) -> Vec<Issue> {
        self.listing.lock().unwrap().clone()
    }

    fn create_remote(
        &self,
        title: &str,
        _body: &str,
        _labels: &[String],
    ) -> Result<u64, RemoteOperationError> {
        self.created.lock().unwrap().push(title.to_string());
        self.create_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| {
                Err(RemoteOperationError::Failed {
                    command: "gh issue create".into(),
                    stderr: "no response queued".into(),
                })
            })
    }

    fn close_remote(&self, number: u64) -> Result<(), RemoteOperationError> {
        self.closed.lock().unwrap().push(number);
        Ok(())
    }

    fn reopen_remote(&self, _number: u64) -> Result<(), RemoteOperationError> {
        Ok(())
    }

    fn fetch_comments(&self, number: u64) -> Vec<Comment> {
        vec![Comment {
            id: format!("c{}", number),
            author: "octocat".into(),
            body: "Seen this too".into(),
            created_at: None,
        }]
    }
}
