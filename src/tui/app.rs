use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use chrono::Utc;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::config_io;
use crate::io::file_index;
use crate::io::images::{self, PastedImage};
use crate::io::project_io::{discover_project, load_project};
use crate::io::store::StoreEvent;
use crate::io::watcher::{FileEvent, StoreWatcher};
use crate::model::agent::{AgentTask, AgentTaskStatus};
use crate::model::comment::Comment;
use crate::model::issue::{Issue, IssueStats, IssueStatus, ProviderKind};
use crate::ops::session::Session;
use crate::ops::suggest::{Field, SuggestionEngine};
use crate::ops::sync::{self, ActionOutcome, IssueAction, IssueDraft};

use super::input;
use super::jobs::{Job, JobContext, JobResult, JobRunner};
use super::render;
use super::text_field::TextField;
use super::theme::Theme;

/// Which screen is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Read,
    Edit,
    Agents,
}

/// The title/body form used for both new and existing issues
#[derive(Debug, Clone)]
pub struct EditorState {
    /// None when creating a new issue
    pub editing_id: Option<String>,
    pub title: TextField,
    pub body: TextField,
    pub field: Field,
}

impl EditorState {
    pub fn active(&self) -> &TextField {
        match self.field {
            Field::Title => &self.title,
            Field::Body => &self.body,
        }
    }

    pub fn active_mut(&mut self) -> &mut TextField {
        match self.field {
            Field::Title => &mut self.title,
            Field::Body => &mut self.body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentsState {
    /// The issue has no identity on the connected remote
    Unavailable,
    Loading,
    Loaded(Vec<Comment>),
}

#[derive(Debug, Clone)]
pub struct ReadState {
    pub issue_id: String,
    pub scroll: usize,
    /// Referenced files with their contents (None when unreadable)
    pub excerpts: Vec<(String, Option<String>)>,
    pub comments: CommentsState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentTab {
    #[default]
    All,
    Active,
    Done,
    Failed,
}

impl AgentTab {
    pub const ALL: [AgentTab; 4] = [AgentTab::All, AgentTab::Active, AgentTab::Done, AgentTab::Failed];

    pub fn label(self) -> &'static str {
        match self {
            AgentTab::All => "All",
            AgentTab::Active => "Active",
            AgentTab::Done => "Done",
            AgentTab::Failed => "Failed",
        }
    }

    pub fn includes(self, status: AgentTaskStatus) -> bool {
        match self {
            AgentTab::All => true,
            AgentTab::Active => status.is_active(),
            AgentTab::Done => status == AgentTaskStatus::Completed,
            AgentTab::Failed => status == AgentTaskStatus::Failed,
        }
    }

    fn index(self) -> usize {
        AgentTab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> AgentTab {
        AgentTab::ALL[(self.index() + 1) % AgentTab::ALL.len()]
    }

    pub fn prev(self) -> AgentTab {
        AgentTab::ALL[(self.index() + AgentTab::ALL.len() - 1) % AgentTab::ALL.len()]
    }
}

/// The "create agent task" dialog
#[derive(Debug, Clone, Default)]
pub struct AgentCreateState {
    pub description: TextField,
    /// 0 is "no issue"; n is the (n-1)th entry of `App::linkable_issues`
    pub linked: usize,
}

#[derive(Debug, Clone)]
pub struct AgentLogState {
    pub id: String,
    /// None while loading
    pub content: Option<String>,
    pub scroll: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AgentViewState {
    pub tab: AgentTab,
    pub cursor: usize,
    pub create: Option<AgentCreateState>,
    pub log: Option<AgentLogState>,
    pub refreshing: bool,
}

/// Main application state
pub struct App {
    pub session: Session,
    pub view: View,
    pub theme: Theme,
    pub show_key_hints: bool,
    pub should_quit: bool,
    /// Selected row of the issue list
    pub cursor: usize,
    /// First visible row of the issue list
    pub scroll: usize,
    pub editor: Option<EditorState>,
    pub suggestions: SuggestionEngine,
    pub read: Option<ReadState>,
    pub agents: AgentViewState,
    /// Last status-row message
    pub message: Option<String>,
    pub syncing: bool,
    pub jobs: JobRunner,
    store_events: Receiver<StoreEvent>,
}

impl App {
    pub fn new(mut session: Session) -> Self {
        let theme = Theme::from_config(&session.project.config.ui);
        let show_key_hints = session.project.config.ui.show_key_hints;
        let store_events = session.issues.subscribe();
        let jobs = JobRunner::new(JobContext {
            provider: session.provider.clone(),
            agents: session.agents.clone(),
            runner: session.runner.clone(),
            root: session.project.root.clone(),
        });
        App {
            session,
            view: View::List,
            theme,
            show_key_hints,
            should_quit: false,
            cursor: 0,
            scroll: 0,
            editor: None,
            suggestions: SuggestionEngine::new(),
            read: None,
            agents: AgentViewState::default(),
            message: None,
            syncing: false,
            jobs,
            store_events,
        }
    }

    pub fn issues(&self) -> &[Issue] {
        self.session.issues.records()
    }

    pub fn stats(&self) -> IssueStats {
        IssueStats::of(self.issues())
    }

    pub fn selected_issue(&self) -> Option<&Issue> {
        self.issues().get(self.cursor)
    }

    fn provider_kind(&self) -> Option<ProviderKind> {
        self.session.provider().map(|p| p.kind())
    }

    fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    // -----------------------------------------------------------------------
    // List
    // -----------------------------------------------------------------------

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.issues().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    pub fn jump_to(&mut self, index: usize) {
        self.cursor = index.min(self.issues().len().saturating_sub(1));
    }

    fn select_issue(&mut self, id: &str) {
        if let Some(index) = self.issues().iter().position(|i| i.id == id) {
            self.cursor = index;
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.issues().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    /// Import remote issues in the background
    pub fn start_sync(&mut self) {
        if self.session.provider.is_none() {
            return;
        }
        self.syncing = true;
        self.jobs.spawn(Job::Sync);
    }

    /// Flip open/closed on the selected issue; the remote mirror runs in the background
    pub fn toggle_selected(&mut self) {
        let Some(issue) = self.selected_issue() else {
            return;
        };
        let id = issue.id.clone();
        let target = issue.status.toggled();
        let updated = match sync::apply_status(&mut self.session.issues, &id, target) {
            Ok(updated) => updated,
            Err(e) => {
                self.set_message(format!("Could not update {}: {}", id, e));
                return;
            }
        };
        match sync::status_target(&updated, self.provider_kind()) {
            Some(number) => self.jobs.spawn(Job::SetStatus {
                id,
                number,
                status: target,
            }),
            None => self.set_message(sync::status_outcome(&updated, target, None).message()),
        }
    }

    // -----------------------------------------------------------------------
    // Read view
    // -----------------------------------------------------------------------

    pub fn open_read(&mut self) {
        let Some(issue) = self.selected_issue() else {
            return;
        };
        let root = &self.session.project.root;
        let excerpts = issue
            .files
            .iter()
            .map(|f| (f.to_string(), file_index::read_file_content(root, f)))
            .collect();
        let issue_id = issue.id.clone();
        let target = sync::status_target(issue, self.provider_kind());

        let comments = match target {
            Some(number) => {
                self.jobs.spawn(Job::Comments {
                    id: issue_id.clone(),
                    number,
                });
                self.set_message("Loading comments...");
                CommentsState::Loading
            }
            None => {
                self.message = None;
                CommentsState::Unavailable
            }
        };
        self.read = Some(ReadState {
            issue_id,
            scroll: 0,
            excerpts,
            comments,
        });
        self.view = View::Read;
    }

    pub fn close_read(&mut self) {
        self.read = None;
        self.message = None;
        self.view = View::List;
    }

    pub fn read_issue(&self) -> Option<&Issue> {
        self.read
            .as_ref()
            .and_then(|r| self.session.issues.get(&r.issue_id))
    }

    pub fn scroll_read(&mut self, delta: isize) {
        if let Some(read) = &mut self.read {
            read.scroll = (read.scroll as isize + delta).max(0) as usize;
        }
    }

    // -----------------------------------------------------------------------
    // Editor
    // -----------------------------------------------------------------------

    /// Open the editor on `id`, or on a blank draft when None
    pub fn open_editor(&mut self, id: Option<String>) {
        let existing = id.as_deref().and_then(|id| self.session.issues.get(id));
        let (title, body) = existing
            .map(|i| (i.title.clone(), i.body.clone()))
            .unwrap_or_default();
        self.editor = Some(EditorState {
            editing_id: existing.map(|i| i.id.clone()),
            title: TextField::new(title),
            body: TextField::new(body),
            field: Field::Title,
        });
        self.suggestions.cancel();
        self.message = None;
        self.view = View::Edit;
    }

    /// Open the selected issue, or a blank draft on an empty list
    pub fn edit_selected(&mut self) {
        let id = self.selected_issue().map(|i| i.id.clone());
        self.open_editor(id);
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
        self.suggestions.cancel();
        self.view = View::List;
    }

    pub fn switch_field(&mut self) {
        if let Some(editor) = &mut self.editor {
            editor.field = match editor.field {
                Field::Title => Field::Body,
                Field::Body => Field::Title,
            };
            self.suggestions.focus_field(editor.field);
        }
    }

    /// Re-run trigger detection on the active field after its text changed
    pub fn editor_input_changed(&mut self) {
        let Some(editor) = &self.editor else {
            return;
        };
        let lookup = self.suggestions.on_input(
            editor.field,
            editor.active().text(),
            self.session.issues.records(),
        );
        if let Some(lookup) = lookup {
            self.jobs.spawn(Job::FileLookup {
                seq: lookup.seq,
                query: lookup.query,
            });
        }
    }

    /// Insert the highlighted suggestion. False when nothing was showing.
    pub fn accept_suggestion(&mut self) -> bool {
        let Some(editor) = &mut self.editor else {
            return false;
        };
        match self.suggestions.accept(editor.field, editor.active().text()) {
            Some(next) => {
                editor.active_mut().set_text(next);
                true
            }
            None => false,
        }
    }

    /// Persist the form. New issues are mirrored to the remote in the background.
    pub fn save_editor(&mut self) {
        self.suggestions.cancel();
        let Some(editor) = &self.editor else {
            return;
        };
        let title = editor.title.text().trim().to_string();
        let body = editor.body.text().to_string();
        let editing_id = editor.editing_id.clone();
        if title.is_empty() {
            self.set_message("Title is required");
            return;
        }

        match editing_id {
            Some(id) => {
                let result = sync::edit_issue(&mut self.session.issues, &id, Some(title), Some(body));
                match result {
                    Ok(outcome) => self.set_message(outcome.message()),
                    Err(e) => self.set_message(format!("Save failed: {}", e)),
                }
            }
            None => match sync::create_local(&mut self.session.issues, IssueDraft::new(title, body)) {
                Ok(issue) => {
                    self.select_issue(&issue.id);
                    if self.session.provider.is_some() {
                        self.jobs.spawn(Job::CreateRemote {
                            id: issue.id.clone(),
                            title: issue.title.clone(),
                            body: issue.body.clone(),
                            labels: issue.labels.iter().cloned().collect(),
                        });
                    }
                    let outcome = ActionOutcome::LocalOnly {
                        action: IssueAction::Created,
                        reference: issue.reference_token(),
                    };
                    self.set_message(outcome.message());
                }
                Err(e) => self.set_message(format!("Save failed: {}", e)),
            },
        }
        self.close_editor();
    }

    /// Bracketed paste. Image data URLs become attachments; a blank paste
    /// falls back to the clipboard image.
    pub fn paste(&mut self, text: &str) {
        if self.view == View::Agents {
            if let Some(create) = &mut self.agents.create {
                create.description.insert_str(&text.replace(['\r', '\n'], " "));
            }
            return;
        }
        if self.view != View::Edit {
            return;
        }
        if images::is_image_data_url(text) {
            match images::decode_data_url(text) {
                Ok(image) => self.attach_image(image),
                Err(e) => self.set_message(format!("Paste failed: {}", e)),
            }
            return;
        }
        if text.trim().is_empty() {
            self.paste_clipboard_image();
            return;
        }
        let Some(editor) = &mut self.editor else {
            return;
        };
        let clean = text.replace('\r', "");
        match editor.field {
            Field::Title => editor.title.insert_str(&clean.replace('\n', " ")),
            Field::Body => editor.body.insert_str(&clean),
        }
        self.editor_input_changed();
    }

    /// Ctrl+V: attach the clipboard image, if there is one
    pub fn paste_clipboard_image(&mut self) {
        match images::read_clipboard_image(self.session.runner.as_ref()) {
            Some(image) => self.attach_image(image),
            None => self.set_message("No image on the clipboard"),
        }
    }

    fn attach_image(&mut self, image: PastedImage) {
        let project = &self.session.project;
        let saved = images::save_image(
            &project.root,
            &project.images_dir(),
            &image,
            Utc::now().timestamp_millis(),
        );
        let path = match saved {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("could not save pasted image: {}", e);
                self.set_message(format!("Paste failed: {}", e));
                return;
            }
        };
        let Some(editor) = &mut self.editor else {
            return;
        };
        let markdown = images::image_markdown(&path);
        match editor.field {
            Field::Title => editor.title.insert_str(markdown.trim()),
            Field::Body => editor.body.insert_str(&markdown),
        }
        self.set_message(format!("Attached {}", path));
    }

    // -----------------------------------------------------------------------
    // Agent view
    // -----------------------------------------------------------------------

    pub fn open_agents(&mut self) {
        self.view = View::Agents;
        self.message = None;
        self.refresh_agents();
    }

    pub fn close_agents(&mut self) {
        self.agents.create = None;
        self.agents.log = None;
        self.view = View::List;
    }

    pub fn refresh_agents(&mut self) {
        if self.session.agents.is_none() {
            self.set_message("Agent tasks need a GitHub remote");
            return;
        }
        self.agents.refreshing = true;
        self.jobs.spawn(Job::AgentList);
    }

    /// Tasks shown under the current tab, newest first
    pub fn visible_agent_tasks(&self) -> Vec<&AgentTask> {
        let tab = self.agents.tab;
        let mut tasks: Vec<&AgentTask> = self
            .session
            .agent_tasks
            .records()
            .iter()
            .filter(|t| tab.includes(t.status))
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks
    }

    pub fn selected_agent_task(&self) -> Option<&AgentTask> {
        self.visible_agent_tasks().get(self.agents.cursor).copied()
    }

    pub fn move_agent_cursor(&mut self, delta: isize) {
        let len = self.visible_agent_tasks().len();
        self.agents.cursor = if len == 0 {
            0
        } else {
            (self.agents.cursor as isize + delta).clamp(0, len as isize - 1) as usize
        };
    }

    pub fn set_agent_tab(&mut self, tab: AgentTab) {
        self.agents.tab = tab;
        self.agents.cursor = 0;
    }

    /// Open issues that an agent task can be linked to
    pub fn linkable_issues(&self) -> Vec<&Issue> {
        self.issues()
            .iter()
            .filter(|i| i.status == IssueStatus::Open)
            .filter(|i| i.remote_number_for(ProviderKind::Github).is_some())
            .collect()
    }

    pub fn open_agent_create(&mut self) {
        self.agents.create = Some(AgentCreateState::default());
    }

    pub fn move_agent_link(&mut self, delta: isize) {
        let options = self.linkable_issues().len() + 1;
        if let Some(create) = &mut self.agents.create {
            create.linked = (create.linked as isize + delta).rem_euclid(options as isize) as usize;
        }
    }

    /// Start the agent task described in the dialog. Ignored while the description is blank.
    pub fn submit_agent_create(&mut self) {
        let Some(create) = &self.agents.create else {
            return;
        };
        let description = create.description.text().trim().to_string();
        if description.is_empty() {
            return;
        }
        let issue_number = create.linked.checked_sub(1).and_then(|i| {
            self.linkable_issues()
                .get(i)
                .and_then(|issue| issue.remote_number_for(ProviderKind::Github))
        });
        self.agents.create = None;
        self.set_message("Starting agent task...");
        self.jobs.spawn(Job::AgentCreate {
            description,
            issue_number,
        });
    }

    pub fn view_selected_agent_log(&mut self) {
        let Some(task) = self.selected_agent_task() else {
            return;
        };
        let id = task.id.clone();
        self.agents.log = Some(AgentLogState {
            id: id.clone(),
            content: None,
            scroll: 0,
        });
        self.jobs.spawn(Job::AgentLog { id });
    }

    // -----------------------------------------------------------------------
    // Event loop plumbing
    // -----------------------------------------------------------------------

    /// Apply finished background work and pending store events
    pub fn tick(&mut self) {
        for result in self.jobs.drain() {
            self.apply_job_result(result);
        }
        if self.store_events.try_iter().count() > 0 {
            self.on_store_changed();
        }
    }

    fn on_store_changed(&mut self) {
        self.clamp_cursor();
        if self.view == View::Read && self.read_issue().is_none() {
            self.close_read();
        }
        if let Some(editing) = self.editor.as_ref().and_then(|e| e.editing_id.as_deref())
            && !self.session.issues.contains(editing)
        {
            self.close_editor();
            self.set_message("The issue was removed");
        }
    }

    pub fn apply_job_result(&mut self, result: JobResult) {
        match result {
            JobResult::Synced(listing) => {
                self.syncing = false;
                let provider = self.session.remote_label();
                let report = sync::merge_remote(&mut self.session.issues, listing);
                if !report.persisted {
                    self.set_message("Sync save failed (see `oi recovery`)");
                } else if report.added > 0 {
                    self.set_message(format!(
                        "Imported {} issue{} from {}",
                        report.added,
                        if report.added == 1 { "" } else { "s" },
                        provider
                    ));
                }
            }
            JobResult::Created {
                id,
                provider,
                result,
            } => match sync::attach_remote(&mut self.session.issues, &id, provider, result) {
                Ok(outcome) => self.set_message(outcome.message()),
                Err(e) => self.set_message(format!("Save failed: {}", e)),
            },
            JobResult::StatusChanged { id, status, result } => match self.session.issues.get(&id) {
                Some(issue) => {
                    let message = sync::status_outcome(issue, status, Some(result)).message();
                    self.set_message(message);
                }
                None => tracing::debug!(id, "status result for a removed issue"),
            },
            JobResult::Comments { id, comments } => {
                if let Some(read) = &mut self.read
                    && read.issue_id == id
                {
                    read.comments = CommentsState::Loaded(comments);
                    if self.message.as_deref() == Some("Loading comments...") {
                        self.message = None;
                    }
                }
            }
            JobResult::Files { seq, result } => {
                self.suggestions.complete_file_lookup(seq, result);
            }
            JobResult::AgentTasks(listing) => {
                self.agents.refreshing = false;
                match sync::merge_agent_tasks(&mut self.session.agent_tasks, listing) {
                    Ok(report) if report.added + report.updated > 0 => self.set_message(format!(
                        "Agent tasks: {} new, {} updated",
                        report.added, report.updated
                    )),
                    Ok(_) => {}
                    Err(e) => self.set_message(format!("Save failed: {}", e)),
                }
                self.move_agent_cursor(0);
            }
            JobResult::AgentCreated(Ok(task)) => {
                let title = task.title.clone();
                match sync::record_agent_task(&mut self.session.agent_tasks, task) {
                    Ok(()) => self.set_message(format!("Started agent task: {}", title)),
                    Err(e) => self.set_message(format!("Save failed: {}", e)),
                }
            }
            JobResult::AgentCreated(Err(e)) => {
                self.set_message(format!("Agent task failed: {}", e));
            }
            JobResult::AgentLog { id, result } => {
                if let Some(log) = &mut self.agents.log
                    && log.id == id
                {
                    log.content = Some(match result {
                        Ok(text) => text,
                        Err(e) => format!("Could not load the log: {}", e),
                    });
                }
            }
            JobResult::Unavailable(reason) => {
                self.syncing = false;
                self.agents.refreshing = false;
                self.set_message(reason);
            }
        }
    }

    /// Out-of-band edits under `.openissue/`
    pub fn on_files_changed(&mut self, paths: &[PathBuf]) {
        for path in paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match name {
                "issues.json" => {
                    self.session.issues.reload_if_changed();
                }
                "agent-tasks.json" => {
                    if self.session.agent_tasks.reload_if_changed() {
                        self.move_agent_cursor(0);
                    }
                }
                "config.toml" => self.reload_config(),
                _ => {}
            }
        }
    }

    fn reload_config(&mut self) {
        match config_io::read_config(&self.session.project.data_dir) {
            Ok((config, _)) => {
                self.theme = Theme::from_config(&config.ui);
                self.show_key_hints = config.ui.show_key_hints;
                self.session.project.config = config;
            }
            Err(e) => tracing::warn!("ignoring config change: {}", e),
        }
    }
}

/// Run the TUI against the project containing `start`
pub fn run(start: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let root = discover_project(start)?;
    let project = load_project(&root)?;
    let watcher = match StoreWatcher::start(&project.data_dir) {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::warn!("file watching disabled: {}", e);
            None
        }
    };

    let mut app = App::new(Session::open(project));
    app.start_sync();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    // Restore terminal
    if enhanced_keys {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&StoreWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.tick();
        if let Some(watcher) = watcher {
            for FileEvent::Changed(paths) in watcher.poll() {
                app.on_files_changed(&paths);
            }
        }

        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
