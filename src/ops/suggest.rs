//! Inline `#issue` and `@file` suggestions for the editor fields.
//!
//! Every lookup is stamped with a sequence number; results are published only
//! if no newer input arrived in the meantime. Issue lookups are answered
//! synchronously from the in-memory records; file lookups are handed back to
//! the caller as a [`FileLookup`] to be run off the UI thread.

use std::sync::LazyLock;

use regex::Regex;

use crate::io::file_index::MAX_FILE_RESULTS;
use crate::model::issue::Issue;

/// Maximum number of issues offered for one `#` lookup
pub const MAX_ISSUE_SUGGESTIONS: usize = 10;

const LABEL_TITLE_MAX: usize = 50;
const LABEL_ID_WIDTH: usize = 12;

static ISSUE_TRIGGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([0-9A-Za-z_]*)$").expect("valid regex"));
static FILE_TRIGGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([0-9A-Za-z_./-]*)$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Issue,
    File,
}

impl TriggerKind {
    fn pattern(self) -> &'static Regex {
        match self {
            TriggerKind::Issue => &ISSUE_TRIGGER,
            TriggerKind::File => &FILE_TRIGGER,
        }
    }

    fn sigil(self) -> char {
        match self {
            TriggerKind::Issue => '#',
            TriggerKind::File => '@',
        }
    }
}

/// The trailing trigger of `text` and its query, if any
pub fn detect_trigger(text: &str) -> Option<(TriggerKind, &str)> {
    [TriggerKind::Issue, TriggerKind::File]
        .into_iter()
        .find_map(|kind| {
            let caps = kind.pattern().captures(text)?;
            Some((kind, caps.get(1).map_or("", |m| m.as_str())))
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionItem {
    Issue {
        id: String,
        /// Inserted after `#` on accept
        display_id: String,
        label: String,
    },
    File(String),
}

impl SuggestionItem {
    fn from_issue(issue: &Issue) -> Self {
        SuggestionItem::Issue {
            id: issue.id.clone(),
            display_id: issue.display_id(),
            label: issue_label(issue),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SuggestionItem::Issue { label, .. } => label,
            SuggestionItem::File(path) => path,
        }
    }

    fn insertion(&self) -> &str {
        match self {
            SuggestionItem::Issue { display_id, .. } => display_id,
            SuggestionItem::File(path) => path,
        }
    }
}

/// ` [ ] #42          Fix the thing ` with long titles cut at 50 characters
pub fn issue_label(issue: &Issue) -> String {
    let title = if issue.title.chars().count() > LABEL_TITLE_MAX {
        let cut: String = issue.title.chars().take(LABEL_TITLE_MAX).collect();
        format!("{}...", cut.trim_end())
    } else {
        issue.title.clone()
    };
    format!(
        " {} {:<width$} {} ",
        issue.status.checkbox(),
        issue.reference_token(),
        title,
        width = LABEL_ID_WIDTH
    )
}

/// Issues whose id, title or remote number contains `query` (case-insensitive), in store order
pub fn filter_issues<'a>(issues: &'a [Issue], query: &str) -> Vec<&'a Issue> {
    let query = query.to_lowercase();
    issues
        .iter()
        .filter(|issue| {
            issue.id.to_lowercase().contains(&query)
                || issue.title.to_lowercase().contains(&query)
                || issue
                    .remote
                    .is_some_and(|r| r.number.to_string().contains(&query))
        })
        .take(MAX_ISSUE_SUGGESTIONS)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SuggestionState {
    #[default]
    Idle,
    Pending {
        kind: TriggerKind,
        field: Field,
        seq: u64,
    },
    Showing {
        kind: TriggerKind,
        field: Field,
        items: Vec<SuggestionItem>,
        selected: usize,
    },
}

/// A file listing the caller must run and feed back through
/// [`SuggestionEngine::complete_file_lookup`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLookup {
    pub seq: u64,
    pub field: Field,
    pub query: String,
}

#[derive(Debug, Default)]
pub struct SuggestionEngine {
    seq: u64,
    state: SuggestionState,
}

impl SuggestionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SuggestionState {
        &self.state
    }

    pub fn is_showing(&self) -> bool {
        matches!(self.state, SuggestionState::Showing { .. })
    }

    /// Items and selected index while a list is visible
    pub fn visible(&self) -> Option<(&[SuggestionItem], usize)> {
        match &self.state {
            SuggestionState::Showing {
                items, selected, ..
            } => Some((items, *selected)),
            _ => None,
        }
    }

    /// React to the new contents of `field`
    pub fn on_input(&mut self, field: Field, text: &str, issues: &[Issue]) -> Option<FileLookup> {
        self.seq += 1;
        let seq = self.seq;
        match detect_trigger(text) {
            Some((TriggerKind::Issue, query)) => {
                let items = filter_issues(issues, query)
                    .into_iter()
                    .map(SuggestionItem::from_issue)
                    .collect();
                self.publish(TriggerKind::Issue, field, items);
                None
            }
            Some((TriggerKind::File, query)) => {
                self.state = SuggestionState::Pending {
                    kind: TriggerKind::File,
                    field,
                    seq,
                };
                Some(FileLookup {
                    seq,
                    field,
                    query: query.to_string(),
                })
            }
            None => {
                self.state = SuggestionState::Idle;
                None
            }
        }
    }

    /// Apply the result of a file lookup. Stale results are dropped.
    pub fn complete_file_lookup<E: std::fmt::Display>(
        &mut self,
        seq: u64,
        result: Result<Vec<String>, E>,
    ) {
        if seq != self.seq {
            tracing::debug!(seq, current = self.seq, "discarding stale file lookup");
            return;
        }
        let SuggestionState::Pending { field, .. } = self.state else {
            return;
        };
        match result {
            Ok(mut paths) => {
                paths.truncate(MAX_FILE_RESULTS);
                let items = paths.into_iter().map(SuggestionItem::File).collect();
                self.publish(TriggerKind::File, field, items);
            }
            Err(e) => {
                tracing::debug!("file lookup failed: {}", e);
                self.state = SuggestionState::Idle;
            }
        }
    }

    fn publish(&mut self, kind: TriggerKind, field: Field, items: Vec<SuggestionItem>) {
        self.state = if items.is_empty() {
            SuggestionState::Idle
        } else {
            SuggestionState::Showing {
                kind,
                field,
                items,
                selected: 0,
            }
        };
    }

    /// Move the highlight, wrapping at both ends
    pub fn move_selection(&mut self, delta: isize) {
        if let SuggestionState::Showing {
            items, selected, ..
        } = &mut self.state
        {
            let len = items.len() as isize;
            *selected = (*selected as isize + delta).rem_euclid(len) as usize;
        }
    }

    /// Replace the trailing trigger in `text` with the selected item.
    /// Returns the new text, or None when nothing is showing for `field`.
    pub fn accept(&mut self, field: Field, text: &str) -> Option<String> {
        let SuggestionState::Showing {
            kind,
            field: shown_for,
            items,
            selected,
        } = &self.state
        else {
            return None;
        };
        if *shown_for != field {
            return None;
        }
        let item = items.get(*selected)?;
        let replacement = format!("{}{} ", kind.sigil(), item.insertion());
        let next = match kind.pattern().find(text) {
            Some(m) => format!("{}{}", &text[..m.start()], replacement),
            None => format!("{}{}", text, replacement),
        };
        self.dismiss();
        Some(next)
    }

    pub fn cancel(&mut self) {
        self.dismiss();
    }

    /// Hide suggestions when focus moves to another field
    pub fn focus_field(&mut self, field: Field) {
        let current = match &self.state {
            SuggestionState::Idle => return,
            SuggestionState::Pending { field, .. } | SuggestionState::Showing { field, .. } => {
                *field
            }
        };
        if current != field {
            self.dismiss();
        }
    }

    fn dismiss(&mut self) {
        self.seq += 1;
        self.state = SuggestionState::Idle;
    }
}
