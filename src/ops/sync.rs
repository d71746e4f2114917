//! Local-first reconciliation between the issue store and a remote tracker.
//!
//! Every mutating action is applied and saved locally before the remote is
//! contacted; a remote failure never rolls the local change back. The steps
//! are exposed separately so the TUI can run the remote half on a worker
//! thread and apply its result on the UI thread.

use std::fmt;

use indexmap::IndexSet;

use crate::io::file_index::extract_file_refs;
use crate::io::store::{AgentTaskStore, IssueStore, PersistenceError};
use crate::model::agent::{AgentTask, AgentTaskPatch};
use crate::model::issue::{
    Issue, IssuePatch, IssueStatus, ProviderKind, RemoteIdentity, generate_local_id,
};
use crate::provider::{RemoteOperationError, RemoteProvider};

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("no issue matches {0}")]
    NotFound(String),
    #[error("title is required")]
    EmptyTitle,
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Result of merging a remote listing into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub added: usize,
    pub listed: usize,
    /// False only when records were added but the save failed
    pub persisted: bool,
}

/// A new issue as entered by the user
#[derive(Debug, Clone, Default)]
pub struct IssueDraft {
    pub title: String,
    pub body: String,
    pub labels: IndexSet<String>,
}

impl IssueDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        IssueDraft {
            title: title.into(),
            body: body.into(),
            labels: IndexSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueAction {
    Created,
    Updated,
    Closed,
    Reopened,
}

impl IssueAction {
    fn for_status(status: IssueStatus) -> Self {
        match status {
            IssueStatus::Open => IssueAction::Reopened,
            IssueStatus::Closed => IssueAction::Closed,
        }
    }
}

/// How far a mutating action got
#[derive(Debug)]
pub enum ActionOutcome {
    /// Applied locally; no remote applies to this record
    LocalOnly {
        action: IssueAction,
        reference: String,
    },
    /// Applied locally and on the remote
    Mirrored {
        action: IssueAction,
        provider: ProviderKind,
        number: u64,
    },
    /// Applied locally; the remote call failed
    RemoteFailed {
        action: IssueAction,
        reference: String,
        error: RemoteOperationError,
    },
}

impl ActionOutcome {
    /// Status-line text for this outcome
    pub fn message(&self) -> String {
        match self {
            ActionOutcome::LocalOnly { action, reference } => match action {
                IssueAction::Created => format!("Created todo {}", reference),
                IssueAction::Updated => format!("Updated todo {}", reference),
                IssueAction::Closed => format!("Closed {}", reference),
                IssueAction::Reopened => format!("Reopened {}", reference),
            },
            ActionOutcome::Mirrored {
                action,
                provider,
                number,
            } => match action {
                IssueAction::Created | IssueAction::Updated => {
                    format!("Created todo #{} on {}", number, provider)
                }
                IssueAction::Closed => format!("Closed #{} on {}", number, provider),
                IssueAction::Reopened => format!("Reopened #{} on {}", number, provider),
            },
            ActionOutcome::RemoteFailed {
                action, reference, ..
            } => match action {
                IssueAction::Created | IssueAction::Updated => {
                    format!("Created todo {} (remote sync failed)", reference)
                }
                IssueAction::Closed => "Closed locally (remote sync failed)".to_string(),
                IssueAction::Reopened => "Reopened locally (remote sync failed)".to_string(),
            },
        }
    }

    pub fn remote_error(&self) -> Option<&RemoteOperationError> {
        match self {
            ActionOutcome::RemoteFailed { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Pull the remote listing and add every record not yet known locally
pub fn sync_from_remote(store: &mut IssueStore, provider: &dyn RemoteProvider) -> SyncReport {
    let listing = provider.list_remote();
    merge_remote(store, listing)
}

/// Add remote records whose `(provider, number)` and synthesized id are both
/// absent, then save once if anything was added. Never fails.
pub fn merge_remote(store: &mut IssueStore, listing: Vec<Issue>) -> SyncReport {
    let mut known = store.remote_identities();
    let mut report = SyncReport {
        listed: listing.len(),
        persisted: true,
        ..Default::default()
    };

    for issue in listing {
        let Some(identity) = issue.remote else {
            continue;
        };
        if known.contains(&identity) || store.contains(&issue.id) {
            continue;
        }
        if store.add(issue).is_ok() {
            known.insert(identity);
            report.added += 1;
        }
    }

    if report.added > 0
        && let Err(e) = store.save()
    {
        tracing::warn!("saving synced issues failed: {}", e);
        report.persisted = false;
    }
    tracing::info!(
        listed = report.listed,
        added = report.added,
        persisted = report.persisted,
        "remote sync finished"
    );
    report
}

/// Add the draft to the store and save. The returned issue has no remote identity yet.
pub fn create_local(store: &mut IssueStore, draft: IssueDraft) -> Result<Issue, ActionError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(ActionError::EmptyTitle);
    }
    let mut issue = Issue::new(title, draft.body);
    while store.contains(&issue.id) {
        issue.id = generate_local_id();
    }
    issue.labels = draft.labels;
    issue.files = extract_file_refs(&format!("{}\n{}", issue.title, issue.body));

    let created = issue.clone();
    if let Err(e) = store.add(issue) {
        tracing::error!("generated id collided: {}", e);
    }
    store.save()?;
    Ok(created)
}

/// Record the outcome of `create_remote` for a locally created issue
pub fn attach_remote(
    store: &mut IssueStore,
    id: &str,
    provider: ProviderKind,
    result: Result<u64, RemoteOperationError>,
) -> Result<ActionOutcome, ActionError> {
    match result {
        Ok(number) => {
            let identity = RemoteIdentity { provider, number };
            if store.remote_identities().contains(&identity) {
                // A sync landed first and imported this issue under its remote id
                let stale: Vec<String> = store
                    .records()
                    .iter()
                    .filter(|issue| issue.id != id && issue.remote == Some(identity))
                    .map(|issue| issue.id.clone())
                    .collect();
                for stale_id in stale {
                    tracing::debug!(id = %stale_id, "dropping imported copy of a local create");
                    store.remove(&stale_id);
                }
            }
            store.update(id, IssuePatch::remote(identity));
            store.save()?;
            Ok(ActionOutcome::Mirrored {
                action: IssueAction::Created,
                provider,
                number,
            })
        }
        Err(error) => {
            tracing::warn!(id, "remote create failed: {}", error);
            Ok(ActionOutcome::RemoteFailed {
                action: IssueAction::Created,
                reference: reference_for(store, id),
                error,
            })
        }
    }
}

/// Create locally, then mirror to `provider` when one is configured
pub fn create_issue(
    store: &mut IssueStore,
    provider: Option<&dyn RemoteProvider>,
    draft: IssueDraft,
) -> Result<ActionOutcome, ActionError> {
    let issue = create_local(store, draft)?;
    let Some(provider) = provider else {
        return Ok(ActionOutcome::LocalOnly {
            action: IssueAction::Created,
            reference: issue.reference_token(),
        });
    };
    let labels: Vec<String> = issue.labels.iter().cloned().collect();
    let result = provider.create_remote(&issue.title, &issue.body, &labels);
    attach_remote(store, &issue.id, provider.kind(), result)
}

/// Set the status locally and save. Returns the updated issue.
pub fn apply_status(
    store: &mut IssueStore,
    id: &str,
    status: IssueStatus,
) -> Result<Issue, ActionError> {
    if !store.update(id, IssuePatch::status(status)) {
        return Err(ActionError::NotFound(id.to_string()));
    }
    store.save()?;
    store
        .get(id)
        .cloned()
        .ok_or_else(|| ActionError::NotFound(id.to_string()))
}

/// Remote number to mirror a status change to, if the issue belongs to `provider`
pub fn status_target(issue: &Issue, provider: Option<ProviderKind>) -> Option<u64> {
    issue.remote_number_for(provider?)
}

/// Outcome of setting `status` given the remote call's result (`None` when no call was made)
pub fn status_outcome(
    issue: &Issue,
    status: IssueStatus,
    remote: Option<Result<(), RemoteOperationError>>,
) -> ActionOutcome {
    let action = IssueAction::for_status(status);
    match (remote, issue.remote) {
        (Some(Ok(())), Some(identity)) => ActionOutcome::Mirrored {
            action,
            provider: identity.provider,
            number: identity.number,
        },
        (Some(Err(error)), _) => {
            tracing::warn!(id = %issue.id, "remote status change failed: {}", error);
            ActionOutcome::RemoteFailed {
                action,
                reference: issue.reference_token(),
                error,
            }
        }
        _ => ActionOutcome::LocalOnly {
            action,
            reference: issue.reference_token(),
        },
    }
}

/// Set `status` locally, then mirror it if the issue carries this provider's identity
pub fn set_status(
    store: &mut IssueStore,
    provider: Option<&dyn RemoteProvider>,
    id: &str,
    status: IssueStatus,
) -> Result<ActionOutcome, ActionError> {
    let issue = apply_status(store, id, status)?;
    let remote = provider.and_then(|p| {
        status_target(&issue, Some(p.kind())).map(|number| match status {
            IssueStatus::Closed => p.close_remote(number),
            IssueStatus::Open => p.reopen_remote(number),
        })
    });
    Ok(status_outcome(&issue, status, remote))
}

/// Flip open/closed
pub fn toggle_status(
    store: &mut IssueStore,
    provider: Option<&dyn RemoteProvider>,
    id: &str,
) -> Result<ActionOutcome, ActionError> {
    let current = store
        .get(id)
        .map(|i| i.status)
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?;
    set_status(store, provider, id, current.toggled())
}

/// Local-only edit of title and/or body. File references are re-extracted.
pub fn edit_issue(
    store: &mut IssueStore,
    id: &str,
    title: Option<String>,
    body: Option<String>,
) -> Result<ActionOutcome, ActionError> {
    let existing = store
        .get(id)
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?;
    let title = match title {
        Some(t) if t.trim().is_empty() => return Err(ActionError::EmptyTitle),
        Some(t) => t.trim().to_string(),
        None => existing.title.clone(),
    };
    let body = body.unwrap_or_else(|| existing.body.clone());
    let files = extract_file_refs(&format!("{}\n{}", title, body));

    store.update(
        id,
        IssuePatch {
            title: Some(title),
            body: Some(body),
            files: Some(files),
            ..Default::default()
        },
    );
    store.save()?;
    Ok(ActionOutcome::LocalOnly {
        action: IssueAction::Updated,
        reference: reference_for(store, id),
    })
}

/// Delete locally and save. Remote issues are left untouched.
pub fn remove_issue(store: &mut IssueStore, id: &str) -> Result<Issue, ActionError> {
    let removed = store
        .remove(id)
        .ok_or_else(|| ActionError::NotFound(id.to_string()))?;
    store.save()?;
    Ok(removed)
}

fn reference_for(store: &IssueStore, id: &str) -> String {
    store
        .get(id)
        .map(Issue::reference_token)
        .unwrap_or_else(|| format!("#{}", id))
}

/// Counts from an agent-task refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgentMergeReport {
    pub added: usize,
    pub updated: usize,
}

/// Add unknown tasks and update the status of known ones; a single save when anything changed
pub fn merge_agent_tasks(
    store: &mut AgentTaskStore,
    listing: Vec<AgentTask>,
) -> Result<AgentMergeReport, PersistenceError> {
    let mut report = AgentMergeReport::default();
    for task in listing {
        // Tasks created here are keyed by session id; listings key them by PR
        let known: Vec<String> = if store.contains(&task.id) {
            vec![task.id.clone()]
        } else {
            task.pull_request_number
                .map(|number| store.get_by_pr(number))
                .unwrap_or_default()
                .into_iter()
                .map(|existing| existing.id.clone())
                .collect()
        };
        if known.is_empty() {
            if store.add(task).is_ok() {
                report.added += 1;
            }
            continue;
        }
        for id in known {
            if store.get(&id).is_some_and(|existing| existing.status != task.status) {
                store.update(
                    &id,
                    AgentTaskPatch {
                        status: Some(task.status),
                        ..Default::default()
                    },
                );
                report.updated += 1;
            }
        }
    }
    if report.added + report.updated > 0 {
        store.save()?;
    }
    Ok(report)
}

/// Persist a task created through the agent provider
pub fn record_agent_task(store: &mut AgentTaskStore, task: AgentTask) -> Result<(), PersistenceError> {
    if let Err(e) = store.add(task) {
        tracing::warn!("agent task already recorded: {}", e);
        return Ok(());
    }
    store.save()
}
