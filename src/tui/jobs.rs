//! Remote calls and file listings run on short-lived worker threads.
//!
//! Workers never touch the stores. Each one sends a single [`JobResult`]
//! back over a channel that the event loop drains once per tick.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::io::file_index::{self, FileIndexError};
use crate::model::agent::AgentTask;
use crate::model::comment::Comment;
use crate::model::issue::{Issue, IssueStatus, ProviderKind};
use crate::provider::agents::{AgentTaskProvider, DEFAULT_AGENT_LIST_LIMIT};
use crate::provider::runner::CommandRunner;
use crate::provider::{RemoteOperationError, RemoteProvider};

/// Work that must not block the UI thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Sync,
    CreateRemote {
        id: String,
        title: String,
        body: String,
        labels: Vec<String>,
    },
    SetStatus {
        id: String,
        number: u64,
        status: IssueStatus,
    },
    Comments {
        id: String,
        number: u64,
    },
    FileLookup {
        seq: u64,
        query: String,
    },
    AgentList,
    AgentCreate {
        description: String,
        issue_number: Option<u64>,
    },
    AgentLog {
        id: String,
    },
}

#[derive(Debug)]
pub enum JobResult {
    Synced(Vec<Issue>),
    Created {
        id: String,
        provider: ProviderKind,
        result: Result<u64, RemoteOperationError>,
    },
    StatusChanged {
        id: String,
        status: IssueStatus,
        result: Result<(), RemoteOperationError>,
    },
    Comments {
        id: String,
        comments: Vec<Comment>,
    },
    Files {
        seq: u64,
        result: Result<Vec<String>, FileIndexError>,
    },
    AgentTasks(Vec<AgentTask>),
    AgentCreated(Result<AgentTask, RemoteOperationError>),
    AgentLog {
        id: String,
        result: Result<String, RemoteOperationError>,
    },
    /// The job needs a collaborator this session does not have
    Unavailable(&'static str),
}

/// Collaborators a worker may call. Cheap to clone.
#[derive(Clone)]
pub struct JobContext {
    pub provider: Option<Arc<dyn RemoteProvider>>,
    pub agents: Option<Arc<AgentTaskProvider>>,
    pub runner: Arc<dyn CommandRunner>,
    pub root: PathBuf,
}

impl JobContext {
    /// Run `job` on the calling thread
    pub fn execute(&self, job: Job) -> JobResult {
        match job {
            Job::Sync => match &self.provider {
                Some(p) => JobResult::Synced(p.list_remote()),
                None => JobResult::Unavailable("no remote configured"),
            },
            Job::CreateRemote {
                id,
                title,
                body,
                labels,
            } => match &self.provider {
                Some(p) => JobResult::Created {
                    id,
                    provider: p.kind(),
                    result: p.create_remote(&title, &body, &labels),
                },
                None => JobResult::Unavailable("no remote configured"),
            },
            Job::SetStatus { id, number, status } => match &self.provider {
                Some(p) => JobResult::StatusChanged {
                    id,
                    status,
                    result: match status {
                        IssueStatus::Closed => p.close_remote(number),
                        IssueStatus::Open => p.reopen_remote(number),
                    },
                },
                None => JobResult::Unavailable("no remote configured"),
            },
            Job::Comments { id, number } => match &self.provider {
                Some(p) => JobResult::Comments {
                    id,
                    comments: p.fetch_comments(number),
                },
                None => JobResult::Unavailable("no remote configured"),
            },
            Job::FileLookup { seq, query } => JobResult::Files {
                seq,
                result: file_index::find_files(self.runner.as_ref(), &self.root, &query),
            },
            Job::AgentList => match &self.agents {
                Some(a) => JobResult::AgentTasks(a.list_agent_tasks(DEFAULT_AGENT_LIST_LIMIT)),
                None => JobResult::Unavailable("agent tasks need a GitHub remote"),
            },
            Job::AgentCreate {
                description,
                issue_number,
            } => match &self.agents {
                Some(a) => JobResult::AgentCreated(a.create_agent_task(&description, issue_number)),
                None => JobResult::Unavailable("agent tasks need a GitHub remote"),
            },
            Job::AgentLog { id } => match &self.agents {
                Some(a) => {
                    let result = a.view_agent_task(&id);
                    JobResult::AgentLog { id, result }
                }
                None => JobResult::Unavailable("agent tasks need a GitHub remote"),
            },
        }
    }
}

pub struct JobRunner {
    context: JobContext,
    tx: Sender<JobResult>,
    rx: Receiver<JobResult>,
    in_flight: usize,
}

impl JobRunner {
    pub fn new(context: JobContext) -> Self {
        let (tx, rx) = mpsc::channel();
        JobRunner {
            context,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn context(&self) -> &JobContext {
        &self.context
    }

    /// Start `job` on a worker thread
    pub fn spawn(&mut self, job: Job) {
        let context = self.context.clone();
        let tx = self.tx.clone();
        tracing::debug!(?job, "spawning job");
        let spawned = thread::Builder::new()
            .name("openissue-job".into())
            .spawn(move || {
                let _ = tx.send(context.execute(job));
            });
        match spawned {
            Ok(_) => self.in_flight += 1,
            Err(e) => tracing::error!("could not start worker thread: {}", e),
        }
    }

    /// Completed results, without blocking
    pub fn drain(&mut self) -> Vec<JobResult> {
        let results: Vec<JobResult> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(results.len());
        results
    }

    /// Jobs started but not yet drained
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Block until every started job has reported. Test use only.
    #[cfg(test)]
    pub fn wait_all(&mut self) -> Vec<JobResult> {
        let mut results = Vec::new();
        while self.in_flight > 0 {
            match self.rx.recv() {
                Ok(r) => {
                    self.in_flight -= 1;
                    results.push(r);
                }
                Err(_) => break,
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::runner::testing::{StubRunner, failure, success};

    fn context(runner: StubRunner) -> JobContext {
        JobContext {
            provider: None,
            agents: None,
            runner: Arc::new(runner),
            root: PathBuf::from("/repo"),
        }
    }

    #[test]
    fn file_lookup_runs_git_on_a_worker() {
        let mut jobs = JobRunner::new(context(StubRunner::with_results(vec![success(
            "src/app.rs\nsrc/lib.rs\nREADME.md\n",
        )])));
        jobs.spawn(Job::FileLookup {
            seq: 3,
            query: "src".into(),
        });
        let results = jobs.wait_all();
        assert_eq!(jobs.in_flight(), 0);
        match &results[..] {
            [JobResult::Files { seq, result: Ok(files) }] => {
                assert_eq!(*seq, 3);
                assert_eq!(files, &vec!["src/app.rs".to_string(), "src/lib.rs".to_string()]);
            }
            other => panic!("unexpected results: {:?}", other),
        }
    }

    #[test]
    fn file_lookup_failure_is_reported() {
        let ctx = context(StubRunner::with_results(vec![failure("not a git repository")]));
        assert!(matches!(
            ctx.execute(Job::FileLookup {
                seq: 1,
                query: "x".into()
            }),
            JobResult::Files { result: Err(_), .. }
        ));
    }

    #[test]
    fn remote_jobs_without_provider_are_unavailable() {
        let ctx = context(StubRunner::with_results(vec![]));
        assert!(matches!(ctx.execute(Job::Sync), JobResult::Unavailable(_)));
        assert!(matches!(
            ctx.execute(Job::AgentLog { id: "s1".into() }),
            JobResult::Unavailable(_)
        ));
    }
}
