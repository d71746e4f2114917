//! Everything one process needs to work on a project: both stores and the
//! remote collaborators resolved from config.

use std::sync::Arc;

use crate::io::store::{AgentTaskStore, IssueStore};
use crate::model::Project;
use crate::provider::agents::AgentTaskProvider;
use crate::provider::runner::{CommandRunner, ProcessCommandRunner};
use crate::provider::{self, ProviderError, RemoteProvider};

pub struct Session {
    pub project: Project,
    pub issues: IssueStore,
    pub agent_tasks: AgentTaskStore,
    pub runner: Arc<dyn CommandRunner>,
    pub provider: Option<Arc<dyn RemoteProvider>>,
    pub agents: Option<Arc<AgentTaskProvider>>,
    /// Why `provider` is absent
    pub offline_reason: Option<ProviderError>,
}

impl Session {
    /// Load both stores and resolve the remote with real subprocesses
    pub fn open(project: Project) -> Self {
        Self::with_runner(project, Arc::new(ProcessCommandRunner))
    }

    pub fn with_runner(project: Project, runner: Arc<dyn CommandRunner>) -> Self {
        let issues = IssueStore::open(project.issues_path());
        let agent_tasks = AgentTaskStore::open(project.agent_tasks_path());

        let (provider, agents, offline_reason) =
            match provider::resolve_remote(&project.config.remote, &project.root, runner.as_ref())
            {
                Ok((kind, repo)) => {
                    let provider = provider::connect_resolved(
                        kind,
                        &repo,
                        &project.config.remote,
                        &project.root,
                        runner.clone(),
                    );
                    let agents = AgentTaskProvider::connect(
                        kind,
                        &repo,
                        &project.config.remote,
                        &project.root,
                        runner.clone(),
                    )
                    .map(Arc::new)
                    .ok();
                    (Some(provider), agents, None)
                }
                Err(e) => {
                    tracing::info!("working offline: {}", e);
                    (None, None, Some(e))
                }
            };

        Session {
            project,
            issues,
            agent_tasks,
            runner,
            provider,
            agents,
            offline_reason,
        }
    }

    /// Both stores, no remote. Used by read-only commands.
    pub fn local(project: Project) -> Self {
        Session {
            issues: IssueStore::open(project.issues_path()),
            agent_tasks: AgentTaskStore::open(project.agent_tasks_path()),
            project,
            runner: Arc::new(ProcessCommandRunner),
            provider: None,
            agents: None,
            offline_reason: None,
        }
    }

    pub fn provider(&self) -> Option<&dyn RemoteProvider> {
        self.provider.as_deref()
    }

    /// `github: owner/repo`, or `local only`
    pub fn remote_label(&self) -> String {
        match &self.provider {
            Some(p) => p.label(),
            None => "local only".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config_io::{read_config, set_remote, set_remote_mode, write_config};
    use crate::io::project_io::{init_project, load_project};
    use crate::model::{ProviderKind, RemoteMode};
    use crate::provider::runner::testing::StubRunner;
    use tempfile::TempDir;

    #[test]
    fn offline_when_remote_disabled() {
        let tmp = TempDir::new().unwrap();
        let project = init_project(tmp.path()).unwrap();
        let (_, mut doc) = read_config(&project.data_dir).unwrap();
        set_remote_mode(&mut doc, RemoteMode::Off);
        write_config(&project.data_dir, &doc).unwrap();
        let project = load_project(tmp.path()).unwrap();

        let runner = Arc::new(StubRunner::with_results(vec![]));
        let session = Session::with_runner(project, runner.clone());
        assert!(session.provider().is_none());
        assert!(matches!(session.offline_reason, Some(ProviderError::Disabled)));
        assert_eq!(session.remote_label(), "local only");
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn pinned_remote_connects_without_git() {
        let tmp = TempDir::new().unwrap();
        let project = init_project(tmp.path()).unwrap();
        let (_, mut doc) = read_config(&project.data_dir).unwrap();
        set_remote(&mut doc, ProviderKind::Github, "octo/repo");
        write_config(&project.data_dir, &doc).unwrap();
        let project = load_project(tmp.path()).unwrap();

        let runner = Arc::new(StubRunner::with_results(vec![]));
        let session = Session::with_runner(project, runner);
        assert_eq!(session.remote_label(), "github: octo/repo");
        assert!(session.agents.is_some());
        assert!(session.issues.is_empty());
    }
}
