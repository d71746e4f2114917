mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::file_index;
use crate::io::project_io::{self, ProjectError};
use crate::io::recovery;
use crate::model::config::RemoteMode;
use crate::model::issue::{IssueStatus, ProviderKind};
use crate::model::project::Project;
use crate::ops::session::Session;
use crate::ops::sync::{self, ActionOutcome, IssueDraft};
use crate::provider::agents::DEFAULT_AGENT_LIST_LIMIT;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = start_dir(cli.project_dir.as_deref())?;

    match cli.command {
        None => crate::tui::run(&start),
        Some(cmd) => match cmd {
            Commands::Init => cmd_init(&start, json),

            // Read commands
            Commands::List(args) => cmd_list(&start, args, json),
            Commands::Show(args) => cmd_show(&start, args, json),
            Commands::Comments(args) => cmd_comments(&start, args, json),
            Commands::Files(args) => cmd_files(&start, args, json),

            // Write commands
            Commands::Add(args) => cmd_add(&start, args, json),
            Commands::Edit(args) => cmd_edit(&start, args, json),
            Commands::Close(args) => cmd_set_status(&start, args, IssueStatus::Closed, json),
            Commands::Reopen(args) => cmd_set_status(&start, args, IssueStatus::Open, json),
            Commands::Rm(args) => cmd_rm(&start, args, json),
            Commands::Sync => cmd_sync(&start, json),

            Commands::Agent(args) => cmd_agent(&start, args, json),
            Commands::Remote(args) => cmd_remote(&start, args, json),
            Commands::Recovery(args) => cmd_recovery(&start, args, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The directory project discovery starts from: `-C` or the cwd
pub fn start_dir(project_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match project_dir {
        Some(dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e).into()),
        None => Ok(std::env::current_dir()?),
    }
}

fn load_project_from(start: &Path) -> Result<Project, ProjectError> {
    let root = project_io::discover_project(start)?;
    project_io::load_project(&root)
}

/// Stores only; no remote resolution
fn local_session(start: &Path) -> Result<Session, ProjectError> {
    Ok(Session::local(load_project_from(start)?))
}

/// Stores plus the configured remote
fn remote_session(start: &Path) -> Result<Session, ProjectError> {
    Ok(Session::open(load_project_from(start)?))
}

/// Full id of the issue `reference` names
fn resolve_id(session: &Session, reference: &str) -> Result<String, Box<dyn std::error::Error>> {
    session
        .issues
        .find_reference(reference)
        .map(|i| i.id.clone())
        .ok_or_else(|| format!("no issue matches '{}'", reference).into())
}

fn require_remote(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    if session.provider.is_some() {
        return Ok(());
    }
    let reason = session
        .offline_reason
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "remote disabled".to_string());
    Err(format!("no remote available: {}", reason).into())
}

fn print_outcome(
    session: &Session,
    id: Option<&str>,
    outcome: &ActionOutcome,
    json: bool,
) -> CmdResult {
    if json {
        let issue = match id.and_then(|id| session.issues.get(id)) {
            Some(issue) => Some(serde_json::to_value(issue_to_json(issue))?),
            None => None,
        };
        let out = ActionJson {
            message: outcome.message(),
            issue,
            remote_error: outcome.remote_error().map(|e| e.to_string()),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", outcome.message());
        if let Some(e) = outcome.remote_error() {
            eprintln!("warning: {}", e);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(start: &Path, args: ListArgs, json: bool) -> CmdResult {
    let session = local_session(start)?;
    let issues: Vec<_> = session
        .issues
        .records()
        .iter()
        .filter(|i| match args.state {
            StateFilter::Open => i.status == IssueStatus::Open,
            StateFilter::Closed => i.status == IssueStatus::Closed,
            StateFilter::All => true,
        })
        .filter(|i| args.label.as_ref().is_none_or(|l| i.labels.contains(l)))
        .collect();

    if json {
        let out: Vec<_> = issues.iter().map(|i| issue_to_json(i)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if issues.is_empty() {
        println!("No issues");
    } else {
        for issue in issues {
            println!("{}", format_issue_line(issue));
        }
    }
    Ok(())
}

fn cmd_show(start: &Path, args: IdArgs, json: bool) -> CmdResult {
    let session = local_session(start)?;
    let issue = session
        .issues
        .find_reference(&args.id)
        .ok_or_else(|| format!("no issue matches '{}'", args.id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&issue_to_json(issue))?);
        return Ok(());
    }
    for line in format_issue_detail(issue) {
        println!("{}", line);
    }
    for file in &issue.files {
        if file.lines.is_none() {
            continue;
        }
        if let Some(excerpt) = file_index::read_file_content(&session.project.root, file) {
            println!();
            println!("--- {} ---", file);
            println!("{}", excerpt);
        }
    }
    Ok(())
}

fn cmd_comments(start: &Path, args: IdArgs, json: bool) -> CmdResult {
    let session = remote_session(start)?;
    require_remote(&session)?;
    let Some(provider) = session.provider() else {
        return Ok(());
    };
    let issue = session
        .issues
        .find_reference(&args.id)
        .ok_or_else(|| format!("no issue matches '{}'", args.id))?;
    let number = issue.remote_number_for(provider.kind()).ok_or_else(|| {
        format!(
            "{} is not mirrored to {}",
            issue.reference_token(),
            provider.kind()
        )
    })?;

    let comments = provider.fetch_comments(number);
    if json {
        println!("{}", serde_json::to_string_pretty(&comments)?);
    } else if comments.is_empty() {
        println!("No comments");
    } else {
        for (i, comment) in comments.iter().enumerate() {
            if i > 0 {
                println!();
            }
            for line in format_comment(comment) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn cmd_files(start: &Path, args: FilesArgs, json: bool) -> CmdResult {
    let session = local_session(start)?;
    let files = file_index::find_files(
        session.runner.as_ref(),
        &session.project.root,
        &args.query,
    )?;
    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
    } else {
        for file in files {
            println!("{}", file);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(start: &Path, args: AddArgs, json: bool) -> CmdResult {
    let mut session = remote_session(start)?;
    let mut draft = IssueDraft::new(args.title, args.body);
    draft.labels = args.labels.into_iter().collect();

    let outcome = sync::create_issue(&mut session.issues, session.provider.as_deref(), draft)?;
    let created = session.issues.records().last().map(|i| i.id.clone());
    print_outcome(&session, created.as_deref(), &outcome, json)
}

fn cmd_edit(start: &Path, args: EditArgs, json: bool) -> CmdResult {
    if args.title.is_none() && args.body.is_none() {
        return Err("nothing to change: pass --title and/or --body".into());
    }
    let mut session = local_session(start)?;
    let id = resolve_id(&session, &args.id)?;
    let outcome = sync::edit_issue(&mut session.issues, &id, args.title, args.body)?;
    print_outcome(&session, Some(&id), &outcome, json)
}

fn cmd_set_status(start: &Path, args: IdArgs, status: IssueStatus, json: bool) -> CmdResult {
    let mut session = remote_session(start)?;
    let id = resolve_id(&session, &args.id)?;
    let outcome = sync::set_status(
        &mut session.issues,
        session.provider.as_deref(),
        &id,
        status,
    )?;
    print_outcome(&session, Some(&id), &outcome, json)
}

fn cmd_rm(start: &Path, args: IdArgs, json: bool) -> CmdResult {
    let mut session = local_session(start)?;
    let id = resolve_id(&session, &args.id)?;
    let removed = sync::remove_issue(&mut session.issues, &id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&issue_to_json(&removed))?);
    } else {
        println!("Removed {}", removed.reference_token());
    }
    Ok(())
}

fn cmd_sync(start: &Path, json: bool) -> CmdResult {
    let mut session = remote_session(start)?;
    require_remote(&session)?;
    let Some(provider) = session.provider.clone() else {
        return Ok(());
    };
    let report = sync::sync_from_remote(&mut session.issues, provider.as_ref());
    if json {
        println!("{}", serde_json::to_string_pretty(&sync_to_json(&report))?);
    } else {
        println!("{}", format_sync_report(&report));
    }
    if !report.persisted {
        return Err("could not save imported issues".into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Agent tasks
// ---------------------------------------------------------------------------

fn cmd_agent(start: &Path, args: AgentCmd, json: bool) -> CmdResult {
    match args.action.unwrap_or(AgentAction::List) {
        AgentAction::List => {
            let session = local_session(start)?;
            let tasks = session.agent_tasks.records();
            if json {
                println!("{}", serde_json::to_string_pretty(tasks)?);
            } else if tasks.is_empty() {
                println!("No agent tasks (run `oi agent sync`)");
            } else {
                for task in tasks {
                    println!("{}", format_agent_task_line(task));
                }
            }
            Ok(())
        }
        AgentAction::Sync(sync_args) => {
            let mut session = remote_session(start)?;
            let agents = session
                .agents
                .clone()
                .ok_or("agent tasks need a GitHub remote")?;
            let listing =
                agents.list_agent_tasks(sync_args.limit.unwrap_or(DEFAULT_AGENT_LIST_LIMIT));
            let report = sync::merge_agent_tasks(&mut session.agent_tasks, listing)?;
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "added": report.added, "updated": report.updated })
                );
            } else {
                println!(
                    "Agent tasks: {} added, {} updated",
                    report.added, report.updated
                );
            }
            Ok(())
        }
        AgentAction::Create(create) => {
            let mut session = remote_session(start)?;
            let agents = session
                .agents
                .clone()
                .ok_or("agent tasks need a GitHub remote")?;
            let issue_number = match &create.issue {
                Some(reference) => {
                    let issue = session
                        .issues
                        .find_reference(reference)
                        .ok_or_else(|| format!("no issue matches '{}'", reference))?;
                    Some(issue.remote_number_for(ProviderKind::Github).ok_or_else(|| {
                        format!("{} is not mirrored to github", issue.reference_token())
                    })?)
                }
                None => None,
            };
            let task = agents.create_agent_task(&create.description, issue_number)?;
            sync::record_agent_task(&mut session.agent_tasks, task.clone())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                println!("Started agent task {}", task.id);
            }
            Ok(())
        }
        AgentAction::View(view) => {
            let session = remote_session(start)?;
            let agents = session
                .agents
                .clone()
                .ok_or("agent tasks need a GitHub remote")?;
            let log = agents.view_agent_task(&view.id)?;
            if json {
                println!("{}", serde_json::json!({ "id": view.id, "log": log }));
            } else {
                println!("{}", log);
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Remote configuration
// ---------------------------------------------------------------------------

fn cmd_remote(start: &Path, args: RemoteCmd, json: bool) -> CmdResult {
    let project = load_project_from(start)?;
    let action = args.action.unwrap_or(RemoteAction::Show);
    if let RemoteAction::Show = action {
        let mode = project.config.remote.mode;
        let session = Session::open(project);
        let provider = session.provider();
        if json {
            let out = RemoteJson {
                mode: mode.as_str().to_string(),
                provider: provider.map(|p| p.kind().to_string()),
                repo: provider.map(|p| p.repo().to_string()),
                offline_reason: session.offline_reason.as_ref().map(|e| e.to_string()),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            println!("mode: {}", mode.as_str());
            match &session.offline_reason {
                Some(reason) => println!("remote: none ({})", reason),
                None => println!("remote: {}", session.remote_label()),
            }
        }
        return Ok(());
    }

    let (_, mut doc) = config_io::read_config(&project.data_dir)?;
    let message = match action {
        RemoteAction::Set(set) => {
            let kind = match set.kind {
                RemoteKindArg::Github => ProviderKind::Github,
                RemoteKindArg::Gitlab => ProviderKind::Gitlab,
            };
            if !set.repo.contains('/') {
                return Err(format!("expected owner/name, got '{}'", set.repo).into());
            }
            config_io::set_remote(&mut doc, kind, &set.repo);
            format!("Remote set to {}: {}", kind, set.repo)
        }
        RemoteAction::Off => {
            config_io::set_remote_mode(&mut doc, RemoteMode::Off);
            "Remote disabled".to_string()
        }
        RemoteAction::Auto | RemoteAction::Show => {
            config_io::set_remote_mode(&mut doc, RemoteMode::Auto);
            "Remote detection set to auto".to_string()
        }
    };
    config_io::write_config(&project.data_dir, &doc)?;
    if json {
        println!("{}", serde_json::json!({ "message": message }));
    } else {
        println!("{}", message);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

fn cmd_recovery(start: &Path, args: RecoveryCmd, json: bool) -> CmdResult {
    let project = load_project_from(start)?;
    match args.action {
        None => {
            let entries =
                recovery::read_recovery_entries(&project.data_dir, Some(args.limit.unwrap_or(10)));
            if json {
                let out: Vec<_> = entries.iter().map(|e| e.to_json()).collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else if entries.is_empty() {
                println!("Recovery log is empty");
            } else {
                for entry in &entries {
                    print!("{}", entry.to_markdown());
                }
            }
        }
        Some(RecoveryAction::Path) => {
            println!("{}", recovery::recovery_log_path(&project.data_dir).display());
        }
        Some(RecoveryAction::Prune(prune)) => {
            let before = match prune.before.as_deref() {
                Some(s) => Some(
                    DateTime::parse_from_rfc3339(s)
                        .map_err(|e| format!("invalid --before '{}': {}", s, e))?
                        .with_timezone(&Utc),
                ),
                None => None,
            };
            let removed = recovery::prune_recovery(&project.data_dir, before, prune.all)?;
            if json {
                println!("{}", serde_json::json!({ "removed": removed }));
            } else {
                println!(
                    "Pruned {} entr{}",
                    removed,
                    if removed == 1 { "y" } else { "ies" }
                );
            }
        }
    }
    Ok(())
}
