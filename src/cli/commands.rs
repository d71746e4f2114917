use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "oi", about = concat!("openissue v", env!("CARGO_PKG_VERSION"), " - local-first issues, mirrored to GitHub and GitLab"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different project directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize an openissue project in the current directory
    Init,
    /// List issues
    List(ListArgs),
    /// Show one issue
    Show(IdArgs),
    /// Create an issue (mirrored to the remote when one is configured)
    Add(AddArgs),
    /// Change an issue's title or body (local only)
    Edit(EditArgs),
    /// Close an issue
    Close(IdArgs),
    /// Reopen a closed issue
    Reopen(IdArgs),
    /// Delete an issue locally
    Rm(IdArgs),
    /// Import remote issues that are not tracked locally yet
    Sync,
    /// Show the remote comments of an issue
    Comments(IdArgs),
    /// List repository files matching a query (as offered for @ references)
    Files(FilesArgs),
    /// Coding-agent tasks (GitHub only)
    Agent(AgentCmd),
    /// Show or change the remote tracker
    Remote(RemoteCmd),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

// ---------------------------------------------------------------------------
// Issue args
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateFilter {
    Open,
    Closed,
    All,
}

#[derive(Args)]
pub struct ListArgs {
    /// Which issues to show
    #[arg(long, value_enum, default_value = "all")]
    pub state: StateFilter,
    /// Only issues carrying this label
    #[arg(long)]
    pub label: Option<String>,
}

#[derive(Args)]
pub struct IdArgs {
    /// Issue id, short id, remote number, or #N
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Issue title
    pub title: String,
    /// Issue body (markdown; @path references are recorded)
    #[arg(long, default_value = "")]
    pub body: String,
    /// Label to attach (repeatable)
    #[arg(long = "label")]
    pub labels: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Issue id, short id, remote number, or #N
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New body
    #[arg(long)]
    pub body: Option<String>,
}

#[derive(Args)]
pub struct FilesArgs {
    /// Case-insensitive substring of the path
    pub query: String,
}

// ---------------------------------------------------------------------------
// Agent tasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AgentCmd {
    #[command(subcommand)]
    pub action: Option<AgentAction>,
}

#[derive(Subcommand)]
pub enum AgentAction {
    /// List recorded agent tasks (default)
    List,
    /// Refresh agent tasks from the remote
    Sync(AgentSyncArgs),
    /// Start a new agent task
    Create(AgentCreateArgs),
    /// Print an agent session's log
    View(AgentViewArgs),
}

#[derive(Args)]
pub struct AgentSyncArgs {
    /// Number of remote tasks to request
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct AgentCreateArgs {
    /// What the agent should do
    pub description: String,
    /// Link the task to this issue (must be mirrored remotely)
    #[arg(long)]
    pub issue: Option<String>,
}

#[derive(Args)]
pub struct AgentViewArgs {
    /// Session id
    pub id: String,
}

// ---------------------------------------------------------------------------
// Remote
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RemoteCmd {
    #[command(subcommand)]
    pub action: Option<RemoteAction>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RemoteKindArg {
    Github,
    Gitlab,
}

#[derive(Subcommand)]
pub enum RemoteAction {
    /// Show the resolved remote (default)
    Show,
    /// Pin the remote tracker and repository
    Set(RemoteSetArgs),
    /// Never talk to a remote
    Off,
    /// Detect the remote from `git remote get-url origin`
    Auto,
}

#[derive(Args)]
pub struct RemoteSetArgs {
    #[arg(value_enum)]
    pub kind: RemoteKindArg,
    /// owner/name
    pub repo: String,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
    /// Print the absolute path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove entries older than this timestamp (default: 30 days ago)
    #[arg(long)]
    pub before: Option<String>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}
