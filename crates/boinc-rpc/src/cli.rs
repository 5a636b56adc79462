//! Clap derive structures for the `boinc-rpc` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// boinc-rpc -- talk to a BOINC core client over GUI RPC
#[derive(Debug, Parser)]
#[command(
    name = "boinc-rpc",
    version,
    about = "Query and control BOINC core clients from the command line",
    long_about = "Connects to a running BOINC core client over its GUI RPC port\n\
        (31416 by default), authenticates with the GUI RPC password, and\n\
        runs one command.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Daemon profile to use
    #[arg(long, short = 'p', env = "BOINC_RPC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Daemon host (overrides profile)
    #[arg(long, short = 'H', env = "BOINC_RPC_HOST", global = true)]
    pub host: Option<String>,

    /// Daemon GUI RPC port (overrides profile)
    #[arg(long, short = 'P', env = "BOINC_RPC_PORT", global = true)]
    pub port: Option<u16>,

    /// GUI RPC password (contents of gui_rpc_auth.cfg)
    #[arg(long, env = "BOINC_RPC_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BOINC_RPC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BOINC_RPC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Daemon state summary: host, platform, projects, apps
    State,

    /// List tasks
    #[command(alias = "results")]
    Tasks(TasksArgs),

    /// Run modes and suspend reasons
    Status,

    /// Per-project credit history
    Stats,

    /// Recently finished tasks
    History,

    /// Disk usage per project
    Disk,

    /// Daemon version
    Version,

    /// Event log
    #[command(alias = "msgs")]
    Messages(MessagesArgs),

    /// Attached projects
    Projects,

    /// Attach to a project with an account key
    Attach(AttachArgs),

    /// Account manager info, attach, and detach
    #[command(name = "acct-mgr", alias = "am")]
    AcctMgr(AcctMgrArgs),

    /// Look up the label for a daemon code
    Lookup(LookupArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Per-command arguments ────────────────────────────────────────────

/// `--wait` accepts 1 second up to the longest operation deadline.
fn wait_secs() -> clap::builder::RangedU64ValueParser<u64> {
    clap::value_parser!(u64).range(1..=boinc_rpc_core::MAX_TIMEOUT.as_secs())
}

#[derive(Debug, Args)]
pub struct TasksArgs {
    /// Include tasks that are not running
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct MessagesArgs {
    /// Only entries with a sequence number above this one
    #[arg(long, short = 's', default_value = "0")]
    pub since: u64,

    /// Show at most this many of the newest entries
    #[arg(long, short = 'n')]
    pub tail: Option<usize>,
}

#[derive(Debug, Args)]
pub struct AttachArgs {
    /// Project master URL
    pub url: String,

    /// Account key (authenticator)
    pub key: String,

    /// Project name shown until the daemon learns the real one
    #[arg(long)]
    pub name: Option<String>,

    /// Give up after this many seconds (overrides profile)
    #[arg(long, value_parser = wait_secs())]
    pub wait: Option<u64>,
}

#[derive(Debug, Args)]
pub struct AcctMgrArgs {
    #[command(subcommand)]
    pub command: AcctMgrCommand,
}

#[derive(Debug, Subcommand)]
pub enum AcctMgrCommand {
    /// Show the current account manager
    Info,

    /// Attach to an account manager
    Attach {
        /// Account manager URL
        url: String,

        /// Account manager user name
        user: String,

        /// Account manager password (prompted if omitted)
        #[arg(long, env = "BOINC_RPC_ACCT_MGR_PASSWORD", hide_env_values = true)]
        account_password: Option<String>,

        /// Give up after this many seconds (overrides profile)
        #[arg(long, value_parser = wait_secs())]
        wait: Option<u64>,
    },

    /// Detach from the current account manager
    Detach {
        /// Give up after this many seconds (overrides profile)
        #[arg(long, value_parser = wait_secs())]
        wait: Option<u64>,
    },
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Code category, e.g. state, task_state, freturn
    pub category: String,

    /// Numeric code
    #[arg(allow_negative_numbers = true)]
    pub code: i32,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display current configuration (secrets masked)
    Show,

    /// Store a profile's GUI RPC password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
