//! Command dispatch: bridges CLI args -> core client calls -> output formatting.

pub mod acct_mgr;
pub mod config_cmd;
pub mod lookup;
pub mod messages;
pub mod projects;
pub mod state;
pub mod stats;
pub mod status;
pub mod tasks;
pub mod util;

use boinc_rpc_core::Client;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a daemon-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::State => state::handle(client, global),
        Command::Tasks(args) => tasks::handle(client, &args, global).await,
        Command::History => tasks::history(client, global).await,
        Command::Status => status::handle(client, global).await,
        Command::Version => status::version(client, global).await,
        Command::Stats => stats::handle(client, global).await,
        Command::Disk => stats::disk(client, global).await,
        Command::Messages(args) => messages::handle(client, &args, global).await,
        Command::Projects => projects::handle(client, global).await,
        Command::Attach(args) => projects::attach(client, args, global).await,
        Command::AcctMgr(args) => acct_mgr::handle(client, args, global).await,
        // Local commands are handled before a connection is made
        Command::Config(_) | Command::Lookup(_) | Command::Completions(_) => {
            Err(CliError::Validation {
                field: "command".into(),
                reason: "does not take a daemon connection".into(),
            })
        }
    }
}
