//! `messages`: the daemon's event log.

use tabled::Tabled;

use boinc_rpc_core::{Client, EventLogEntry};

use crate::cli::{GlobalOpts, MessagesArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct MessageRow {
    #[tabled(rename = "#")]
    seqno: u64,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Message")]
    body: String,
}

impl From<&EventLogEntry> for MessageRow {
    fn from(e: &EventLogEntry) -> Self {
        Self {
            seqno: e.seqno,
            time: super::util::fmt_time(e.time()),
            project: e.project.clone().unwrap_or_default(),
            body: e.body.clone(),
        }
    }
}

pub async fn handle(
    client: &Client,
    args: &MessagesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut entries = client.get_messages(args.since, false).await?;
    if let Some(n) = args.tail {
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
    }
    let out = output::render_list(&global.output, &entries, |e| MessageRow::from(e), |e| {
        e.body.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
