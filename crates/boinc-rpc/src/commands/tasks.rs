//! Task command handlers: `tasks` and `history`.

use tabled::Tabled;

use boinc_rpc_core::{Client, OldResult, WorkUnit};

use crate::cli::{GlobalOpts, TasksArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "Task")]
    name: String,
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Elapsed")]
    elapsed: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Deadline")]
    deadline: String,
}

impl From<&WorkUnit> for TaskRow {
    fn from(w: &WorkUnit) -> Self {
        let state = match w.active {
            Some(ref a) => format!("{} / {}", w.state_label, a.task_state_label),
            None if w.suspended_via_gui => format!("{} (suspended)", w.state_label),
            None => w.state_label.to_owned(),
        };
        Self {
            name: w.display_name().to_owned(),
            project: w.project_name.clone().unwrap_or_else(|| w.project_url.clone()),
            app: w.app_name.clone().unwrap_or_default(),
            state,
            progress: w
                .progress()
                .map(|p| format!("{:.1}%", p * 100.0))
                .unwrap_or_default(),
            elapsed: util::fmt_secs(w.active.as_ref().and_then(|a| a.elapsed_secs)),
            remaining: util::fmt_secs(w.estimated_remaining_secs),
            deadline: util::fmt_time(w.report_deadline),
        }
    }
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Task")]
    name: String,
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Exit")]
    exit_status: i32,
    #[tabled(rename = "Elapsed")]
    elapsed: String,
    #[tabled(rename = "CPU")]
    cpu: String,
}

impl From<&OldResult> for HistoryRow {
    fn from(r: &OldResult) -> Self {
        Self {
            name: r.result_name.clone(),
            app: r.app_name.clone(),
            exit_status: r.exit_status,
            elapsed: util::fmt_secs(Some(r.elapsed_time)),
            cpu: util::fmt_secs(Some(r.cpu_time)),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(
    client: &Client,
    args: &TasksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let tasks = client.get_results(!args.all).await?;
    let out =
        output::render_list(&global.output, &tasks, |w| TaskRow::from(w), |w| w.name.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn history(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let results = client.get_old_results().await?;
    let out = output::render_list(&global.output, &results, |r| HistoryRow::from(r), |r| {
        r.result_name.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
