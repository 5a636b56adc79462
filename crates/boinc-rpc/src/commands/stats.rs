//! `stats` and `disk` handlers.

use tabled::Tabled;

use boinc_rpc_core::{Client, ProjectDiskUsage, ProjectStatistics};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Days")]
    days: usize,
    #[tabled(rename = "User total")]
    user_total: String,
    #[tabled(rename = "User avg")]
    user_avg: String,
    #[tabled(rename = "Host total")]
    host_total: String,
    #[tabled(rename = "Host avg")]
    host_avg: String,
}

impl From<&ProjectStatistics> for StatsRow {
    fn from(p: &ProjectStatistics) -> Self {
        let latest = p.daily_statistics.last();
        Self {
            project: p.master_url.clone(),
            days: p.daily_statistics.len(),
            user_total: util::fmt_credit(latest.map(|d| d.user_total_credit)),
            user_avg: util::fmt_credit(latest.map(|d| d.user_expavg_credit)),
            host_total: util::fmt_credit(latest.map(|d| d.host_total_credit)),
            host_avg: util::fmt_credit(latest.map(|d| d.host_expavg_credit)),
        }
    }
}

#[derive(Tabled)]
struct DiskRow {
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Used")]
    used: String,
}

impl From<&ProjectDiskUsage> for DiskRow {
    fn from(d: &ProjectDiskUsage) -> Self {
        Self {
            project: d.master_url.clone(),
            used: util::fmt_bytes(d.disk_usage),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = client.get_statistics().await?;
    let out = output::render_list(&global.output, &stats, |p| StatsRow::from(p), |p| {
        p.master_url.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn disk(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let usage = client.get_disk_usage().await?;
    let out = output::render_single(
        &global.output,
        &usage,
        |u| {
            let table = output::render_list(
                &crate::cli::OutputFormat::Table,
                &u.project,
                |d| DiskRow::from(d),
                |d| d.master_url.clone(),
            )
            .unwrap_or_default();
            let summary = output::detail(&[
                ("Total", util::fmt_bytes(u.d_total)),
                ("Free", util::fmt_bytes(u.d_free)),
                ("BOINC", util::fmt_bytes(u.d_boinc)),
                ("Allowed", util::fmt_bytes(u.d_allowed)),
            ]);
            format!("{table}\n{summary}")
        },
        |u| util::fmt_bytes(u.d_boinc),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
