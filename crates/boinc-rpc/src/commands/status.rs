//! `status` and `version` handlers.

use boinc_rpc_core::{Client, DaemonStatus, RunModeSetting};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn mode(m: &RunModeSetting) -> String {
    if m.current == m.selected || m.delay_secs <= 0.0 {
        m.current_label.to_owned()
    } else {
        format!(
            "{} (reverts to {} in {})",
            m.current_label,
            m.selected_label,
            super::util::fmt_secs(Some(m.delay_secs))
        )
    }
}

fn suspend(reason: i32, label: &str) -> String {
    if reason == 0 {
        "no".into()
    } else {
        label.to_owned()
    }
}

fn detail(s: &DaemonStatus) -> String {
    output::detail(&[
        ("Network", s.network_status_label.to_owned()),
        ("Task mode", mode(&s.task_mode)),
        ("GPU mode", mode(&s.gpu_mode)),
        ("Network mode", mode(&s.network_mode)),
        ("Tasks suspended", suspend(s.task_suspend_reason, s.task_suspend_label)),
        ("GPU suspended", suspend(s.gpu_suspend_reason, s.gpu_suspend_label)),
        (
            "Network suspended",
            suspend(s.network_suspend_reason, s.network_suspend_label),
        ),
        (
            "Account manager",
            if s.ams_password_error {
                "password rejected".into()
            } else {
                String::new()
            },
        ),
    ])
}

pub async fn handle(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let status = client.get_cc_status().await?;
    let out = output::render_single(&global.output, &status, detail, |s| {
        s.task_mode.current_label.to_owned()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn version(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let version = client.exchange_versions().await?;
    let out = output::render_single(
        &global.output,
        &version,
        ToString::to_string,
        ToString::to_string,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
