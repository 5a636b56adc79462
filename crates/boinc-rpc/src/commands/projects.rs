//! `projects` and `attach` handlers.

use tabled::Tabled;

use boinc_rpc_core::{Client, OperationSpec, ProjectStatus};

use crate::cli::{AttachArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "Project")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Credit")]
    credit: String,
    #[tabled(rename = "Share")]
    share: String,
    #[tabled(rename = "Flags")]
    flags: String,
}

impl From<&ProjectStatus> for ProjectRow {
    fn from(p: &ProjectStatus) -> Self {
        let flags: Vec<&str> = [
            (p.suspended_via_gui, "suspended"),
            (p.dont_request_more_work, "no-new-work"),
            (p.attached_via_acct_mgr, "acct-mgr"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();
        Self {
            name: p.project_name.clone(),
            url: p.master_url.clone(),
            user: p.user_name.clone().unwrap_or_default(),
            credit: util::fmt_credit(p.host_total_credit),
            share: p.resource_share.map(|s| format!("{s:.0}")).unwrap_or_default(),
            flags: flags.join(","),
        }
    }
}

pub async fn handle(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let projects = client.get_project_status().await?;
    let out = output::render_list(&global.output, &projects, |p| ProjectRow::from(p), |p| {
        p.master_url.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn attach(
    client: &Client,
    args: AttachArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let url = util::validate_url("url", &args.url)?;
    if args.key.trim().is_empty() {
        return Err(CliError::Validation {
            field: "key".into(),
            reason: "account key must not be empty".into(),
        });
    }
    let name = args.name.unwrap_or_default();

    let options = util::operation_options(client.config().operation_options(), args.wait);
    let spec = OperationSpec::project_attach(&url, args.key.trim(), &name);
    let handle = client.run_operation(spec, options);
    let report = util::await_operation(handle, global.quiet).await?;

    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            let confirmation = r.confirmation.clone().unwrap_or_default();
            format!("Attached to {url}\n{confirmation}").trim_end().to_owned()
        },
        |_| url.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
