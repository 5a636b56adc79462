//! Account manager handlers: `acct-mgr info|attach|detach`.

use secrecy::SecretString;

use boinc_rpc_core::{AccountManagerInfo, Client, OperationReport, OperationSpec};

use crate::cli::{AcctMgrArgs, AcctMgrCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

fn info_detail(info: &AccountManagerInfo) -> String {
    if !info.is_attached() {
        return "Not attached to an account manager".into();
    }
    output::detail(&[
        ("Name", info.acct_mgr_name.clone().unwrap_or_default()),
        ("URL", info.acct_mgr_url.clone().unwrap_or_default()),
        (
            "Credentials",
            if info.have_credentials { "stored" } else { "missing" }.into(),
        ),
        (
            "Cookie",
            if info.cookie_required {
                info.cookie_failure_url
                    .clone()
                    .map_or_else(|| "required".into(), |url| format!("required ({url})"))
            } else {
                String::new()
            },
        ),
    ])
}

fn report_detail(r: &OperationReport) -> String {
    let mut out = format!("{} succeeded", r.kind);
    if let Some(ref info) = r.account_manager {
        out.push('\n');
        out.push_str(&info_detail(info));
    }
    out
}

fn print_report(report: &OperationReport, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, report, report_detail, |r| {
        r.account_manager
            .as_ref()
            .and_then(|i| i.acct_mgr_url.clone())
            .unwrap_or_default()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(
    client: &Client,
    args: AcctMgrArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let base = client.config().operation_options();

    match args.command {
        AcctMgrCommand::Info => {
            let info = client.account_manager_info().await?;
            let out = output::render_single(&global.output, &info, info_detail, |i| {
                i.acct_mgr_url.clone().unwrap_or_default()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AcctMgrCommand::Attach {
            url,
            user,
            account_password,
            wait,
        } => {
            let url = util::validate_url("url", &url)?;
            let password = match account_password {
                Some(pw) => pw,
                None => rpassword::prompt_password(format!("Password for {user}: "))?,
            };
            let password = SecretString::from(password);
            let spec = OperationSpec::account_manager_attach(&url, &user, &password);
            let handle = client.run_operation(spec, util::operation_options(base, wait));
            let report = util::await_operation(handle, global.quiet).await?;
            print_report(&report, global)
        }

        AcctMgrCommand::Detach { wait } => {
            let current = client.account_manager_info().await?;
            if !current.is_attached() {
                return Err(CliError::Validation {
                    field: "acct-mgr".into(),
                    reason: "not attached to an account manager".into(),
                });
            }
            let name = current
                .acct_mgr_name
                .or(current.acct_mgr_url)
                .unwrap_or_default();
            if !util::confirm(&format!("Detach from account manager '{name}'?"), global.yes)? {
                return Ok(());
            }
            let handle = client.run_operation(
                OperationSpec::account_manager_detach(),
                util::operation_options(base, wait),
            );
            let report = util::await_operation(handle, global.quiet).await?;
            print_report(&report, global)
        }
    }
}
