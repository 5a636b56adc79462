//! `state`: summary of the snapshot taken at connect time.

use boinc_rpc_core::{Client, ClientState};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(s: &ClientState) -> String {
    let version = match (
        s.core_client_major_version,
        s.core_client_minor_version,
        s.core_client_release,
    ) {
        (Some(major), Some(minor), Some(release)) => format!("{major}.{minor}.{release}"),
        _ => String::new(),
    };
    let host = s.host_info.as_ref();
    let os = host
        .map(|h| {
            [h.os_name.as_deref(), h.os_version.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    output::detail(&[
        ("Host", host.and_then(|h| h.domain_name.clone()).unwrap_or_default()),
        ("OS", os),
        (
            "CPUs",
            host.and_then(|h| h.p_ncpus).map(|n| n.to_string()).unwrap_or_default(),
        ),
        ("Platform", s.platform_name.clone().unwrap_or_default()),
        ("Client", version),
        ("Projects", s.project.len().to_string()),
        ("Apps", s.app.len().to_string()),
    ])
}

pub fn handle(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = client.snapshot().ok_or(CliError::Disconnected)?;
    let out = output::render_single(&global.output, snapshot.as_ref(), detail, |s| {
        s.platform_name.clone().unwrap_or_default()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
