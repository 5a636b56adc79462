//! CLI flag overrides on top of `boinc-rpc-config`.
//!
//! Core never sees profiles; it receives a pre-built `ClientConfig`.

use std::time::Duration;

use secrecy::SecretString;

use boinc_rpc_config::{Config, Profile};
use boinc_rpc_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use boinc_rpc_config::{config_path, load_config_or_default, store_password};

/// Profile name selected by `--profile`, falling back to the config default.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| cfg.active_profile_name().to_owned())
}

/// Build a `ClientConfig` from the config file, profile, and CLI overrides.
///
/// An explicitly named profile must exist. Without one, the default
/// profile is used if present, otherwise flags alone describe the daemon.
pub fn build_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => Profile::default(),
    };

    let profile = apply_overrides(profile, global);

    // --password / BOINC_RPC_PASSWORD beat everything in the profile.
    let password = match global.password {
        Some(ref pw) => SecretString::from(pw.clone()),
        None => boinc_rpc_config::resolve_password(&profile, &profile_name)?,
    };

    let mut client = boinc_rpc_config::profile_to_client_config(&profile, &cfg.defaults, password)?;
    if let Some(secs) = global.timeout {
        client.read_timeout = Duration::from_secs(secs);
    }
    Ok(client)
}

fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = port;
    }
    profile
}
