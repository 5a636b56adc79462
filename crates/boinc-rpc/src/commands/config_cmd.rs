//! Config subcommand handlers.

use boinc_rpc_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const MASK: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

/// Replace plaintext passwords before the config leaves the process.
fn redact(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }
    cfg
}

fn password_source(p: &Profile) -> String {
    if let Some(ref var) = p.password_env {
        format!("env ${var}")
    } else if p.password.is_some() {
        "config file".into()
    } else if let Some(ref path) = p.auth_file {
        format!("auth file {}", path.display())
    } else {
        "keyring".into()
    }
}

fn config_detail(cfg: &Config) -> String {
    let d = &cfg.defaults;
    let mut out = output::detail(&[
        ("Default profile", cfg.active_profile_name().to_owned()),
        ("Output", d.output.clone()),
        ("Timeout", format!("{}s", d.timeout)),
        ("Connect timeout", format!("{}s", d.connect_timeout)),
        ("Operation timeout", format!("{}s", d.operation_timeout)),
        ("Poll interval", format!("{}ms", d.poll_interval_ms)),
    ]);

    let mut names: Vec<&String> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let Some(p) = cfg.profiles.get(name) else {
            continue;
        };
        out.push_str(&format!("\n\n[{name}]\n"));
        out.push_str(&output::detail(&[
            ("Daemon", format!("{}:{}", p.host, p.port)),
            ("Password", password_source(p)),
            ("Timeout", p.timeout.map(|t| format!("{t}s")).unwrap_or_default()),
            (
                "Operation timeout",
                p.operation_timeout.map(|t| format!("{t}s")).unwrap_or_default(),
            ),
        ]));
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redact(config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, config_detail, |c| {
                c.active_profile_name().to_owned()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            let password = rpassword::prompt_password(format!("GUI RPC password for '{name}': "))?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            config::store_password(&name, &password)?;
            if !global.quiet {
                eprintln!("Password for profile '{name}' stored in the system keyring");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn sample() -> Config {
        let mut profiles = HashMap::new();
        profiles.insert(
            "cruncher".to_owned(),
            Profile {
                host: "10.0.0.5".into(),
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );
        profiles.insert("laptop".to_owned(), Profile::default());
        Config {
            default_profile: Some("cruncher".into()),
            defaults: Default::default(),
            profiles,
        }
    }

    #[test]
    fn redact_masks_plaintext_passwords() {
        let cfg = redact(sample());
        assert_eq!(cfg.profiles["cruncher"].password.as_deref(), Some(MASK));
        assert_eq!(cfg.profiles["laptop"].password, None);
    }

    #[test]
    fn detail_lists_profiles_in_order() {
        let text = config_detail(&redact(sample()));
        let cruncher = text.find("[cruncher]").unwrap_or(usize::MAX);
        let laptop = text.find("[laptop]").unwrap_or(0);
        assert!(cruncher < laptop);
        assert!(text.contains("10.0.0.5:31416"));
        assert!(!text.contains("hunter2"));
    }
}
