//! Shared helpers for command handlers.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use indicatif::{ProgressBar, ProgressStyle};

use boinc_rpc_core::{OperationHandle, OperationOptions, OperationReport, OperationState};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Require a parseable absolute URL.
pub fn validate_url(field: &str, raw: &str) -> Result<String, CliError> {
    let url = url::Url::parse(raw).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("{raw}: {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CliError::Validation {
            field: field.into(),
            reason: format!("expected an http(s) URL, got '{raw}'"),
        });
    }
    Ok(url.to_string())
}

/// Operation options from the session config, with an optional `--wait`.
pub fn operation_options(base: OperationOptions, wait_secs: Option<u64>) -> OperationOptions {
    match wait_secs {
        Some(secs) => OperationOptions {
            timeout: Duration::from_secs(secs),
            ..base
        },
        None => base,
    }
}

/// Wait for an operation, showing a spinner unless quiet.
///
/// Ctrl-C drops the handle, which cancels the operation.
pub async fn await_operation(
    handle: OperationHandle,
    quiet: bool,
) -> Result<OperationReport, CliError> {
    let kind = handle.kind();
    let mut state = handle.state();

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(format!("{kind}: starting"));
        pb
    };

    let wait = handle.wait();
    tokio::pin!(wait);
    let mut watching = true;

    let result = loop {
        tokio::select! {
            biased;
            result = &mut wait => break result.map_err(CliError::from),
            changed = state.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                    continue;
                }
                if let OperationState::Polling { polls } = *state.borrow_and_update() {
                    spinner.set_message(format!("{kind}: waiting for the daemon (poll {polls})"));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break Err(CliError::OperationCancelled { kind });
            }
        }
    };

    spinner.finish_and_clear();
    result
}

// ── Formatting ──────────────────────────────────────────────────────

pub fn fmt_time(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Seconds as `1h02m03s` / `2m03s` / `3s`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
pub fn fmt_secs(secs: Option<f64>) -> String {
    let Some(secs) = secs.filter(|s| s.is_finite() && *s >= 0.0) else {
        return String::new();
    };
    let total = secs.round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h{m:02}m{s:02}s")
    } else if m > 0 {
        format!("{m}m{s:02}s")
    } else {
        format!("{s}s")
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
pub fn fmt_bytes(bytes: f64) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 B".into();
    }
    bytesize::ByteSize::b(bytes as u64).to_string()
}

pub fn fmt_credit(credit: Option<f64>) -> String {
    credit.map(|c| format!("{c:.0}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_formatting() {
        assert_eq!(fmt_secs(Some(3.4)), "3s");
        assert_eq!(fmt_secs(Some(123.0)), "2m03s");
        assert_eq!(fmt_secs(Some(3723.0)), "1h02m03s");
        assert_eq!(fmt_secs(None), "");
        assert_eq!(fmt_secs(Some(-1.0)), "");
    }

    #[test]
    fn url_validation() {
        assert!(validate_url("url", "https://einstein.phys.uwm.edu/").is_ok());
        assert!(matches!(
            validate_url("url", "einstein.phys.uwm.edu"),
            Err(CliError::Validation { .. })
        ));
        assert!(matches!(
            validate_url("url", "ftp://example.org/"),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn wait_overrides_timeout_only() {
        let base = OperationOptions::default();
        let opts = operation_options(base, Some(5));
        assert_eq!(opts.timeout, Duration::from_secs(5));
        assert_eq!(opts.poll_interval, base.poll_interval);
        assert_eq!(operation_options(base, None), base);
    }
}
