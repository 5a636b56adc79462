#![allow(clippy::unwrap_used)]
// Long-running operations driven end to end against the scripted daemon.
// Time is paused, so poll intervals and deadlines elapse instantly.

mod support;

use std::time::Duration;

use boinc_rpc_core::{CoreError, OperationKind, OperationOptions, OperationSpec, OperationState};
use secrecy::SecretString;

use support::{FakeDaemon, connect, msgs, poll_reply};

// ── Helpers ─────────────────────────────────────────────────────────

const NEW_URL: &str = "https://new.example/";

fn short() -> OperationOptions {
    OperationOptions {
        timeout: Duration::from_secs(5),
        poll_interval: Duration::from_millis(500),
    }
}

fn attach_spec() -> OperationSpec {
    OperationSpec::project_attach(NEW_URL, "0123abcd", "New Project")
}

fn attach_in_progress() -> String {
    poll_reply("project_attach_reply", -204)
}

fn attach_settled() -> String {
    poll_reply("project_attach_reply", 0)
}

// ── Project attach ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn project_attach_confirmed_by_log() {
    let daemon = FakeDaemon::new();
    daemon
        .on("project_attach", "<success/>")
        .on("project_attach_poll", attach_in_progress())
        .on("project_attach_poll", attach_settled())
        .on(
            "get_messages",
            msgs(&[(11, "New Project", "Scheduler request completed: got 0 new tasks")]),
        );
    let client = connect(&daemon).await;

    let handle = client.run_operation(attach_spec(), short());
    let state = handle.state();
    let report = handle.wait().await.unwrap();

    assert_eq!(report.kind, OperationKind::ProjectAttach);
    assert_eq!(report.polls, 2);
    assert_eq!(
        report.confirmation.as_deref(),
        Some("Scheduler request completed: got 0 new tasks")
    );
    assert_eq!(*state.borrow(), OperationState::Succeeded);

    // Watermark is read before the start command and used for the log query.
    let tags = daemon.tags();
    let count_at = tags.iter().position(|t| t == "get_message_count").unwrap();
    let start_at = tags.iter().position(|t| t == "project_attach").unwrap();
    assert!(count_at < start_at);
    assert!(daemon.requests_for("get_messages")[0].contains("<seqno>10</seqno>"));

    // The in-progress poll never consults the log.
    assert_eq!(daemon.count("get_messages"), 1);

    // Success refreshes the state snapshot (connect + refresh).
    assert_eq!(daemon.count("get_state"), 2);
}

#[tokio::test(start_paused = true)]
async fn start_request_carries_arguments() {
    let daemon = FakeDaemon::new();
    daemon
        .on("project_attach", "<success/>")
        .on("project_attach_poll", attach_settled())
        .on("get_messages", msgs(&[(11, "New Project", "Scheduler request completed")]));
    let client = connect(&daemon).await;

    client.run_operation(attach_spec(), short()).wait().await.unwrap();

    let start = &daemon.requests_for("project_attach")[0];
    assert!(start.contains(&format!("<project_url>{NEW_URL}</project_url>")));
    assert!(start.contains("<authenticator>0123abcd</authenticator>"));
    assert!(start.contains("<project_name>New Project</project_name>"));
}

#[tokio::test(start_paused = true)]
async fn already_attached_project_cannot_confirm() {
    let daemon = FakeDaemon::new();
    daemon
        .on("project_attach", "<success/>")
        .on("project_attach_poll", attach_settled())
        .on(
            "get_messages",
            msgs(&[(11, "Old Project", "Scheduler request completed: got 3 new tasks")]),
        );
    let client = connect(&daemon).await;

    let handle = client.run_operation(attach_spec(), short());
    let state = handle.state();
    let err = handle.wait().await.unwrap_err();

    assert!(
        matches!(err, CoreError::OperationTimedOut { kind: OperationKind::ProjectAttach, .. }),
        "got {err:?}"
    );
    assert_eq!(*state.borrow(), OperationState::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn entries_at_or_below_watermark_are_ignored() {
    let daemon = FakeDaemon::new();
    daemon
        .on("project_attach", "<success/>")
        .on("project_attach_poll", attach_settled())
        .on("get_messages", msgs(&[(10, "New Project", "Scheduler request completed")]));
    let client = connect(&daemon).await;

    let err = client.run_operation(attach_spec(), short()).wait().await.unwrap_err();
    assert!(matches!(err, CoreError::OperationTimedOut { .. }), "got {err:?}");
}

#[tokio::test(start_paused = true)]
async fn failure_marker_fails_the_attach() {
    let daemon = FakeDaemon::new();
    daemon
        .on("project_attach", "<success/>")
        .on("project_attach_poll", attach_settled())
        .on(
            "get_messages",
            msgs(&[
                (11, "", "Fetching configuration file"),
                (12, "New Project", "Invalid or missing account key."),
            ]),
        );
    let client = connect(&daemon).await;

    let handle = client.run_operation(attach_spec(), short());
    let state = handle.state();
    let err = handle.wait().await.unwrap_err();

    match err {
        CoreError::OperationFailed { kind, reason } => {
            assert_eq!(kind, OperationKind::ProjectAttach);
            assert_eq!(reason, "Invalid or missing account key.");
        }
        other => panic!("expected OperationFailed, got {other:?}"),
    }
    assert!(matches!(*state.borrow(), OperationState::Failed { .. }));
    // No refresh after a failure.
    assert_eq!(daemon.count("get_state"), 1);
}

#[tokio::test(start_paused = true)]
async fn poll_error_without_marker_fails_with_daemon_message() {
    let daemon = FakeDaemon::new();
    daemon.on("project_attach", "<success/>").on(
        "project_attach_poll",
        "<project_attach_reply>\n<error_num>-189</error_num>\n<message>Invalid URL</message>\n</project_attach_reply>",
    );
    let client = connect(&daemon).await;

    let err = client.run_operation(attach_spec(), short()).wait().await.unwrap_err();
    assert!(
        matches!(&err, CoreError::OperationFailed { reason, .. } if reason == "Invalid URL"),
        "got {err:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_start_fails_without_polling() {
    let daemon = FakeDaemon::new();
    daemon.on("project_attach", "<error>Already attached to project</error>");
    let client = connect(&daemon).await;

    let err = client.run_operation(attach_spec(), short()).wait().await.unwrap_err();
    assert!(
        matches!(
            &err,
            CoreError::OperationFailed { reason, .. } if reason == "Already attached to project"
        ),
        "got {err:?}"
    );
    assert_eq!(daemon.count("project_attach_poll"), 0);

    // The session survives a rejected command.
    assert_eq!(client.get_message_count().await.unwrap(), 10);
}

// ── Cancellation ────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn cancel_stops_polling() {
    let daemon = FakeDaemon::new();
    daemon
        .on("project_attach", "<success/>")
        .on("project_attach_poll", attach_in_progress());
    let client = connect(&daemon).await;

    let handle = client.run_operation(attach_spec(), short());
    let mut state = handle.state();
    state
        .wait_for(|s| matches!(s, OperationState::Polling { polls } if *polls >= 2))
        .await
        .unwrap();

    handle.cancel();
    let err = handle.wait().await.unwrap_err();
    assert!(matches!(err, CoreError::OperationCancelled { .. }), "got {err:?}");
    assert_eq!(*state.borrow(), OperationState::Cancelled);

    // Nothing more goes out for this operation.
    let polls = daemon.count("project_attach_poll");
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(daemon.count("project_attach_poll"), polls);
}

#[tokio::test(start_paused = true)]
async fn disconnect_cancels_running_operations() {
    let daemon = FakeDaemon::new();
    daemon
        .on("project_attach", "<success/>")
        .on("project_attach_poll", attach_in_progress());
    let client = connect(&daemon).await;

    let handle = client.run_operation(attach_spec(), short());
    let mut state = handle.state();
    state
        .wait_for(|s| matches!(s, OperationState::Polling { .. }))
        .await
        .unwrap();

    client.disconnect().await;
    let err = handle.wait().await.unwrap_err();
    assert!(matches!(err, CoreError::OperationCancelled { .. }), "got {err:?}");
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels() {
    let daemon = FakeDaemon::new();
    daemon
        .on("project_attach", "<success/>")
        .on("project_attach_poll", attach_in_progress());
    let client = connect(&daemon).await;

    let handle = client.run_operation(attach_spec(), short());
    let mut state = handle.state();
    state
        .wait_for(|s| matches!(s, OperationState::Polling { .. }))
        .await
        .unwrap();
    drop(handle);

    state.wait_for(OperationState::is_terminal).await.unwrap();
    assert_eq!(*state.borrow(), OperationState::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn operations_share_the_connection_with_other_callers() {
    let daemon = FakeDaemon::new();
    daemon
        .on("project_attach", "<success/>")
        .on("project_attach_poll", attach_in_progress())
        .on("project_attach_poll", attach_in_progress())
        .on("project_attach_poll", attach_settled())
        .on("get_messages", msgs(&[(11, "New Project", "Scheduler request completed")]))
        .delay("project_attach_poll", Duration::from_millis(200));
    let client = connect(&daemon).await;

    let handle = client.run_operation(attach_spec(), short());
    for _ in 0..5 {
        assert_eq!(client.get_message_count().await.unwrap(), 10);
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    handle.wait().await.unwrap();
}

// ── Account manager ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn account_manager_attach_confirmed_by_log() {
    let daemon = FakeDaemon::new();
    daemon
        .on("acct_mgr_rpc", "<success/>")
        .on("acct_mgr_rpc_poll", poll_reply("acct_mgr_rpc_reply", -204))
        .on("acct_mgr_rpc_poll", poll_reply("acct_mgr_rpc_reply", 0))
        .on("get_messages", msgs(&[(11, "", "Account manager contact succeeded")]))
        .on(
            "acct_mgr_info",
            "<acct_mgr_info>\n<acct_mgr_url>https://bam.example/</acct_mgr_url>\n\
             <acct_mgr_name>BAM!</acct_mgr_name>\n<have_credentials/>\n</acct_mgr_info>",
        );
    let client = connect(&daemon).await;

    let report = client
        .attach_account_manager("https://bam.example/", "Alice", &SecretString::from("pw"))
        .wait()
        .await
        .unwrap();

    assert_eq!(report.kind, OperationKind::AccountManagerAttach);
    let info = report.account_manager.unwrap();
    assert!(info.is_attached());
    assert_eq!(info.acct_mgr_name.as_deref(), Some("BAM!"));
    assert!(info.have_credentials);

    let start = &daemon.requests_for("acct_mgr_rpc")[0];
    assert!(start.contains("<name>Alice</name>"));
    assert!(!start.contains(">pw<"));
}

#[tokio::test(start_paused = true)]
async fn account_manager_attach_fails_on_poll_error() {
    let daemon = FakeDaemon::new();
    daemon.on("acct_mgr_rpc", "<success/>").on(
        "acct_mgr_rpc_poll",
        "<acct_mgr_rpc_reply>\n<error_num>-206</error_num>\n<message>Invalid password</message>\n</acct_mgr_rpc_reply>",
    );
    let client = connect(&daemon).await;

    let err = client
        .attach_account_manager("https://bam.example/", "Alice", &SecretString::from("bad"))
        .wait()
        .await
        .unwrap_err();
    assert!(
        matches!(
            &err,
            CoreError::OperationFailed { kind: OperationKind::AccountManagerAttach, reason }
                if reason == "Invalid password"
        ),
        "got {err:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn account_manager_detach_settles_on_status() {
    let daemon = FakeDaemon::new();
    daemon
        .on("acct_mgr_rpc", "<success/>")
        .on("acct_mgr_rpc_poll", poll_reply("acct_mgr_rpc_reply", 0));
    let client = connect(&daemon).await;

    let report = client.detach_account_manager().wait().await.unwrap();

    assert_eq!(report.kind, OperationKind::AccountManagerDetach);
    assert_eq!(report.polls, 1);
    assert_eq!(report.confirmation, None);
    assert!(!report.account_manager.unwrap().is_attached());
    assert!(daemon.requests_for("acct_mgr_rpc")[0].contains("<url></url>"));
}

#[tokio::test(start_paused = true)]
async fn detach_poll_without_error_num_is_malformed() {
    let daemon = FakeDaemon::new();
    daemon.on("acct_mgr_rpc", "<success/>").on(
        "acct_mgr_rpc_poll",
        "<acct_mgr_rpc_reply>\n<message>x</message>\n</acct_mgr_rpc_reply>",
    );
    let client = connect(&daemon).await;

    let handle = client.detach_account_manager();
    let state = handle.state();
    let err = handle.wait().await.unwrap_err();

    assert!(matches!(err, CoreError::MalformedReply { .. }), "got {err:?}");
    assert!(matches!(*state.borrow(), OperationState::Failed { .. }));
    assert_eq!(daemon.count("acct_mgr_info"), 0);
}

// ── Polling across ticks ────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn attach_resolves_once_after_in_progress_polls() {
    let daemon = FakeDaemon::new();
    daemon
        .on("project_attach", "<success/>")
        .on("project_attach_poll", attach_in_progress())
        .on("project_attach_poll", attach_in_progress())
        .on("project_attach_poll", attach_in_progress())
        .on("project_attach_poll", attach_settled())
        .on(
            "get_messages",
            msgs(&[(11, "New Project", "Scheduler request completed: got 2 new tasks")]),
        );
    let client = connect(&daemon).await;

    let handle = client.run_operation(attach_spec(), short());
    let state = handle.state();
    let report = handle.wait().await.unwrap();

    assert_eq!(report.polls, 4);
    assert_eq!(daemon.count("get_messages"), 1);
    assert_eq!(*state.borrow(), OperationState::Succeeded);

    // Terminal: no further polls, and the state stays put.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(daemon.count("project_attach_poll"), 4);
    assert_eq!(*state.borrow(), OperationState::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn watermark_advances_between_settled_polls() {
    let daemon = FakeDaemon::new();
    daemon
        .on("project_attach", "<success/>")
        .on("project_attach_poll", attach_settled())
        .on(
            "get_messages",
            msgs(&[(11, "New Project", "Sending scheduler request: Project initialization.")]),
        )
        .on(
            "get_messages",
            msgs(&[(12, "New Project", "Scheduler request completed: got 1 new tasks")]),
        );
    let client = connect(&daemon).await;

    let report = client.run_operation(attach_spec(), short()).wait().await.unwrap();

    assert_eq!(report.polls, 2);
    assert_eq!(
        report.confirmation.as_deref(),
        Some("Scheduler request completed: got 1 new tasks")
    );
    let queries = daemon.requests_for("get_messages");
    assert_eq!(queries.len(), 2);
    assert!(queries[0].contains("<seqno>10</seqno>"));
    assert!(queries[1].contains("<seqno>11</seqno>"));
}

// ── Option bounds ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn huge_timeout_still_runs_to_completion() {
    let daemon = FakeDaemon::new();
    daemon
        .on("project_attach", "<success/>")
        .on("project_attach_poll", attach_settled())
        .on("get_messages", msgs(&[(11, "New Project", "Scheduler request completed")]));
    let client = connect(&daemon).await;

    let options = OperationOptions {
        timeout: Duration::from_secs(u64::MAX),
        ..short()
    };
    let handle = client.run_operation(attach_spec(), options);
    let state = handle.state();
    let report = handle.wait().await.unwrap();

    assert_eq!(report.polls, 1);
    assert_eq!(*state.borrow(), OperationState::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn zero_poll_interval_still_polls() {
    let daemon = FakeDaemon::new();
    daemon
        .on("project_attach", "<success/>")
        .on("project_attach_poll", attach_in_progress())
        .on("project_attach_poll", attach_settled())
        .on("get_messages", msgs(&[(11, "New Project", "Scheduler request completed")]));
    let client = connect(&daemon).await;

    let options = OperationOptions {
        poll_interval: Duration::ZERO,
        ..short()
    };
    let handle = client.run_operation(attach_spec(), options);
    let state = handle.state();
    let report = handle.wait().await.unwrap();

    assert_eq!(report.polls, 2);
    assert_eq!(*state.borrow(), OperationState::Succeeded);
}
