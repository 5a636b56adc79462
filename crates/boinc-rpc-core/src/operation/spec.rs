use std::collections::HashSet;

use boinc_rpc_api::Request;
use boinc_rpc_api::rpc::acct_mgr::{
    acct_mgr_attach_request, acct_mgr_detach_request, acct_mgr_poll_request,
};
use boinc_rpc_api::rpc::projects::{project_attach_poll_request, project_attach_request};
use secrecy::SecretString;

use super::OperationKind;

// Event-log phrases the daemon emits when an attach settles. Matched as
// case-sensitive substrings of the entry body.
const PROJECT_ATTACH_SUCCESS: &[&str] = &["Scheduler request completed"];
const PROJECT_ATTACH_FAILURE: &[&str] = &[
    "Invalid or missing account key",
    "Invalid authenticator",
    "Master file download failed",
    "Couldn't attach to project",
];
const ACCT_MGR_SUCCESS: &[&str] = &["Account manager contact succeeded"];
const ACCT_MGR_FAILURE: &[&str] = &[
    "Invalid password",
    "Invalid user name",
    "Account manager error",
    "Account manager contact failed",
];

/// Everything that distinguishes one long-running operation from another.
#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub kind: OperationKind,
    /// Command that starts the operation; must be acknowledged with `<success/>`.
    pub start: Request,
    /// Status command issued on every poll.
    pub poll: Request,
    /// Element of the poll reply that carries `error_num`.
    pub poll_reply: String,
    pub success_markers: Vec<String>,
    pub failure_markers: Vec<String>,
    /// Project names whose log entries are ignored, in addition to the
    /// projects attached when the operation starts.
    pub exclusions: HashSet<String>,
    /// Treat a settled status (`error_num == 0`) as success even when no
    /// log entry confirms it.
    pub settle_on_status: bool,
}

fn owned(markers: &[&str]) -> Vec<String> {
    markers.iter().map(|m| (*m).to_owned()).collect()
}

impl OperationSpec {
    /// Attach the daemon to a project with an account key.
    pub fn project_attach(url: &str, authenticator: &str, name: &str) -> Self {
        Self {
            kind: OperationKind::ProjectAttach,
            start: project_attach_request(url, authenticator, name),
            poll: project_attach_poll_request(),
            poll_reply: "project_attach_reply".into(),
            success_markers: owned(PROJECT_ATTACH_SUCCESS),
            failure_markers: owned(PROJECT_ATTACH_FAILURE),
            exclusions: HashSet::new(),
            settle_on_status: false,
        }
    }

    /// Attach the daemon to an account manager.
    pub fn account_manager_attach(url: &str, user: &str, password: &SecretString) -> Self {
        Self {
            kind: OperationKind::AccountManagerAttach,
            start: acct_mgr_attach_request(url, user, password),
            poll: acct_mgr_poll_request(),
            poll_reply: "acct_mgr_rpc_reply".into(),
            success_markers: owned(ACCT_MGR_SUCCESS),
            failure_markers: owned(ACCT_MGR_FAILURE),
            exclusions: HashSet::new(),
            settle_on_status: false,
        }
    }

    /// Detach from the current account manager. The daemon logs nothing
    /// reliable for a detach, so a settled status is enough.
    pub fn account_manager_detach() -> Self {
        Self {
            kind: OperationKind::AccountManagerDetach,
            start: acct_mgr_detach_request(),
            poll: acct_mgr_poll_request(),
            poll_reply: "acct_mgr_rpc_reply".into(),
            success_markers: Vec::new(),
            failure_markers: owned(ACCT_MGR_FAILURE),
            exclusions: HashSet::new(),
            settle_on_status: true,
        }
    }

    /// Ignore log entries from an additional project.
    pub fn exclude(mut self, project: impl Into<String>) -> Self {
        self.exclusions.insert(project.into());
        self
    }

    pub fn with_markers(mut self, success: &[&str], failure: &[&str]) -> Self {
        self.success_markers.extend(success.iter().map(|m| (*m).to_owned()));
        self.failure_markers.extend(failure.iter().map(|m| (*m).to_owned()));
        self
    }
}
