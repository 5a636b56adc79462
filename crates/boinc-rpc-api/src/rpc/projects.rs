// Project endpoints
//
// Attached-project status plus the asynchronous attach pair: the start
// request returns `<success/>` immediately and `project_attach_poll`
// reports progress until `error_num` leaves the in-progress value.

use tracing::debug;

use crate::error::Error;
use crate::request::Request;
use crate::rpc::client::RpcClient;
use crate::rpc::models::{PollReply, Project};

/// Start attaching to a project.
pub fn project_attach_request(url: &str, authenticator: &str, name: &str) -> Request {
    Request::new("project_attach")
        .field("project_url", url)
        .field("authenticator", authenticator)
        .field("project_name", name)
}

/// Progress of the pending attach.
pub fn project_attach_poll_request() -> Request {
    Request::new("project_attach_poll")
}

impl RpcClient {
    /// Projects the daemon is attached to.
    ///
    /// `<get_project_status/>` -> `<projects><project>...`
    pub async fn get_project_status(&self) -> Result<Vec<Project>, Error> {
        let reply = self.execute(&Request::new("get_project_status")).await?;
        reply.list("projects", "project")
    }

    /// Begin a project attach. Completion is observed through
    /// [`project_attach_poll`](Self::project_attach_poll).
    pub async fn project_attach(
        &self,
        url: &str,
        authenticator: &str,
        name: &str,
    ) -> Result<(), Error> {
        debug!(url, "starting project attach");
        self.action(&project_attach_request(url, authenticator, name)).await?;
        Ok(())
    }

    /// `<project_attach_poll/>` -> `<project_attach_reply>`
    pub async fn project_attach_poll(&self) -> Result<PollReply, Error> {
        let reply = self.execute(&project_attach_poll_request()).await?;
        reply.decode("project_attach_reply")
    }
}
