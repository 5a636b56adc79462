// Task endpoints
//
// Current results (optionally only those with a running process) and
// the recently-finished history.

use tracing::debug;

use crate::error::Error;
use crate::request::Request;
use crate::rpc::client::RpcClient;
use crate::rpc::models::{OldResult, TaskResult};

/// `<get_results>` with the active-only switch.
pub fn get_results_request(active_only: bool) -> Request {
    Request::new("get_results").field("active_only", u8::from(active_only))
}

impl RpcClient {
    /// Tasks known to the daemon.
    ///
    /// `<get_results>` -> `<results><result>...`
    pub async fn get_results(&self, active_only: bool) -> Result<Vec<TaskResult>, Error> {
        debug!(active_only, "fetching results");
        let reply = self.execute(&get_results_request(active_only)).await?;
        reply.list("results", "result")
    }

    /// Recently completed tasks.
    ///
    /// `<get_old_results/>` -> `<old_results><old_result>...`
    pub async fn get_old_results(&self) -> Result<Vec<OldResult>, Error> {
        let reply = self.execute(&Request::new("get_old_results")).await?;
        reply.list("old_results", "old_result")
    }
}
