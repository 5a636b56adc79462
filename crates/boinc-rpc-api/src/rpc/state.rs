// Host-level read endpoints
//
// get_state, get_cc_status, get_statistics, get_disk_usage and
// exchange_versions. Each is one exchange; nothing is cached here.

use tracing::debug;

use crate::error::Error;
use crate::request::Request;
use crate::rpc::client::RpcClient;
use crate::rpc::models::{CcStatus, ClientState, DiskUsage, ProjectStatistics, VersionInfo};

impl RpcClient {
    /// Full daemon state: projects, apps, host info.
    ///
    /// `<get_state/>` -> `<client_state>`
    pub async fn get_state(&self) -> Result<ClientState, Error> {
        debug!("fetching client state");
        let reply = self.execute(&Request::new("get_state")).await?;
        reply.decode("client_state")
    }

    /// Run modes, suspend reasons, network status.
    ///
    /// `<get_cc_status/>` -> `<cc_status>`
    pub async fn get_cc_status(&self) -> Result<CcStatus, Error> {
        let reply = self.execute(&Request::new("get_cc_status")).await?;
        reply.decode("cc_status")
    }

    /// Credit history per project.
    ///
    /// `<get_statistics/>` -> `<statistics><project_statistics>...`
    pub async fn get_statistics(&self) -> Result<Vec<ProjectStatistics>, Error> {
        let reply = self.execute(&Request::new("get_statistics")).await?;
        reply.list("statistics", "project_statistics")
    }

    /// Disk usage summary.
    ///
    /// `<get_disk_usage/>` -> `<disk_usage_summary>`
    pub async fn get_disk_usage(&self) -> Result<DiskUsage, Error> {
        let reply = self.execute(&Request::new("get_disk_usage")).await?;
        reply.decode("disk_usage_summary")
    }

    /// Daemon version.
    ///
    /// `<exchange_versions/>` -> `<server_version>`
    pub async fn exchange_versions(&self) -> Result<VersionInfo, Error> {
        let reply = self.execute(&Request::new("exchange_versions")).await?;
        reply.decode("server_version")
    }
}
