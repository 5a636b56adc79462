// ── Typed commands ──
//
// Read-only daemon queries, converted into domain types. Each call is a
// single exchange through the client's facade.

use std::sync::Arc;

use crate::client::Client;
use crate::convert;
use crate::error::CoreError;
use crate::model::{
    AccountManagerInfo, ClientState, DaemonStatus, DiskUsage, EventLogEntry, OldResult,
    ProjectStatistics, ProjectStatus, ServerVersion, WorkUnit,
};

impl Client {
    /// Full daemon state. Also replaces the session snapshot used to
    /// resolve task names.
    pub async fn get_state(&self) -> Result<Arc<ClientState>, CoreError> {
        let rpc = self.rpc()?;
        let state = self.track(rpc.get_state().await)?;
        Ok(self.store_snapshot(state))
    }

    /// Tasks known to the daemon, with app and project names resolved
    /// from the latest snapshot.
    pub async fn get_results(&self, active_only: bool) -> Result<Vec<WorkUnit>, CoreError> {
        let rpc = self.rpc()?;
        let results = self.track(rpc.get_results(active_only).await)?;
        let snapshot = self.snapshot();
        Ok(results
            .into_iter()
            .map(|r| convert::work_unit(r, snapshot.as_deref()))
            .collect())
    }

    pub async fn get_old_results(&self) -> Result<Vec<OldResult>, CoreError> {
        let rpc = self.rpc()?;
        self.track(rpc.get_old_results().await)
    }

    pub async fn get_cc_status(&self) -> Result<DaemonStatus, CoreError> {
        let rpc = self.rpc()?;
        Ok(self.track(rpc.get_cc_status().await)?.into())
    }

    pub async fn get_statistics(&self) -> Result<Vec<ProjectStatistics>, CoreError> {
        let rpc = self.rpc()?;
        self.track(rpc.get_statistics().await)
    }

    pub async fn get_disk_usage(&self) -> Result<DiskUsage, CoreError> {
        let rpc = self.rpc()?;
        self.track(rpc.get_disk_usage().await)
    }

    pub async fn exchange_versions(&self) -> Result<ServerVersion, CoreError> {
        let rpc = self.rpc()?;
        Ok(self.track(rpc.exchange_versions().await)?.into())
    }

    /// Highest event-log sequence number.
    pub async fn get_message_count(&self) -> Result<u64, CoreError> {
        let rpc = self.rpc()?;
        self.track(rpc.get_message_count().await)
    }

    /// Event-log entries with a sequence number above `since`.
    pub async fn get_messages(
        &self,
        since: u64,
        translatable: bool,
    ) -> Result<Vec<EventLogEntry>, CoreError> {
        let rpc = self.rpc()?;
        let messages = self.track(rpc.get_messages(since, translatable).await)?;
        Ok(messages.into_iter().map(EventLogEntry::from).collect())
    }

    /// Attached projects.
    pub async fn get_project_status(&self) -> Result<Vec<ProjectStatus>, CoreError> {
        let rpc = self.rpc()?;
        self.track(rpc.get_project_status().await)
    }

    pub async fn account_manager_info(&self) -> Result<AccountManagerInfo, CoreError> {
        let rpc = self.rpc()?;
        self.track(rpc.acct_mgr_info().await)
    }
}
