// Account manager endpoints
//
// `acct_mgr_rpc` both attaches (url + credentials) and detaches (all
// fields empty). Like project attach it only starts the work; progress
// comes from `acct_mgr_rpc_poll`.

use secrecy::SecretString;
use tracing::debug;

use crate::auth::password_hash;
use crate::error::Error;
use crate::request::Request;
use crate::rpc::client::RpcClient;
use crate::rpc::models::{AcctMgrInfo, PollReply};

/// Attach to an account manager. The password is sent as
/// [`password_hash`], never in clear.
pub fn acct_mgr_attach_request(url: &str, user: &str, password: &SecretString) -> Request {
    Request::new("acct_mgr_rpc")
        .field("url", url)
        .field("name", user)
        .field("password_hash", password_hash(password, user))
}

/// Detach from the current account manager.
pub fn acct_mgr_detach_request() -> Request {
    Request::new("acct_mgr_rpc")
        .field("url", "")
        .field("name", "")
        .field("password_hash", "")
}

pub fn acct_mgr_poll_request() -> Request {
    Request::new("acct_mgr_rpc_poll")
}

impl RpcClient {
    /// Current account manager, if any.
    ///
    /// `<acct_mgr_info/>` -> `<acct_mgr_info>`
    pub async fn acct_mgr_info(&self) -> Result<AcctMgrInfo, Error> {
        let reply = self.execute(&Request::new("acct_mgr_info")).await?;
        reply.decode("acct_mgr_info")
    }

    /// Begin an account-manager attach.
    pub async fn acct_mgr_attach(
        &self,
        url: &str,
        user: &str,
        password: &SecretString,
    ) -> Result<(), Error> {
        debug!(url, "starting account manager attach");
        self.action(&acct_mgr_attach_request(url, user, password)).await?;
        Ok(())
    }

    /// Begin an account-manager detach.
    pub async fn acct_mgr_detach(&self) -> Result<(), Error> {
        debug!("starting account manager detach");
        self.action(&acct_mgr_detach_request()).await?;
        Ok(())
    }

    /// `<acct_mgr_rpc_poll/>` -> `<acct_mgr_rpc_reply>`
    pub async fn acct_mgr_rpc_poll(&self) -> Result<PollReply, Error> {
        let reply = self.execute(&acct_mgr_poll_request()).await?;
        reply.decode("acct_mgr_rpc_reply")
    }
}
