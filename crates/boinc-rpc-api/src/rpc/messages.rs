// Event log endpoints
//
// The daemon keeps a sequence-numbered log. `get_message_count` returns the
// newest seqno; `get_messages` returns entries after a given seqno.

use tracing::debug;

use crate::error::Error;
use crate::request::Request;
use crate::rpc::client::RpcClient;
use crate::rpc::models::Message;

/// `<get_messages>`; `since = 0` asks for the whole retained log.
pub fn get_messages_request(since: u64, translatable: bool) -> Request {
    let req = Request::new("get_messages");
    let req = if since > 0 { req.field("seqno", since) } else { req };
    req.flag_if("translatable", translatable)
}

impl RpcClient {
    /// Newest event-log sequence number.
    ///
    /// `<get_message_count/>` -> `<seqno>`
    pub async fn get_message_count(&self) -> Result<u64, Error> {
        let reply = self.execute(&Request::new("get_message_count")).await?;
        let seqno = reply.int("seqno").ok_or_else(|| Error::MissingElement {
            element: "seqno".into(),
        })?;
        u64::try_from(seqno).map_err(|_| Error::Decode {
            element: "seqno".into(),
            message: format!("negative sequence number {seqno}"),
        })
    }

    /// Event-log entries with seqno greater than `since`.
    ///
    /// `<get_messages>` -> `<msgs><msg>...`
    pub async fn get_messages(
        &self,
        since: u64,
        translatable: bool,
    ) -> Result<Vec<Message>, Error> {
        debug!(since, "fetching messages");
        let reply = self.execute(&get_messages_request(since, translatable)).await?;
        reply.list("msgs", "msg")
    }
}
