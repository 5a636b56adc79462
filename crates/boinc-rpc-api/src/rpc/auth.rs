// GUI RPC handshake
//
// `<auth1/>` returns a nonce; `<auth2>` answers with the nonce digest and
// the daemon replies `<authorized/>` or `<unauthorized/>`. One attempt per
// connection: the outcome is remembered and replayed on later calls.

use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::auth::{AuthState, nonce_hash};
use crate::error::Error;
use crate::request::Request;
use crate::rpc::client::RpcClient;

impl RpcClient {
    /// Run the handshake.
    ///
    /// Succeeds immediately if already authenticated. After a failed
    /// attempt the connection stays unauthenticated and this returns
    /// [`Error::Authentication`] again without contacting the daemon.
    pub async fn authorize(&self, password: &SecretString) -> Result<(), Error> {
        let mut state = self.auth.lock().await;
        match *state {
            AuthState::Authenticated => return Ok(()),
            AuthState::Failed | AuthState::NonceReceived => {
                return Err(Error::Authentication {
                    message: "handshake already failed on this connection".into(),
                });
            }
            AuthState::Unauthenticated => {}
        }

        let result = self.handshake(&mut state, password).await;
        match &result {
            Ok(()) => {
                *state = AuthState::Authenticated;
                self.mark_authenticated();
                info!(peer = self.connection().peer(), "authenticated");
            }
            Err(e) => {
                *state = AuthState::Failed;
                warn!(peer = self.connection().peer(), error = %e, "authentication failed");
            }
        }
        result
    }

    async fn handshake(&self, state: &mut AuthState, password: &SecretString) -> Result<(), Error> {
        // Handshake requests go straight to the connection; an
        // `<unauthorized/>` reply here is a rejected password, not a gate miss.
        let auth1 = self.connection().send(&Request::new("auth1")).await?;
        let nonce = auth1
            .text("nonce")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::Authentication {
                message: "daemon did not supply a nonce".into(),
            })?;
        *state = AuthState::NonceReceived;
        debug!("nonce received");

        let auth2 = Request::new("auth2").field("nonce_hash", nonce_hash(nonce, password));
        let reply = self.connection().send(&auth2).await?;
        if reply.has("authorized") {
            Ok(())
        } else {
            Err(Error::Authentication {
                message: "daemon rejected the password".into(),
            })
        }
    }
}
