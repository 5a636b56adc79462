// boinc-rpc-api: Async Rust client for the BOINC core client GUI RPC protocol
//
// Layers, bottom-up:
// - `codec`: 0x03-terminated framing over any async byte stream
// - `xml`: attribute-free markup -> generic `serde_json::Value` tree
// - `request` / `reply`: outbound body builder and decoded reply wrapper
// - `connection`: single-flight request/reply exchange with read timeout
// - `auth`: nonce/password digests and the handshake state machine
// - `rpc`: `RpcClient`, the auth-gated client with typed endpoint calls

pub mod auth;
pub mod codec;
pub mod connection;
pub mod error;
pub mod reply;
pub mod request;
pub mod rpc;
pub mod serde_helpers;
pub mod xml;

pub use auth::{AuthState, nonce_hash, password_hash};
pub use connection::{Connection, RpcStream, TransportConfig};
pub use error::Error;
pub use reply::Reply;
pub use request::Request;
pub use rpc::RpcClient;
