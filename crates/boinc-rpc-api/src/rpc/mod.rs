// Authenticated GUI RPC client
//
// `RpcClient` owns one `Connection` plus the handshake state, gates every
// non-auth command on a completed handshake, and exposes one inherent
// method per daemon command. Endpoint groups live in separate files as
// `impl RpcClient` blocks; this module keeps the gate and request helpers.

pub mod acct_mgr;
pub mod auth;
pub mod client;
pub mod messages;
pub mod models;
pub mod projects;
pub mod results;
pub mod state;

pub use client::RpcClient;
