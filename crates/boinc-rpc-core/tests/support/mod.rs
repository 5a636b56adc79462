// Scripted daemon for integration tests.
//
// Speaks the real framing over an in-memory duplex pipe, performs the
// auth handshake, and answers every other command from a per-tag script.
// A scripted queue is consumed front to back; its last reply repeats.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use boinc_rpc_api::nonce_hash;
use boinc_rpc_core::{Client, ClientConfig};
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::task::JoinHandle;

pub const PASSWORD: &str = "secret";
const NONCE: &str = "1700000000.123456";

/// Reply that makes the daemon drop the connection instead of answering.
pub const HANG_UP: &str = "\0hang-up";

#[derive(Default)]
struct Script {
    queued: HashMap<String, VecDeque<String>>,
    defaults: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    log: Vec<String>,
}

impl Script {
    fn next_reply(&mut self, tag: &str) -> String {
        if let Some(queue) = self.queued.get_mut(tag) {
            if queue.len() > 1 {
                return queue.pop_front().unwrap();
            }
            if let Some(last) = queue.front() {
                return last.clone();
            }
        }
        self.defaults
            .get(tag)
            .cloned()
            .unwrap_or_else(|| "<error>unrecognized op</error>".into())
    }
}

#[derive(Clone)]
pub struct FakeDaemon {
    script: Arc<Mutex<Script>>,
}

impl FakeDaemon {
    /// A daemon with one attached project, an empty event log at seqno 10,
    /// and no account manager.
    pub fn new() -> Self {
        let mut script = Script::default();
        let defaults = [
            ("get_state", client_state(&[("https://old.example/", "Old Project")])),
            ("get_project_status", projects(&[("https://old.example/", "Old Project")])),
            ("get_message_count", "<seqno>10</seqno>".into()),
            ("get_messages", "<msgs>\n</msgs>".into()),
            ("acct_mgr_info", "<acct_mgr_info>\n</acct_mgr_info>".into()),
        ];
        for (tag, reply) in defaults {
            script.defaults.insert(tag.into(), reply);
        }
        Self {
            script: Arc::new(Mutex::new(script)),
        }
    }

    /// Queue `reply` (the inner markup of the reply envelope) for `tag`.
    pub fn on(&self, tag: &str, reply: impl Into<String>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .queued
            .entry(tag.into())
            .or_default()
            .push_back(reply.into());
        self
    }

    /// Hold every reply to `tag` for `delay` before writing it.
    pub fn delay(&self, tag: &str, delay: Duration) -> &Self {
        self.script.lock().unwrap().delays.insert(tag.into(), delay);
        self
    }

    /// Full bodies of every request received, in order.
    pub fn requests(&self) -> Vec<String> {
        self.script.lock().unwrap().log.clone()
    }

    pub fn tags(&self) -> Vec<String> {
        self.requests().iter().map(|r| request_tag(r)).collect()
    }

    pub fn count(&self, tag: &str) -> usize {
        self.tags().iter().filter(|t| *t == tag).count()
    }

    pub fn requests_for(&self, tag: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| request_tag(r) == tag)
            .collect()
    }

    /// Serve one connection until the client hangs up.
    pub fn serve(&self, stream: DuplexStream) -> JoinHandle<()> {
        let script = Arc::clone(&self.script);
        tokio::spawn(async move {
            let (read, mut write) = tokio::io::split(stream);
            let mut read = BufReader::new(read);
            loop {
                let mut buf = Vec::new();
                match read.read_until(0x03, &mut buf).await {
                    Ok(0) | Err(_) => return,
                    Ok(_) => {}
                }
                if buf.last() == Some(&0x03) {
                    buf.pop();
                }
                let body = String::from_utf8(buf).unwrap();
                let tag = request_tag(&body);

                let (reply, delay) = {
                    let mut script = script.lock().unwrap();
                    script.log.push(body.clone());
                    let reply = match tag.as_str() {
                        "auth1" => format!("<nonce>{NONCE}</nonce>"),
                        "auth2" => auth2_reply(&body),
                        other => script.next_reply(other),
                    };
                    (reply, script.delays.get(&tag).copied())
                };

                if reply == HANG_UP {
                    return;
                }
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }

                // Two writes so the client has to reassemble the frame.
                let framed =
                    format!("<boinc_gui_rpc_reply>\n{reply}\n</boinc_gui_rpc_reply>\n\x03");
                let (head, tail) = framed.as_bytes().split_at(framed.len() / 2);
                if write.write_all(head).await.is_err() {
                    return;
                }
                write.flush().await.unwrap();
                tokio::task::yield_now().await;
                if write.write_all(tail).await.is_err() {
                    return;
                }
            }
        })
    }
}

fn auth2_reply(body: &str) -> String {
    let expected = nonce_hash(NONCE, &SecretString::from(PASSWORD));
    if body.contains(&format!("<nonce_hash>{expected}</nonce_hash>")) {
        "<authorized/>".into()
    } else {
        "<unauthorized/>".into()
    }
}

/// First element name inside the request envelope.
pub fn request_tag(body: &str) -> String {
    let inner = body
        .trim_start()
        .strip_prefix("<boinc_gui_rpc_request>")
        .unwrap_or(body)
        .trim_start();
    inner
        .trim_start_matches('<')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

// ── Reply builders ──────────────────────────────────────────────────

pub fn client_state(projects: &[(&str, &str)]) -> String {
    let mut out =
        String::from("<client_state>\n<platform_name>x86_64-pc-linux-gnu</platform_name>\n");
    for (url, name) in projects {
        out.push_str(&format!(
            "<project>\n<master_url>{url}</master_url>\n<project_name>{name}</project_name>\n</project>\n"
        ));
    }
    out.push_str("</client_state>");
    out
}

pub fn projects(projects: &[(&str, &str)]) -> String {
    let mut out = String::from("<projects>\n");
    for (url, name) in projects {
        out.push_str(&format!(
            "<project>\n<master_url>{url}</master_url>\n<project_name>{name}</project_name>\n</project>\n"
        ));
    }
    out.push_str("</projects>");
    out
}

/// `(seqno, project, body)` entries as a `get_messages` reply.
pub fn msgs(entries: &[(u64, &str, &str)]) -> String {
    let mut out = String::from("<msgs>\n");
    for (seqno, project, body) in entries {
        out.push_str(&format!(
            "<msg>\n <project>{project}</project>\n <pri>1</pri>\n <seqno>{seqno}</seqno>\n \
             <body><![CDATA[\n{body}\n]]></body>\n <time>1700000000</time>\n</msg>\n"
        ));
    }
    out.push_str("</msgs>");
    out
}

pub fn poll_reply(element: &str, error_num: i32) -> String {
    format!("<{element}>\n<error_num>{error_num}</error_num>\n</{element}>")
}

// ── Client helpers ──────────────────────────────────────────────────

pub fn config() -> ClientConfig {
    ClientConfig {
        password: SecretString::from(PASSWORD),
        ..ClientConfig::default()
    }
}

/// Connect a client to `daemon` over a fresh duplex pipe.
pub async fn connect(daemon: &FakeDaemon) -> Client {
    connect_with(daemon, config()).await
}

pub async fn connect_with(daemon: &FakeDaemon, config: ClientConfig) -> Client {
    let (client_side, daemon_side) = tokio::io::duplex(64 * 1024);
    daemon.serve(daemon_side);
    Client::connect_stream(config, client_side).await.unwrap()
}
