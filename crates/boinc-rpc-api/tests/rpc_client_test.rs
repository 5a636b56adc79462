#![allow(clippy::unwrap_used)]
// Integration tests for `Connection` and `RpcClient` against a scripted
// daemon on the other end of an in-memory duplex pipe.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

use boinc_rpc_api::{AuthState, Connection, Error, Request, RpcClient, TransportConfig, nonce_hash};

// ── Helpers ─────────────────────────────────────────────────────────

fn transport() -> TransportConfig {
    TransportConfig {
        connect_timeout: Duration::from_secs(1),
        read_timeout: Duration::from_secs(5),
    }
}

fn pair() -> (Connection, DuplexStream) {
    let (client, server) = tokio::io::duplex(64 * 1024);
    (Connection::from_stream(client, "duplex", &transport()), server)
}

/// Read one request (up to and excluding the sentinel) from the daemon side.
async fn read_request(server: &mut DuplexStream) -> String {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        server.read_exact(&mut byte).await.unwrap();
        if byte[0] == 0x03 {
            break;
        }
        buf.push(byte[0]);
    }
    String::from_utf8(buf).unwrap()
}

async fn write_reply(server: &mut DuplexStream, inner: &str) {
    let body = format!("<boinc_gui_rpc_reply>\n{inner}\n</boinc_gui_rpc_reply>\n\x03");
    server.write_all(body.as_bytes()).await.unwrap();
}

/// Play the daemon side of the handshake, accepting `password`.
async fn serve_handshake(server: &mut DuplexStream, password: &str) {
    let auth1 = read_request(server).await;
    assert!(auth1.contains("<auth1/>"), "got {auth1}");
    write_reply(server, "<nonce>1712345678.123456</nonce>").await;

    let auth2 = read_request(server).await;
    let expected = nonce_hash("1712345678.123456", &SecretString::from(password));
    if auth2.contains(&format!("<nonce_hash>{expected}</nonce_hash>")) {
        write_reply(server, "<authorized/>").await;
    } else {
        write_reply(server, "<unauthorized/>").await;
    }
}

// ── Handshake ───────────────────────────────────────────────────────

#[tokio::test]
async fn handshake_succeeds_and_unlocks_commands() {
    let (conn, mut server) = pair();
    let client = RpcClient::new(conn);

    let daemon = tokio::spawn(async move {
        serve_handshake(&mut server, "secret").await;
        let req = read_request(&mut server).await;
        assert!(req.contains("<get_message_count/>"));
        write_reply(&mut server, "<seqno>311</seqno>").await;
        server
    });

    client.authorize(&SecretString::from("secret")).await.unwrap();
    assert_eq!(client.auth_state().await, AuthState::Authenticated);
    assert_eq!(client.get_message_count().await.unwrap(), 311);

    // Second call is a no-op and does not touch the socket.
    client.authorize(&SecretString::from("secret")).await.unwrap();
    daemon.await.unwrap();
}

#[tokio::test]
async fn wrong_password_fails_and_stays_failed() {
    let (conn, mut server) = pair();
    let client = RpcClient::new(conn);

    let daemon = tokio::spawn(async move {
        serve_handshake(&mut server, "right").await;
        server
    });

    let err = client.authorize(&SecretString::from("wrong")).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }), "got {err:?}");
    let _server = daemon.await.unwrap();

    assert_eq!(client.auth_state().await, AuthState::Failed);
    assert!(matches!(
        client.authorize(&SecretString::from("right")).await,
        Err(Error::Authentication { .. })
    ));
    assert!(matches!(client.get_state().await, Err(Error::NotAuthenticated)));
}

#[tokio::test]
async fn missing_nonce_fails_handshake() {
    let (conn, mut server) = pair();
    let client = RpcClient::new(conn);

    let daemon = tokio::spawn(async move {
        let _ = read_request(&mut server).await;
        write_reply(&mut server, "<error>nope</error>").await;
        server
    });

    let err = client.authorize(&SecretString::from("pw")).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }), "got {err:?}");
    let _server = daemon.await.unwrap();
}

#[tokio::test]
async fn commands_before_handshake_never_reach_the_socket() {
    // Any write to this mock would panic.
    let mock = tokio_test::io::Builder::new().build();
    let client = RpcClient::new(Connection::from_stream(mock, "mock", &transport()));

    assert!(matches!(client.get_state().await, Err(Error::NotAuthenticated)));
    assert!(matches!(
        client.execute(&Request::new("get_cc_status")).await,
        Err(Error::NotAuthenticated)
    ));
}

// ── Transport ───────────────────────────────────────────────────────

#[tokio::test]
async fn reply_split_across_many_writes_is_reassembled() {
    let (conn, mut server) = pair();

    let daemon = tokio::spawn(async move {
        let _ = read_request(&mut server).await;
        let reply = b"<boinc_gui_rpc_reply>\n<server_version>\n<major>8</major>\n<minor>0</minor>\n<release>4</release>\n</server_version>\n</boinc_gui_rpc_reply>\n\x03";
        for chunk in reply.chunks(7) {
            server.write_all(chunk).await.unwrap();
            server.flush().await.unwrap();
            tokio::task::yield_now().await;
        }
        server
    });

    let reply = conn.send(&Request::new("exchange_versions")).await.unwrap();
    assert_eq!(reply.get("server_version").unwrap()["release"], "4");
    let _server = daemon.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn reply_without_sentinel_times_out_and_poisons() {
    let (conn, mut server) = pair();

    let daemon = tokio::spawn(async move {
        let _ = read_request(&mut server).await;
        server
            .write_all(b"<boinc_gui_rpc_reply><seqno>1</seqno></boinc_gui_rpc_reply>")
            .await
            .unwrap();
        // Keep the pipe open so the client sees silence, not EOF.
        tokio::time::sleep(Duration::from_secs(3600)).await;
        server
    });

    let err = conn.send(&Request::new("get_message_count")).await.unwrap_err();
    assert!(matches!(err, Error::Timeout { timeout_ms: 5000 }), "got {err:?}");
    assert!(!conn.is_open());
    assert!(matches!(
        conn.send(&Request::new("get_message_count")).await,
        Err(Error::ConnectionClosed)
    ));
    daemon.abort();
}

#[tokio::test(start_paused = true)]
async fn concurrent_requests_are_serialised() {
    let (conn, mut server) = pair();
    let conn = Arc::new(conn);

    let daemon = tokio::spawn(async move {
        let mut seen = Vec::new();
        for n in 0..2 {
            let req = read_request(&mut server).await;

            // While this request is outstanding nothing else may be written.
            tokio::time::sleep(Duration::from_millis(50)).await;
            let mut byte = [0u8; 1];
            let pending =
                tokio::time::timeout(Duration::from_millis(10), server.read(&mut byte)).await;
            assert!(pending.is_err(), "second request written before first reply");

            seen.push(req);
            write_reply(&mut server, &format!("<seqno>{n}</seqno>")).await;
        }
        (server, seen)
    });

    let a = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move { conn.send(&Request::new("get_message_count")).await })
    };
    let b = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move { conn.send(&Request::new("get_message_count")).await })
    };

    let mut seqnos = vec![
        a.await.unwrap().unwrap().int("seqno").unwrap(),
        b.await.unwrap().unwrap().int("seqno").unwrap(),
    ];
    seqnos.sort_unstable();
    assert_eq!(seqnos, vec![0, 1]);

    let (_server, seen) = daemon.await.unwrap();
    assert_eq!(seen.len(), 2);
}

#[tokio::test]
async fn stray_bytes_after_reply_do_not_leak_into_next_exchange() {
    let (conn, mut server) = pair();

    let daemon = tokio::spawn(async move {
        let _ = read_request(&mut server).await;
        // A reply followed by garbage that has no sentinel.
        server
            .write_all(b"<boinc_gui_rpc_reply><seqno>1</seqno></boinc_gui_rpc_reply>\x03<junk")
            .await
            .unwrap();
        let _ = read_request(&mut server).await;
        write_reply(&mut server, "<seqno>2</seqno>").await;
        server
    });

    let first = conn.send(&Request::new("get_message_count")).await.unwrap();
    assert_eq!(first.int("seqno"), Some(1));
    let second = conn.send(&Request::new("get_message_count")).await.unwrap();
    assert_eq!(second.int("seqno"), Some(2));
    let _server = daemon.await.unwrap();
}

#[tokio::test]
async fn peer_hangup_is_connection_closed() {
    let (conn, mut server) = pair();

    let daemon = tokio::spawn(async move {
        let _ = read_request(&mut server).await;
        drop(server);
    });

    let err = conn.send(&Request::new("get_state")).await.unwrap_err();
    assert!(matches!(err, Error::ConnectionClosed), "got {err:?}");
    daemon.await.unwrap();
}
