// GUI RPC framing
//
// Requests and replies are both terminated by a single 0x03 byte, which
// never appears inside well-formed markup. Requests are wrapped in the
// `<boinc_gui_rpc_request>` envelope by the encoder; the decoder yields
// everything up to (not including) the sentinel as one reply frame.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::error::Error;

/// End-of-message marker for both directions.
pub const SENTINEL: u8 = 0x03;

/// Upper bound on a single reply. `get_state` on a busy host runs to a few
/// MiB; anything past this is treated as an unterminated stream.
pub const MAX_REPLY_BYTES: usize = 64 * 1024 * 1024;

const REQUEST_OPEN: &str = "<boinc_gui_rpc_request>\n";
const REQUEST_CLOSE: &str = "\n</boinc_gui_rpc_request>\n";

/// Sentinel-delimited codec for GUI RPC exchanges.
///
/// Tracks how far the buffer has already been scanned so a reply arriving
/// in many small reads is not rescanned from the start each time.
#[derive(Debug, Default)]
pub struct RpcCodec {
    scanned: usize,
}

impl RpcCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget scan progress. Call whenever the read buffer is cleared.
    pub fn reset(&mut self) {
        self.scanned = 0;
    }
}

impl Decoder for RpcCodec {
    type Item = BytesMut;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let start = self.scanned.min(src.len());
        if let Some(offset) = src[start..].iter().position(|b| *b == SENTINEL) {
            let frame = src.split_to(start + offset);
            src.advance(1);
            self.scanned = 0;
            trace!(bytes = frame.len(), "reply frame complete");
            return Ok(Some(frame));
        }

        if src.len() > MAX_REPLY_BYTES {
            return Err(Error::MalformedReply {
                message: format!("reply exceeds {MAX_REPLY_BYTES} bytes without a terminator"),
                body: String::new(),
            });
        }

        self.scanned = src.len();
        Ok(None)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(frame) => Ok(Some(frame)),
            None if buf.is_empty() => Ok(None),
            // Peer hung up mid-reply.
            None => Err(Error::ConnectionClosed),
        }
    }
}

impl Encoder<String> for RpcCodec {
    type Error = Error;

    fn encode(&mut self, body: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(REQUEST_OPEN.len() + body.len() + REQUEST_CLOSE.len() + 1);
        dst.put_slice(REQUEST_OPEN.as_bytes());
        dst.put_slice(body.as_bytes());
        dst.put_slice(REQUEST_CLOSE.as_bytes());
        dst.put_u8(SENTINEL);
        Ok(())
    }
}
