//! Socket wire format for the process-based bridge variant.
//!
//! Each frame is a binary-serialized payload, base64-encoded, terminated
//! with CRLF. The protocol is one call per connection: the client writes a
//! single request frame, the worker writes a single response frame and
//! half-closes. The literal lines `ping`/`pong` form the liveness probe and
//! bypass the base64 layer entirely.

use std::io::{ErrorKind, Read, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::{Buf, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::envelope::CallRequest;
use crate::error::{CodecError, Result};
use crate::value::Value;

/// Liveness probe request line.
pub const PING: &[u8] = b"ping";
/// Liveness probe response line.
pub const PONG: &[u8] = b"pong";
/// Frame terminator.
pub const DELIMITER: &[u8] = b"\r\n";
/// Default bound on a single encoded line: 16 MiB.
pub const DEFAULT_MAX_LINE_LEN: usize = 16 * 1024 * 1024;

/// Request frame.
///
/// The variant order fixes the wire tags: `Call` = 0 for ordinary calls,
/// `Init` = 1 for the first exchange, which asks the worker for its
/// callable index (the sorted list of registered action names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub enum WireRequest {
    Call(CallRequest),
    Init,
}

/// Reduced failure info carried by the socket envelope.
///
/// Unlike the in-process variant, only a code and message survive this
/// transport; structured failure properties do not round-trip here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct WireFailure {
    pub code: String,
    pub message: String,
}

/// Response frame: the `{s, v}` envelope.
///
/// Variant order fixes the success flag: `Failure` = 0 (`s = false`),
/// `Success` = 1 (`s = true`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub enum WireResponse {
    Failure(WireFailure),
    Success(Value),
}

/// Encode a payload into a complete frame, delimiter included.
pub fn encode_frame<T: bincode::Encode>(payload: &T) -> Result<Vec<u8>> {
    let binary = bincode::encode_to_vec(payload, bincode::config::standard())?;
    let mut frame = BASE64.encode(&binary).into_bytes();
    frame.extend_from_slice(DELIMITER);
    Ok(frame)
}

/// Decode a frame body (the line content, delimiter already stripped).
pub fn decode_frame<T: bincode::Decode<()>>(line: &[u8]) -> Result<T> {
    let binary = BASE64.decode(line)?;
    let (payload, consumed) = bincode::decode_from_slice(&binary, bincode::config::standard())?;
    if consumed != binary.len() {
        return Err(CodecError::TrailingBytes {
            count: binary.len() - consumed,
        });
    }
    Ok(payload)
}

/// Write a raw line (payload + delimiter), retrying interrupted writes.
pub fn send_line<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let mut frame = Vec::with_capacity(payload.len() + DELIMITER.len());
    frame.extend_from_slice(payload);
    frame.extend_from_slice(DELIMITER);

    let mut offset = 0usize;
    while offset < frame.len() {
        match writer.write(&frame[offset..]) {
            Ok(0) => return Err(CodecError::ConnectionClosed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(CodecError::Io(err)),
        }
    }
    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(CodecError::Io(err)),
        }
    }
}

/// Encode and write one frame.
pub fn send_frame<W: Write, T: bincode::Encode>(writer: &mut W, payload: &T) -> Result<()> {
    let binary = bincode::encode_to_vec(payload, bincode::config::standard())?;
    let encoded = BASE64.encode(&binary);
    tracing::trace!(frame_bytes = encoded.len(), "sending frame");
    send_line(writer, encoded.as_bytes())
}

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads delimiter-terminated lines from any `Read` stream.
///
/// Handles partial reads internally; callers always get a complete line
/// with the delimiter stripped.
pub struct FrameReader<R> {
    inner: R,
    buf: BytesMut,
    max_line_len: usize,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_max_line_len(inner, DEFAULT_MAX_LINE_LEN)
    }

    pub fn with_max_line_len(inner: R, max_line_len: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(READ_CHUNK_SIZE),
            max_line_len,
        }
    }

    /// Read the next complete line (blocking).
    ///
    /// Returns `Err(CodecError::ConnectionClosed)` on EOF, whether at a
    /// frame boundary or mid-line.
    pub fn read_line(&mut self) -> Result<Bytes> {
        loop {
            if let Some(pos) = find_delimiter(&self.buf) {
                let line = self.buf.split_to(pos).freeze();
                self.buf.advance(DELIMITER.len());
                return Ok(line);
            }

            if self.buf.len() > self.max_line_len {
                return Err(CodecError::LineTooLong {
                    size: self.buf.len(),
                    max: self.max_line_len,
                });
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(CodecError::Io(err)),
            };
            if read == 0 {
                return Err(CodecError::ConnectionClosed);
            }
            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Read and decode the next frame.
    pub fn read_frame<T: bincode::Decode<()>>(&mut self) -> Result<T> {
        let line = self.read_line()?;
        decode_frame(&line)
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

fn find_delimiter(buf: &[u8]) -> Option<usize> {
    buf.windows(DELIMITER.len())
        .position(|window| window == DELIMITER)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::Cursor;

    use super::*;

    #[test]
    fn frame_roundtrip() {
        let request = WireRequest::Call(CallRequest::new(
            "find_by_id",
            vec![Value::Int(7), Value::Text("users".to_string())],
        ));

        let frame = encode_frame(&request).expect("request should encode");
        assert!(frame.ends_with(DELIMITER));

        let body = &frame[..frame.len() - DELIMITER.len()];
        let decoded: WireRequest = decode_frame(body).expect("request should decode");
        assert_eq!(decoded, request);
    }

    #[test]
    fn wire_tags_are_stable() {
        // CALL = 0, INIT = 1: the variant index is the wire tag.
        let call = bincode::encode_to_vec(
            &WireRequest::Call(CallRequest::new("m", vec![])),
            bincode::config::standard(),
        )
        .expect("call should encode");
        let init = bincode::encode_to_vec(&WireRequest::Init, bincode::config::standard())
            .expect("init should encode");
        assert_eq!(call[0], 0);
        assert_eq!(init[0], 1);

        // s = false (0) for failures, s = true (1) for success.
        let failure = bincode::encode_to_vec(
            &WireResponse::Failure(WireFailure {
                code: "x".to_string(),
                message: "y".to_string(),
            }),
            bincode::config::standard(),
        )
        .expect("failure should encode");
        let success = bincode::encode_to_vec(
            &WireResponse::Success(Value::Null),
            bincode::config::standard(),
        )
        .expect("success should encode");
        assert_eq!(failure[0], 0);
        assert_eq!(success[0], 1);
    }

    #[test]
    fn reader_splits_lines_and_strips_delimiter() {
        let mut wire = Vec::new();
        wire.extend_from_slice(b"first\r\n");
        wire.extend_from_slice(b"second\r\n");

        let mut reader = FrameReader::new(Cursor::new(wire));
        assert_eq!(reader.read_line().expect("first line").as_ref(), b"first");
        assert_eq!(reader.read_line().expect("second line").as_ref(), b"second");
        assert!(matches!(
            reader.read_line(),
            Err(CodecError::ConnectionClosed)
        ));
    }

    #[test]
    fn reader_rejects_oversized_line() {
        let wire = vec![b'a'; 64];
        let mut reader = FrameReader::with_max_line_len(Cursor::new(wire), 16);
        assert!(matches!(
            reader.read_line(),
            Err(CodecError::LineTooLong { .. })
        ));
    }

    #[test]
    fn eof_mid_line_is_connection_closed() {
        let mut reader = FrameReader::new(Cursor::new(b"partial-no-delimiter".to_vec()));
        assert!(matches!(
            reader.read_line(),
            Err(CodecError::ConnectionClosed)
        ));
    }

    #[test]
    fn partial_reads_are_reassembled() {
        struct ByteByByte {
            bytes: Vec<u8>,
            pos: usize,
        }

        impl Read for ByteByByte {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.pos >= self.bytes.len() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.bytes[self.pos];
                self.pos += 1;
                Ok(1)
            }
        }

        let frame = encode_frame(&WireRequest::Init).expect("init should encode");
        let mut reader = FrameReader::new(ByteByByte {
            bytes: frame,
            pos: 0,
        });
        let decoded: WireRequest = reader.read_frame().expect("frame should decode");
        assert_eq!(decoded, WireRequest::Init);
    }

    #[test]
    fn send_frame_then_read_frame() {
        let mut row = BTreeMap::new();
        row.insert("count".to_string(), Value::Int(12));
        let response = WireResponse::Success(Value::Map(row));

        let mut wire = Vec::new();
        send_frame(&mut wire, &response).expect("frame should send");

        let mut reader = FrameReader::new(Cursor::new(wire));
        let decoded: WireResponse = reader.read_frame().expect("frame should decode");
        assert_eq!(decoded, response);
    }

    #[test]
    fn ping_line_bypasses_base64() {
        let mut wire = Vec::new();
        send_line(&mut wire, PING).expect("ping should send");
        assert_eq!(wire, b"ping\r\n");

        let mut reader = FrameReader::new(Cursor::new(wire));
        assert_eq!(reader.read_line().expect("ping line").as_ref(), PING);
    }

    #[test]
    fn corrupt_base64_is_rejected() {
        let result: Result<WireRequest> = decode_frame(b"!!not-base64!!");
        assert!(matches!(result, Err(CodecError::Base64(_))));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut binary =
            bincode::encode_to_vec(&WireRequest::Init, bincode::config::standard())
                .expect("init should encode");
        binary.push(0xFF);
        let line = BASE64.encode(&binary);

        let result: Result<WireRequest> = decode_frame(line.as_bytes());
        assert!(matches!(result, Err(CodecError::TrailingBytes { .. })));
    }
}
