// ABOUTME: Owns the serial byte stream to the SBD transceiver and implements reply matching
// ABOUTME: Reads byte-by-byte until a terminator and expected token are seen or a deadline passes

use crate::client::error::{SbdError, SbdResult};
use crate::datatypes::CommandSpec;
use crate::datatypes::reply::contains;
use bytes::{BufMut, BytesMut};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, trace, warn};

/// Half-duplex AT command link
///
/// Wraps any byte stream (a `tokio_serial::SerialStream` in production, an
/// in-memory duplex pipe in tests) and provides the two read primitives the
/// modem protocol needs:
///
/// - [`ModemLink::read_reply`] accepts a reply only once the terminator byte
///   has been read *and* the expected token occurs somewhere in everything
///   read so far. A terminator on its own does not end the read.
/// - [`ModemLink::wait_for`] accepts as soon as the expected token appears.
///
/// Both are bounded by the timeout in the [`CommandSpec`]; the task sleeps
/// on the stream until a byte or the deadline arrives. A reply that
/// completes after the deadline is never accepted.
///
/// ## Exclusivity
///
/// The protocol allows one outstanding command. All methods take
/// `&mut self`, so a link can only serve one write+read cycle at a time.
#[derive(Debug)]
pub struct ModemLink<T> {
    stream: T,

    // Bytes read since the current exchange started.
    buffer: BytesMut,
}

impl<T> ModemLink<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a new `ModemLink` backed by `stream`.
    pub fn new(stream: T) -> ModemLink<T> {
        ModemLink {
            stream,
            // Replies are a few lines at most; an MT message is capped at 270 bytes.
            buffer: BytesMut::with_capacity(512),
        }
    }

    /// Drop whatever input is already waiting on the stream.
    ///
    /// Returns the number of bytes discarded. Never waits for new input.
    pub async fn discard_input(&mut self) -> SbdResult<usize> {
        let mut scratch = [0u8; 256];
        let mut discarded = 0;

        loop {
            match timeout(Duration::ZERO, self.stream.read(&mut scratch)).await {
                // End of stream; the next read reports it with context.
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => discarded += n,
                Ok(Err(e)) => return Err(SbdError::Transport(e)),
                Err(_) => break,
            }
        }

        if discarded > 0 {
            debug!(discarded, "discarded stale input");
        }
        Ok(discarded)
    }

    /// Write the command text followed by a carriage return.
    pub async fn write_command(&mut self, spec: &CommandSpec) -> SbdResult<()> {
        trace!(command = %spec.command, "writing command");
        self.stream.write_all(&spec.to_bytes()).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read until the terminator has been seen and the expected token is present.
    ///
    /// Returns everything accumulated for this exchange, echo and blank
    /// lines included.
    pub async fn read_reply(&mut self, spec: &CommandSpec) -> SbdResult<String> {
        let expected = spec.expected.as_bytes();
        let terminator = spec.terminator;
        self.read_matching(spec, |byte, buffer| {
            byte == terminator && contains(buffer, expected)
        })
        .await
    }

    /// Read until the expected token appears, terminator or not.
    pub async fn wait_for(&mut self, spec: &CommandSpec) -> SbdResult<()> {
        let expected = spec.expected.as_bytes();
        // Bytes arrive one at a time, so the token completes at the tail.
        self.read_matching(spec, |_, buffer| buffer.ends_with(expected))
            .await
            .map(|_| ())
    }

    async fn read_matching<F>(&mut self, spec: &CommandSpec, is_complete: F) -> SbdResult<String>
    where
        F: Fn(u8, &[u8]) -> bool,
    {
        let deadline = Instant::now() + spec.timeout;
        self.buffer.clear();

        loop {
            let mut byte = [0u8; 1];
            match timeout_at(deadline, self.stream.read(&mut byte)).await {
                Ok(Ok(0)) => {
                    let partial = self.partial();
                    warn!(command = %spec.command, %partial, "link closed while waiting for reply");
                    return Err(SbdError::ConnectionClosed { partial });
                }
                Ok(Ok(_)) => {
                    self.buffer.put_u8(byte[0]);
                    if is_complete(byte[0], &self.buffer[..]) {
                        let reply = self.partial();
                        trace!(command = %spec.command, %reply, "reply matched");
                        return Ok(reply);
                    }
                }
                Ok(Err(e)) => {
                    warn!(command = %spec.command, partial = %self.partial(), error = %e, "read failed");
                    return Err(SbdError::Transport(e));
                }
                Err(_) => {
                    let partial = self.partial();
                    warn!(
                        command = %spec.command,
                        expected = %spec.expected,
                        %partial,
                        "no expected reply before timeout"
                    );
                    return Err(SbdError::Timeout {
                        command: spec.command.clone(),
                        partial,
                    });
                }
            }
        }
    }

    fn partial(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    /// Give the stream back to the caller, who owns closing it.
    pub fn into_inner(self) -> T {
        self.stream
    }
}
