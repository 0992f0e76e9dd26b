// ABOUTME: Core SBD modem traits using native async functions
// ABOUTME: Separates transceiver setup commands from the message-exchange session operations

use std::time::Duration;

use crate::client::error::SbdResult;
use crate::client::types::BufferAction;
use crate::datatypes::BufferStatus;

/// Transceiver setup and link health
///
/// Setup commands report `true` when the modem acknowledged them before
/// the configured timeout. Failures are logged with the command sent and
/// whatever partial reply arrived.
pub trait ModemControl {
    /// Send `AT` and wait for `OK`.
    async fn check_connected(&mut self) -> bool;

    /// Enable automatic SBD network registration (`AT+SBDAREG=1`).
    ///
    /// The transceiver then re-registers by itself once it has moved far
    /// enough from its last registered location.
    async fn start_auto_register(&mut self) -> bool;

    /// Enable indicator event reporting (`AT+CIER=1,0,1`).
    async fn start_reporting(&mut self) -> bool;

    /// Enable SBD ring alerts (`AT+SBDMTA=1`).
    ///
    /// The transceiver asserts RI and emits `SBDRING` when the gateway has
    /// a message waiting.
    async fn enable_ring(&mut self) -> bool;

    /// Query received signal strength, 0 (none) to 5 (10 dB or more of margin).
    async fn check_signal_strength(&mut self) -> SbdResult<u8>;

    /// Poll signal strength until it exceeds `minimum` or `timeout` passes.
    async fn wait_for_signal_strength(&mut self, minimum: u8, timeout: Duration) -> bool;
}

/// SBD message exchange
pub trait SbdSession: ModemControl {
    /// Write a text message into the MO buffer, replacing anything already there.
    async fn buffer_message(&mut self, text: &str) -> bool;

    /// Run `AT+SBDIX` until the MO buffer is delivered and every queued MT
    /// message has been collected.
    ///
    /// Returns the received message texts in arrival order, possibly none.
    /// The loop has no attempt limit; it ends early only when the link
    /// itself closes.
    async fn initiate_session(&mut self) -> SbdResult<Vec<String>>;

    /// Read the MT buffer as text with the `+SBDRT:` framing removed.
    async fn get_text(&mut self) -> SbdResult<String>;

    /// Query `AT+SBDSX`, log any buffered message and optionally clear the buffers.
    async fn buffer_status(&mut self, action: BufferAction) -> SbdResult<BufferStatus>;

    /// Log and then clear both buffers.
    async fn clear_buffers(&mut self) -> SbdResult<BufferStatus> {
        self.buffer_status(BufferAction::Clear).await
    }
}
