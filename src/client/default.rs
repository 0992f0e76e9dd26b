// ABOUTME: Default SBD modem client implementing setup, buffering and the session retry loop
// ABOUTME: Every exchange flushes stale input, writes the command, settles, then matches the reply

use crate::client::error::{SbdError, SbdResult};
use crate::client::traits::{ModemControl, SbdSession};
use crate::client::types::{BufferAction, ModemConfig};
use crate::connection::ModemLink;
use crate::datatypes::reply::{extract_message_text, parse_signal_strength};
use crate::datatypes::*;
use crate::telemetry::Telemetry;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::{Instant, sleep};

/// Default SBD modem client
///
/// Owns the [`ModemLink`] for its lifetime, so only one command is ever
/// outstanding. Hand the stream back with [`DefaultModem::into_inner`] to
/// close it.
pub struct DefaultModem<T> {
    /// The serial link with reply matching
    link: ModemLink<T>,
    /// Timeouts and pacing
    config: ModemConfig,
    /// Log sink and optional publish channel
    telemetry: Telemetry,
}

impl<T> DefaultModem<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap `stream` with the default configuration and tracing-only telemetry.
    pub fn new(stream: T) -> Self {
        Self::with_config(stream, ModemConfig::default(), Telemetry::new())
    }

    pub fn with_config(stream: T, config: ModemConfig, telemetry: Telemetry) -> Self {
        DefaultModem {
            link: ModemLink::new(stream),
            config,
            telemetry,
        }
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Release the underlying stream.
    pub fn into_inner(self) -> T {
        self.link.into_inner()
    }

    /// Write a command and report whether its expected token arrived in time.
    pub async fn write_and_check(&mut self, spec: &CommandSpec) -> bool {
        match self.check(spec).await {
            Ok(()) => true,
            Err(e) => {
                self.telemetry
                    .warn(format!("{} was not acknowledged: {e}", spec.command));
                false
            }
        }
    }

    /// Write a command and return the full reply once the terminator and
    /// expected token have both been read.
    ///
    /// On timeout the buffers are inspected and logged before the error is
    /// returned.
    pub async fn write_and_receive(&mut self, spec: &CommandSpec) -> SbdResult<String> {
        match self.receive(spec).await {
            Err(err @ SbdError::Timeout { .. }) => {
                self.telemetry.warn(format!("{err}"));
                self.run_diagnostic().await;
                Err(err)
            }
            other => other,
        }
    }

    async fn send(&mut self, spec: &CommandSpec) -> SbdResult<()> {
        self.telemetry.debug(format!("Sending command: {}", spec.command));
        self.link.discard_input().await?;
        self.link.write_command(spec).await?;
        sleep(self.config.settle_delay).await;
        Ok(())
    }

    async fn check(&mut self, spec: &CommandSpec) -> SbdResult<()> {
        self.send(spec).await?;
        self.link.wait_for(spec).await
    }

    async fn receive(&mut self, spec: &CommandSpec) -> SbdResult<String> {
        self.send(spec).await?;
        self.link.read_reply(spec).await
    }

    async fn run_diagnostic(&mut self) {
        self.telemetry
            .debug("Reply timed out, checking what the transceiver has buffered");
        if let Err(e) = self.inspect_buffers(BufferAction::Inspect).await {
            self.telemetry.warn(format!("Buffer status check failed: {e}"));
        }
        sleep(self.config.diagnostic_settle).await;
    }

    async fn inspect_buffers(&mut self, action: BufferAction) -> SbdResult<BufferStatus> {
        let reply = self.receive(&self.config.spec(AtCommand::BufferStatus)).await?;
        let status = BufferStatus::parse(&reply)?;
        self.telemetry.debug(format!(
            "MO flag: {}, MT flag: {}, RA flag: {}, waiting: {}",
            status.mo_flag, status.mt_flag, status.ring_alert, status.queued
        ));

        if status.is_empty() {
            self.telemetry.debug("MO and MT buffers are empty");
            return Ok(status);
        }

        if status.has_mt_message() {
            let text = self.read_buffer().await;
            self.telemetry.debug(format!("MT buffer: {text}"));
        }

        if status.has_mo_message() {
            // The MO buffer cannot be read directly; copy it over the MT buffer first.
            match self.receive(&self.config.spec(AtCommand::TransferMoToMt)).await {
                Ok(reply) => self.telemetry.debug(reply.trim()),
                Err(e) => self.telemetry.warn(format!("MO to MT copy failed: {e}")),
            }
            let text = self.read_buffer().await;
            self.telemetry.debug(format!("MO buffer: {text}"));
        }

        if action == BufferAction::Clear {
            if self.write_and_check(&self.config.spec(AtCommand::ClearBuffers)).await {
                self.telemetry.info("Buffers cleared");
            } else {
                self.telemetry.warn("Clearing buffers failed");
            }
        }

        Ok(status)
    }

    async fn read_buffer(&mut self) -> String {
        match self.receive(&self.config.spec(AtCommand::ReadText)).await {
            Ok(reply) => reply,
            Err(e) => format!("<unreadable: {e}>"),
        }
    }

    fn log_session_status(&self, status: &SessionStatus) {
        self.telemetry.info(format!(
            "MO status: {}, MT status: {}, MT queued: {}",
            status.mo_status, status.mt_status, status.mt_queued
        ));
        self.telemetry.info(describe_mo(status.mo_status));
    }
}

impl<T> ModemControl for DefaultModem<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    async fn check_connected(&mut self) -> bool {
        let connected = self
            .write_and_check(&self.config.spec(AtCommand::Attention))
            .await;
        if connected {
            self.telemetry.info("Transceiver is responding");
        } else {
            self.telemetry.warn("Transceiver is not responding to AT");
        }
        connected
    }

    async fn start_auto_register(&mut self) -> bool {
        let ok = self
            .write_and_check(&self.config.spec(AtCommand::AutoRegister))
            .await;
        if !ok {
            self.telemetry.warn("Could not enable automatic registration");
        }
        ok
    }

    async fn start_reporting(&mut self) -> bool {
        let ok = self
            .write_and_check(&self.config.spec(AtCommand::IndicatorReporting))
            .await;
        if !ok {
            self.telemetry.warn("Could not enable indicator reporting");
        }
        ok
    }

    async fn enable_ring(&mut self) -> bool {
        let ok = self
            .write_and_check(&self.config.spec(AtCommand::RingAlert))
            .await;
        if !ok {
            self.telemetry.warn("Could not enable ring alerts");
        }
        ok
    }

    async fn check_signal_strength(&mut self) -> SbdResult<u8> {
        let reply = self
            .write_and_receive(&self.config.spec(AtCommand::SignalQuality))
            .await?;
        let strength = parse_signal_strength(&reply)?;
        self.telemetry.debug(format!("Signal strength: {strength}"));
        Ok(strength)
    }

    async fn wait_for_signal_strength(&mut self, minimum: u8, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        while Instant::now() < deadline {
            match self.check_signal_strength().await {
                Ok(strength) if strength > minimum => return true,
                Ok(strength) => self
                    .telemetry
                    .debug(format!("Signal strength {strength} too weak, need more than {minimum}")),
                Err(e) if !e.is_retryable() => {
                    self.telemetry.warn(format!("Giving up on signal strength: {e}"));
                    return false;
                }
                Err(e) => self.telemetry.warn(format!("Signal strength unavailable: {e}")),
            }
            sleep(self.config.signal_poll_interval).await;
        }

        self.telemetry.warn("Timed out waiting for signal strength");
        false
    }
}

impl<T> SbdSession for DefaultModem<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    async fn buffer_message(&mut self, text: &str) -> bool {
        self.telemetry.debug(format!("Buffering message: {text}"));

        // The transceiver answers READY when it is prepared to take the text.
        if !self
            .write_and_check(&self.config.spec(AtCommand::WriteText))
            .await
        {
            self.telemetry.warn("Transceiver did not become ready for the message");
            return false;
        }
        sleep(self.config.ready_pause).await;

        let body = CommandSpec::raw(text, "0", self.config.timeouts.message_body)
            .with_terminator(self.config.terminator);
        if !self.write_and_check(&body).await {
            self.telemetry.warn("Transceiver did not accept the message text");
            return false;
        }
        sleep(self.config.buffered_pause).await;

        self.telemetry.info("Message buffered");
        true
    }

    async fn initiate_session(&mut self) -> SbdResult<Vec<String>> {
        let spec = self.config.spec(AtCommand::InitiateSession);
        let mut messages = Vec::new();
        let mut mo_confirmed = false;
        let mut mt_confirmed = false;
        let mut queued = 0;

        while !mo_confirmed || !mt_confirmed || queued > 0 {
            let reply = self.write_and_receive(&spec).await;
            let status = match reply.and_then(|reply| SessionStatus::parse(&reply)) {
                Ok(status) => status,
                Err(e) if e.is_retryable() => {
                    self.telemetry.warn(format!("No usable session reply: {e}"));
                    sleep(self.config.no_reply_backoff).await;
                    continue;
                }
                Err(e) => return Err(e),
            };

            self.log_session_status(&status);
            queued = status.mt_queued;

            mo_confirmed = match status.check_mo() {
                Ok(()) => true,
                Err(e) => {
                    self.telemetry.warn(format!("{e}, retrying session"));
                    false
                }
            };

            mt_confirmed = match status.mt() {
                MtStatus::NoMessage => {
                    self.telemetry.debug("No MT message waiting at the gateway");
                    true
                }
                MtStatus::MessageReceived => {
                    self.telemetry.info("MT message received from the gateway");
                    match self.get_text().await {
                        Ok(text) if !text.is_empty() => messages.push(text),
                        Ok(_) => self.telemetry.debug("MT message was empty"),
                        Err(e) if !e.is_retryable() => return Err(e),
                        Err(e) => self.telemetry.warn(format!("Could not read MT message: {e}")),
                    }
                    true
                }
                MtStatus::RetrievalError => {
                    self.telemetry
                        .warn("Gateway reported an MT retrieval error, retrying session");
                    false
                }
            };

            if queued > 0 {
                self.telemetry
                    .info(format!("{queued} more MT message(s) queued at the gateway"));
            }

            sleep(self.config.session_backoff).await;
        }

        Ok(messages)
    }

    async fn get_text(&mut self) -> SbdResult<String> {
        let reply = self
            .write_and_receive(&self.config.spec(AtCommand::ReadText))
            .await?;
        extract_message_text(&reply)
    }

    async fn buffer_status(&mut self, action: BufferAction) -> SbdResult<BufferStatus> {
        self.inspect_buffers(action).await
    }
}
