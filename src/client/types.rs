// ABOUTME: Configuration types for the SBD modem client: per-command timeouts and pacing delays
// ABOUTME: Defaults follow the timings a RockBLOCK 9602/9603 needs over a 19200 baud link

use std::time::Duration;

use crate::datatypes::{AtCommand, CR, CommandSpec};

/// Upper bound on the wait for each command's reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTimeouts {
    pub attention: Duration,
    pub auto_register: Duration,
    pub indicator_reporting: Duration,
    pub ring_alert: Duration,
    pub signal_quality: Duration,
    /// Wait for `READY` after `AT+SBDWT`
    pub write_text: Duration,
    /// Wait for the `0` acknowledging the message body
    pub message_body: Duration,
    pub initiate_session: Duration,
    pub read_text: Duration,
    pub transfer_mo_to_mt: Duration,
    pub buffer_status: Duration,
    pub clear_buffers: Duration,
}

impl Default for CommandTimeouts {
    fn default() -> Self {
        Self {
            attention: Duration::from_secs(20),
            auto_register: Duration::from_secs(30),
            indicator_reporting: Duration::from_secs(40),
            ring_alert: Duration::from_secs(30),
            signal_quality: Duration::from_secs(40),
            write_text: Duration::from_secs(60),
            message_body: Duration::from_secs(60),
            initiate_session: Duration::from_secs(60),
            read_text: Duration::from_secs(60),
            transfer_mo_to_mt: Duration::from_secs(60),
            buffer_status: Duration::from_secs(90),
            clear_buffers: Duration::from_secs(20),
        }
    }
}

impl CommandTimeouts {
    /// Configured timeout for `command`.
    pub fn for_command(&self, command: AtCommand) -> Duration {
        match command {
            AtCommand::Attention => self.attention,
            AtCommand::AutoRegister => self.auto_register,
            AtCommand::IndicatorReporting => self.indicator_reporting,
            AtCommand::RingAlert => self.ring_alert,
            AtCommand::SignalQuality => self.signal_quality,
            AtCommand::WriteText => self.write_text,
            AtCommand::InitiateSession => self.initiate_session,
            AtCommand::ReadText => self.read_text,
            AtCommand::TransferMoToMt => self.transfer_mo_to_mt,
            AtCommand::BufferStatus => self.buffer_status,
            AtCommand::ClearBuffers => self.clear_buffers,
        }
    }
}

/// Configuration for the modem client
///
/// # Example
///
/// ```rust
/// use iridium_sbd::client::ModemConfig;
/// use std::time::Duration;
///
/// // Defaults: 3s settle after each write, 5s between session attempts
/// let config = ModemConfig::default();
///
/// // Fast pacing for a bench-top simulator
/// let config = ModemConfig::default()
///     .with_settle_delay(Duration::from_millis(100))
///     .with_session_backoff(Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModemConfig {
    /// Per-command reply timeouts
    pub timeouts: CommandTimeouts,

    /// Pause after every write, giving the transceiver time to process the
    /// command before the reply is read (default: 3 seconds)
    pub settle_delay: Duration,

    /// Pause between `AT+SBDIX` attempts that got a reply (default: 5 seconds)
    pub session_backoff: Duration,

    /// Pause before retrying an `AT+SBDIX` that got no usable reply (default: 3 seconds)
    pub no_reply_backoff: Duration,

    /// Pause after the buffer-status diagnostic that follows a timeout (default: 2 seconds)
    pub diagnostic_settle: Duration,

    /// Pause between `READY` and writing the message body (default: 3 seconds)
    pub ready_pause: Duration,

    /// Pause after the message body has been accepted (default: 2 seconds)
    pub buffered_pause: Duration,

    /// Interval between signal strength polls (default: 3 seconds)
    pub signal_poll_interval: Duration,

    /// Reply line terminator (default: carriage return)
    pub terminator: u8,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            timeouts: CommandTimeouts::default(),
            settle_delay: Duration::from_secs(3),
            session_backoff: Duration::from_secs(5),
            no_reply_backoff: Duration::from_secs(3),
            diagnostic_settle: Duration::from_secs(2),
            ready_pause: Duration::from_secs(3),
            buffered_pause: Duration::from_secs(2),
            signal_poll_interval: Duration::from_secs(3),
            terminator: CR,
        }
    }
}

impl ModemConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeouts(mut self, timeouts: CommandTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_session_backoff(mut self, session_backoff: Duration) -> Self {
        self.session_backoff = session_backoff;
        self
    }

    pub fn with_no_reply_backoff(mut self, no_reply_backoff: Duration) -> Self {
        self.no_reply_backoff = no_reply_backoff;
        self
    }

    pub fn with_signal_poll_interval(mut self, interval: Duration) -> Self {
        self.signal_poll_interval = interval;
        self
    }

    /// Exchange for `command` using the configured timeout and terminator.
    pub fn spec(&self, command: AtCommand) -> CommandSpec {
        CommandSpec::new(command, self.timeouts.for_command(command)).with_terminator(self.terminator)
    }
}

/// What [`buffer_status`](crate::client::SbdSession::buffer_status) does after inspecting the buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferAction {
    /// Read out and log any buffered message, leave the buffers intact
    Inspect,
    /// As `Inspect`, then clear both buffers with `AT+SBDD2`
    Clear,
}
