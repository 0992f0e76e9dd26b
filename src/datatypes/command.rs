// ABOUTME: Defines the AT commands used to drive an Iridium 960x SBD transceiver
// ABOUTME: Pairs each command with the reply token that marks it as answered

use std::time::Duration;

/// Carriage return, the line terminator for both commands and replies
pub const CR: u8 = b'\r';

/// AT commands understood by the transceiver
///
/// Each variant knows its wire text (without the trailing carriage return)
/// and the token whose appearance in the reply means the modem has answered.
///
/// ## Reply tokens
///
/// ```text
/// AT              -> OK
/// AT+SBDAREG=1    -> OK
/// AT+CIER=1,0,1   -> OK
/// AT+SBDMTA=1     -> OK
/// AT+CSQ          -> +CSQ:<rssi>
/// AT+SBDWT        -> READY   (then the text, answered with 0)
/// AT+SBDIX        -> +SBDIX:<MO status>,<MOMSN>,<MT status>,<MTMSN>,<MT length>,<MT queued>
/// AT+SBDRT        -> +SBDRT:<CR>{MT buffer}<CR>OK
/// AT+SBDTC        -> SBDTC: Outbound SBD Copied to Inbound SBD: size = <n>
/// AT+SBDSX        -> +SBDSX:<MO flag>,<MOMSN>,<MT flag>,<MTMSN>,<RA flag>,<msg waiting>
/// AT+SBDD2        -> 0
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AtCommand {
    /// Liveness check
    Attention,
    /// Enable automatic SBD network registration
    AutoRegister,
    /// Enable indicator event reporting (+CIEV)
    IndicatorReporting,
    /// Enable SBD ring alert indication
    RingAlert,
    /// Query received signal strength
    SignalQuality,
    /// Start writing a text message into the MO buffer
    WriteText,
    /// Initiate an extended SBD session
    InitiateSession,
    /// Read the MT buffer as text
    ReadText,
    /// Copy the MO buffer into the MT buffer
    TransferMoToMt,
    /// Query MO/MT buffer status
    BufferStatus,
    /// Clear both MO and MT buffers
    ClearBuffers,
}

impl AtCommand {
    /// Command text as written to the link, without the terminator.
    pub fn text(self) -> &'static str {
        match self {
            AtCommand::Attention => "AT",
            AtCommand::AutoRegister => "AT+SBDAREG=1",
            AtCommand::IndicatorReporting => "AT+CIER=1,0,1",
            AtCommand::RingAlert => "AT+SBDMTA=1",
            AtCommand::SignalQuality => "AT+CSQ",
            AtCommand::WriteText => "AT+SBDWT",
            AtCommand::InitiateSession => "AT+SBDIX",
            AtCommand::ReadText => "AT+SBDRT",
            AtCommand::TransferMoToMt => "AT+SBDTC",
            AtCommand::BufferStatus => "AT+SBDSX",
            AtCommand::ClearBuffers => "AT+SBDD2",
        }
    }

    /// Token that must appear in the reply before it is accepted.
    pub fn expected_reply(self) -> &'static str {
        match self {
            AtCommand::Attention
            | AtCommand::AutoRegister
            | AtCommand::IndicatorReporting
            | AtCommand::RingAlert
            | AtCommand::ReadText => "OK",
            AtCommand::SignalQuality => "+CSQ:",
            AtCommand::WriteText => "READY",
            AtCommand::InitiateSession => "+SBDIX:",
            AtCommand::TransferMoToMt => "SBDTC:",
            AtCommand::BufferStatus => "+SBDSX:",
            AtCommand::ClearBuffers => "0",
        }
    }
}

/// One command/response exchange: what to send, what to wait for, how long
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    /// Text written to the link; a carriage return is appended on write
    pub command: String,
    /// Substring that must be present in the accumulated reply
    pub expected: String,
    /// Byte that ends a reply line
    pub terminator: u8,
    /// Upper bound on the wait for a matching reply
    pub timeout: Duration,
}

impl CommandSpec {
    /// Build the exchange for a known AT command.
    pub fn new(command: AtCommand, timeout: Duration) -> Self {
        Self::raw(command.text(), command.expected_reply(), timeout)
    }

    /// Build an exchange for arbitrary text, such as a message body.
    pub fn raw(command: impl Into<String>, expected: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            expected: expected.into(),
            terminator: CR,
            timeout,
        }
    }

    /// Replace the reply terminator.
    pub fn with_terminator(mut self, terminator: u8) -> Self {
        self.terminator = terminator;
        self
    }

    /// Bytes written to the link for this exchange.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.command.len() + 1);
        bytes.extend_from_slice(self.command.as_bytes());
        bytes.push(CR);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_bytes_are_cr_terminated() {
        let spec = CommandSpec::new(AtCommand::InitiateSession, Duration::from_secs(60));
        assert_eq!(spec.to_bytes(), b"AT+SBDIX\r".to_vec());
        assert_eq!(spec.expected, "+SBDIX:");
        assert_eq!(spec.terminator, CR);
    }

    #[test]
    fn test_raw_spec_for_message_body() {
        let spec = CommandSpec::raw("hello", "0", Duration::from_secs(60));
        assert_eq!(spec.to_bytes(), b"hello\r".to_vec());
        assert_eq!(spec.expected, "0");
    }

    #[test]
    fn test_buffer_commands_expect_their_prefixes() {
        assert_eq!(AtCommand::BufferStatus.expected_reply(), "+SBDSX:");
        assert_eq!(AtCommand::TransferMoToMt.expected_reply(), "SBDTC:");
        assert_eq!(AtCommand::ClearBuffers.text(), "AT+SBDD2");
    }
}
