// ABOUTME: Classifies +SBDIX mobile-originated and mobile-terminated status codes
// ABOUTME: Maps raw integers onto success, retryable and fatal outcomes via a range table

use num_enum::TryFromPrimitive;
use std::ops::RangeInclusive;

/// Documented MO session status codes reported in the first `+SBDIX` field
///
/// Codes 3–8 and 19–31 are reserved ranges; they are not listed here but
/// still classify through [`classify_mo`].
#[derive(TryFromPrimitive)]
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoStatus {
    /// MO message, if any, transferred successfully
    Transferred = 0,
    /// MO transferred, but the queued MT message was too big to transfer
    TransferredMtTooBig = 1,
    /// MO transferred, but the requested location update was not accepted
    TransferredLocationRejected = 2,
    /// Gateway reported that the call did not complete in the allowed time
    GatewayTimeout = 10,
    /// MO message queue at the gateway is full
    GatewayQueueFull = 11,
    /// MO message has too many segments
    TooManySegments = 12,
    /// Gateway reported that the session did not complete
    SessionIncomplete = 13,
    /// Invalid segment size
    InvalidSegmentSize = 14,
    /// Access is denied
    AccessDenied = 15,
    /// Transceiver is locked and may not make SBD calls
    Locked = 16,
    /// Gateway not responding (local session timeout)
    GatewayNotResponding = 17,
    /// Connection lost (RF drop)
    ConnectionLost = 18,
    /// No network service, unable to initiate call
    NoNetworkService = 32,
    /// Antenna fault, unable to initiate call
    AntennaFault = 33,
    /// Radio is disabled, unable to initiate call
    RadioDisabled = 34,
    /// Transceiver is busy, typically performing auto-registration
    Busy = 35,
    /// Reserved, indicates failure if used
    ReservedFailure = 36,
}

/// Semantic outcome of an MO status code
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoOutcome {
    /// The MO part of the session completed
    Success,
    /// Network, timeout or session-level problem; a new session may succeed
    RetryableFailure,
    /// Hardware, radio or service condition that retrying will not resolve
    FatalFailure,
    /// Outside every documented range
    Unknown,
}

impl MoOutcome {
    pub fn is_success(self) -> bool {
        self == MoOutcome::Success
    }
}

const MO_OUTCOMES: [(RangeInclusive<i32>, MoOutcome); 3] = [
    (0..=8, MoOutcome::Success),
    (10..=31, MoOutcome::RetryableFailure),
    (32..=36, MoOutcome::FatalFailure),
];

/// Classify an MO status code. Total over `i32`.
pub fn classify_mo(code: i32) -> MoOutcome {
    MO_OUTCOMES
        .iter()
        .find(|(range, _)| range.contains(&code))
        .map(|(_, outcome)| *outcome)
        .unwrap_or(MoOutcome::Unknown)
}

/// Human-readable explanation of an MO status code for logging.
pub fn describe_mo(code: i32) -> &'static str {
    match MoStatus::try_from(code) {
        Ok(MoStatus::Transferred) => "MO message, if any, transferred successfully.",
        Ok(MoStatus::TransferredMtTooBig) => {
            "MO message, if any, transferred successfully, but the MT message in the queue was too big to be transferred."
        }
        Ok(MoStatus::TransferredLocationRejected) => {
            "MO message, if any, transferred successfully, but the requested Location Update was not accepted."
        }
        Ok(MoStatus::GatewayTimeout) => {
            "Gateway reported that the call did not complete in the allowed time."
        }
        Ok(MoStatus::GatewayQueueFull) => "MO message queue at the Gateway is full.",
        Ok(MoStatus::TooManySegments) => "MO message has too many segments.",
        Ok(MoStatus::SessionIncomplete) => "Gateway reported that the session did not complete.",
        Ok(MoStatus::InvalidSegmentSize) => "Invalid segment size.",
        Ok(MoStatus::AccessDenied) => "Access is denied.",
        Ok(MoStatus::Locked) => {
            "Transceiver has been locked and may not make SBD calls (see +CULK command)."
        }
        Ok(MoStatus::GatewayNotResponding) => "Gateway not responding (local session timeout).",
        Ok(MoStatus::ConnectionLost) => "Connection lost (RF drop).",
        Ok(MoStatus::NoNetworkService) => "No network service, unable to initiate call.",
        Ok(MoStatus::AntennaFault) => "Antenna fault, unable to initiate call.",
        Ok(MoStatus::RadioDisabled) => {
            "Radio is disabled, unable to initiate call (see *Rn command)."
        }
        Ok(MoStatus::Busy) => {
            "Transceiver is busy, unable to initiate call (typically performing auto-registration)."
        }
        Ok(MoStatus::ReservedFailure) => "Reserved, but indicate failure if used.",
        Err(_) => match classify_mo(code) {
            MoOutcome::Success => "Reserved, but indicate MO session success if used.",
            MoOutcome::RetryableFailure => "Reserved, but indicate MO session failure if used.",
            _ => "Unknown code. Assume error.",
        },
    }
}

/// MT status reported in the third `+SBDIX` field
#[derive(TryFromPrimitive)]
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MtStatus {
    /// No MT SBD message to receive from the gateway
    NoMessage = 0,
    /// MT SBD message successfully received from the gateway
    MessageReceived = 1,
    /// Error while performing a mailbox check or receiving a message
    RetrievalError = 2,
}

impl MtStatus {
    /// Undocumented codes are treated like a retrieval error so the session retries.
    pub fn from_code(code: i32) -> Self {
        MtStatus::try_from(code).unwrap_or(MtStatus::RetrievalError)
    }
}
