// ABOUTME: SBD modem error types covering link failures, reply timeouts and session status codes
// ABOUTME: Provides structured error reporting with automatic conversion from underlying I/O errors

use std::io;
use thiserror::Error;

/// Error type for every modem operation
///
/// Transport faults are caught at the link layer and surfaced here rather
/// than escaping as panics. Callers decide whether to retry by looking at
/// [`SbdError::is_retryable`].
#[derive(Debug, Error)]
pub enum SbdError {
    /// I/O error on the underlying serial link (read, write, flush)
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    /// No reply matching the expected token arrived before the deadline
    #[error("No reply to {command:?} within timeout, partial buffer: {partial:?}")]
    Timeout { command: String, partial: String },

    /// The link reached end-of-stream while waiting for a reply
    #[error("Link closed while waiting for reply, partial buffer: {partial:?}")]
    ConnectionClosed { partial: String },

    /// A reply arrived but its fields could not be parsed
    #[error("Malformed reply {reply:?}: {reason}")]
    Protocol { reply: String, reason: String },

    /// The modem reported a transient mobile-originated failure
    #[error("Retryable MO session failure (status {code})")]
    SessionRetryable { code: i32 },

    /// The modem reported a mobile-originated failure that retrying will not fix
    #[error("Fatal MO session failure (status {code})")]
    SessionFatal { code: i32 },
}

impl SbdError {
    /// Build a [`SbdError::Protocol`] from the offending reply text.
    pub fn protocol(reply: impl Into<String>, reason: impl Into<String>) -> Self {
        SbdError::Protocol {
            reply: reply.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failed operation may succeed if attempted again.
    ///
    /// Only a closed or broken link is terminal; everything else, including
    /// fatal MO status codes, is left to the caller's retry policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            SbdError::ConnectionClosed { .. } => false,
            SbdError::Transport(e) => !matches!(
                e.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => true,
        }
    }
}

/// Result type alias for modem operations
pub type SbdResult<T> = Result<T, SbdError>;
