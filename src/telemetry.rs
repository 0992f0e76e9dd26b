// ABOUTME: Logging context shared by every modem operation
// ABOUTME: Emits tracing events and optionally forwards timestamped lines on a publish channel

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

/// Topic attached to every forwarded log line
pub const LOG_TOPIC: &str = "IridiumLog";

/// A two-part published log message: topic plus the timestamped line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    pub topic: &'static str,
    pub line: String,
}

/// Log context injected into the modem client
///
/// Every line goes to `tracing`. When a publish channel is attached the
/// line is also sent as a [`LogRecord`] of the form
/// `"2014-11-05 14:56:58:123,<text>"`. Publishing never waits: a full or
/// closed channel drops the record.
#[derive(Clone, Debug, Default)]
pub struct Telemetry {
    publisher: Option<mpsc::Sender<LogRecord>>,
}

impl Telemetry {
    /// Telemetry that only logs through `tracing`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also forward every line on `publisher`.
    pub fn with_publisher(publisher: mpsc::Sender<LogRecord>) -> Self {
        Self {
            publisher: Some(publisher),
        }
    }

    pub fn is_publishing(&self) -> bool {
        self.publisher.is_some()
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        debug!(target: "iridium_sbd", "{}", message.as_ref());
        self.publish(message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        info!(target: "iridium_sbd", "{}", message.as_ref());
        self.publish(message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        warn!(target: "iridium_sbd", "{}", message.as_ref());
        self.publish(message.as_ref());
    }

    fn publish(&self, message: &str) {
        let Some(publisher) = &self.publisher else {
            return;
        };

        let record = LogRecord {
            topic: LOG_TOPIC,
            line: format!("{},{}", Utc::now().format("%Y-%m-%d %H:%M:%S:%3f"), message),
        };
        match publisher.try_send(record) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("publish channel full, dropping log line"),
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
