pub mod client;
pub mod connection;
pub mod datatypes;
pub mod telemetry;

#[cfg(test)]
mod tests;

// Re-export the main client API for easy access
pub use client::{
    BufferAction, DefaultModem, ModemBuilder, ModemConfig, ModemControl, SbdError, SbdResult,
    SbdSession, SharedModem,
};
pub use connection::ModemLink;
pub use telemetry::{LogRecord, Telemetry};

/// Error returned by the demo program and other top-level glue.
///
/// Library operations return [`SbdError`]; this boxed form is only for
/// callers mixing modem errors with port-opening or argument errors.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// A specialized `Result` type for top-level glue code.
///
/// # Examples
///
/// ## One message exchange
///
/// ```rust,no_run
/// use iridium_sbd::{ModemBuilder, ModemControl, SbdSession};
///
/// async fn exchange(port: tokio::io::DuplexStream) -> iridium_sbd::Result<Vec<String>> {
///     let mut modem = ModemBuilder::new().build(port);
///
///     if !modem.check_connected().await {
///         return Err("transceiver not responding".into());
///     }
///     modem.buffer_message("Position 51.5N 0.1W").await;
///
///     // Sends the buffered MO message and collects every queued MT message
///     Ok(modem.initiate_session().await?)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
