// ABOUTME: Builder for assembling an SBD modem client from a stream, configuration and telemetry
// ABOUTME: Also provides the transceiver bring-up sequence used before the first session

use crate::client::default::DefaultModem;
use crate::client::traits::ModemControl;
use crate::client::types::ModemConfig;
use crate::telemetry::{LogRecord, Telemetry};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

/// Builder for [`DefaultModem`]
///
/// ```rust,no_run
/// use iridium_sbd::client::{ModemBuilder, ModemConfig, SbdSession};
///
/// # async fn example(port: tokio::io::DuplexStream) -> Result<(), Box<dyn std::error::Error>> {
/// let (tx, _rx) = tokio::sync::mpsc::channel(64);
/// let mut modem = ModemBuilder::new()
///     .config(ModemConfig::default())
///     .publisher(tx)
///     .build(port);
///
/// let received = modem.initiate_session().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ModemBuilder {
    config: ModemConfig,
    telemetry: Telemetry,
}

impl ModemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ModemConfig) -> Self {
        self.config = config;
        self
    }

    /// Forward every log line on `publisher` as well as through `tracing`.
    pub fn publisher(mut self, publisher: mpsc::Sender<LogRecord>) -> Self {
        self.telemetry = Telemetry::with_publisher(publisher);
        self
    }

    pub fn build<T>(self, stream: T) -> DefaultModem<T>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        DefaultModem::with_config(stream, self.config, self.telemetry)
    }

    /// Build the client and run the bring-up sequence: liveness check,
    /// automatic registration, indicator reporting and ring alerts.
    ///
    /// Returns the client together with whether every step was acknowledged.
    /// Later steps still run when an earlier one fails.
    pub async fn bring_up<T>(self, stream: T) -> (DefaultModem<T>, bool)
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let mut modem = self.build(stream);
        let connected = modem.check_connected().await;
        let registered = modem.start_auto_register().await;
        let reporting = modem.start_reporting().await;
        let ringing = modem.enable_ring().await;
        (modem, connected && registered && reporting && ringing)
    }
}
