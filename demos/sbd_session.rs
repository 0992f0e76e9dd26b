// ABOUTME: Command-line program running one SBD exchange against a transceiver on a serial port
// ABOUTME: Brings the modem up, waits for signal, optionally buffers a message and prints received ones

//! # SBD session over a serial port
//!
//! ```bash
//! # Check for inbound messages only
//! cargo run --example sbd_session -- --port /dev/ttyUSB0
//!
//! # Send a message and collect anything queued at the gateway
//! cargo run --example sbd_session -- --port /dev/ttyUSB0 --message "hello"
//!
//! # Log every line as a published record as well, and clear the buffers afterwards
//! cargo run --example sbd_session -- --port /dev/ttyUSB0 --publish --clear -d
//! ```

use argh::FromArgs;
use iridium_sbd::client::{ModemBuilder, ModemConfig, ModemControl, SbdSession};
use std::error::Error;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, StopBits};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Run one Iridium SBD session
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// serial device the transceiver is attached to (default: /dev/ttyUSB0)
    #[argh(option, short = 'p')]
    port: Option<String>,

    /// baud rate (default: 19200)
    #[argh(option, short = 'b')]
    baud: Option<u32>,

    /// text message to send during the session
    #[argh(option, short = 'm')]
    message: Option<String>,

    /// signal strength that must be exceeded before starting (default: 1)
    #[argh(option)]
    min_signal: Option<u8>,

    /// how long to wait for signal in seconds (default: 300)
    #[argh(option)]
    signal_timeout: Option<u64>,

    /// clear the MO and MT buffers after the session
    #[argh(switch)]
    clear: bool,

    /// print log lines as published records
    #[argh(switch)]
    publish: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli_args.debugging { Level::DEBUG } else { Level::INFO })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let device = cli_args.port.unwrap_or_else(|| "/dev/ttyUSB0".to_owned());
    let baud = cli_args.baud.unwrap_or(19200);
    let min_signal = cli_args.min_signal.unwrap_or(1);
    let signal_timeout = Duration::from_secs(cli_args.signal_timeout.unwrap_or(300));

    info!("Opening {device} at {baud} baud");
    let port = tokio_serial::new(&device, baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::Hardware)
        .open_native_async()?;

    let mut builder = ModemBuilder::new().config(ModemConfig::default());
    if cli_args.publish {
        let (tx, mut rx) = mpsc::channel(256);
        builder = builder.publisher(tx);
        tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                println!("[{}] {}", record.topic, record.line);
            }
        });
    }

    let (mut modem, ready) = builder.bring_up(port).await;
    if !ready {
        warn!("Transceiver did not acknowledge every setup command, continuing");
    }

    if !modem
        .wait_for_signal_strength(min_signal, signal_timeout)
        .await
    {
        error!("No usable signal within {} seconds", signal_timeout.as_secs());
        return Err("no signal".into());
    }

    if let Some(message) = cli_args.message {
        if !modem.buffer_message(&message).await {
            error!("Could not buffer message");
            return Err("buffering failed".into());
        }
    }

    let received = modem.initiate_session().await?;
    info!("Session complete, {} message(s) received", received.len());
    for (index, message) in received.iter().enumerate() {
        println!("{}: {message}", index + 1);
    }

    if cli_args.clear {
        modem.clear_buffers().await?;
    }

    Ok(())
}
