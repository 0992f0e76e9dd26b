// ABOUTME: SBD modem client module providing trait-based interfaces over an AT command link
// ABOUTME: Exports the client traits, builder, configuration, error types and default implementation

//! SBD Modem Client Module
//!
//! This module drives an Iridium short-burst-data transceiver (RockBLOCK
//! 9602/9603 and friends) over any async byte stream:
//!
//! * **Native async traits** - `async fn` in traits, no `async_trait` dependency
//! * **Layered design** - setup commands in [`ModemControl`], message exchange in [`SbdSession`]
//! * **Bounded waits** - every reply is matched against a token within a timeout
//! * **Session retry loop** - `AT+SBDIX` is repeated until MO and MT transfer are confirmed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use iridium_sbd::client::{ModemBuilder, ModemControl, SbdSession};
//!
//! # async fn example(port: tokio::io::DuplexStream) -> Result<(), Box<dyn std::error::Error>> {
//! let (mut modem, ready) = ModemBuilder::new().bring_up(port).await;
//! if !ready {
//!     return Err("transceiver not ready".into());
//! }
//!
//! if modem.wait_for_signal_strength(1, std::time::Duration::from_secs(120)).await {
//!     modem.buffer_message("Hello from the field").await;
//!     for message in modem.initiate_session().await? {
//!         println!("received: {message}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Sharing a modem between tasks
//!
//! The client takes `&mut self` for every operation. Tasks that share one
//! transceiver go through [`SharedModem`] and hold the lock for a whole
//! command, so bytes of two exchanges never interleave on the link.
//!
//! ```rust,no_run
//! use iridium_sbd::client::{DefaultModem, ModemControl, SharedModem};
//! use std::sync::Arc;
//! use tokio::sync::Mutex;
//!
//! # async fn example(port: tokio::io::DuplexStream) {
//! let modem: SharedModem<_> = Arc::new(Mutex::new(DefaultModem::new(port)));
//!
//! let poller = Arc::clone(&modem);
//! tokio::spawn(async move {
//!     let strength = poller.lock().await.check_signal_strength().await;
//!     println!("signal: {strength:?}");
//! });
//!
//! let alive = modem.lock().await.check_connected().await;
//! # let _ = alive;
//! # }
//! ```

pub mod builder;
pub mod default;
pub mod error;
pub mod traits;
pub mod types;

use std::sync::Arc;
use tokio::sync::Mutex;

// Re-export the main types for easy access
pub use builder::ModemBuilder;
pub use default::DefaultModem;
pub use error::{SbdError, SbdResult};
pub use traits::{ModemControl, SbdSession};
pub use types::{BufferAction, CommandTimeouts, ModemConfig};

/// A modem client shared between tasks
pub type SharedModem<T> = Arc<Mutex<DefaultModem<T>>>;
