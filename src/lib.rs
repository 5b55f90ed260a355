//! # ezbpad
//!
//! A Rust client library for EZB macro-pad devices.
//!
//! This library configures per-key macros, aliases, scripts, LED color
//! and Wi-Fi credentials over USB/Serial using the device's compact
//! text-framed protocol, and recognizes the status banners the device
//! mixes into its inbound stream.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - Event-driven surface for unsolicited device banners
//! - Type-safe frame encoding with pre-send validation
//! - Comprehensive error handling
//!
//! ## Quick Start
//!
//! ```no_run
//! use ezbpad::{KeyIndex, MacroPad, Profile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ezbpad::Error> {
//!     // Connect to a macro-pad
//!     let mut pad = MacroPad::serial("/dev/ttyACM0");
//!     pad.connect().await?;
//!
//!     // Bind ctrl+c to key 1 of profile 0
//!     let profile = Profile::new(0)?;
//!     let key = KeyIndex::new(1)?;
//!     pad.bind_macro(profile, key, "[lctrl]c").await?;
//!
//!     // Disconnect
//!     pad.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`protocol`] - Low-level protocol pieces (frames, key tokens, banner
//!   parser, validation)
//! - [`types`] - Data structures (profiles, key indices, LED colors)
//! - [`transport`] - Transport implementations (currently USB/Serial)
//! - [`event`] - Async event system for handling notifications
//! - [`client`] - High-level [`MacroPad`] client

pub mod client;
pub mod error;
pub mod event;
pub mod protocol;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{ConnectionState, MacroPad};
pub use error::{Error, FrameError, Result};
pub use event::{Event, EventDispatcher, EventKind, Subscription};
pub use protocol::{
    ConfigMessage, MessageKind, Response, ResponseParser, validate_macro, validate_wire_text,
};
pub use transport::{
    SerialTransport,
    serial::{find_device, list_ports},
};
pub use types::{KeyIndex, LedColor, Profile, VersionNumber};
