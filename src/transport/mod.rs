//! Transport layer for macro-pad communication.
//!
//! This module provides the abstraction for different transport methods.
//! Currently only USB/Serial is implemented.

pub mod serial;

use bytes::Bytes;
use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::error::Result;

/// Trait for transport implementations.
pub trait Transport: Send + Sync {
    /// Opens the connection to the device.
    fn connect(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Closes the connection.
    fn disconnect(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Writes one complete frame.
    ///
    /// The write finishes fully before another send acquires the port.
    fn send(&mut self, frame: Bytes) -> BoxFuture<'_, Result<()>>;

    /// Returns true if connected.
    fn is_connected(&self) -> bool;

    /// Sets the channel that inbound chunks are delivered on.
    fn set_chunk_sender(&mut self, tx: mpsc::Sender<Bytes>);
}

pub use serial::SerialTransport;
