//! Error types for the ezbpad library.

use thiserror::Error;

/// The main error type for ezbpad operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame encoding error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Input rejected before encoding.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// No attached device matched the expected USB identifiers.
    #[error("no macro-pad found (vid {vid:04x}, pid {pid:04x})")]
    DeviceNotFound { vid: u16, pid: u16 },

    /// Connection is not established.
    #[error("not connected")]
    NotConnected,

    /// A connection is already open.
    #[error("already connected")]
    AlreadyConnected,
}

/// Frame-specific errors.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame's length code does not fit the single-digit length field.
    ///
    /// The device protocol reserves exactly one base-10 digit for the
    /// length code; longer frames cannot be represented on the wire.
    #[error("frame length code {len} exceeds single-digit maximum {max}")]
    Overflow { len: usize, max: usize },
}

/// Result type alias for ezbpad operations.
pub type Result<T> = std::result::Result<T, Error>;
