//! Serial/USB transport implementation.
//!
//! This module provides serial port communication for macro-pad devices
//! connected via USB.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use futures::future::BoxFuture;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{Mutex, mpsc};
use tokio_serial::{SerialPortBuilderExt, SerialPortType, SerialStream};

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Symbol rate the device runs at.
pub const BAUD_RATE: u32 = 115_200;

/// USB vendor identifier of the macro-pad.
pub const USB_VID: u16 = 0x303A;

/// USB product identifier of the macro-pad.
pub const USB_PID: u16 = 0x1001;

/// Configuration for serial transport.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Serial port path (e.g., "/dev/ttyACM0" or "COM5").
    pub port: String,
    /// Baud rate.
    pub baud_rate: u32,
}

impl SerialConfig {
    /// Creates a configuration for the given port at the device baud rate.
    #[must_use]
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: BAUD_RATE,
        }
    }
}

/// Serial transport for macro-pad communication.
///
/// Uses split read/write halves so the read loop and outbound writes
/// proceed independently; the writer sits behind a mutex so only one
/// write section is open at a time.
pub struct SerialTransport {
    config: SerialConfig,
    writer: Option<Arc<Mutex<WriteHalf<SerialStream>>>>,
    reader: Option<ReadHalf<SerialStream>>,
    chunk_tx: Option<mpsc::Sender<Bytes>>,
}

impl SerialTransport {
    /// Creates a new serial transport with the given configuration.
    #[must_use]
    pub fn new(config: SerialConfig) -> Self {
        Self {
            config,
            writer: None,
            reader: None,
            chunk_tx: None,
        }
    }

    /// Creates a new serial transport for the given port with default settings.
    #[must_use]
    pub fn with_port(port: impl Into<String>) -> Self {
        Self::new(SerialConfig::new(port))
    }

    /// Takes the reader half for use in a background task.
    ///
    /// This can only be called once after connecting.
    pub fn take_reader(&mut self) -> Option<ReadHalf<SerialStream>> {
        self.reader.take()
    }

    /// Gets the inbound chunk channel.
    #[must_use]
    pub fn chunk_tx(&self) -> Option<mpsc::Sender<Bytes>> {
        self.chunk_tx.clone()
    }

    /// Runs the inbound read loop until stopped or the stream ends.
    ///
    /// This should be spawned as a separate task. The stop flag is
    /// observed between reads only; an in-flight read is never aborted,
    /// so shutdown waits for the current read to return. There is no
    /// read timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the connection is lost.
    pub async fn run_read_loop(
        mut reader: ReadHalf<SerialStream>,
        chunk_tx: mpsc::Sender<Bytes>,
        stop: Arc<AtomicBool>,
    ) -> Result<()> {
        let mut buf = [0u8; 1024];

        while !stop.load(Ordering::Acquire) {
            let n = match reader.read(&mut buf).await {
                Ok(0) => {
                    tracing::debug!("serial port closed");
                    return Err(Error::Io(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "serial port closed",
                    )));
                }
                Ok(n) => n,
                Err(e) => {
                    tracing::error!("serial read error: {}", e);
                    return Err(Error::Io(e));
                }
            };

            tracing::trace!("received {} bytes", n);
            if chunk_tx.send(Bytes::copy_from_slice(&buf[..n])).await.is_err() {
                tracing::debug!("chunk receiver dropped");
                return Ok(());
            }
        }

        tracing::debug!("read loop stop requested");
        Ok(())
    }
}

impl Transport for SerialTransport {
    fn connect(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.writer.is_some() {
                return Err(Error::AlreadyConnected);
            }

            tracing::info!("opening serial port: {}", self.config.port);

            let stream = tokio_serial::new(&self.config.port, self.config.baud_rate)
                .open_native_async()
                .map_err(Error::Serial)?;

            let (reader, writer) = tokio::io::split(stream);
            self.reader = Some(reader);
            self.writer = Some(Arc::new(Mutex::new(writer)));

            tracing::info!("serial port open");
            Ok(())
        })
    }

    fn disconnect(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.writer.is_some() || self.reader.is_some() {
                tracing::info!("closing serial port");
            }
            self.writer = None;
            self.reader = None;
            self.chunk_tx = None;
            Ok(())
        })
    }

    fn send(&mut self, frame: Bytes) -> BoxFuture<'_, Result<()>> {
        let writer = self.writer.clone();
        Box::pin(async move {
            let writer = writer.ok_or(Error::NotConnected)?;
            let mut writer = writer.lock().await;

            tracing::trace!("sending frame: {} bytes", frame.len());
            writer.write_all(&frame).await.map_err(Error::Io)?;
            writer.flush().await.map_err(Error::Io)?;

            Ok(())
        })
    }

    fn is_connected(&self) -> bool {
        self.writer.is_some()
    }

    fn set_chunk_sender(&mut self, tx: mpsc::Sender<Bytes>) {
        self.chunk_tx = Some(tx);
    }
}

/// Finds the first serial port whose USB identifiers match the macro-pad.
///
/// # Errors
///
/// Returns an error if the port list cannot be retrieved or no port
/// matches.
pub fn find_device() -> Result<String> {
    let ports = tokio_serial::available_ports().map_err(Error::Serial)?;
    for port in ports {
        if let SerialPortType::UsbPort(info) = &port.port_type {
            if info.vid == USB_VID && info.pid == USB_PID {
                tracing::debug!("found macro-pad at {}", port.port_name);
                return Ok(port.port_name);
            }
        }
    }
    Err(Error::DeviceNotFound {
        vid: USB_VID,
        pid: USB_PID,
    })
}

/// Lists available serial ports.
///
/// # Errors
///
/// Returns an error if the port list cannot be retrieved.
pub fn list_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports().map_err(Error::Serial)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
