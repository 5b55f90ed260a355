//! High-level [`MacroPad`] client implementation.
//!
//! This module owns the connection state machine, the shared transport
//! handle, and the background read loop that feeds the banner parser.
//! Nothing outside this module mutates the connection state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::event::{Event, EventDispatcher, Subscription};
use crate::protocol::{ConfigMessage, Response, ResponseParser, validate_macro, validate_wire_text};
use crate::transport::{
    SerialTransport, Transport,
    serial::{SerialConfig, find_device},
};
use crate::types::{KeyIndex, LedColor, Profile};

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport open.
    Disconnected,
    /// Transport open in progress.
    Connecting,
    /// Transport open, read loop running.
    Connected,
    /// Shutdown in progress.
    Disconnecting,
}

/// Client for configuring an EZB macro-pad device.
///
/// The wire protocol is fire-and-forget: sends complete when the frame is
/// written, and the device's only feedback is the unsolicited version
/// banner surfaced as [`Event::Version`].
pub struct MacroPad<T> {
    transport: Arc<Mutex<T>>,
    dispatcher: EventDispatcher,
    state: Arc<RwLock<ConnectionState>>,
    stop: Arc<AtomicBool>,

    // Background tasks
    read_task: Option<JoinHandle<()>>,
    parse_task: Option<JoinHandle<()>>,
}

impl MacroPad<SerialTransport> {
    /// Creates a client for a serial port.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/ttyACM0")
    ///
    /// # Returns
    ///
    /// A new client (not yet connected).
    #[must_use]
    pub fn serial(port: impl Into<String>) -> Self {
        Self::with_serial_config(SerialConfig::new(port))
    }

    /// Creates a client with custom serial configuration.
    #[must_use]
    pub fn with_serial_config(config: SerialConfig) -> Self {
        Self::new(SerialTransport::new(config))
    }

    /// Creates a client for the first attached macro-pad, located by its
    /// fixed USB vendor/product identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if no matching device is attached.
    pub fn detect() -> Result<Self> {
        let port = find_device()?;
        Ok(Self::serial(port))
    }
}

impl<T: Transport + 'static> MacroPad<T> {
    /// Creates a new client with the given transport.
    fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(Mutex::new(transport)),
            dispatcher: EventDispatcher::new(256),
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            stop: Arc::new(AtomicBool::new(false)),
            read_task: None,
            parse_task: None,
        }
    }

    /// Connects to the device.
    ///
    /// This will:
    /// 1. Open the transport
    /// 2. Start the background read loop and banner parser
    /// 3. Issue a version query (the banner arrives later as [`Event::Version`])
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyConnected`] unless the client is fully
    /// disconnected; the state machine never double-opens. An open failure
    /// returns the client to `Disconnected` with no automatic retry.
    pub async fn connect(&mut self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if *state != ConnectionState::Disconnected {
                return Err(Error::AlreadyConnected);
            }
            *state = ConnectionState::Connecting;
        }

        self.stop = Arc::new(AtomicBool::new(false));
        let (chunk_tx, chunk_rx) = mpsc::channel::<Bytes>(256);

        let connected = {
            let mut transport = self.transport.lock().await;
            transport.set_chunk_sender(chunk_tx);
            transport.connect().await
        };
        if let Err(e) = connected {
            let mut state = self.state.write().await;
            *state = ConnectionState::Disconnected;
            return Err(e);
        }

        self.start_read_loop().await;
        self.start_parser(chunk_rx);

        {
            let mut state = self.state.write().await;
            *state = ConnectionState::Connected;
        }
        self.dispatcher.dispatch(Event::Connected);
        tracing::info!("connected");

        // The device answers in the inbound stream with its version banner.
        self.send(&ConfigMessage::VersionQuery).await?;

        Ok(())
    }

    /// Starts the background read loop (serial transports only).
    async fn start_read_loop(&mut self) {
        // Take the reader half out of the transport so the loop can run
        // without holding the transport lock.
        let reader_setup = {
            let mut transport = self.transport.lock().await;
            if let Some(serial) =
                ((&mut *transport) as &mut dyn std::any::Any).downcast_mut::<SerialTransport>()
            {
                serial.take_reader().zip(serial.chunk_tx())
            } else {
                None
            }
        };

        if let Some((reader, chunk_tx)) = reader_setup {
            let stop = Arc::clone(&self.stop);
            let state = Arc::clone(&self.state);
            let transport = Arc::clone(&self.transport);
            let dispatcher = self.dispatcher.clone();

            let read_task = tokio::spawn(async move {
                if let Err(e) = SerialTransport::run_read_loop(reader, chunk_tx, Arc::clone(&stop)).await {
                    tracing::warn!("read loop ended: {}", e);
                }

                // End-of-stream or I/O failure without a disconnect() call:
                // walk the state machine down ourselves.
                if !stop.load(Ordering::Acquire) {
                    let close = {
                        let mut state = state.write().await;
                        if *state == ConnectionState::Connected {
                            *state = ConnectionState::Disconnecting;
                            true
                        } else {
                            false
                        }
                    };
                    if close {
                        {
                            let mut transport = transport.lock().await;
                            if let Err(e) = transport.disconnect().await {
                                tracing::warn!("transport close failed: {}", e);
                            }
                        }
                        let mut state = state.write().await;
                        *state = ConnectionState::Disconnected;
                        dispatcher.dispatch(Event::Disconnected);
                    }
                }
            });
            self.read_task = Some(read_task);
        }
    }

    /// Starts the task that feeds inbound chunks to the banner parser.
    fn start_parser(&mut self, mut chunk_rx: mpsc::Receiver<Bytes>) {
        let dispatcher = self.dispatcher.clone();

        let parse_task = tokio::spawn(async move {
            let mut parser = ResponseParser::new();
            while let Some(chunk) = chunk_rx.recv().await {
                // Bytes map 1:1 to code units; no UTF-8 transcoding.
                let text: String = chunk.iter().map(|&b| char::from(b)).collect();
                if let Some(Response::Version(version)) = parser.feed(&text) {
                    dispatcher.dispatch(Event::Version(version));
                }
            }
        });
        self.parse_task = Some(parse_task);
    }

    /// Disconnects from the device.
    ///
    /// Cancellation is cooperative: the read loop observes the stop flag
    /// between reads, so this waits for any in-flight read to return
    /// before the transport is closed. A no-op when already disconnected.
    pub async fn disconnect(&mut self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if *state != ConnectionState::Connected {
                return Ok(());
            }
            *state = ConnectionState::Disconnecting;
        }

        self.stop.store(true, Ordering::Release);
        if let Some(task) = self.read_task.take() {
            let _ = task.await;
        }
        if let Some(task) = self.parse_task.take() {
            task.abort();
        }

        {
            let mut transport = self.transport.lock().await;
            transport.disconnect().await?;
        }

        {
            let mut state = self.state.write().await;
            *state = ConnectionState::Disconnected;
        }
        self.dispatcher.dispatch(Event::Disconnected);
        tracing::info!("disconnected");

        Ok(())
    }

    /// Returns the current connection state.
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Returns true if connected.
    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    /// Subscribes to connection and banner events.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.dispatcher.subscribe()
    }

    /// Encodes and transmits one configuration message.
    ///
    /// Valid only while connected; otherwise the transport is left
    /// untouched. Concurrent callers serialize on the transport lock, so
    /// each frame is written in full before the next send begins.
    ///
    /// A failed write counts as end-of-stream: the connection is closed
    /// and the state machine walks down to `Disconnected` before the
    /// error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] when no connection is open, a frame
    /// error if the message outgrows the length field, or an I/O error
    /// from the write itself.
    pub async fn send(&self, message: &ConfigMessage) -> Result<()> {
        if self.state().await != ConnectionState::Connected {
            return Err(Error::NotConnected);
        }

        let frame = message.encode()?;
        tracing::debug!("sending {:?} frame", message.kind());

        let mut transport = self.transport.lock().await;
        match transport.send(frame).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!("write failed, closing connection: {}", e);
                self.stop.store(true, Ordering::Release);
                {
                    let mut state = self.state.write().await;
                    *state = ConnectionState::Disconnecting;
                }
                if let Err(close) = transport.disconnect().await {
                    tracing::warn!("transport close failed: {}", close);
                }
                {
                    let mut state = self.state.write().await;
                    *state = ConnectionState::Disconnected;
                }
                self.dispatcher.dispatch(Event::Disconnected);
                Err(e)
            }
        }
    }

    // ==================== Configuration Operations ====================

    /// Validates macro text and binds it to a key.
    pub async fn bind_macro(&self, profile: Profile, key: KeyIndex, text: &str) -> Result<()> {
        validate_macro(text)?;
        self.send(&ConfigMessage::MacroBind {
            profile,
            key,
            text: text.to_owned(),
        })
        .await
    }

    /// Sets the backlight color and brightness.
    pub async fn set_led_color(&self, color: LedColor, brightness: u8) -> Result<()> {
        self.send(&ConfigMessage::LedColor { color, brightness }).await
    }

    /// Assigns alias text to a key.
    pub async fn add_alias(&self, profile: Profile, key: KeyIndex, alias: &str) -> Result<()> {
        validate_wire_text("alias", alias)?;
        self.send(&ConfigMessage::AliasAdd {
            profile,
            key,
            alias: alias.to_owned(),
        })
        .await
    }

    /// Clears the alias on a key.
    pub async fn remove_alias(&self, profile: Profile, key: KeyIndex) -> Result<()> {
        self.send(&ConfigMessage::AliasRemove { profile, key }).await
    }

    /// Attaches script text to a key.
    pub async fn add_script(&self, profile: Profile, key: KeyIndex, script: &str) -> Result<()> {
        validate_wire_text("script", script)?;
        self.send(&ConfigMessage::ScriptAdd {
            profile,
            key,
            script: script.to_owned(),
        })
        .await
    }

    /// Clears the script on a key.
    pub async fn remove_script(&self, profile: Profile, key: KeyIndex) -> Result<()> {
        self.send(&ConfigMessage::ScriptRemove { profile, key }).await
    }

    /// Stores Wi-Fi credentials on the device.
    pub async fn set_wifi(&self, ssid: &str, password: &str) -> Result<()> {
        validate_wire_text("ssid", ssid)?;
        validate_wire_text("password", password)?;
        self.send(&ConfigMessage::WifiConfig {
            ssid: ssid.to_owned(),
            password: password.to_owned(),
        })
        .await
    }

    /// Requests the firmware version banner.
    pub async fn query_version(&self) -> Result<()> {
        self.send(&ConfigMessage::VersionQuery).await
    }
}

impl<T> Drop for MacroPad<T> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(task) = self.read_task.take() {
            task.abort();
        }
        if let Some(task) = self.parse_task.take() {
            task.abort();
        }
    }
}
