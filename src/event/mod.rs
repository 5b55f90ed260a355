//! Event system for surfacing connection state and device banners.
//!
//! The surrounding UI layer subscribes here instead of wiring callbacks
//! into the connection internals.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::types::VersionNumber;

/// Event types that can be dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Connection established.
    Connected,
    /// Connection closed or lost.
    Disconnected,
    /// Firmware version banner received.
    Version(VersionNumber),
}

/// Event discriminant used for filtered waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Connected,
    Disconnected,
    Version,
}

impl Event {
    /// Returns the event's kind.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Connected => EventKind::Connected,
            Self::Disconnected => EventKind::Disconnected,
            Self::Version(_) => EventKind::Version,
        }
    }
}

/// A subscription to events.
pub struct Subscription {
    receiver: broadcast::Receiver<Event>,
}

impl Subscription {
    /// Receives the next event.
    ///
    /// Returns `None` if the channel is closed. Lagged notifications are
    /// skipped.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

struct EventDispatcherInner {
    sender: broadcast::Sender<Event>,
}

/// Dispatches events to subscribers.
#[derive(Clone)]
pub struct EventDispatcher {
    inner: Arc<EventDispatcherInner>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(EventDispatcherInner { sender }),
        }
    }

    /// Dispatches an event to all subscribers.
    pub fn dispatch(&self, event: Event) {
        // No receivers is fine; the send error is deliberately dropped.
        let _ = self.inner.sender.send(event);
    }

    /// Subscribes to all events.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.inner.sender.subscribe(),
        }
    }

    /// Waits for the next event of the given kind.
    ///
    /// Returns `None` if the timeout expires or the channel is closed.
    pub async fn wait_for(&self, kind: EventKind, timeout: Duration) -> Option<Event> {
        let mut subscription = self.subscribe();

        tokio::select! {
            biased;
            result = async {
                loop {
                    match subscription.recv().await {
                        Some(event) if event.kind() == kind => return Some(event),
                        Some(_) => {}
                        None => return None,
                    }
                }
            } => result,
            () = tokio::time::sleep(timeout) => None,
        }
    }
}
