//! # Event Bus System
//!
//! Session lifecycle notifications over `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The session never drives navigation or UI itself. Instead it publishes
//! [`AuthEvent`]s and lets hosts react: show a spinner on `Initializing`,
//! route to the login page on `RedirectRequested`, and so on.
//!
//! ```text
//! ┌─────────────┐     emit      ┌───────────┐     subscribe    ┌────────────┐
//! │ AuthSession ├──────────────>│ EventBus  ├─────────────────>│ Host / UI  │
//! └─────────────┘               └───────────┘                  └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{AuthEvent, EventBus};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(16);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(AuthEvent::RedirectRequested {
//!         url: Some("https://example.com/login".to_string()),
//!     })
//!     .ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert!(matches!(event, AuthEvent::RedirectRequested { .. }));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   Non-fatal; the subscriber keeps receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped. Treat as shutdown.
//!
//! Emitting with no subscribers returns an error that publishers ignore.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

/// Events published by the authentication session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// Session initialization started.
    Initializing {
        session_id: String,
    },
    /// A principal was accepted.
    SignedIn {
        session_id: String,
        user_id: String,
        /// `"server_verified"` or `"locally_verified"`.
        tier: String,
    },
    /// The principal was refreshed by a successful re-verification.
    VerificationRefreshed {
        session_id: String,
        user_id: String,
    },
    /// The session dropped its credential.
    SignedOut {
        session_id: String,
        /// Human-readable reason, e.g. "logout" or "verification failed".
        reason: String,
    },
    /// Authentication error occurred.
    AuthError {
        session_id: Option<String>,
        /// Human-readable error message.
        message: String,
        /// Whether the error is recoverable (e.g., retry possible).
        recoverable: bool,
    },
    /// The host should navigate to its login page. `url` is the configured
    /// login redirect URL; `None` leaves the target to the host.
    RedirectRequested {
        url: Option<String>,
    },
}

impl AuthEvent {
    pub fn description(&self) -> &str {
        match self {
            AuthEvent::Initializing { .. } => "Session initializing",
            AuthEvent::SignedIn { .. } => "User signed in successfully",
            AuthEvent::VerificationRefreshed { .. } => "Verification refreshed",
            AuthEvent::SignedOut { .. } => "User signed out",
            AuthEvent::AuthError { .. } => "Authentication error",
            AuthEvent::RedirectRequested { .. } => "Redirect requested",
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            AuthEvent::AuthError {
                recoverable: false, ..
            } => EventSeverity::Error,
            AuthEvent::AuthError { .. } => EventSeverity::Warning,
            AuthEvent::Initializing { .. } => EventSeverity::Debug,
            _ => EventSeverity::Info,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Central event bus for publishing and subscribing to session events.
///
/// Cloning the bus clones the sender; every clone publishes to the same
/// subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AuthEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none.
    pub fn emit(&self, event: AuthEvent) -> Result<usize, SendError<AuthEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

type EventFilter = Box<dyn Fn(&AuthEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with optional filtering.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{AuthEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(16);
/// let redirects = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, AuthEvent::RedirectRequested { .. }));
/// ```
pub struct EventStream {
    receiver: Receiver<AuthEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<AuthEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&AuthEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &AuthEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<AuthEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<AuthEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
