//! Clipboard event value objects

use std::fmt;
use std::time::SystemTime;

use crate::domain::target::Target;

/// Event channel identifier.
///
/// The well-known kinds cover the library's own notifications; `Custom`
/// lets callers publish and subscribe on their own channels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Text was committed to the clipboard
    Copy,
    /// A driver or the facade reported a failure
    Error,
    /// The facade was torn down
    Destroy,
    /// Caller-defined channel
    Custom(String),
}

impl EventKind {
    /// Wire-level name of the channel
    pub fn as_str(&self) -> &str {
        match self {
            Self::Copy => "copy",
            Self::Error => "error",
            Self::Destroy => "destroy",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable failure classification carried by error events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultKind {
    /// A driver definition was rejected at construction time
    DriverError,
    /// A mechanism turned out to be unsupported at interaction time.
    /// This is the kind the fallback protocol rotates on.
    Support,
    /// The mechanism is present but the commit itself failed
    CopyFailed,
    /// Mechanism-specific kind
    Other(String),
}

impl FaultKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::DriverError => "driver-error",
            Self::Support => "support",
            Self::CopyFailed => "copy-failed",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure detail attached to error events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    kind: FaultKind,
    message: String,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &FaultKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Immutable notification payload.
///
/// Constructed once per dispatched notification; the timestamp is captured
/// at construction and never recomputed. Only the fields relevant to the
/// event's kind are populated: copy events may carry `text`, error events
/// carry a [`Fault`], all other kinds carry the common fields alone.
#[derive(Debug, Clone)]
pub struct ClipEvent {
    kind: EventKind,
    target: Option<Target>,
    driver: Option<String>,
    timestamp: SystemTime,
    text: Option<String>,
    fault: Option<Fault>,
}

impl ClipEvent {
    fn new(kind: EventKind, target: Option<Target>, driver: Option<String>) -> Self {
        Self {
            kind,
            target,
            driver,
            timestamp: SystemTime::now(),
            text: None,
            fault: None,
        }
    }

    /// A successful copy, with the text that reached the clipboard.
    pub fn copied(target: Option<Target>, driver: impl Into<String>, text: impl Into<String>) -> Self {
        let mut event = Self::new(EventKind::Copy, target, Some(driver.into()));
        event.text = Some(text.into());
        event
    }

    /// A copy-kind event for a target before any text is committed.
    ///
    /// This is the event handed to a computing [`crate::domain::ValueSource`]
    /// so it can derive its text from the interacted target.
    pub fn copy_request(target: Target, driver: Option<String>) -> Self {
        Self::new(EventKind::Copy, Some(target), driver)
    }

    /// A failure report.
    pub fn failed(
        kind: FaultKind,
        message: impl Into<String>,
        target: Option<Target>,
        driver: Option<String>,
    ) -> Self {
        let mut event = Self::new(EventKind::Error, target, driver);
        event.fault = Some(Fault::new(kind, message));
        event
    }

    /// The teardown notification.
    pub fn destroyed() -> Self {
        Self::new(EventKind::Destroy, None, None)
    }

    /// An event on a caller-defined channel.
    pub fn custom(name: impl Into<String>, target: Option<Target>) -> Self {
        Self::new(EventKind::Custom(name.into()), target, None)
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Name of the driver that produced the event, if any
    pub fn driver(&self) -> Option<&str> {
        self.driver.as_deref()
    }

    /// Capture time, fixed at construction
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Committed text (copy events only)
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Failure detail (error events only)
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }
}
