//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ReconciliationEngine (domain)
//! ```
//!
//! Driven adapters (cameras, serial links, recognizers, gate actuators,
//! displays, image storage) implement these traits.  The
//! [`ReconciliationEngine`](super::service::ReconciliationEngine) consumes
//! them via generics, so the domain core never touches a device directly.
//!
//! All polling ports are **non-blocking**: "nothing this tick" is `None`,
//! never an error and never a wait.

use std::path::PathBuf;

use crate::config::SystemConfig;
use crate::evidence::EvidenceShot;
use crate::model::{CardToken, Frame, Lane, PlateText, Timestamp};

use super::events::{Effect, GateEvent};

// ───────────────────────────────────────────────────────────────
// Lane input ports (driven adapter: devices → domain)
// ───────────────────────────────────────────────────────────────

/// Per-lane signal source.
pub trait LanePoller {
    /// Latest camera frame, or `None` when the device is not ready.
    fn poll_frame(&mut self) -> Option<Frame>;

    /// Latest RFID token read since the previous poll, if any.
    fn poll_card_token(&mut self) -> Option<CardToken>;
}

/// Raw camera capture.
pub trait FrameSource {
    fn grab(&mut self) -> Option<Frame>;
}

/// Plate recognition: an opaque image → text function.
pub trait RecognitionPort {
    /// `None` (or empty text) when no plate is readable in `frame`.
    fn recognize(&mut self, frame: &Frame) -> Option<PlateText>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → gate controllers)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget gate command.  No acknowledgement is awaited.
pub trait ActuatorPort {
    fn open(&mut self, lane: Lane);
}

/// Both gates' devices behind one value.
///
/// Owning the pollers and the actuator together avoids a double mutable
/// borrow in the tick: a lane is polled first, then the borrow ends and
/// the actuator is driven.
pub trait GateHardware: ActuatorPort {
    type Poller: LanePoller;

    fn poller(&mut self, lane: Lane) -> &mut Self::Poller;
}

// ───────────────────────────────────────────────────────────────
// Output ports (driven adapter: domain → display / disk)
// ───────────────────────────────────────────────────────────────

/// Where the engine hands its side effects.  Implementations must not
/// block the tick loop.
pub trait EffectSink {
    fn dispatch(&mut self, effect: Effect);
}

/// Receives display/log events.  Fire-and-forget.
pub trait PresentationPort {
    fn present(&mut self, event: &GateEvent);
}

/// Persists the frame that justified an admission or release.
pub trait ImageStorePort {
    /// Returns the path the image was written to.
    fn store(&mut self, shot: &EvidenceShot) -> Result<PathBuf, StoreError>;
}

/// Two presenters side by side (e.g. log + status file).
impl<A: PresentationPort, B: PresentationPort> PresentationPort for (A, B) {
    fn present(&mut self, event: &GateEvent) {
        self.0.present(event);
        self.1.present(event);
    }
}

/// An optional presenter; `None` discards.
impl<P: PresentationPort> PresentationPort for Option<P> {
    fn present(&mut self, event: &GateEvent) {
        if let Some(inner) = self {
            inner.present(event);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Clock and configuration ports
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for session timestamps and debounce windows.
pub trait ClockPort {
    fn now(&self) -> Timestamp;
}

/// Loads system configuration.
///
/// Implementations MUST validate before returning; invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config could not be parsed.
    Corrupted(String),
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError(std::io::Error),
}

/// Errors from [`ImageStorePort`] operations.
#[derive(Debug)]
pub enum StoreError {
    /// The target directory is missing or not writable.
    IoError(std::io::Error),
    /// The frame could not be encoded.
    EncodeFailed(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted(msg) => write!(f, "config corrupted: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::EncodeFailed(msg) => write!(f, "encode failed: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
