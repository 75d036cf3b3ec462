//! Decision errors raised by the session registry and the engine.
//!
//! A rejection is a normal outcome of a lane tick, never a reason to stop
//! the loop.  Every variant is `Copy` so it can be logged, embedded in a
//! presentation event, and returned to the caller without allocation.

use core::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Reject reasons
// ---------------------------------------------------------------------------

/// Why an admission, release, or eviction did not change any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Every slot is occupied.
    NoCapacity,
    /// The presented card already has an active session.
    DuplicateCard,
    /// The recognized plate already has an active session under another card.
    DuplicatePlate,
    /// No active session matches the presented plate (or card).
    NotFound,
    /// The exit card does not belong to the session of the exiting plate.
    CardMismatch,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCapacity => write!(f, "no free capacity"),
            Self::DuplicateCard => write!(f, "card already inside"),
            Self::DuplicatePlate => write!(f, "plate already inside"),
            Self::NotFound => write!(f, "no matching session"),
            Self::CardMismatch => write!(f, "card does not match session"),
        }
    }
}

/// Error returned by registry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected {
    pub reason: RejectReason,
}

impl Rejected {
    pub const fn new(reason: RejectReason) -> Self {
        Self { reason }
    }
}

impl From<RejectReason> for Rejected {
    fn from(reason: RejectReason) -> Self {
        Self::new(reason)
    }
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rejected: {}", self.reason)
    }
}

impl std::error::Error for Rejected {}

// ---------------------------------------------------------------------------
// Non-error skips
// ---------------------------------------------------------------------------

/// Conditions that skip a lane decision without being failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// A card was swiped but no plate could be read for the vehicle.
    RecognitionUnavailable,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecognitionUnavailable => write!(f, "plate not recognized"),
        }
    }
}
