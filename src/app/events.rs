//! Outbound application events.
//!
//! The [`ReconciliationEngine`](super::service::ReconciliationEngine) emits
//! these as [`Effect`]s through the
//! [`EffectSink`](super::ports::EffectSink) port.  Adapters on the other
//! side decide what to do with them — render a display, log to the
//! console, rewrite a status file, write images to disk.

use crate::error::{Notice, RejectReason};
use crate::evidence::EvidenceShot;
use crate::model::{CardToken, Departure, Frame, Lane, PlateText, Session};
use crate::registry::RegistrySnapshot;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum GateEvent {
    /// The engine has started with an empty registry.
    Started { capacity: usize },

    /// Per-lane, per-tick feed update.  Emitted even when nothing happened
    /// so the live view never stalls.
    LaneFrame {
        lane: Lane,
        frame: Option<Frame>,
        plate: PlateText,
        free: usize,
    },

    /// A plate became readable on a lane (debounced when configured).
    PlateRead { lane: Lane, plate: PlateText },

    /// A vehicle was admitted through the entry gate.
    Admitted { session: Session, free: usize },

    /// A vehicle was released through the exit gate (or evicted).
    Released { departure: Departure, free: usize },

    /// A debounced swipe did not change any state.
    Rejected {
        lane: Lane,
        plate: PlateText,
        card: CardToken,
        reason: RejectReason,
    },

    /// A swipe was skipped for a non-error reason.
    Notice {
        lane: Lane,
        card: CardToken,
        notice: Notice,
    },

    /// An open command was sent to a gate.
    GateOpened { lane: Lane, manual: bool },

    /// Registry contents after a mutation.
    Table(RegistrySnapshot),

    /// The engine stopped after `ticks` ticks.
    Stopped { ticks: u64 },
}

/// Side effect requested by the engine.
#[derive(Debug, Clone)]
pub enum Effect {
    Present(GateEvent),
    Persist(EvidenceShot),
}
