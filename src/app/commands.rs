//! Inbound operator commands to the reconciliation engine.
//!
//! These represent actions requested by the outside world (the operator
//! console today) that the
//! [`ReconciliationEngine`](super::service::ReconciliationEngine)
//! interprets between ticks.

use crate::model::{CardToken, Lane};

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateCommand {
    /// Open a gate without touching the registry (attendant override).
    ManualOpen(Lane),

    /// Remove the session held by a card (vehicle left without swiping).
    EvictCard(CardToken),
}
