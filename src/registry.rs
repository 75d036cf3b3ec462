//! Session registry — the authoritative occupancy table.
//!
//! Every active vehicle is one [`Session`] stored under a monotonically
//! increasing slot key, so iteration order is admission order.  Two
//! secondary indices (card → slot, plate → slot) make the same record
//! reachable by either key.  All three maps change inside a single
//! `&mut self` call, which is the only way the tick loop touches them.
//!
//! ## Invariants
//!
//! - `occupied() == sessions.len() <= capacity`, hence `0 <= free <= capacity`.
//! - A card appears in at most one active session.
//! - A non-empty plate appears in at most one active session.
//! - Released sessions are kept in a bounded ring of recent departures
//!   for the presentation table; they never count towards occupancy.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info};
use serde::Serialize;

use crate::error::{RejectReason, Rejected};
use crate::model::{CardToken, Departure, PlateText, Session, Timestamp};

/// How many released sessions the table keeps showing.
pub const RECENT_DEPARTURES: usize = 16;

/// In-memory session table for a fixed-capacity facility.
#[derive(Debug)]
pub struct SessionRegistry {
    capacity: usize,
    next_slot: u64,
    sessions: BTreeMap<u64, Session>,
    by_card: HashMap<CardToken, u64>,
    by_plate: HashMap<PlateText, u64>,
    departures: heapless::Deque<Departure, RECENT_DEPARTURES>,
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next_slot: 0,
            sessions: BTreeMap::new(),
            by_card: HashMap::new(),
            by_plate: HashMap::new(),
            departures: heapless::Deque::new(),
        }
    }

    // ── Transitions ───────────────────────────────────────────

    /// Admit a vehicle.
    ///
    /// Duplicate checks run before the capacity check: a card that is
    /// already inside is reported as such even when the lot is full.
    pub fn try_admit(
        &mut self,
        plate: PlateText,
        card: CardToken,
        now: Timestamp,
    ) -> Result<Session, Rejected> {
        if self.by_card.contains_key(&card) {
            return Err(RejectReason::DuplicateCard.into());
        }
        if !plate.is_empty() && self.by_plate.contains_key(&plate) {
            return Err(RejectReason::DuplicatePlate.into());
        }
        if self.free() == 0 {
            return Err(RejectReason::NoCapacity.into());
        }

        let slot = self.next_slot;
        self.next_slot += 1;

        let session = Session {
            plate: plate.clone(),
            card: card.clone(),
            entry_time: now,
        };
        self.by_card.insert(card, slot);
        if !plate.is_empty() {
            self.by_plate.insert(plate, slot);
        }
        self.sessions.insert(slot, session.clone());

        info!(
            "Registry: admitted plate='{}' card='{}' ({}/{} occupied)",
            session.plate,
            session.card,
            self.occupied(),
            self.capacity
        );
        Ok(session)
    }

    /// Release the session whose plate matches `plate`.
    pub fn try_release(&mut self, plate: &PlateText, now: Timestamp) -> Result<Session, Rejected> {
        if plate.is_empty() {
            return Err(RejectReason::NotFound.into());
        }
        let slot = *self
            .by_plate
            .get(plate)
            .ok_or(Rejected::new(RejectReason::NotFound))?;
        self.remove_slot(slot, now)
            .ok_or(Rejected::new(RejectReason::NotFound))
    }

    /// Operator removal of a stale session, addressed by card.
    pub fn evict_card(&mut self, card: &CardToken, now: Timestamp) -> Result<Session, Rejected> {
        let slot = *self
            .by_card
            .get(card)
            .ok_or(Rejected::new(RejectReason::NotFound))?;
        self.remove_slot(slot, now)
            .ok_or(Rejected::new(RejectReason::NotFound))
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn occupied(&self) -> usize {
        self.sessions.len()
    }

    pub fn free(&self) -> usize {
        self.capacity.saturating_sub(self.occupied())
    }

    pub fn session_for_card(&self, card: &CardToken) -> Option<&Session> {
        self.by_card.get(card).and_then(|slot| self.sessions.get(slot))
    }

    pub fn session_for_plate(&self, plate: &PlateText) -> Option<&Session> {
        self.by_plate.get(plate).and_then(|slot| self.sessions.get(slot))
    }

    /// Read-only view for presentation.  Sessions are oldest-parked
    /// first; departures are most-recent first.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            capacity: self.capacity,
            free: self.free(),
            occupied: self.occupied(),
            sessions: self.sessions.values().cloned().collect(),
            departures: {
                let mut recent: Vec<Departure> = self.departures.iter().cloned().collect();
                recent.reverse();
                recent
            },
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn remove_slot(&mut self, slot: u64, now: Timestamp) -> Option<Session> {
        let session = self.sessions.remove(&slot)?;
        self.by_card.remove(&session.card);
        if !session.plate.is_empty() {
            self.by_plate.remove(&session.plate);
        }

        if self.departures.is_full() {
            self.departures.pop_front();
        }
        // Cannot fail: a slot was just freed above.
        let _ = self
            .departures
            .push_back(Departure::new(session.clone(), now));

        debug!(
            "Registry: released plate='{}' card='{}' ({}/{} occupied)",
            session.plate,
            session.card,
            self.occupied(),
            self.capacity
        );
        Some(session)
    }
}

// ───────────────────────────────────────────────────────────────
// Snapshot
// ───────────────────────────────────────────────────────────────

/// Point-in-time copy of the registry, safe to ship to another thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    pub capacity: usize,
    pub free: usize,
    pub occupied: usize,
    pub sessions: Vec<Session>,
    pub departures: Vec<Departure>,
}

/// One row of the operator table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub card: CardToken,
    pub plate: PlateText,
    pub entry_time: Timestamp,
    pub exit_time: Option<Timestamp>,
}

impl RegistrySnapshot {
    /// Active sessions followed by recent departures.
    pub fn rows(&self) -> Vec<TableRow> {
        let active = self.sessions.iter().map(|s| TableRow {
            card: s.card.clone(),
            plate: s.plate.clone(),
            entry_time: s.entry_time,
            exit_time: None,
        });
        let departed = self.departures.iter().map(|d| TableRow {
            card: d.card.clone(),
            plate: d.plate.clone(),
            entry_time: d.entry_time,
            exit_time: Some(d.exit_time),
        });
        active.chain(departed).collect()
    }
}
