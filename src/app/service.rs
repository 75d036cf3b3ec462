//! Reconciliation engine — the hexagonal core.
//!
//! [`ReconciliationEngine`] owns the session registry and one debounce
//! state machine per lane.  It exposes a clean, device-agnostic API.
//! All I/O flows through port traits injected at call sites, making the
//! whole engine testable with mock adapters.
//!
//! ```text
//!   GateHardware ──▶ ┌──────────────────────────┐ ──▶ EffectSink
//!  (LanePoller ×2)   │   ReconciliationEngine    │    (display, images)
//!                    │ Debounce · Registry       │
//! RecognitionPort ──▶│                           │ ──▶ ActuatorPort
//!                    └──────────────────────────┘
//! ```
//!
//! A tick services the entry lane, then the exit lane.  A lane only
//! mutates the registry on a debounced card swipe paired with a plate
//! read from the same tick's frame; the frame itself is always forwarded
//! so the live feed keeps running at camera rate.

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::debounce::{DebounceGate, SignalKind};
use crate::error::{Notice, RejectReason, Rejected};
use crate::evidence::EvidenceShot;
use crate::model::{CardToken, Departure, Frame, Lane, PlateText, Session, Timestamp};
use crate::registry::{RegistrySnapshot, SessionRegistry};

use super::commands::GateCommand;
use super::events::{Effect, GateEvent};
use super::ports::{ActuatorPort, EffectSink, GateHardware, LanePoller, RecognitionPort};

// ───────────────────────────────────────────────────────────────
// Outcomes
// ───────────────────────────────────────────────────────────────

/// What one lane did during one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaneOutcome {
    /// No card was presented.
    Idle,
    /// The card repeated inside the debounce window.
    Suppressed(CardToken),
    Admitted(Session),
    Released(Departure),
    Rejected(RejectReason),
    /// The swipe was skipped without being an error.
    Skipped(Notice),
}

/// Per-tick result for both lanes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub entry: LaneOutcome,
    pub exit: LaneOutcome,
}

// ───────────────────────────────────────────────────────────────
// Lane state
// ───────────────────────────────────────────────────────────────

/// Independent state machine for one gate.
#[derive(Debug)]
struct LaneState {
    debounce: DebounceGate,
    last_plate: PlateText,
}

impl LaneState {
    fn new(config: &SystemConfig) -> Self {
        Self {
            debounce: DebounceGate::new(config.cooldown()),
            last_plate: PlateText::empty(),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ReconciliationEngine
// ───────────────────────────────────────────────────────────────

/// Orchestrates both lanes against the session registry.
#[derive(Debug)]
pub struct ReconciliationEngine {
    registry: SessionRegistry,
    entry: LaneState,
    exit: LaneState,
    debounce_plates: bool,
    verify_exit_card: bool,
    tick_count: u64,
}

impl ReconciliationEngine {
    /// Build the engine with an empty registry of `config.capacity` slots.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            registry: SessionRegistry::new(config.capacity),
            entry: LaneState::new(config),
            exit: LaneState::new(config),
            debounce_plates: config.debounce_plates,
            verify_exit_card: config.verify_exit_card,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, effects: &mut impl EffectSink) {
        let capacity = self.registry.capacity();
        info!("Engine started: capacity={}", capacity);
        effects.dispatch(Effect::Present(GateEvent::Started { capacity }));
        effects.dispatch(Effect::Present(GateEvent::Table(self.registry.snapshot())));
    }

    pub fn shutdown(&mut self, effects: &mut impl EffectSink) {
        info!(
            "Engine stopping after {} ticks ({} vehicles inside)",
            self.tick_count,
            self.registry.occupied()
        );
        effects.dispatch(Effect::Present(GateEvent::Stopped {
            ticks: self.tick_count,
        }));
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full cycle: entry lane, then exit lane.
    ///
    /// A lane whose devices have nothing to offer simply reports
    /// [`LaneOutcome::Idle`]; it never holds up the other lane.
    pub fn tick(
        &mut self,
        now: Timestamp,
        hw: &mut impl GateHardware,
        recognizer: &mut impl RecognitionPort,
        effects: &mut impl EffectSink,
    ) -> TickReport {
        self.tick_count += 1;
        let entry = self.service_lane(Lane::Entry, now, hw, recognizer, effects);
        let exit = self.service_lane(Lane::Exit, now, hw, recognizer, effects);
        TickReport { entry, exit }
    }

    fn service_lane<H: GateHardware>(
        &mut self,
        lane: Lane,
        now: Timestamp,
        hw: &mut H,
        recognizer: &mut impl RecognitionPort,
        effects: &mut impl EffectSink,
    ) -> LaneOutcome {
        // 1–2. Frame and recognition (absent frame = device unready).
        let frame = hw.poller(lane).poll_frame();
        let plate = frame
            .as_ref()
            .and_then(|f| recognizer.recognize(f))
            .unwrap_or_default();

        if !plate.is_empty() {
            let announce = !self.debounce_plates
                || self
                    .lane_mut(lane)
                    .debounce
                    .admit_signal(SignalKind::Plate, plate.as_str(), now);
            if announce {
                effects.dispatch(Effect::Present(GateEvent::PlateRead {
                    lane,
                    plate: plate.clone(),
                }));
            }
        }

        // 3–5. Card swipe, debounce, commit.
        let outcome = match hw.poller(lane).poll_card_token() {
            None => LaneOutcome::Idle,
            Some(card) => {
                let admitted = self
                    .lane_mut(lane)
                    .debounce
                    .admit_signal(SignalKind::Card, card.as_str(), now);
                if admitted {
                    self.commit(lane, &plate, card, frame.as_ref(), now, hw, effects)
                } else {
                    debug!("{} lane: card '{}' debounced", lane, card);
                    LaneOutcome::Suppressed(card)
                }
            }
        };

        // 6. Feed update, whatever happened.
        self.lane_mut(lane).last_plate = plate.clone();
        effects.dispatch(Effect::Present(GateEvent::LaneFrame {
            lane,
            frame,
            plate,
            free: self.registry.free(),
        }));
        outcome
    }

    /// Apply a debounced swipe to the registry and drive the side effects.
    #[allow(clippy::too_many_arguments)]
    fn commit(
        &mut self,
        lane: Lane,
        plate: &PlateText,
        card: CardToken,
        frame: Option<&Frame>,
        now: Timestamp,
        actuator: &mut impl ActuatorPort,
        effects: &mut impl EffectSink,
    ) -> LaneOutcome {
        if plate.is_empty() {
            info!("{} lane: card '{}' presented but no plate read", lane, card);
            effects.dispatch(Effect::Present(GateEvent::Notice {
                lane,
                card,
                notice: Notice::RecognitionUnavailable,
            }));
            return LaneOutcome::Skipped(Notice::RecognitionUnavailable);
        }

        let (outcome, event) = match lane {
            Lane::Entry => match self.registry.try_admit(plate.clone(), card.clone(), now) {
                Ok(session) => (
                    LaneOutcome::Admitted(session.clone()),
                    GateEvent::Admitted {
                        session,
                        free: self.registry.free(),
                    },
                ),
                Err(rejected) => return Self::reject(lane, plate, card, rejected, effects),
            },
            Lane::Exit => match self.release_checked(plate, &card, now) {
                Ok(session) => {
                    let departure = Departure::new(session, now);
                    (
                        LaneOutcome::Released(departure.clone()),
                        GateEvent::Released {
                            departure,
                            free: self.registry.free(),
                        },
                    )
                }
                Err(rejected) => return Self::reject(lane, plate, card, rejected, effects),
            },
        };

        if let Some(frame) = frame {
            effects.dispatch(Effect::Persist(EvidenceShot {
                frame: frame.clone(),
                plate: plate.clone(),
                lane,
                at: now,
            }));
        }
        actuator.open(lane);
        effects.dispatch(Effect::Present(GateEvent::GateOpened {
            lane,
            manual: false,
        }));
        effects.dispatch(Effect::Present(event));
        effects.dispatch(Effect::Present(GateEvent::Table(self.registry.snapshot())));
        outcome
    }

    fn reject(
        lane: Lane,
        plate: &PlateText,
        card: CardToken,
        rejected: Rejected,
        effects: &mut impl EffectSink,
    ) -> LaneOutcome {
        warn!("{} lane: plate='{}' card='{}' {}", lane, plate, card, rejected);
        effects.dispatch(Effect::Present(GateEvent::Rejected {
            lane,
            plate: plate.clone(),
            card,
            reason: rejected.reason,
        }));
        LaneOutcome::Rejected(rejected.reason)
    }

    fn release_checked(
        &mut self,
        plate: &PlateText,
        card: &CardToken,
        now: Timestamp,
    ) -> Result<Session, Rejected> {
        if self.verify_exit_card {
            if let Some(session) = self.registry.session_for_plate(plate) {
                if session.card != *card {
                    return Err(RejectReason::CardMismatch.into());
                }
            }
        }
        self.registry.try_release(plate, now)
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an operator command between ticks.
    pub fn handle_command(
        &mut self,
        cmd: GateCommand,
        now: Timestamp,
        actuator: &mut impl ActuatorPort,
        effects: &mut impl EffectSink,
    ) -> Result<(), Rejected> {
        match cmd {
            GateCommand::ManualOpen(lane) => {
                info!("{} gate opened manually", lane);
                actuator.open(lane);
                effects.dispatch(Effect::Present(GateEvent::GateOpened { lane, manual: true }));
                Ok(())
            }
            GateCommand::EvictCard(card) => {
                let session = self.registry.evict_card(&card, now).inspect_err(|e| {
                    warn!("Evict card='{}': {}", card, e);
                })?;
                info!("Evicted plate='{}' card='{}'", session.plate, session.card);
                // Let the card back in immediately on either lane.
                self.entry.debounce.reset();
                self.exit.debounce.reset();
                effects.dispatch(Effect::Present(GateEvent::Released {
                    departure: Departure::new(session, now),
                    free: self.registry.free(),
                }));
                effects.dispatch(Effect::Present(GateEvent::Table(self.registry.snapshot())));
                Ok(())
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Total ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Plate shown on `lane` after the most recent tick.
    pub fn last_plate(&self, lane: Lane) -> &PlateText {
        match lane {
            Lane::Entry => &self.entry.last_plate,
            Lane::Exit => &self.exit.last_plate,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn lane_mut(&mut self, lane: Lane) -> &mut LaneState {
        match lane {
            Lane::Entry => &mut self.entry,
            Lane::Exit => &mut self.exit,
        }
    }
}
