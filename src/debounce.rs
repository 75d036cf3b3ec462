//! Per-lane signal debouncing.
//!
//! RFID readers report the same physical swipe several times, and a car
//! sitting under the camera yields the same plate on every frame.  The
//! gate keeps, per signal kind, the last value it let through and when.
//!
//! | Arrival                                  | Result    |
//! |------------------------------------------|-----------|
//! | First signal on the channel              | admitted  |
//! | Same value before `last_at + cooldown`   | suppressed|
//! | Same value at or after the window        | admitted  |
//! | Different value, any time                | admitted  |
//!
//! A suppressed signal does not extend the window; only admitted
//! signals move `last_at`.

use chrono::TimeDelta;
use log::debug;

use crate::model::{TOKEN_CAP, Timestamp};

/// Which stream a signal belongs to.  Each kind debounces independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Card,
    Plate,
}

/// Last admitted occurrence on one channel.
#[derive(Debug, Clone)]
struct ChannelState {
    last_value: heapless::String<TOKEN_CAP>,
    last_at: Timestamp,
}

impl ChannelState {
    fn suppresses(&self, value: &str, now: Timestamp, cooldown: TimeDelta) -> bool {
        if self.last_value.as_str() != value {
            return false;
        }
        self.last_at
            .checked_add_signed(cooldown)
            .is_some_and(|until| now < until)
    }
}

/// Debounce state for one lane.
#[derive(Debug, Clone)]
pub struct DebounceGate {
    cooldown: TimeDelta,
    card: Option<ChannelState>,
    plate: Option<ChannelState>,
}

impl DebounceGate {
    pub fn new(cooldown: TimeDelta) -> Self {
        Self {
            cooldown,
            card: None,
            plate: None,
        }
    }

    pub fn cooldown(&self) -> TimeDelta {
        self.cooldown
    }

    /// Decide whether this occurrence of `value` should be processed.
    ///
    /// Returns `false` when it repeats the last admitted value of `kind`
    /// inside the cooldown window.
    pub fn admit_signal(&mut self, kind: SignalKind, value: &str, now: Timestamp) -> bool {
        let cooldown = self.cooldown;
        let slot = match kind {
            SignalKind::Card => &mut self.card,
            SignalKind::Plate => &mut self.plate,
        };

        if let Some(prev) = slot.as_ref() {
            if prev.suppresses(value, now, cooldown) {
                debug!("Debounce: {:?} '{}' suppressed", kind, value);
                return false;
            }
        }

        let mut last_value = heapless::String::new();
        if last_value.push_str(value).is_err() {
            // Values longer than any token cannot repeat a stored one.
            *slot = None;
            return true;
        }
        *slot = Some(ChannelState {
            last_value,
            last_at: now,
        });
        true
    }

    /// Forget every channel (e.g. after a manual override).
    pub fn reset(&mut self) {
        self.card = None;
        self.plate = None;
    }
}
