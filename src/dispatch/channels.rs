//! Effect channel between the tick loop and the effect worker.
//!
//! Uses an `embassy-sync` bounded channel: the tick loop only ever
//! `try_send`s, so a slow display or disk can never stall a tick.
//!
//! ```text
//! ┌──────────────┐  Envelope  ┌──────────────┐
//! │  Tick loop   │──────────▶│ Effect worker │
//! │  (sync)      │            │ (block_on)    │
//! └──────────────┘            └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::app::events::Effect;

/// Channel depth for effects.  One busy tick emits about ten.
pub const EFFECT_DEPTH: usize = 64;

/// Message on the effect channel.
#[derive(Debug)]
pub enum Envelope {
    Effect(Effect),
    /// Drain stops here; the worker exits after handling earlier messages.
    Shutdown,
}

pub type EffectChannel = Channel<CriticalSectionRawMutex, Envelope, EFFECT_DEPTH>;
