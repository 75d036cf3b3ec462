//! Effect dispatch — where engine effects meet the output adapters.
//!
//! - [`InlineEffects`] applies effects on the calling thread (tests, replay)
//! - [`worker::EffectDispatcher`] hands them to a background thread

pub mod channels;
pub mod worker;

use log::{info, warn};

use crate::app::events::Effect;
use crate::app::ports::{EffectSink, ImageStorePort, PresentationPort};

pub use worker::EffectDispatcher;

/// Counters reported when a dispatcher shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub presented: u64,
    pub persisted: u64,
    pub store_failures: u64,
    /// Effects discarded because the channel was full.
    pub dropped: u64,
}

/// Applies each effect immediately.
pub struct InlineEffects<P, S> {
    presenter: P,
    store: S,
    stats: WorkerStats,
}

impl<P: PresentationPort, S: ImageStorePort> InlineEffects<P, S> {
    pub fn new(presenter: P, store: S) -> Self {
        Self {
            presenter,
            store,
            stats: WorkerStats::default(),
        }
    }

    pub fn stats(&self) -> WorkerStats {
        self.stats
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<P: PresentationPort, S: ImageStorePort> EffectSink for InlineEffects<P, S> {
    fn dispatch(&mut self, effect: Effect) {
        match effect {
            Effect::Present(event) => {
                self.presenter.present(&event);
                self.stats.presented += 1;
            }
            Effect::Persist(shot) => match self.store.store(&shot) {
                Ok(path) => {
                    info!("Evidence saved: {}", path.display());
                    self.stats.persisted += 1;
                }
                Err(e) => {
                    // The decision already stands; only the evidence is lost.
                    warn!("Evidence for plate='{}' not saved: {}", shot.plate, e);
                    self.stats.store_failures += 1;
                }
            },
        }
    }
}
