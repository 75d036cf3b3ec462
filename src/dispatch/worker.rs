//! Background effect worker.
//!
//! Runs in a dedicated thread driven by `futures_lite::future::block_on`:
//! the worker awaits `receive()` on the effect channel and wakes as soon
//! as the tick loop pushes something, so no polling interval is needed.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::Context;
use futures_lite::future::block_on;
use log::{debug, error, warn};

use crate::app::events::Effect;
use crate::app::ports::{EffectSink, ImageStorePort, PresentationPort};

use super::channels::{EffectChannel, Envelope};
use super::{InlineEffects, WorkerStats};

/// Non-blocking [`EffectSink`] backed by a worker thread.
pub struct EffectDispatcher {
    channel: Arc<EffectChannel>,
    handle: Option<JoinHandle<WorkerStats>>,
    dropped: u64,
}

impl EffectDispatcher {
    /// Start the worker.  `presenter` and `store` move to its thread.
    pub fn spawn<P, S>(presenter: P, store: S) -> anyhow::Result<Self>
    where
        P: PresentationPort + Send + 'static,
        S: ImageStorePort + Send + 'static,
    {
        let channel = Arc::new(EffectChannel::new());
        let rx = Arc::clone(&channel);
        let handle = thread::Builder::new()
            .name("effects".into())
            .spawn(move || run_worker(&rx, InlineEffects::new(presenter, store)))
            .context("failed to spawn effect worker")?;

        Ok(Self {
            channel,
            handle: Some(handle),
            dropped: 0,
        })
    }

    /// Effects discarded so far because the worker fell behind.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Drain pending effects, stop the worker, and return its counters.
    pub fn shutdown(mut self) -> WorkerStats {
        let Some(handle) = self.handle.take() else {
            return WorkerStats::default();
        };
        if !handle.is_finished() {
            block_on(self.channel.send(Envelope::Shutdown));
        }
        match handle.join() {
            Ok(stats) => WorkerStats {
                dropped: self.dropped,
                ..stats
            },
            Err(_) => {
                error!("Effect worker panicked");
                WorkerStats {
                    dropped: self.dropped,
                    ..WorkerStats::default()
                }
            }
        }
    }
}

impl EffectSink for EffectDispatcher {
    fn dispatch(&mut self, effect: Effect) {
        if self.channel.try_send(Envelope::Effect(effect)).is_err() {
            self.dropped += 1;
            warn!("Effects: channel full, dropping effect ({} total)", self.dropped);
        }
    }
}

impl Drop for EffectDispatcher {
    fn drop(&mut self) {
        // Not shut down explicitly: ask the worker to stop, but don't wait.
        if self.handle.is_some() {
            let _ = self.channel.try_send(Envelope::Shutdown);
        }
    }
}

fn run_worker<P, S>(channel: &EffectChannel, mut effects: InlineEffects<P, S>) -> WorkerStats
where
    P: PresentationPort,
    S: ImageStorePort,
{
    debug!("Effects: worker started");
    block_on(async {
        loop {
            match channel.receive().await {
                Envelope::Effect(effect) => effects.dispatch(effect),
                Envelope::Shutdown => break,
            }
        }
    });
    let stats = effects.stats();
    debug!("Effects: worker stopped {:?}", stats);
    stats
}
