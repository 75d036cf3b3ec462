//! Tick pacing for the reconciliation loop.
//!
//! The loop does bounded work per tick and then sleeps away the rest of
//! the period.  A tick that runs past its deadline is an *overrun*: the
//! next tick starts immediately and the schedule re-anchors on "now", so
//! a slow tick never causes a burst of catch-up ticks.
//!
//! ```text
//!  deadline ─┬──────── period ────────┬──────── period ────────┬──
//!            │ work ▓▓▓▓  sleep ░░░░░ │ work ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓│▓▓ (overrun)
//! ```

use std::time::{Duration, Instant};

use log::warn;

/// Fixed-period scheduler for the tick loop.
#[derive(Debug)]
pub struct TickPacer {
    period: Duration,
    next_deadline: Instant,
    ticks: u64,
    overruns: u64,
}

impl TickPacer {
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next_deadline: start + period,
            ticks: 0,
            overruns: 0,
        }
    }

    /// Account for a finished tick at `now` and return how long to sleep
    /// before the next one.
    pub fn pace(&mut self, now: Instant) -> Duration {
        self.ticks += 1;
        if now > self.next_deadline {
            let late = now - self.next_deadline;
            self.overruns += 1;
            warn!(
                "Tick {} overran its {}ms period by {}ms",
                self.ticks,
                self.period.as_millis(),
                late.as_millis()
            );
            self.next_deadline = now + self.period;
            return Duration::ZERO;
        }
        let sleep = self.next_deadline - now;
        self.next_deadline += self.period;
        sleep
    }

    /// Block the calling thread until the next tick is due.
    pub fn wait(&mut self) {
        let sleep = self.pace(Instant::now());
        if !sleep.is_zero() {
            std::thread::sleep(sleep);
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
