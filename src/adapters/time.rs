//! Wall-clock adapter.
//!
//! Session times and evidence file names use local time without a zone,
//! as shown to the attendant.

use chrono::Local;

use crate::app::ports::ClockPort;
use crate::model::Timestamp;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> Timestamp {
        Local::now().naive_local()
    }
}
