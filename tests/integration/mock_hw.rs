//! Mock hardware adapters for integration tests.
//!
//! Records every actuator call and every effect so tests can assert on
//! the full history without touching real cameras or serial devices.
//! Each tick pops one scripted step per lane.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, TimeDelta};
use image::RgbImage;

use gatekeeper::app::events::{Effect, GateEvent};
use gatekeeper::app::ports::{
    ActuatorPort, EffectSink, GateHardware, ImageStorePort, LanePoller, PresentationPort,
    RecognitionPort, StoreError,
};
use gatekeeper::evidence::EvidenceShot;
use gatekeeper::model::{CardToken, Frame, Lane, PlateText, Timestamp};
use gatekeeper::serial::transport::Transport;

// ── Time helpers ──────────────────────────────────────────────

pub fn t0() -> Timestamp {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

pub fn at_ms(ms: i64) -> Timestamp {
    t0() + TimeDelta::milliseconds(ms)
}

// ── Scripted lane ─────────────────────────────────────────────

/// What a lane's devices report on one tick.
#[derive(Debug, Clone, Default)]
pub struct Step {
    /// `None` = camera not ready; `Some("")` = frame with no readable plate.
    pub plate: Option<&'static str>,
    pub card: Option<&'static str>,
}

impl Step {
    pub fn idle() -> Self {
        Self {
            plate: Some(""),
            card: None,
        }
    }

    pub fn plate(plate: &'static str) -> Self {
        Self {
            plate: Some(plate),
            card: None,
        }
    }

    pub fn swipe(plate: &'static str, card: &'static str) -> Self {
        Self {
            plate: Some(plate),
            card: Some(card),
        }
    }

    pub fn no_camera(card: &'static str) -> Self {
        Self {
            plate: None,
            card: Some(card),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScriptedLane {
    steps: VecDeque<Step>,
    pending_card: Option<&'static str>,
}

impl ScriptedLane {
    pub fn push(&mut self, step: Step) {
        self.steps.push_back(step);
    }
}

impl LanePoller for ScriptedLane {
    fn poll_frame(&mut self) -> Option<Frame> {
        let step = self.steps.pop_front().unwrap_or_else(Step::idle);
        self.pending_card = step.card;
        // The plate text rides in the frame's source path.
        step.plate
            .map(|p| Frame::new(RgbImage::new(4, 4)).with_source(PathBuf::from(p)))
    }

    fn poll_card_token(&mut self) -> Option<CardToken> {
        self.pending_card.take().and_then(CardToken::parse)
    }
}

// ── MockGate ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockGate {
    pub entry: ScriptedLane,
    pub exit: ScriptedLane,
    pub opened: Vec<Lane>,
}

#[allow(dead_code)]
impl MockGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&mut self, lane: Lane, step: Step) -> &mut Self {
        self.poller(lane).push(step);
        self
    }
}

impl ActuatorPort for MockGate {
    fn open(&mut self, lane: Lane) {
        self.opened.push(lane);
    }
}

impl GateHardware for MockGate {
    type Poller = ScriptedLane;

    fn poller(&mut self, lane: Lane) -> &mut ScriptedLane {
        match lane {
            Lane::Entry => &mut self.entry,
            Lane::Exit => &mut self.exit,
        }
    }
}

// ── Recognizer ────────────────────────────────────────────────

/// Reads the plate back out of the frame's source path.
pub struct TagRecognizer;

impl RecognitionPort for TagRecognizer {
    fn recognize(&mut self, frame: &Frame) -> Option<PlateText> {
        let plate = PlateText::new(frame.source()?.to_str()?);
        (!plate.is_empty()).then_some(plate)
    }
}

// ── Effect recording ──────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub effects: Vec<Effect>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> impl Iterator<Item = &GateEvent> {
        self.effects.iter().filter_map(|e| match e {
            Effect::Present(ev) => Some(ev),
            Effect::Persist(_) => None,
        })
    }

    pub fn persisted(&self) -> Vec<&EvidenceShot> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Persist(shot) => Some(shot),
                Effect::Present(_) => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

impl EffectSink for RecordingSink {
    fn dispatch(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}

/// Presenter that shares its log with the test (it moves to a worker thread).
#[derive(Debug, Clone, Default)]
pub struct SharedPresenter {
    pub events: Arc<Mutex<Vec<GateEvent>>>,
}

impl PresentationPort for SharedPresenter {
    fn present(&mut self, event: &GateEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Image store that remembers file stems, or fails on demand.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub stems: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl ImageStorePort for MemoryStore {
    fn store(&mut self, shot: &EvidenceShot) -> Result<PathBuf, StoreError> {
        if self.fail {
            return Err(StoreError::EncodeFailed("disk full".into()));
        }
        let stem = shot.file_stem();
        self.stems.lock().unwrap().push(stem.clone());
        Ok(PathBuf::from(format!("{stem}.jpg")))
    }
}

// ── Memory transport ──────────────────────────────────────────

/// In-memory byte channel: tests queue inbound bytes and inspect writes.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    pub inbound: VecDeque<Vec<u8>>,
    pub written: Vec<u8>,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MemoryTransport {
    pub fn with_reads(reads: &[&[u8]]) -> Self {
        Self {
            inbound: reads.iter().map(|r| r.to_vec()).collect(),
            ..Self::default()
        }
    }
}

impl Transport for MemoryTransport {
    type Error = &'static str;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, &'static str> {
        let Some(mut chunk) = self.inbound.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.inbound.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, &'static str> {
        if self.fail_writes {
            return Err("device unplugged");
        }
        self.written.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), &'static str> {
        Ok(())
    }

    fn available(&self) -> bool {
        !self.inbound.is_empty()
    }
}
