//! Domain value types shared by every layer.
//!
//! Plates and card tokens are short, bounded strings, so both are backed
//! by `heapless::String` and never allocate.  A [`Frame`] wraps a decoded
//! RGB image behind an `Arc` so that the same pixels can travel from the
//! tick loop to the effect worker without a copy.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Byte capacity of a [`PlateText`].
pub const PLATE_CAP: usize = 16;

/// Byte capacity of a [`CardToken`].
pub const TOKEN_CAP: usize = 32;

/// Wall-clock time (local, naive) used for sessions and file names.
pub type Timestamp = NaiveDateTime;

/// Format used for every human-facing timestamp.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a timestamp in [`DISPLAY_FORMAT`].
pub fn display_time(ts: &Timestamp) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}

// ───────────────────────────────────────────────────────────────
// Lane
// ───────────────────────────────────────────────────────────────

/// One physical gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Entry,
    Exit,
}

impl Lane {
    /// Both lanes in service order.
    pub const ALL: [Lane; 2] = [Lane::Entry, Lane::Exit];

    /// Byte the lane's gate controller interprets as "open".
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Entry => b'A',
            Self::Exit => b'B',
        }
    }

    /// Lower-case label used in file names and log lines.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ───────────────────────────────────────────────────────────────
// PlateText
// ───────────────────────────────────────────────────────────────

/// Recognized plate characters.  Empty means "nothing read this tick".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PlateText(heapless::String<PLATE_CAP>);

impl PlateText {
    /// Trim `raw` and keep as many leading chars as fit.
    pub fn new(raw: &str) -> Self {
        let mut text = heapless::String::new();
        for ch in raw.trim().chars() {
            if text.push(ch).is_err() {
                break;
            }
        }
        Self(text)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for PlateText {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for PlateText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ───────────────────────────────────────────────────────────────
// CardToken
// ───────────────────────────────────────────────────────────────

/// Opaque RFID card identifier.  Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CardToken(heapless::String<TOKEN_CAP>);

impl CardToken {
    /// Parse a raw serial line.  Returns `None` for blank input or a
    /// token longer than [`TOKEN_CAP`] bytes; truncating would merge
    /// distinct cards.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let mut text = heapless::String::new();
        text.push_str(trimmed).ok()?;
        Some(Self(text))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CardToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ───────────────────────────────────────────────────────────────
// Session / Departure
// ───────────────────────────────────────────────────────────────

/// One vehicle currently parked.  Immutable once admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub plate: PlateText,
    pub card: CardToken,
    pub entry_time: Timestamp,
}

/// A session that has been released through the exit gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Departure {
    pub plate: PlateText,
    pub card: CardToken,
    pub entry_time: Timestamp,
    pub exit_time: Timestamp,
}

impl Departure {
    pub fn new(session: Session, exit_time: Timestamp) -> Self {
        Self {
            plate: session.plate,
            card: session.card,
            entry_time: session.entry_time,
            exit_time,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Frame
// ───────────────────────────────────────────────────────────────

/// A captured camera frame.  Cheap to clone.
#[derive(Debug, Clone)]
pub struct Frame {
    image: Arc<RgbImage>,
    source: Option<PathBuf>,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image: Arc::new(image),
            source: None,
        }
    }

    /// Attach the file the frame was decoded from (replay cameras).
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}
