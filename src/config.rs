//! System configuration parameters
//!
//! All tunable parameters for the gate controller.
//! Values come from a TOML file (see [`crate::adapters::config_file`]) and
//! may be overridden on the command line.

use std::path::PathBuf;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Devices attached to one lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneDevices {
    /// Directory of frames replayed as this lane's camera feed.
    pub camera_dir: Option<PathBuf>,
    /// Serial device of the lane's gate microcontroller (RFID in, opcodes out).
    pub serial_path: Option<PathBuf>,
    /// Restart the frame directory once exhausted.
    pub loop_frames: bool,
}

impl Default for LaneDevices {
    fn default() -> Self {
        Self {
            camera_dir: None,
            serial_path: None,
            loop_frames: true,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Facility ---
    /// Number of parking slots
    pub capacity: usize,

    // --- Debounce ---
    /// Window in which a repeated card (or plate) is ignored (milliseconds)
    pub cooldown_ms: u64,
    /// Also debounce plate announcements, not only card swipes
    pub debounce_plates: bool,

    // --- Decisions ---
    /// Exit requires the presented card to match the plate's session
    pub verify_exit_card: bool,

    // --- Timing ---
    /// Tick loop period (milliseconds)
    pub tick_interval_ms: u64,

    // --- Outputs ---
    /// Where entry/exit evidence images are written
    pub image_dir: PathBuf,
    /// Optional JSON file rewritten with the session table on every change
    pub status_file: Option<PathBuf>,

    // --- Devices ---
    pub entry: LaneDevices,
    pub exit: LaneDevices,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            cooldown_ms: 5000,
            debounce_plates: false,
            verify_exit_card: false,
            tick_interval_ms: 100, // 10 Hz
            image_dir: PathBuf::from("Parking_Images"),
            status_file: None,
            entry: LaneDevices::default(),
            exit: LaneDevices::default(),
        }
    }
}

impl SystemConfig {
    /// Debounce window as a signed duration.
    pub fn cooldown(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.cooldown_ms.min(i64::MAX as u64) as i64)
    }

    /// Range checks.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ValidationFailed("capacity must be at least 1"));
        }
        if self.cooldown_ms > 600_000 {
            return Err(ConfigError::ValidationFailed(
                "cooldown_ms must not exceed 10 minutes",
            ));
        }
        if self.tick_interval_ms == 0 || self.tick_interval_ms > 10_000 {
            return Err(ConfigError::ValidationFailed(
                "tick_interval_ms must be within 1..=10000",
            ));
        }
        if self.image_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed("image_dir must not be empty"));
        }
        Ok(())
    }
}
