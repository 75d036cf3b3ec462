//! Evidence images for admissions and releases.
//!
//! The file stem is `{plate}_{entry|exit}_{timestamp}` with the
//! timestamp in display format and every `:` replaced by `-` so the name
//! is valid on every filesystem.

use crate::model::{Frame, Lane, PlateText, Timestamp, display_time};

/// Stem used when no plate was read.
const UNKNOWN_PLATE: &str = "UNKNOWN";

/// A frame tagged with the decision it documents.
#[derive(Debug, Clone)]
pub struct EvidenceShot {
    pub frame: Frame,
    pub plate: PlateText,
    pub lane: Lane,
    pub at: Timestamp,
}

impl EvidenceShot {
    /// File name without extension.
    pub fn file_stem(&self) -> String {
        let plate = if self.plate.is_empty() {
            UNKNOWN_PLATE.to_string()
        } else {
            self.plate
                .as_str()
                .chars()
                .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
                .collect()
        };
        let stamp = display_time(&self.at).replace(':', "-");
        format!("{}_{}_{}", plate, self.lane.label(), stamp)
    }
}
