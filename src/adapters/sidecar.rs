//! Sidecar-file recognizer.
//!
//! Reads the plate for `frame_0001.jpg` from `frame_0001.plate` next to
//! it.  Pairs with [`ImageDirCamera`](super::camera::ImageDirCamera) to
//! replay recorded traffic with known plates; a missing sidecar means
//! nothing was readable in that frame.

use std::fs;

use log::trace;

use crate::app::ports::RecognitionPort;
use crate::model::{Frame, PlateText};

/// Extension of the plate text file.
pub const SIDECAR_EXTENSION: &str = "plate";

#[derive(Debug, Default)]
pub struct SidecarRecognizer;

impl SidecarRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl RecognitionPort for SidecarRecognizer {
    fn recognize(&mut self, frame: &Frame) -> Option<PlateText> {
        let sidecar = frame.source()?.with_extension(SIDECAR_EXTENSION);
        match fs::read_to_string(&sidecar) {
            Ok(text) => {
                let plate = PlateText::new(&text);
                (!plate.is_empty()).then_some(plate)
            }
            Err(e) => {
                trace!("Recognizer: no plate at {}: {}", sidecar.display(), e);
                None
            }
        }
    }
}
