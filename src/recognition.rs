//! Two-stage plate recognition.
//!
//! Recognition engines are external: one model locates plate regions in
//! a frame, another reads the characters inside a cropped region.  This
//! module composes the two behind [`RecognitionPort`] and owns the one
//! piece of logic that is ours: putting characters back in reading order.
//!
//! ```text
//!   Frame ──▶ PlateLocator ──▶ regions ──▶ crop ──▶ CharReader ──▶ chars
//!                                                                   │
//!                                       sort by (y, x), concatenate ◀┘
//! ```
//!
//! Two-row plates read top row first, each row left to right.  Sorting is
//! on the detected (y, x) corner exactly, with no row tolerance.

use std::cmp::Ordering;

use image::RgbImage;
use log::trace;

use crate::app::ports::RecognitionPort;
use crate::model::{Frame, PlateText};

/// Axis-aligned plate bounding box in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PlateRegion {
    /// Clip the region to a `(width, height)` frame.  `None` if nothing remains.
    pub fn clamp_to(self, (frame_w, frame_h): (u32, u32)) -> Option<Self> {
        if self.x >= frame_w || self.y >= frame_h {
            return None;
        }
        let width = self.width.min(frame_w - self.x);
        let height = self.height.min(frame_h - self.y);
        (width > 0 && height > 0).then_some(Self {
            width,
            height,
            ..self
        })
    }
}

/// One detected glyph, positioned by its top-left corner inside the crop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharDetection {
    pub x: f32,
    pub y: f32,
    pub glyph: char,
}

/// Stage one: find candidate plates.
pub trait PlateLocator {
    fn locate(&mut self, frame: &RgbImage) -> Vec<PlateRegion>;
}

/// Stage two: read glyphs in a cropped plate.
pub trait CharReader {
    fn read_chars(&mut self, plate: &RgbImage) -> Vec<CharDetection>;
}

/// Concatenate glyphs in reading order: vertical first, then horizontal.
pub fn assemble_plate(chars: &mut [CharDetection]) -> PlateText {
    chars.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });
    let text: String = chars.iter().map(|c| c.glyph).collect();
    PlateText::new(&text)
}

/// [`RecognitionPort`] built from a locator and a reader.
pub struct TwoStageRecognizer<L, R> {
    locator: L,
    reader: R,
}

impl<L: PlateLocator, R: CharReader> TwoStageRecognizer<L, R> {
    pub fn new(locator: L, reader: R) -> Self {
        Self { locator, reader }
    }
}

impl<L: PlateLocator, R: CharReader> RecognitionPort for TwoStageRecognizer<L, R> {
    /// When several regions are found the last one wins.
    fn recognize(&mut self, frame: &Frame) -> Option<PlateText> {
        let image = frame.image();
        let mut plate = PlateText::empty();

        for region in self.locator.locate(image) {
            let Some(r) = region.clamp_to(image.dimensions()) else {
                trace!("Recognition: region {:?} outside frame", region);
                continue;
            };
            let crop = image::imageops::crop_imm(image, r.x, r.y, r.width, r.height).to_image();
            let mut chars = self.reader.read_chars(&crop);
            plate = assemble_plate(&mut chars);
        }

        (!plate.is_empty()).then_some(plate)
    }
}
