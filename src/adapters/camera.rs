//! Directory-replay camera.
//!
//! Stands in for a live capture device: every image file in a directory
//! is one frame, served in lexicographic file-name order.  A frame that
//! fails to decode is skipped for that tick (the device is "not ready").

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::app::ports::FrameSource;
use crate::model::Frame;

const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// [`FrameSource`] that replays a directory of still images.
#[derive(Debug)]
pub struct ImageDirCamera {
    frames: Vec<PathBuf>,
    cursor: usize,
    loop_frames: bool,
}

impl ImageDirCamera {
    /// Index `dir`.  Fails only if the directory cannot be listed.
    pub fn open(dir: &Path, loop_frames: bool) -> io::Result<Self> {
        let mut frames = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_frame_file(&path) {
                frames.push(path);
            }
        }
        frames.sort();

        if frames.is_empty() {
            warn!("Camera: no frames in {}", dir.display());
        } else {
            info!("Camera: {} frames from {}", frames.len(), dir.display());
        }
        Ok(Self {
            frames,
            cursor: 0,
            loop_frames,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// All frames served and not looping.
    pub fn exhausted(&self) -> bool {
        !self.loop_frames && self.cursor >= self.frames.len()
    }
}

impl FrameSource for ImageDirCamera {
    fn grab(&mut self) -> Option<Frame> {
        if self.cursor >= self.frames.len() {
            if !self.loop_frames || self.frames.is_empty() {
                return None;
            }
            self.cursor = 0;
        }
        let path = &self.frames[self.cursor];
        self.cursor += 1;

        match image::open(path) {
            Ok(img) => Some(Frame::new(img.to_rgb8()).with_source(path.clone())),
            Err(e) => {
                warn!("Camera: cannot decode {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn is_frame_file(path: &Path) -> bool {
    let matched = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            FRAME_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        });
    if !matched {
        debug!("Camera: ignoring {}", path.display());
    }
    matched
}
