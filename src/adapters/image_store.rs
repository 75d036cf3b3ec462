//! Disk image store.
//!
//! Implements [`ImageStorePort`] by encoding evidence frames as JPEG into
//! one flat directory, named by [`EvidenceShot::file_stem`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat};
use log::info;

use crate::app::ports::{ImageStorePort, StoreError};
use crate::evidence::EvidenceShot;

#[derive(Debug)]
pub struct DiskImageStore {
    dir: PathBuf,
}

impl DiskImageStore {
    /// Use `dir`, creating it (and parents) if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!("ImageStore: writing evidence to {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, shot: &EvidenceShot) -> PathBuf {
        self.dir.join(format!("{}.jpg", shot.file_stem()))
    }
}

impl ImageStorePort for DiskImageStore {
    fn store(&mut self, shot: &EvidenceShot) -> Result<PathBuf, StoreError> {
        let path = self.path_for(shot);
        shot.frame
            .image()
            .save_with_format(&path, ImageFormat::Jpeg)
            .map_err(|e| match e {
                ImageError::IoError(io) => StoreError::IoError(io),
                other => StoreError::EncodeFailed(other.to_string()),
            })?;
        Ok(path)
    }
}

/// Store that discards everything (no image directory wanted).
#[derive(Debug, Default)]
pub struct NullImageStore;

impl ImageStorePort for NullImageStore {
    fn store(&mut self, shot: &EvidenceShot) -> Result<PathBuf, StoreError> {
        Ok(PathBuf::from(shot.file_stem()))
    }
}
