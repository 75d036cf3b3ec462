//! Status-file presentation adapter.
//!
//! Rewrites a JSON document with the session table whenever the registry
//! changes, so an external dashboard can render it.  The file is written
//! to a sibling temp file first and renamed into place, so readers never
//! observe a half-written document.
//!
//! ```json
//! { "updated_at": "2024-01-15 08:00:00", "capacity": 10, "free": 9,
//!   "occupied": 1, "lanes": { "entry": "51A-12345", "exit": "" },
//!   "rows": [ { "card": "C1", "plate": "51A-12345", ... } ] }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;

use crate::app::events::GateEvent;
use crate::app::ports::PresentationPort;
use crate::model::{Lane, PlateText, Timestamp, display_time};
use crate::registry::{RegistrySnapshot, TableRow};

#[derive(Debug, Default, Serialize)]
struct LanePlates {
    entry: PlateText,
    exit: PlateText,
}

#[derive(Serialize)]
struct StatusDocument<'a> {
    updated_at: String,
    capacity: usize,
    free: usize,
    occupied: usize,
    lanes: &'a LanePlates,
    rows: Vec<TableRow>,
}

/// [`PresentationPort`] that mirrors the session table into a JSON file.
#[derive(Debug)]
pub struct StatusFilePresenter {
    path: PathBuf,
    lanes: LanePlates,
    writes: u64,
}

impl StatusFilePresenter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lanes: LanePlates::default(),
            writes: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Documents written so far.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn write(&mut self, snapshot: &RegistrySnapshot, at: Option<Timestamp>) -> io::Result<()> {
        let doc = StatusDocument {
            updated_at: at.as_ref().map(display_time).unwrap_or_default(),
            capacity: snapshot.capacity,
            free: snapshot.free,
            occupied: snapshot.occupied,
            lanes: &self.lanes,
            rows: snapshot.rows(),
        };
        let json = serde_json::to_vec_pretty(&doc).map_err(io::Error::other)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        self.writes += 1;
        debug!("Status: wrote {}", self.path.display());
        Ok(())
    }
}

impl PresentationPort for StatusFilePresenter {
    fn present(&mut self, event: &GateEvent) {
        match event {
            GateEvent::LaneFrame { lane, plate, .. } => {
                let slot = match lane {
                    Lane::Entry => &mut self.lanes.entry,
                    Lane::Exit => &mut self.lanes.exit,
                };
                slot.clone_from(plate);
            }
            GateEvent::Table(snapshot) => {
                // Newest registry change; the snapshot carries no clock.
                let latest = snapshot
                    .departures
                    .first()
                    .map(|d| d.exit_time)
                    .into_iter()
                    .chain(snapshot.sessions.iter().map(|s| s.entry_time))
                    .max();
                if let Err(e) = self.write(snapshot, latest) {
                    warn!("Status: cannot write {}: {}", self.path.display(), e);
                }
            }
            _ => {}
        }
    }
}
