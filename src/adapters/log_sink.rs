//! Log-based presentation adapter.
//!
//! Implements [`PresentationPort`] by writing one structured line per
//! gate event to the `log` facade (stderr via `env_logger` in the
//! binary).  The live frame feed is only traced; everything else is the
//! operator's audit trail.

use log::{info, trace, warn};

use crate::app::events::GateEvent;
use crate::app::ports::PresentationPort;
use crate::model::display_time;

/// Adapter that logs every [`GateEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogPresenter;

impl LogPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl PresentationPort for LogPresenter {
    fn present(&mut self, event: &GateEvent) {
        match event {
            GateEvent::Started { capacity } => {
                info!("START | capacity={}", capacity);
            }
            GateEvent::LaneFrame {
                lane,
                frame,
                plate,
                free,
            } => {
                trace!(
                    "FRAME | lane={} | frame={} | plate='{}' | free={}",
                    lane,
                    frame
                        .as_ref()
                        .map(|f| format!("{}x{}", f.dimensions().0, f.dimensions().1))
                        .unwrap_or_else(|| "-".into()),
                    plate,
                    free
                );
            }
            GateEvent::PlateRead { lane, plate } => {
                info!("PLATE | lane={} | plate='{}'", lane, plate);
            }
            GateEvent::Admitted { session, free } => {
                info!(
                    "ADMIT | plate='{}' | card='{}' | entry={} | free={}",
                    session.plate,
                    session.card,
                    display_time(&session.entry_time),
                    free
                );
            }
            GateEvent::Released { departure, free } => {
                info!(
                    "RELEASE | plate='{}' | card='{}' | entry={} | exit={} | free={}",
                    departure.plate,
                    departure.card,
                    display_time(&departure.entry_time),
                    display_time(&departure.exit_time),
                    free
                );
            }
            GateEvent::Rejected {
                lane,
                plate,
                card,
                reason,
            } => {
                warn!(
                    "REJECT | lane={} | plate='{}' | card='{}' | {}",
                    lane, plate, card, reason
                );
            }
            GateEvent::Notice { lane, card, notice } => {
                info!("NOTICE | lane={} | card='{}' | {}", lane, card, notice);
            }
            GateEvent::GateOpened { lane, manual } => {
                info!(
                    "GATE | lane={} | open{}",
                    lane,
                    if *manual { " (manual)" } else { "" }
                );
            }
            GateEvent::Table(snapshot) => {
                info!(
                    "TABLE | occupied={}/{} | free={}",
                    snapshot.occupied, snapshot.capacity, snapshot.free
                );
                for row in snapshot.rows() {
                    info!(
                        "TABLE |   {:<16} {:<32} {} -> {}",
                        row.plate.as_str(),
                        row.card.as_str(),
                        display_time(&row.entry_time),
                        row.exit_time
                            .as_ref()
                            .map(display_time)
                            .unwrap_or_else(|| "-".into())
                    );
                }
            }
            GateEvent::Stopped { ticks } => {
                info!("STOP | ticks={}", ticks);
            }
        }
    }
}
