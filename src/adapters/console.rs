//! Operator console.
//!
//! Reads commands from stdin on a background thread and queues them for
//! the tick loop, which picks them up between ticks.
//!
//! | Line              | Command                         |
//! |-------------------|---------------------------------|
//! | `open entry`      | `GateCommand::ManualOpen(Entry)`|
//! | `open exit`       | `GateCommand::ManualOpen(Exit)` |
//! | `evict <card>`    | `GateCommand::EvictCard(card)`  |

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, warn};

use crate::app::commands::GateCommand;
use crate::model::{CardToken, Lane};

/// Commands buffered between the console thread and the tick loop.
const COMMAND_DEPTH: usize = 8;

type CommandChannel = Channel<CriticalSectionRawMutex, GateCommand, COMMAND_DEPTH>;

/// Parse one console line.
pub fn parse_command(line: &str) -> Result<GateCommand, String> {
    let mut words = line.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("open"), Some(lane), None) => match lane {
            "entry" | "in" => Ok(GateCommand::ManualOpen(Lane::Entry)),
            "exit" | "out" => Ok(GateCommand::ManualOpen(Lane::Exit)),
            other => Err(format!("unknown lane '{}'", other)),
        },
        (Some("evict"), Some(card), None) => CardToken::parse(card)
            .map(GateCommand::EvictCard)
            .ok_or_else(|| format!("invalid card '{}'", card)),
        _ => Err(format!("unrecognized command '{}'", line.trim())),
    }
}

/// Handle to the console thread's command queue.
pub struct OperatorConsole {
    rx: Arc<CommandChannel>,
}

impl OperatorConsole {
    /// Start reading stdin.  The thread ends at EOF.
    pub fn spawn() -> io::Result<Self> {
        let rx = Arc::new(CommandChannel::new());
        let tx = Arc::clone(&rx);
        thread::Builder::new()
            .name("console".into())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match parse_command(&line) {
                        Ok(cmd) => {
                            if tx.try_send(cmd).is_err() {
                                warn!("Console: command queue full, ignoring '{}'", line);
                            }
                        }
                        Err(msg) => warn!("Console: {}", msg),
                    }
                }
                debug!("Console: stdin closed");
            })?;
        Ok(Self { rx })
    }

    /// Next queued command, if any.  Never blocks.
    pub fn try_command(&self) -> Option<GateCommand> {
        self.rx.try_receive().ok()
    }
}
