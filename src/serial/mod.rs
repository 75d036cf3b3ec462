//! Serial link to a lane's gate controller.
//!
//! The controller reports RFID swipes as newline-terminated tokens and
//! accepts a single opcode byte to raise its barrier.
//!
//! - `codec`: line decoder and opcode encoder
//! - `transport`: byte channel abstraction and threaded serial device

pub mod codec;
pub mod transport;

use log::{trace, warn};

use crate::model::{CardToken, Lane};

use codec::LineDecoder;
use transport::Transport;

/// Bytes requested per `Transport::read`.
const READ_BUF_SIZE: usize = 128;

/// Upper bound on reads per poll so a chatty device cannot stall a tick.
const MAX_READS_PER_POLL: usize = 8;

/// Token reader and opcode writer over one transport.
pub struct SerialLink<T> {
    transport: T,
    decoder: LineDecoder,
}

impl<T: Transport> SerialLink<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            decoder: LineDecoder::new(),
        }
    }

    /// Drain what the controller has sent and return the newest token.
    ///
    /// Never blocks.  Transport errors are logged and treated as "no
    /// swipe this tick".
    pub fn poll_token(&mut self) -> Option<CardToken> {
        let mut buf = [0u8; READ_BUF_SIZE];
        let mut newest = None;

        for _ in 0..MAX_READS_PER_POLL {
            let n = match self.transport.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    warn!("Serial: read error: {:?}", e);
                    break;
                }
            };
            if let Some(token) = self.decoder.feed(&buf[..n]) {
                trace!("Serial: token '{}'", token);
                newest = Some(token);
            }
        }

        newest
    }

    /// Send the lane's open opcode.  Fire-and-forget: failures are logged.
    pub fn send_opcode(&mut self, lane: Lane) {
        let mut out = [0u8; 1];
        let Some(len) = codec::encode_opcode(lane.opcode(), &mut out) else {
            return;
        };
        let result = self
            .transport
            .write(&out[..len])
            .and_then(|_| self.transport.flush());
        if let Err(e) = result {
            warn!("Serial: {} gate open command failed: {:?}", lane, e);
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn decoder(&self) -> &LineDecoder {
        &self.decoder
    }
}
