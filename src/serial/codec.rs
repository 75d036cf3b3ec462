//! Newline-delimited card token codec.
//!
//! Wire format (gate controller → host):
//! ```text
//! ┌──────────────────────────┬────────────┐
//! │ token text (1..=32 B)    │ \n or \r\n │
//! └──────────────────────────┴────────────┘
//! ```
//!
//! The decoder accumulates incoming bytes and yields complete tokens.
//! A single `Transport::read` may return part of a line or several lines
//! at once; only the newest valid token of a feed is returned, since the
//! tick consumes at most one swipe per lane.
//!
//! Lines longer than [`MAX_LINE`] bytes are discarded up to the next
//! newline, as are blank lines and lines that are not UTF-8.

use log::{debug, trace};

use crate::model::CardToken;

/// Maximum raw line length, terminator excluded (protects the buffer).
pub const MAX_LINE: usize = 64;

/// Host → controller command: the single opcode byte, no terminator.
pub fn encode_opcode(opcode: u8, out_buf: &mut [u8]) -> Option<usize> {
    let slot = out_buf.first_mut()?;
    *slot = opcode;
    Some(1)
}

/// Decoder state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    /// Accumulating a line.
    Collecting,
    /// Current line overflowed; skip to the next `\n`.
    Discarding,
}

/// Streaming line decoder.
#[derive(Debug)]
pub struct LineDecoder {
    state: DecoderState,
    line_buf: heapless::Vec<u8, MAX_LINE>,
    overflows: u64,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::Collecting,
            line_buf: heapless::Vec::new(),
            overflows: 0,
        }
    }

    /// Feed bytes into the decoder.
    ///
    /// Returns the newest complete token in `data`, if any.  A partial
    /// trailing line stays buffered for the next call.
    pub fn feed(&mut self, data: &[u8]) -> Option<CardToken> {
        let mut newest = None;

        for &byte in data {
            match self.state {
                DecoderState::Collecting => {
                    if byte == b'\n' {
                        if let Some(token) = self.take_line() {
                            newest = Some(token);
                        }
                    } else if self.line_buf.push(byte).is_err() {
                        self.overflows += 1;
                        debug!("Serial: line exceeds {} bytes, discarding", MAX_LINE);
                        self.line_buf.clear();
                        self.state = DecoderState::Discarding;
                    }
                }
                DecoderState::Discarding => {
                    if byte == b'\n' {
                        self.state = DecoderState::Collecting;
                    }
                }
            }
        }

        newest
    }

    /// Number of lines dropped for being too long.
    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    /// Reset decoder state (e.g. after the device reconnects).
    pub fn reset(&mut self) {
        self.state = DecoderState::Collecting;
        self.line_buf.clear();
    }

    fn take_line(&mut self) -> Option<CardToken> {
        let token = match core::str::from_utf8(&self.line_buf) {
            // `parse` trims, which also strips the '\r' of a CRLF.
            Ok(text) => CardToken::parse(text),
            Err(_) => {
                trace!("Serial: dropping non-UTF-8 line");
                None
            }
        };
        self.line_buf.clear();
        token
    }
}
