//! Transport abstraction — any byte-oriented channel to a gate controller.
//!
//! Concrete implementations:
//! - [`ThreadedSerial`]: a serial device (or any `Read`/`Write` pair)
//!   whose blocking reads run on a dedicated thread
//! - [`NullTransport`] (or `None`): a lane with no controller attached
//!
//! [`SerialLink`](super::SerialLink) is generic over `Transport`, so tests
//! drive it with in-memory transports.
//!
//! ```text
//!  ┌──────────────┐  Chunk (≤64 B)  ┌──────────────┐
//!  │ Reader thread│───────────────▶│  Tick loop    │
//!  │ (blocking)   │  embassy chan   │  (try_recv)   │
//!  └──────────────┘                 └──────────────┘
//! ```

use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Check if data is available for reading.
    fn available(&self) -> bool;
}

/// A null transport that discards all writes and never reads.
/// Used for a lane with no serial device configured.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn available(&self) -> bool {
        false
    }
}

/// An optional device; `None` behaves like [`NullTransport`].
impl<T: Transport> Transport for Option<T> {
    type Error = T::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, T::Error> {
        match self {
            Some(inner) => inner.read(buf),
            None => Ok(0),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, T::Error> {
        match self {
            Some(inner) => inner.write(data),
            None => Ok(data.len()),
        }
    }

    fn flush(&mut self) -> Result<(), T::Error> {
        match self {
            Some(inner) => inner.flush(),
            None => Ok(()),
        }
    }

    fn available(&self) -> bool {
        self.as_ref().is_some_and(|inner| inner.available())
    }
}

// ───────────────────────────────────────────────────────────────
// Threaded serial
// ───────────────────────────────────────────────────────────────

/// Bytes handed over per channel message.
const CHUNK_SIZE: usize = 64;

/// Chunks buffered between the reader thread and the tick loop.
const CHUNK_DEPTH: usize = 16;

type Chunk = heapless::Vec<u8, CHUNK_SIZE>;
type ChunkChannel = Channel<CriticalSectionRawMutex, Chunk, CHUNK_DEPTH>;

/// Serial transport whose reads never block the caller.
///
/// A background thread performs the blocking reads and forwards chunks
/// through a bounded channel; [`Transport::read`] drains whatever has
/// arrived.  The thread ends on EOF or a read error and is otherwise
/// left to die with the process.
pub struct ThreadedSerial {
    rx: Arc<ChunkChannel>,
    pending: Chunk,
    cursor: usize,
    writer: Box<dyn Write + Send>,
    closed: Arc<AtomicBool>,
}

impl ThreadedSerial {
    /// Open a serial device node for reading and writing.
    ///
    /// Line settings (baud rate, parity) are the device's current ones;
    /// configure them beforehand with the OS tools.
    pub fn open(path: &Path) -> io::Result<Self> {
        let device = OpenOptions::new().read(true).write(true).open(path)?;
        let reader = device.try_clone()?;
        info!("Serial: opened {}", path.display());
        Self::spawn(reader, device)
    }

    /// Wrap an arbitrary reader/writer pair.
    pub fn spawn<R, W>(mut reader: R, writer: W) -> io::Result<Self>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let rx = Arc::new(ChunkChannel::new());
        let closed = Arc::new(AtomicBool::new(false));

        let tx = Arc::clone(&rx);
        let done = Arc::clone(&closed);
        thread::Builder::new()
            .name("serial-rx".into())
            .spawn(move || {
                let mut buf = [0u8; CHUNK_SIZE];
                loop {
                    match reader.read(&mut buf) {
                        Ok(0) => {
                            info!("Serial: reader reached end of stream");
                            break;
                        }
                        Ok(n) => {
                            let mut chunk = Chunk::new();
                            // n <= CHUNK_SIZE by construction.
                            let _ = chunk.extend_from_slice(&buf[..n]);
                            futures_lite::future::block_on(tx.send(chunk));
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            warn!("Serial: read failed: {}", e);
                            break;
                        }
                    }
                }
                done.store(true, Ordering::Release);
            })?;

        Ok(Self {
            rx,
            pending: Chunk::new(),
            cursor: 0,
            writer: Box::new(writer),
            closed,
        })
    }

    /// The reader thread has stopped (EOF or error).
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Transport for ThreadedSerial {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
        let mut written = 0;
        while written < buf.len() {
            if self.cursor == self.pending.len() {
                match self.rx.try_receive() {
                    Ok(chunk) => {
                        self.pending = chunk;
                        self.cursor = 0;
                    }
                    Err(_) => break,
                }
            }
            let n = (self.pending.len() - self.cursor).min(buf.len() - written);
            buf[written..written + n]
                .copy_from_slice(&self.pending[self.cursor..self.cursor + n]);
            self.cursor += n;
            written += n;
        }
        Ok(written)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.writer.write(data)
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        self.writer.flush()
    }

    fn available(&self) -> bool {
        self.cursor < self.pending.len() || !self.rx.is_empty()
    }
}
