//! Integration tests for the serial link and the lane hardware adapter.

use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use gatekeeper::adapters::hardware::{LaneRig, SerialGate};
use gatekeeper::app::ports::{ActuatorPort, FrameSource, GateHardware, LanePoller};
use gatekeeper::model::{CardToken, Frame, Lane};
use gatekeeper::serial::SerialLink;
use gatekeeper::serial::transport::{NullTransport, ThreadedSerial, Transport};

use super::mock_hw::MemoryTransport;

fn token(s: &str) -> Option<CardToken> {
    CardToken::parse(s)
}

// ── SerialLink ───────────────────────────────────────────────

#[test]
fn token_split_across_reads_is_reassembled() {
    let mut link = SerialLink::new(MemoryTransport::with_reads(&[b"04A1", b"B2\r\n"]));
    assert_eq!(link.poll_token(), token("04A1B2"));
    assert_eq!(link.poll_token(), None);
}

#[test]
fn token_split_across_polls_waits_for_terminator() {
    let mut link = SerialLink::new(MemoryTransport::with_reads(&[b"04A1"]));
    assert_eq!(link.poll_token(), None);
}

#[test]
fn newest_swipe_of_a_poll_wins() {
    let mut link = SerialLink::new(MemoryTransport::with_reads(&[b"C1\n", b"C2\n", b"C3\n"]));
    assert_eq!(link.poll_token(), token("C3"));
}

#[test]
fn open_writes_lane_opcode() {
    let mut link = SerialLink::new(MemoryTransport::default());
    link.send_opcode(Lane::Entry);
    link.send_opcode(Lane::Exit);
    assert_eq!(link.transport().written, b"AB");
}

#[test]
fn write_failure_is_swallowed() {
    let mut link = SerialLink::new(MemoryTransport {
        fail_writes: true,
        ..MemoryTransport::default()
    });
    link.send_opcode(Lane::Exit);
    assert!(link.transport().written.is_empty());
}

// ── ThreadedSerial ───────────────────────────────────────────

#[derive(Clone, Default)]
struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn threaded_serial_delivers_reader_bytes() {
    let input = Cursor::new(b"C1\r\nC2\r\n".to_vec());
    let writer = SharedWriter::default();
    let serial = ThreadedSerial::spawn(input, writer.clone()).unwrap();
    let mut link = SerialLink::new(serial);

    // The reader thread runs concurrently; poll until both lines landed.
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen = None;
    while Instant::now() < deadline {
        if let Some(t) = link.poll_token() {
            seen = Some(t);
            if seen == token("C2") {
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(seen, token("C2"));

    link.send_opcode(Lane::Exit);
    assert_eq!(*writer.0.lock().unwrap(), b"B");
}

#[test]
fn threaded_serial_reports_closed_at_eof() {
    let serial = ThreadedSerial::spawn(io::empty(), io::sink()).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while !serial.is_closed() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(serial.is_closed());
    assert!(!serial.available());
}

#[test]
fn absent_device_behaves_like_null_transport() {
    let mut none: Option<NullTransport> = None;
    let mut buf = [0u8; 8];
    assert_eq!(none.read(&mut buf), Ok(0));
    assert_eq!(none.write(b"A"), Ok(1));
    assert!(!none.available());
}

// ── SerialGate ───────────────────────────────────────────────

struct OneFrame(Option<Frame>);

impl FrameSource for OneFrame {
    fn grab(&mut self) -> Option<Frame> {
        self.0.take()
    }
}

#[test]
fn gate_routes_opcodes_to_the_lane_link() {
    let entry = LaneRig::new(None::<OneFrame>, MemoryTransport::default());
    let exit = LaneRig::new(None, MemoryTransport::with_reads(&[b"C9\n"]));
    let mut gate = SerialGate::new(entry, exit);

    gate.open(Lane::Exit);
    assert!(gate.lane(Lane::Entry).link().transport().written.is_empty());
    assert_eq!(gate.lane(Lane::Exit).link().transport().written, b"B");

    assert_eq!(gate.poller(Lane::Exit).poll_card_token(), token("C9"));
    assert_eq!(gate.poller(Lane::Entry).poll_card_token(), None);
    assert!(gate.poller(Lane::Entry).poll_frame().is_none());
}

#[test]
fn lane_rig_forwards_camera_frames() {
    let frame = Frame::new(image::RgbImage::new(3, 2));
    let mut rig = LaneRig::new(Some(OneFrame(Some(frame))), NullTransport);
    assert_eq!(rig.poll_frame().map(|f| f.dimensions()), Some((3, 2)));
    assert!(rig.poll_frame().is_none());
}
