//! Lane hardware adapter.
//!
//! Implements both [`LanePoller`] and [`ActuatorPort`] by combining a
//! camera and the lane's serial link.  Either device may be absent: a
//! lane without a camera never yields frames, a lane on a
//! [`NullTransport`](crate::serial::transport::NullTransport) never
//! yields swipes and swallows open commands.
//!
//! ## Device map
//!
//! | Lane  | Camera                | Serial            | Open opcode |
//! |-------|-----------------------|-------------------|-------------|
//! | Entry | `entry.camera_dir`    | `entry.serial_path` | `A`       |
//! | Exit  | `exit.camera_dir`     | `exit.serial_path`  | `B`       |

use log::info;

use crate::app::ports::{ActuatorPort, FrameSource, GateHardware, LanePoller};
use crate::model::{CardToken, Frame, Lane};
use crate::serial::SerialLink;
use crate::serial::transport::Transport;

/// One lane's devices.
pub struct LaneRig<C, T> {
    camera: Option<C>,
    link: SerialLink<T>,
}

impl<C: FrameSource, T: Transport> LaneRig<C, T> {
    pub fn new(camera: Option<C>, transport: T) -> Self {
        Self {
            camera,
            link: SerialLink::new(transport),
        }
    }

    pub fn link(&self) -> &SerialLink<T> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut SerialLink<T> {
        &mut self.link
    }
}

impl<C: FrameSource, T: Transport> LanePoller for LaneRig<C, T> {
    fn poll_frame(&mut self) -> Option<Frame> {
        self.camera.as_mut().and_then(|camera| camera.grab())
    }

    fn poll_card_token(&mut self) -> Option<CardToken> {
        self.link.poll_token()
    }
}

/// Both lanes of the facility.
pub struct SerialGate<C, T> {
    entry: LaneRig<C, T>,
    exit: LaneRig<C, T>,
}

impl<C: FrameSource, T: Transport> SerialGate<C, T> {
    pub fn new(entry: LaneRig<C, T>, exit: LaneRig<C, T>) -> Self {
        Self { entry, exit }
    }

    pub fn lane(&self, lane: Lane) -> &LaneRig<C, T> {
        match lane {
            Lane::Entry => &self.entry,
            Lane::Exit => &self.exit,
        }
    }
}

impl<C: FrameSource, T: Transport> ActuatorPort for SerialGate<C, T> {
    fn open(&mut self, lane: Lane) {
        info!("Gate: open {} (opcode '{}')", lane, lane.opcode() as char);
        self.poller(lane).link.send_opcode(lane);
    }
}

impl<C: FrameSource, T: Transport> GateHardware for SerialGate<C, T> {
    type Poller = LaneRig<C, T>;

    fn poller(&mut self, lane: Lane) -> &mut LaneRig<C, T> {
        match lane {
            Lane::Entry => &mut self.entry,
            Lane::Exit => &mut self.exit,
        }
    }
}
