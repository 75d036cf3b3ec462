//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `camera`       | FrameSource        | Directory of still frames   |
//! | `config_file`  | ConfigPort         | TOML file                   |
//! | `console`      | (GateCommand)      | stdin operator commands     |
//! | `hardware`     | LanePoller         | Camera + serial link        |
//! |                | ActuatorPort       | Gate controller opcodes     |
//! |                | GateHardware       |                             |
//! | `image_store`  | ImageStorePort     | JPEG files on disk          |
//! | `log_sink`     | PresentationPort   | `log` facade                |
//! | `sidecar`      | RecognitionPort    | `.plate` text files         |
//! | `status_file`  | PresentationPort   | JSON status document        |
//! | `time`         | ClockPort          | Local wall clock            |

pub mod camera;
pub mod config_file;
pub mod console;
pub mod hardware;
pub mod image_store;
pub mod log_sink;
pub mod sidecar;
pub mod status_file;
pub mod time;
