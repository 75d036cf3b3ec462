//! Gatekeeper — Main Entry Point
//!
//! Hexagonal architecture with a fixed-rate tick loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SerialGate          SidecarRecognizer   SystemClock           │
//! │  (LanePoller×2 +     (RecognitionPort)   (ClockPort)           │
//! │   ActuatorPort)      OperatorConsole     TomlConfigFile        │
//! │                                          (ConfigPort)          │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │          ReconciliationEngine (pure logic)             │    │
//! │  │  Debounce · SessionRegistry                            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  EffectDispatcher ─▶ worker thread ─▶ LogPresenter,            │
//! │                                       StatusFilePresenter,     │
//! │                                       DiskImageStore           │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use gatekeeper::adapters::camera::ImageDirCamera;
use gatekeeper::adapters::config_file::TomlConfigFile;
use gatekeeper::adapters::console::OperatorConsole;
use gatekeeper::adapters::hardware::{LaneRig, SerialGate};
use gatekeeper::adapters::image_store::DiskImageStore;
use gatekeeper::adapters::log_sink::LogPresenter;
use gatekeeper::adapters::sidecar::SidecarRecognizer;
use gatekeeper::adapters::status_file::StatusFilePresenter;
use gatekeeper::adapters::time::SystemClock;
use gatekeeper::app::ports::{ClockPort, ConfigPort};
use gatekeeper::app::service::ReconciliationEngine;
use gatekeeper::config::{LaneDevices, SystemConfig};
use gatekeeper::dispatch::EffectDispatcher;
use gatekeeper::model::Lane;
use gatekeeper::scheduler::TickPacer;
use gatekeeper::serial::transport::ThreadedSerial;

type Lanes = LaneRig<ImageDirCamera, Option<ThreadedSerial>>;

/// Dual-gate parking access controller
#[derive(Parser, Debug)]
#[command(name = "gatekeeper", version, long_about = None)]
struct Args {
    /// TOML configuration file (defaults apply when it does not exist)
    #[arg(short, long, default_value = "gatekeeper.toml")]
    config: PathBuf,

    /// Override the number of parking slots
    #[arg(long)]
    capacity: Option<usize>,

    /// Override the debounce window in milliseconds
    #[arg(long)]
    cooldown_ms: Option<u64>,

    /// Override the evidence image directory
    #[arg(long)]
    image_dir: Option<PathBuf>,

    /// Do not read operator commands from stdin
    #[arg(long, default_value_t = false)]
    no_console: bool,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    info!("Gatekeeper v{} starting", env!("CARGO_PKG_VERSION"));

    // ── Configuration ─────────────────────────────────────────
    let config = load_config(&args)?;
    info!(
        "Config: capacity={} cooldown={}ms tick={}ms verify_exit_card={}",
        config.capacity, config.cooldown_ms, config.tick_interval_ms, config.verify_exit_card
    );

    // ── Devices (any failure here is fatal) ───────────────────
    let mut hw = SerialGate::new(
        open_lane(Lane::Entry, &config.entry)?,
        open_lane(Lane::Exit, &config.exit)?,
    );
    let mut recognizer = SidecarRecognizer::new();
    let clock = SystemClock::new();

    // ── Outputs ───────────────────────────────────────────────
    let store = DiskImageStore::new(&config.image_dir).with_context(|| {
        format!("cannot create image directory {}", config.image_dir.display())
    })?;
    let presenter = (
        LogPresenter::new(),
        config.status_file.clone().map(StatusFilePresenter::new),
    );
    let mut effects = EffectDispatcher::spawn(presenter, store)?;

    let console = if args.no_console {
        None
    } else {
        Some(OperatorConsole::spawn().context("failed to start operator console")?)
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Shutdown signal received...");
        r.store(false, Ordering::SeqCst);
    })
    .context("failed to install signal handler")?;

    // ── Tick loop ─────────────────────────────────────────────
    let mut engine = ReconciliationEngine::new(&config);
    engine.start(&mut effects);

    let mut pacer = TickPacer::new(
        Duration::from_millis(config.tick_interval_ms),
        Instant::now(),
    );
    info!("Running (Press Ctrl+C to stop)...");

    while running.load(Ordering::Relaxed) {
        while let Some(cmd) = console.as_ref().and_then(OperatorConsole::try_command) {
            if let Err(rejected) = engine.handle_command(cmd, clock.now(), &mut hw, &mut effects) {
                debug!("Command not applied: {}", rejected);
            }
        }
        engine.tick(clock.now(), &mut hw, &mut recognizer, &mut effects);
        pacer.wait();
    }

    // ── Shutdown ──────────────────────────────────────────────
    engine.shutdown(&mut effects);
    let stats = effects.shutdown();
    info!(
        "Shutdown complete: {} ticks ({} overruns), {} events, {} images ({} failed), {} dropped",
        engine.tick_count(),
        pacer.overruns(),
        stats.presented,
        stats.persisted,
        stats.store_failures,
        stats.dropped
    );
    Ok(())
}

/// File config with command-line overrides, validated once merged.
fn load_config(args: &Args) -> Result<SystemConfig> {
    let mut config = TomlConfigFile::new(&args.config)
        .load()
        .with_context(|| format!("cannot load {}", args.config.display()))?;

    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    if let Some(cooldown_ms) = args.cooldown_ms {
        config.cooldown_ms = cooldown_ms;
    }
    if let Some(dir) = &args.image_dir {
        config.image_dir = dir.clone();
    }
    config.validate().context("invalid command-line override")?;
    Ok(config)
}

fn open_lane(lane: Lane, devices: &LaneDevices) -> Result<Lanes> {
    let camera = devices
        .camera_dir
        .as_deref()
        .map(|dir| ImageDirCamera::open(dir, devices.loop_frames))
        .transpose()
        .with_context(|| format!("cannot open {} camera", lane))?;
    if camera.is_none() {
        info!("{} lane: no camera configured", lane);
    }

    let serial = devices
        .serial_path
        .as_deref()
        .map(ThreadedSerial::open)
        .transpose()
        .with_context(|| format!("cannot open {} serial device", lane))?;
    if serial.is_none() {
        info!("{} lane: no serial device configured", lane);
    }

    Ok(LaneRig::new(camera, serial))
}
