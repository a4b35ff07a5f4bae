//! Run one launch-to-rest capture cycle on the host.
//!
//! Storage goes to a real directory, camera, trigger and power are simulated
//! against a simulated clock, so a two-minute flight finishes in moments.
//!
//! ```bash
//! cargo run --example record -- --mount-point /tmp/sdcard
//! RUST_LOG=launch_cam=debug cargo run --example record -- --mount-point /tmp/sdcard --duration 10
//! cargo run --example record -- --mount-point /tmp/sdcard --launch-mode await-release --release-after 3
//! ```

use std::num::NonZeroU64;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use launch_cam::mjpeg::split_frames;
use launch_cam::platform::host::{
    DropSchedule, FsSessionStore, LogIndicator, SimCamera, SimCameraConfig, SimClock, SimPower,
    SimTrigger,
};
use launch_cam::{
    CaptureProfile, CaptureStateMachine, LaunchMode, MemoryClass, Outcome, RecorderConfig,
    WakeCause,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Immediate,
    AwaitRelease,
    DeepSleep,
}

impl From<Mode> for LaunchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Immediate => LaunchMode::Immediate,
            Mode::AwaitRelease => LaunchMode::AwaitRelease,
            Mode::DeepSleep => LaunchMode::DeepSleep,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Directory standing in for the card's mount point. Must exist.
    #[arg(long, env = "LAUNCH_CAM_MOUNT_POINT")]
    mount_point: PathBuf,

    /// Recording window in seconds.
    #[arg(long, default_value_t = RecorderConfig::LAUNCH.record_duration.as_secs())]
    duration: u64,

    #[arg(long, value_enum, default_value_t = Mode::Immediate)]
    launch_mode: Mode,

    /// Seconds after power-on at which the breakwire breaks.
    #[arg(long, default_value_t = 0.0)]
    release_after: f64,

    /// Boot as if woken by the trigger line.
    #[arg(long)]
    trigger_wake: bool,

    /// Simulate a board without external RAM.
    #[arg(long)]
    no_psram: bool,

    /// Encoded size of each simulated frame in bytes.
    #[arg(long, default_value_t = 20_000)]
    frame_len: usize,

    /// Sensor frame period in milliseconds.
    #[arg(long, default_value_t = 67)]
    frame_interval_ms: u64,

    /// Make every n-th capture attempt fail.
    #[arg(long)]
    drop_every: Option<NonZeroU64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = RecorderConfig {
        record_duration: Duration::from_secs(cli.duration),
        launch_mode: cli.launch_mode.into(),
        ..RecorderConfig::LAUNCH
    };
    let memory = if cli.no_psram {
        MemoryClass::Internal
    } else {
        MemoryClass::Extended
    };
    let profile = CaptureProfile::for_memory(memory);
    let wake = if cli.trigger_wake {
        WakeCause::Trigger
    } else {
        WakeCause::PowerOn
    };

    let clock = SimClock::new();
    let trigger = SimTrigger::releasing_at(
        clock.clone(),
        Duration::try_from_secs_f64(cli.release_after).context("invalid --release-after")?,
    );
    let camera = SimCamera::new(
        SimCameraConfig {
            frame_len: cli.frame_len,
            frame_interval: Duration::from_millis(cli.frame_interval_ms),
            drops: cli.drop_every.map_or(DropSchedule::Never, DropSchedule::Every),
            fail_init: false,
        },
        clock.clone(),
    );
    let store = FsSessionStore::new(&cli.mount_point);

    tracing::info!(
        "expecting about {} frames at {:.1} fps ({:?}, {} buffer(s))",
        config.expected_frames(),
        config.target_frame_rate.as_f64(),
        profile.frame_size,
        profile.frame_buffers,
    );

    let mut machine = CaptureStateMachine::new(
        config,
        profile,
        SimPower::new(wake),
        trigger,
        LogIndicator::new(),
        store,
        camera,
        clock,
    );

    match machine.run() {
        Outcome::Completed(report) => {
            let path = machine.store().container_path(report.session);
            let container =
                std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let frames = split_frames(&container).count();
            println!("session:      {}", report.session);
            println!("container:    {}", path.display());
            println!("frames:       {} ({} in file)", report.frames_appended, frames);
            println!("bytes:        {}", report.bytes_appended);
            println!("unavailable:  {}", report.frames_unavailable);
            println!("write errors: {}", report.write_failures);
            println!("elapsed:      {:.3}s", report.elapsed.as_secs_f64());
            if frames as u32 != report.frames_appended {
                bail!("container holds {frames} frames, expected {}", report.frames_appended);
            }
            Ok(())
        }
        Outcome::Suspended => {
            println!("trigger armed, device suspended until launch");
            Ok(())
        }
        Outcome::Halted(e) => Err(e).context("capture halted"),
    }
}
