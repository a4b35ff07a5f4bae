//! Backends for running the capture sequence on a development host.
//!
//! Storage is a directory standing in for the card's mount point. Camera,
//! trigger and power are simulated against a shared [`SimClock`], so a full
//! recording window runs in milliseconds.

pub mod camera;
pub mod clock;
pub mod indicator;
pub mod power;
pub mod storage;
pub mod trigger;

pub use camera::{
    DropSchedule, PooledFrame, SimCamera, SimCameraConfig, SimFrameSource, frame_sequence,
};
pub use clock::{SimClock, SystemClock};
pub use indicator::LogIndicator;
pub use power::{PowerEvent, SimPower};
pub use storage::{FsContainer, FsSessionStore};
pub use trigger::SimTrigger;
