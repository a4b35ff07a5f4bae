use core::time::Duration;

use crate::types::Ratio;

/// How the device decides that the launch has happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchMode {
    /// Start recording right after power-on without looking at the trigger.
    ///
    /// Bench testing only: a device flown like this records on the pad.
    Immediate,
    /// Stay powered and poll the trigger until it reads released.
    AwaitRelease,
    /// Suspend the whole device until the trigger line wakes it, unless this
    /// boot was already caused by the trigger or the trigger is released.
    DeepSleep,
}

/// What the device does once the recording is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestMode {
    /// Re-arm the trigger wake source and suspend.
    Suspend,
    /// Stay awake doing nothing.
    Idle,
}

/// Compile-time recorder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Length of the recording window.
    pub record_duration: Duration,
    /// Expected sensor frame rate. Advisory; the loop never throttles.
    pub target_frame_rate: Ratio,
    pub launch_mode: LaunchMode,
    pub rest_mode: RestMode,
    /// Poll period while waiting for the trigger in
    /// [`LaunchMode::AwaitRelease`].
    pub trigger_poll_interval: Duration,
}

impl RecorderConfig {
    /// Flight configuration: two minutes, waits for launch in deep sleep.
    pub const LAUNCH: Self = Self {
        record_duration: Duration::from_secs(120),
        target_frame_rate: Ratio::new(15, 1),
        launch_mode: LaunchMode::DeepSleep,
        rest_mode: RestMode::Suspend,
        trigger_poll_interval: Duration::from_millis(10),
    };

    /// Bench configuration: ten seconds, records immediately.
    pub const BENCH_TEST: Self = Self {
        record_duration: Duration::from_secs(10),
        target_frame_rate: Ratio::new(15, 1),
        launch_mode: LaunchMode::Immediate,
        rest_mode: RestMode::Suspend,
        trigger_poll_interval: Duration::from_millis(10),
    };

    /// Nominal time between frames at the target rate.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_frame_rate.as_f64())
    }

    /// Number of frames a loss-free window would contain.
    pub fn expected_frames(&self) -> u64 {
        (self.record_duration.as_secs_f64() * self.target_frame_rate.as_f64()) as u64
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self::LAUNCH
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn expected_frames_is_advisory_estimate() {
        assert_eq!(RecorderConfig::BENCH_TEST.expected_frames(), 150);
        assert_eq!(RecorderConfig::LAUNCH.expected_frames(), 1800);
        let interval = RecorderConfig::LAUNCH.frame_interval();
        assert_eq!(interval.as_millis(), 66);
    }
}
